//! Confirmation token extraction.
//!
//! QR codes in the wild encode the token in several ways:
//!
//! - the raw token (`ABC123`)
//! - a deep link (`https://host/callback/ABC123`, `https://host/orders/qr/ABC123?src=app`)
//! - a short link or bare path (`qr.example/ABC123`, `/callback/ABC123`)
//!
//! [`extract_token`] reduces all of them to the token itself. It is pure and
//! never fails; validation happens in [`crate::models::scan::ScanToken::parse`].

use url::Url;

/// Path prefixes after which the next segment is the token.
const MARKERS: &[&[&str]] = &[&["callback"], &["orders", "qr"]];

/// Extract the confirmation token from scanned text.
///
/// # Rules
///
/// 1. URL-like text with a known marker: the segment after the marker
/// 2. URL-like text without a marker: the last non-empty path segment
/// 3. Anything else: the trimmed input
///
/// Query strings and fragments are never part of the token. When a URL has
/// no usable segment the trimmed input is returned unchanged.
pub fn extract_token(raw: &str) -> String {
    let trimmed = raw.trim();

    path_segments(trimmed)
        .and_then(|segments| token_from_segments(&segments))
        .unwrap_or_else(|| trimmed.to_string())
}

/// Non-empty path segments of URL-like text, or `None` if the text is not URL-like.
fn path_segments(text: &str) -> Option<Vec<String>> {
    if text.is_empty() || text.chars().any(char::is_whitespace) {
        return None;
    }

    if let Ok(url) = Url::parse(text) {
        if url.has_host() {
            let segments: Vec<String> = url
                .path_segments()
                .map(|segments| {
                    segments
                        .filter(|segment| !segment.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            return Some(segments);
        }
    }

    // Short links and bare paths do not parse as absolute URLs.
    if text.contains('/') {
        let path = text.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<String> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        return Some(segments);
    }

    None
}

fn token_from_segments(segments: &[String]) -> Option<String> {
    for marker in MARKERS {
        let found = segments.windows(marker.len() + 1).find(|window| {
            window
                .iter()
                .zip(marker.iter())
                .all(|(segment, expected)| segment.eq_ignore_ascii_case(expected))
        });

        if let Some(window) = found {
            return window.last().cloned();
        }
    }

    segments.last().cloned()
}
