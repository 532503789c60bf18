//! Scan token and confirmation wire types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ExtractionError;
use crate::token::extract_token;

/// Canonical confirmation token extracted from a QR code.
///
/// Non-empty, with no path separators, query or fragment delimiters, or
/// whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ScanToken(String);

impl ScanToken {
    /// Extract and validate a token from raw scanned or typed text.
    pub fn parse(raw: &str) -> Result<Self, ExtractionError> {
        let candidate = extract_token(raw);

        if candidate.is_empty() {
            return Err(ExtractionError::Empty);
        }

        // Whitespace is rejected too, tighter than the delimiter rule
        if let Some(c) = candidate
            .chars()
            .find(|c| matches!(c, '/' | '?' | '#') || c.is_whitespace())
        {
            return Err(ExtractionError::IllegalCharacter(c));
        }

        Ok(Self(candidate))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One submission of a token to the backend.
#[derive(Debug, Clone)]
pub struct ScanAttempt {
    /// Correlates log lines for a single attempt
    pub id: Uuid,
    pub token: ScanToken,
    pub started_at: DateTime<Utc>,
}

impl ScanAttempt {
    pub fn new(token: ScanToken) -> Self {
        Self {
            id: Uuid::new_v4(),
            token,
            started_at: Utc::now(),
        }
    }
}

/// Request body for `POST /orders/scan`.
///
/// ```json
/// { "qrCodeToken": "ABC123" }
/// ```
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmScanRequest {
    pub qr_code_token: String,
}

impl From<&ScanToken> for ConfirmScanRequest {
    fn from(token: &ScanToken) -> Self {
        Self {
            qr_code_token: token.as_str().to_string(),
        }
    }
}

/// Failure body returned by the backend.
///
/// Only `message` is relevant; it may be missing entirely.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
