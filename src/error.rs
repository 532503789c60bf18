//! Error types for the pickup-confirmation flow.
//!
//! Errors are split by how they propagate:
//!
//! - **Device errors** are handled locally: the scanner falls back to manual entry
//! - **Capture/lifecycle errors** are internal and always swallowed by the camera manager
//! - **Confirmation errors** are surfaced inline to the user, who may retry
//! - **Scanner/API errors** cover configuration, credentials and order-list fetches

use std::fmt;

/// Camera could not be acquired.
///
/// Never fatal. The scanner reacts by switching to manual entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// No capture device is attached or exposed by the platform.
    #[error("No camera available")]
    NoDevice,

    /// The user or the platform denied camera access.
    #[error("Camera permission denied")]
    PermissionDenied,

    /// Another session is running the camera.
    ///
    /// A start issued while a previous session is still starting or stopping
    /// waits for it instead.
    #[error("Camera is busy")]
    Busy,

    /// Any other failure reported by the capture library.
    #[error("Camera error: {0}")]
    Backend(String),
}

/// Scanned text could not be turned into a usable token.
///
/// The extractor itself never fails; this is raised only by the stricter
/// validation in [`crate::models::scan::ScanToken::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("Scanned code is empty")]
    Empty,

    #[error("Scanned code contains an illegal character: {0:?}")]
    IllegalCharacter(char),
}

/// Why a confirmation did not go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfirmReason {
    /// Token unknown to the backend, or rejected locally before sending.
    Invalid,
    AlreadyConfirmed,
    Expired,
    /// Transport failure or timeout.
    Network,
    Unknown,
}

impl ConfirmReason {
    /// Fixed user-facing text, if this reason has one.
    fn mapped_message(self) -> Option<&'static str> {
        match self {
            ConfirmReason::Invalid => Some("This QR code is not valid."),
            ConfirmReason::AlreadyConfirmed => Some("This order has already been picked up."),
            ConfirmReason::Expired => Some("The pickup window for this order has expired."),
            ConfirmReason::Network => Some("Network error. Check your connection and try again."),
            ConfirmReason::Unknown => None,
        }
    }
}

impl fmt::Display for ConfirmReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfirmReason::Invalid => "invalid",
            ConfirmReason::AlreadyConfirmed => "already-confirmed",
            ConfirmReason::Expired => "expired",
            ConfirmReason::Network => "network",
            ConfirmReason::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A confirmation attempt failed.
///
/// Always retryable from the user's perspective: the scanner stays open and
/// the error is shown inline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Confirmation failed ({reason})")]
pub struct ConfirmError {
    pub reason: ConfirmReason,

    /// Human-readable message from the backend (or the local cause).
    pub message: Option<String>,
}

impl ConfirmError {
    pub fn new(reason: ConfirmReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: Some(message.into()),
        }
    }

    pub fn from_reason(reason: ConfirmReason) -> Self {
        Self {
            reason,
            message: None,
        }
    }

    /// Text to display to the user.
    ///
    /// Mapped reasons use a fixed message; anything else shows the backend
    /// message verbatim.
    pub fn user_message(&self) -> String {
        match (self.reason.mapped_message(), &self.message) {
            (Some(text), _) => text.to_string(),
            (None, Some(message)) => message.clone(),
            (None, None) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<ExtractionError> for ConfirmError {
    fn from(err: ExtractionError) -> Self {
        ConfirmError::new(ConfirmReason::Invalid, err.to_string())
    }
}

/// Failure reported by the capture library while stopping.
///
/// Internal only. The camera manager logs these and always ends idle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// The library considers the capture already stopped.
    #[error("capture is not running")]
    NotRunning,

    /// The library refused to stop in its current state.
    #[error("capture cannot be stopped: {0}")]
    CannotStop(String),

    #[error("capture failure: {0}")]
    Failed(String),
}

impl CaptureError {
    /// Classify a raw error message from a capture library.
    ///
    /// Platform-API limitation: some capture libraries only report their
    /// state through error strings, so benign races are recognised from this
    /// allow-list of signatures. Libraries that expose typed states should
    /// construct the variants directly instead.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("not running") || lower.contains("not started") {
            CaptureError::NotRunning
        } else if lower.contains("cannot stop") {
            CaptureError::CannotStop(message.to_string())
        } else {
            CaptureError::Failed(message.to_string())
        }
    }

    /// Whether this is an expected race rather than a real failure.
    pub fn is_benign(&self) -> bool {
        matches!(self, CaptureError::NotRunning | CaptureError::CannotStop(_))
    }
}

/// Lifecycle race detected by the camera manager.
///
/// Internal only: never shown to the user, always resolved by ending idle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleRaceError {
    #[error("stop requested while capture was not running")]
    StopWhileIdle,

    #[error("start completed after the owning view was torn down")]
    StaleStart,
}

/// Fetching the order list failed.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid base URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Errors surfaced by the scanner itself.
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    /// No bearer credential is stored.
    ///
    /// Checked before any camera or network action.
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Configuration error: {0}")]
    Config(#[from] envy::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}
