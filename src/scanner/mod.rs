//! QR pickup scanner.
//!
//! - [`mux`]: camera/manual input switching and the scanner lifecycle
//! - [`submitter`]: single-in-flight confirmation of scanned tokens

pub mod mux;
pub mod submitter;

#[cfg(test)]
pub(crate) mod testing;

pub use mux::{InputMode, ManualCause, ScanListener, ScanOutcome, Scanner};
pub use submitter::{ConfirmationSubmitter, SubmitOutcome};
