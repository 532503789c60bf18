//! Camera access for the scanner.
//!
//! - [`backend`]: traits a platform capture library implements
//! - [`session`]: the session manager that exclusively owns the camera
//! - [`headless`]: stand-in for hosts without a camera

pub mod backend;
pub mod headless;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{CaptureDevice, CaptureStream, HardwareTrack};
pub use headless::HeadlessCamera;
pub use session::{CameraSession, CameraState, StartOutcome};
