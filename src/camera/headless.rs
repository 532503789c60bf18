//! Camera for hosts without capture hardware.

use std::future::Future;

use super::backend::{CaptureDevice, CaptureStream, HardwareTrack};
use crate::error::{CaptureError, DeviceError};

/// A camera that is never available.
///
/// Opening always fails with `NoDevice`, which puts the scanner straight into
/// manual entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessCamera;

/// Placeholder stream type for [`HeadlessCamera`]. Never constructed by it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl CaptureDevice for HeadlessCamera {
    type Stream = NoCapture;

    fn open(&self) -> impl Future<Output = Result<NoCapture, DeviceError>> + Send {
        std::future::ready(Err(DeviceError::NoDevice))
    }
}

impl CaptureStream for NoCapture {
    type Track = NoCapture;

    fn stop(&mut self) -> impl Future<Output = Result<(), CaptureError>> + Send {
        std::future::ready(Err(CaptureError::NotRunning))
    }

    fn video_tracks(&mut self) -> Vec<NoCapture> {
        Vec::new()
    }
}

impl HardwareTrack for NoCapture {
    fn label(&self) -> String {
        "none".to_string()
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }
}
