//! Capture library abstraction.
//!
//! Platform camera integrations implement these traits. The session manager
//! only talks to the camera through them.

use std::future::Future;

use crate::error::{CaptureError, DeviceError};

/// An individual hardware media track (e.g. the camera video track).
///
/// Stopping the track is what actually releases the physical device.
pub trait HardwareTrack: Send {
    /// Label used in logs.
    fn label(&self) -> String;

    fn stop(&mut self) -> Result<(), CaptureError>;
}

/// A started capture stream, exclusively owned by the session manager.
pub trait CaptureStream: Send {
    type Track: HardwareTrack;

    /// Ask the capture library to stop scanning.
    ///
    /// Not always enough to release the device on its own.
    fn stop(&mut self) -> impl Future<Output = Result<(), CaptureError>> + Send;

    /// Enumerate the hardware tracks attached to the video output.
    fn video_tracks(&mut self) -> Vec<Self::Track>;
}

/// A camera that can be opened into a capture stream.
pub trait CaptureDevice: Send + Sync {
    type Stream: CaptureStream;

    /// Acquire the camera and start capturing.
    ///
    /// # Errors
    ///
    /// - `NoDevice` if no camera is available
    /// - `PermissionDenied` if access was refused
    fn open(&self) -> impl Future<Output = Result<Self::Stream, DeviceError>> + Send;
}
