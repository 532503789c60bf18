//! Camera session manager.
//!
//! Owns the single active capture stream and guards its lifecycle:
//!
//! ```text
//! Idle ──start──▶ Starting ──opened──▶ Running ──stop──▶ Stopping ──▶ Idle
//!                    │                                      ▲
//!                    ├──open failed──────────────▶ Idle     │
//!                    └──view torn down during open──────────┘
//! ```
//!
//! The stream handle lives inside the `Running` state, so a handle exists
//! only while the camera is started and can be released at most once.

use tokio::sync::{Mutex, Notify};
use tokio_util::sync::CancellationToken;

use super::backend::{CaptureDevice, CaptureStream, HardwareTrack};
use crate::error::{DeviceError, LifecycleRaceError};

/// Observable camera state, without the stream handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Idle,
    Starting,
    Running,
    Stopping,
}

/// Result of a start that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Running,
    /// The owning view went away while the camera was opening; the stream
    /// has already been released.
    Cancelled,
}

enum SessionState<S> {
    Idle,
    Starting,
    Running(S),
    Stopping,
}

impl<S> SessionState<S> {
    fn observe(&self) -> CameraState {
        match self {
            SessionState::Idle => CameraState::Idle,
            SessionState::Starting => CameraState::Starting,
            SessionState::Running(_) => CameraState::Running,
            SessionState::Stopping => CameraState::Stopping,
        }
    }
}

/// Exclusive owner of the camera device.
///
/// Only this type starts or stops the camera.
pub struct CameraSession<D: CaptureDevice> {
    device: D,
    state: Mutex<SessionState<D::Stream>>,
    /// Signalled whenever the state leaves `Starting` or `Stopping`.
    settled: Notify,
}

impl<D: CaptureDevice> std::fmt::Debug for CameraSession<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession").finish_non_exhaustive()
    }
}

impl<D: CaptureDevice> CameraSession<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            state: Mutex::new(SessionState::Idle),
            settled: Notify::new(),
        }
    }

    pub async fn state(&self) -> CameraState {
        self.state.lock().await.observe()
    }

    /// Acquire the camera on behalf of the view represented by `view`.
    ///
    /// A previous session that is still starting or stopping is waited for
    /// first. If `view` is cancelled before the camera finishes opening, the
    /// freshly opened stream is released immediately and `Cancelled` is
    /// returned.
    ///
    /// # Errors
    ///
    /// - `Busy` if another session is running
    /// - whatever the device reports when it cannot be opened
    pub async fn start(&self, view: &CancellationToken) -> Result<StartOutcome, DeviceError> {
        loop {
            // Registered before the state check so a settle in between is not missed
            let settled = self.settled.notified();
            tokio::pin!(settled);
            settled.as_mut().enable();

            {
                let mut state = self.state.lock().await;
                match *state {
                    SessionState::Idle => {
                        *state = SessionState::Starting;
                        break;
                    }
                    SessionState::Running(_) => return Err(DeviceError::Busy),
                    SessionState::Starting | SessionState::Stopping => {}
                }
            }

            tracing::debug!("Previous camera session still settling, waiting");
            settled.await;
        }

        if view.is_cancelled() {
            self.settle(SessionState::Idle).await;
            tracing::debug!("Camera start skipped, view already closed");
            return Ok(StartOutcome::Cancelled);
        }

        let mut stream = match self.device.open().await {
            Ok(stream) => stream,
            Err(e) => {
                self.settle(SessionState::Idle).await;
                tracing::warn!(error = %e, "Camera failed to start");
                return Err(e);
            }
        };

        let mut state = self.state.lock().await;
        if view.is_cancelled() {
            *state = SessionState::Stopping;
            drop(state);

            tracing::debug!(reason = %LifecycleRaceError::StaleStart, "Releasing camera");
            release(&mut stream).await;

            self.settle(SessionState::Idle).await;
            return Ok(StartOutcome::Cancelled);
        }

        *state = SessionState::Running(stream);
        drop(state);
        self.settled.notify_waiters();
        tracing::info!("Camera running");
        Ok(StartOutcome::Running)
    }

    /// Stop the camera and release the physical device.
    ///
    /// A no-op unless the camera is running. Never fails: every error from the
    /// capture library is logged and the session always ends idle.
    pub async fn stop(&self) {
        let mut stream = {
            let mut state = self.state.lock().await;
            match std::mem::replace(&mut *state, SessionState::Stopping) {
                SessionState::Running(stream) => stream,
                other => {
                    *state = other;
                    tracing::debug!(reason = %LifecycleRaceError::StopWhileIdle, "Camera stop ignored");
                    return;
                }
            }
        };

        release(&mut stream).await;

        self.settle(SessionState::Idle).await;
        tracing::info!("Camera stopped");
    }

    async fn settle(&self, next: SessionState<D::Stream>) {
        *self.state.lock().await = next;
        self.settled.notify_waiters();
    }
}

/// Stop the capture library, then stop every hardware track.
///
/// Both steps always run. The library's own stop does not reliably free the
/// device, and a track left open makes the next start fail with camera-busy.
/// Each step is attempted once.
async fn release<S: CaptureStream>(stream: &mut S) {
    match stream.stop().await {
        Ok(()) => {}
        Err(e) if e.is_benign() => tracing::debug!(error = %e, "Capture already stopped"),
        Err(e) => tracing::warn!(error = %e, "Capture library failed to stop"),
    }

    for mut track in stream.video_tracks() {
        if let Err(e) = track.stop() {
            tracing::warn!(track = %track.label(), error = %e, "Hardware track release failed");
        }
    }
}
