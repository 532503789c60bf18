//! Scanner front: switches between camera and manual entry.
//!
//! Exactly one token source is active at a time. The camera feeds every
//! decoded frame to the submitter; manual entry submits only on an explicit
//! user action. A camera that cannot be acquired drops the scanner into
//! manual entry instead of failing.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use super::submitter::{ConfirmationSubmitter, SubmitOutcome};
use crate::auth::CredentialSource;
use crate::camera::{CameraSession, CameraState, CaptureDevice, StartOutcome};
use crate::error::{ConfirmError, DeviceError, ScannerError};
use crate::models::order::Order;
use crate::models::scan::ScanToken;
use crate::services::ConfirmBackend;

/// Why the scanner is in manual entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualCause {
    UserChoice,
    /// The camera could not be acquired.
    DeviceFallback(DeviceError),
}

/// The active token source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Scanner view is not open (or has completed a confirmation).
    Closed,
    Camera,
    Manual(ManualCause),
}

/// Result of feeding one decoded frame or manual submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Confirmed(Order),
    Rejected(ConfirmError),
    /// Not acted on: wrong input mode, closed scanner, or a confirmation
    /// already in flight.
    Ignored,
}

/// Receives scanner events for the owning view.
///
/// Callbacks are skipped once the view has been closed.
pub trait ScanListener: Send + Sync {
    /// Called after the camera has been stopped.
    fn on_confirmed(&self, _order: &Order) {}

    fn on_rejected(&self, _error: &ConfirmError) {}

    fn on_mode_changed(&self, _mode: &InputMode) {}
}

impl ScanListener for () {}

pub struct Scanner<D: CaptureDevice, B> {
    camera: CameraSession<D>,
    submitter: ConfirmationSubmitter<B>,
    credentials: Arc<dyn CredentialSource>,
    listener: Arc<dyn ScanListener>,
    mode: Mutex<InputMode>,
    view: Mutex<CancellationToken>,
    /// Owns the current camera activation; a child of `view`.
    source: Mutex<CancellationToken>,
}

impl<D: CaptureDevice, B> std::fmt::Debug for Scanner<D, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner").finish_non_exhaustive()
    }
}

impl<D: CaptureDevice, B: ConfirmBackend> Scanner<D, B> {
    pub fn new(device: D, backend: B, credentials: Arc<dyn CredentialSource>) -> Self {
        let view = CancellationToken::new();
        view.cancel();

        Self {
            camera: CameraSession::new(device),
            submitter: ConfirmationSubmitter::new(backend, credentials.clone()),
            credentials,
            listener: Arc::new(()),
            mode: Mutex::new(InputMode::Closed),
            source: Mutex::new(view.child_token()),
            view: Mutex::new(view),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn ScanListener>) -> Self {
        self.listener = listener;
        self
    }

    pub async fn mode(&self) -> InputMode {
        self.mode.lock().await.clone()
    }

    pub async fn camera_state(&self) -> CameraState {
        self.camera.state().await
    }

    pub fn is_in_flight(&self) -> bool {
        self.submitter.is_in_flight()
    }

    /// Open the scanner view, starting in camera mode.
    ///
    /// Falls back to manual entry if the camera cannot be acquired. Opening
    /// an already open scanner returns its current mode.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` if no bearer credential is stored; the camera is
    /// not touched in that case.
    pub async fn open(&self) -> Result<InputMode, ScannerError> {
        if self.credentials.bearer_token().is_none() {
            return Err(ScannerError::NotAuthenticated);
        }

        let source = {
            let mut mode = self.mode.lock().await;
            if *mode != InputMode::Closed {
                return Ok(mode.clone());
            }
            let view = CancellationToken::new();
            let source = view.child_token();
            *self.view.lock().await = view;
            *self.source.lock().await = source.clone();
            *mode = InputMode::Camera;
            source
        };
        tracing::info!("Scanner opened");

        self.start_camera(&source).await;
        Ok(self.mode().await)
    }

    /// Switch to manual entry, releasing the camera first.
    ///
    /// A camera start still in progress is undone when it completes.
    pub async fn use_manual(&self) {
        let mut mode = self.mode.lock().await;
        match *mode {
            InputMode::Camera => {
                self.source.lock().await.cancel();
                self.camera.stop().await;
                *mode = InputMode::Manual(ManualCause::UserChoice);
            }
            InputMode::Manual(_) | InputMode::Closed => return,
        }
        drop(mode);

        self.notify_mode(&self.current_view().await, &InputMode::Manual(ManualCause::UserChoice));
    }

    /// Switch back to the camera from manual entry.
    pub async fn use_camera(&self) -> InputMode {
        let source = {
            let mut mode = self.mode.lock().await;
            if !matches!(*mode, InputMode::Manual(_)) {
                return mode.clone();
            }
            let source = self.view.lock().await.child_token();
            *self.source.lock().await = source.clone();
            *mode = InputMode::Camera;
            source
        };

        self.start_camera(&source).await;
        self.mode().await
    }

    /// Start the camera for the activation owned by `source`.
    ///
    /// Once `source` is cancelled the scanner has left this activation, and a
    /// stream opened for it has already been released by the session.
    async fn start_camera(&self, source: &CancellationToken) {
        let next = match self.camera.start(source).await {
            Ok(StartOutcome::Running) => InputMode::Camera,
            Ok(StartOutcome::Cancelled) => return,
            Err(e) => {
                tracing::info!(error = %e, "Camera unavailable, switching to manual entry");
                InputMode::Manual(ManualCause::DeviceFallback(e))
            }
        };

        {
            let mut mode = self.mode.lock().await;
            if source.is_cancelled() || *mode != InputMode::Camera {
                return;
            }
            *mode = next.clone();
        }

        self.notify_mode(source, &next);
    }

    /// Close the scanner view.
    ///
    /// A camera start still in progress is undone when it completes. A
    /// confirmation still in flight is awaited by its caller, but the
    /// listener is no longer notified.
    pub async fn close(&self) {
        self.view.lock().await.cancel();
        *self.mode.lock().await = InputMode::Closed;
        self.camera.stop().await;
        tracing::info!("Scanner closed");
    }

    /// Handle one frame decoded by the camera.
    ///
    /// Ignored unless the scanner is in camera mode.
    pub async fn on_decode(&self, raw: &str) -> ScanOutcome {
        if *self.mode.lock().await != InputMode::Camera {
            return ScanOutcome::Ignored;
        }
        self.confirm_text(raw).await
    }

    /// Submit text typed or pasted by the user.
    ///
    /// Ignored unless the scanner is in manual entry.
    pub async fn submit_manual(&self, raw: &str) -> ScanOutcome {
        if !matches!(*self.mode.lock().await, InputMode::Manual(_)) {
            return ScanOutcome::Ignored;
        }
        self.confirm_text(raw).await
    }

    async fn confirm_text(&self, raw: &str) -> ScanOutcome {
        if self.submitter.is_in_flight() {
            return ScanOutcome::Ignored;
        }

        let view = self.current_view().await;

        let token = match ScanToken::parse(raw) {
            Ok(token) => token,
            Err(e) => {
                let error = ConfirmError::from(e);
                if !view.is_cancelled() {
                    self.listener.on_rejected(&error);
                }
                return ScanOutcome::Rejected(error);
            }
        };

        match self.submitter.submit(token, &self.camera).await {
            SubmitOutcome::Confirmed(order) => {
                if view.is_cancelled() {
                    tracing::info!(order = %order.id, "Pickup confirmed after scanner was closed");
                } else {
                    view.cancel();
                    *self.mode.lock().await = InputMode::Closed;
                    self.listener.on_confirmed(&order);
                }
                ScanOutcome::Confirmed(order)
            }
            SubmitOutcome::Rejected(error) => {
                if !view.is_cancelled() {
                    self.listener.on_rejected(&error);
                }
                ScanOutcome::Rejected(error)
            }
            SubmitOutcome::Dropped => ScanOutcome::Ignored,
        }
    }

    async fn current_view(&self) -> CancellationToken {
        self.view.lock().await.clone()
    }

    fn notify_mode(&self, view: &CancellationToken, mode: &InputMode) {
        if !view.is_cancelled() {
            self.listener.on_mode_changed(mode);
        }
    }
}
