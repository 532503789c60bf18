//! Confirmation submitter.
//!
//! Sends a token to the backend at most once at a time. The camera keeps
//! decoding the same QR code on every frame while a confirmation is in
//! flight; those duplicates are dropped, not queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::auth::CredentialSource;
use crate::camera::{CameraSession, CaptureDevice};
use crate::error::{ConfirmError, ConfirmReason};
use crate::models::order::Order;
use crate::models::scan::{ScanAttempt, ScanToken};
use crate::services::ConfirmBackend;

/// What happened to one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend confirmed the order; the camera has been stopped.
    Confirmed(Order),
    /// The confirmation failed; the user may retry.
    Rejected(ConfirmError),
    /// Another confirmation was in flight, nothing was sent.
    Dropped,
}

/// Resets the in-flight flag on every exit path.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ConfirmationSubmitter<B> {
    backend: B,
    credentials: Arc<dyn CredentialSource>,
    in_flight: AtomicBool,
}

impl<B> std::fmt::Debug for ConfirmationSubmitter<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmationSubmitter")
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl<B: ConfirmBackend> ConfirmationSubmitter<B> {
    pub fn new(backend: B, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            backend,
            credentials,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.in_flight))
    }

    /// Confirm `token`, stopping `camera` before reporting success.
    ///
    /// # Process
    ///
    /// 1. Drop the call if a confirmation is already in flight
    /// 2. Read the bearer credential
    /// 3. Call the backend
    /// 4. On success stop the camera, then return the confirmed order
    ///
    /// The in-flight flag stays set until the camera stop has been issued, so
    /// frames decoded while the camera shuts down cannot trigger a second
    /// confirmation.
    pub async fn submit<D: CaptureDevice>(
        &self,
        token: ScanToken,
        camera: &CameraSession<D>,
    ) -> SubmitOutcome {
        let Some(_guard) = self.try_begin() else {
            tracing::trace!(token = %token, "Confirmation in flight, scan dropped");
            return SubmitOutcome::Dropped;
        };

        let Some(bearer) = self.credentials.bearer_token() else {
            tracing::warn!("No bearer credential, confirmation not sent");
            return SubmitOutcome::Rejected(ConfirmError::new(
                ConfirmReason::Unknown,
                "You are signed out. Sign in again to confirm pickups.",
            ));
        };

        let attempt = ScanAttempt::new(token);
        tracing::info!(attempt = %attempt.id, token = %attempt.token, "Submitting pickup confirmation");

        match self.backend.confirm_scan(&attempt.token, &bearer).await {
            Ok(order) => {
                camera.stop().await;
                let elapsed_ms = (chrono::Utc::now() - attempt.started_at).num_milliseconds();
                tracing::info!(
                    attempt = %attempt.id,
                    order = %order.id,
                    elapsed_ms,
                    "Pickup confirmed"
                );
                SubmitOutcome::Confirmed(order)
            }
            Err(e) => {
                tracing::warn!(attempt = %attempt.id, reason = %e.reason, error = %e, "Pickup confirmation rejected");
                SubmitOutcome::Rejected(e)
            }
        }
    }
}
