//! HTTP client for the marketplace backend.
//!
//! Two endpoints are consumed:
//! - `POST /orders/scan` confirms a pickup
//! - `GET /orders/provider` lists the provider's orders
//!
//! Both send the stored bearer credential. Requests carry a fixed timeout; a
//! timeout is reported as a retryable network error.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

use crate::config::Config;
use crate::error::{ApiError, ConfirmError, ConfirmReason};
use crate::models::order::Order;
use crate::models::scan::{ConfirmScanRequest, ErrorBody, ScanToken};

/// Backend that can confirm a scanned pickup token.
pub trait ConfirmBackend: Send + Sync {
    /// Confirm the pickup identified by `token`.
    ///
    /// Returns the updated order on success. Every failure is mapped to a
    /// [`ConfirmError`] the user may retry.
    fn confirm_scan(
        &self,
        token: &ScanToken,
        bearer: &str,
    ) -> impl Future<Output = Result<Order, ConfirmError>> + Send;
}

/// Source of the provider's current order list.
pub trait OrderSource: Send + Sync {
    fn provider_orders(
        &self,
        bearer: &str,
    ) -> impl Future<Output = Result<Vec<Order>, ApiError>> + Send;
}

/// `reqwest`-backed client for the marketplace API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// - `Url` if `base_url` is not an absolute URL
    /// - `Http` if the underlying HTTP client cannot be built
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;

        // Url::join replaces the last segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(&config.api_base_url, config.confirm_timeout())
    }

    fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

impl ConfirmBackend for ApiClient {
    async fn confirm_scan(&self, token: &ScanToken, bearer: &str) -> Result<Order, ConfirmError> {
        let url = self
            .endpoint("orders/scan")
            .map_err(|e| ConfirmError::new(ConfirmReason::Unknown, e.to_string()))?;

        let response = self
            .http
            .post(url)
            .bearer_auth(bearer)
            .json(&ConfirmScanRequest::from(token))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return response.json::<Order>().await.map_err(transport_error);
        }

        let message = error_message(response).await;
        Err(classify_rejection(status, message))
    }
}

impl OrderSource for ApiClient {
    async fn provider_orders(&self, bearer: &str) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint("orders/provider")?;

        let response = self.http.get(url).bearer_auth(bearer).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response)
                .await
                .unwrap_or_else(|| status.to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<Vec<Order>>().await?)
    }
}

/// Read the `message` field from a failure body, if there is one.
async fn error_message(response: reqwest::Response) -> Option<String> {
    let body = response.text().await.ok()?;
    serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
}

fn transport_error(e: reqwest::Error) -> ConfirmError {
    if e.is_decode() {
        ConfirmError::new(
            ConfirmReason::Unknown,
            format!("Unexpected response from server: {e}"),
        )
    } else {
        ConfirmError::new(ConfirmReason::Network, e.to_string())
    }
}

/// Map a rejected confirmation to a user-facing reason.
///
/// # Status Code Mapping
///
/// - `404 Not Found` → invalid
/// - `409 Conflict` → already confirmed
/// - `410 Gone` → expired
/// - `502`/`503`/`504` → network
/// - other `4xx` → inferred from the message, otherwise unknown
/// - anything else → unknown
///
/// The backend message is always kept for display.
fn classify_rejection(status: StatusCode, message: Option<String>) -> ConfirmError {
    let reason = match status {
        StatusCode::NOT_FOUND => ConfirmReason::Invalid,
        StatusCode::CONFLICT => ConfirmReason::AlreadyConfirmed,
        StatusCode::GONE => ConfirmReason::Expired,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            ConfirmReason::Network
        }
        s if s.is_client_error() => message
            .as_deref()
            .map(reason_from_message)
            .unwrap_or(ConfirmReason::Unknown),
        _ => ConfirmReason::Unknown,
    };

    ConfirmError {
        reason,
        message: message.or_else(|| Some(status.to_string())),
    }
}

fn reason_from_message(message: &str) -> ConfirmReason {
    let lower = message.to_lowercase();
    if lower.contains("already") {
        ConfirmReason::AlreadyConfirmed
    } else if lower.contains("expired") {
        ConfirmReason::Expired
    } else if lower.contains("not found") || lower.contains("invalid") {
        ConfirmReason::Invalid
    } else {
        ConfirmReason::Unknown
    }
}
