//! In-memory confirmation backend used by unit tests.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::error::ConfirmError;
use crate::models::order::{Order, OrderId, OrderStatus};
use crate::models::scan::ScanToken;
use crate::services::ConfirmBackend;

#[derive(Default)]
struct Shared {
    calls: Mutex<Vec<String>>,
    called: Notify,
    gate: Notify,
}

#[derive(Clone)]
pub(crate) struct FakeBackend {
    rejection: Option<ConfirmError>,
    gated: bool,
    shared: Arc<Shared>,
}

impl FakeBackend {
    /// Confirms every token. `ORD-99` confirms order `99`.
    pub(crate) fn confirming() -> Self {
        Self {
            rejection: None,
            gated: false,
            shared: Arc::default(),
        }
    }

    pub(crate) fn rejecting(error: ConfirmError) -> Self {
        Self {
            rejection: Some(error),
            ..Self::confirming()
        }
    }

    /// Hold the response until [`FakeBackend::release`] is called.
    pub(crate) fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    pub(crate) async fn wait_for_call(&self) {
        self.shared.called.notified().await;
    }

    pub(crate) fn release(&self) {
        self.shared.gate.notify_one();
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.shared.calls.lock().unwrap().clone()
    }
}

fn order_id_for(token: &str) -> OrderId {
    let digits: String = token.chars().filter(char::is_ascii_digit).collect();
    digits
        .parse::<i64>()
        .map(OrderId::Numeric)
        .unwrap_or_else(|_| OrderId::Text(token.to_string()))
}

impl ConfirmBackend for FakeBackend {
    fn confirm_scan(
        &self,
        token: &ScanToken,
        bearer: &str,
    ) -> impl Future<Output = Result<Order, ConfirmError>> + Send {
        assert!(!bearer.is_empty());
        let backend = self.clone();
        let token = token.as_str().to_string();
        async move {
            backend.shared.calls.lock().unwrap().push(token.clone());
            backend.shared.called.notify_one();
            if backend.gated {
                backend.shared.gate.notified().await;
            }

            match backend.rejection {
                Some(error) => Err(error),
                None => Ok(Order::new(order_id_for(&token), OrderStatus::Confirmed)),
            }
        }
    }
}
