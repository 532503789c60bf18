//! Client-side order expiry.
//!
//! The backend does not flip orders to `expired` on its own schedule, so the
//! client does it for display: every `pending` order whose pickup window has
//! ended is shown as `expired`. Reconciliation runs once after every fetch and
//! then on a fixed tick while the list is held in memory.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::auth::CredentialSource;
use crate::error::ScannerError;
use crate::models::order::{Order, OrderStatus};
use crate::services::OrderSource;

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Expire overdue pending orders in place. Returns how many changed.
fn expire_overdue(orders: &mut [Order], now: DateTime<Utc>) -> usize {
    orders
        .iter_mut()
        .filter(|order| order.is_overdue(now))
        .map(|order| order.transition(OrderStatus::Expired))
        .filter(|changed| *changed)
        .count()
}

/// Reconcile `orders` against `now`.
///
/// Every `pending` order with a pickup deadline at or before `now` becomes
/// `expired`; everything else is copied unchanged. Running it again with the
/// same `now` yields the same list.
pub fn reconcile(orders: &[Order], now: DateTime<Utc>) -> Vec<Order> {
    let mut reconciled = orders.to_vec();
    expire_overdue(&mut reconciled, now);
    reconciled
}

/// In-memory order list with expiry applied.
///
/// Subscribers are only notified when the list actually changes.
#[derive(Debug)]
pub struct OrderBoard<C = SystemClock> {
    clock: C,
    orders: watch::Sender<Vec<Order>>,
}

impl OrderBoard<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for OrderBoard<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> OrderBoard<C> {
    pub fn with_clock(clock: C) -> Self {
        let (orders, _) = watch::channel(Vec::new());
        Self { clock, orders }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Order>> {
        self.orders.subscribe()
    }

    pub fn snapshot(&self) -> Vec<Order> {
        self.orders.borrow().clone()
    }

    /// Install a freshly fetched list, reconciled immediately.
    ///
    /// Returns how many orders were expired.
    pub fn replace(&self, mut orders: Vec<Order>) -> usize {
        let expired = expire_overdue(&mut orders, self.clock.now());
        self.orders.send_replace(orders);
        expired
    }

    /// Re-run expiry against the current time.
    ///
    /// Publishes nothing when no order changed.
    pub fn tick(&self) -> usize {
        let now = self.clock.now();
        let mut expired = 0;
        self.orders.send_if_modified(|orders| {
            expired = expire_overdue(orders, now);
            expired > 0
        });
        expired
    }

    /// Apply a confirmation returned by the scanner.
    ///
    /// Only a pending order with the same id is updated. Returns whether the
    /// list changed.
    pub fn apply_confirmed(&self, confirmed: &Order) -> bool {
        self.orders.send_if_modified(|orders| {
            orders
                .iter_mut()
                .find(|order| order.id == confirmed.id)
                .is_some_and(|order| order.transition(confirmed.status))
        })
    }

    /// Fetch the provider's orders and install them.
    ///
    /// # Errors
    ///
    /// - `NotAuthenticated` if no bearer credential is stored
    /// - `Api` if the fetch fails; the current list is kept
    pub async fn refresh<S: OrderSource>(
        &self,
        source: &S,
        credentials: &dyn CredentialSource,
    ) -> Result<usize, ScannerError> {
        let bearer = credentials
            .bearer_token()
            .ok_or(ScannerError::NotAuthenticated)?;

        let orders = source.provider_orders(&bearer).await?;
        let total = orders.len();
        let expired = self.replace(orders);
        tracing::info!(total, expired, "Order list refreshed");

        Ok(total)
    }
}

impl<C: Clock + 'static> OrderBoard<C> {
    /// Reconcile every `period` until `shutdown` is cancelled.
    pub fn spawn_ticker(self: Arc<Self>, period: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; lists are reconciled on install
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => {
                        let expired = self.tick();
                        if expired > 0 {
                            tracing::info!(expired, "Pickup windows elapsed");
                        }
                    }
                }
            }

            tracing::debug!("Expiry ticker stopped");
        })
    }
}
