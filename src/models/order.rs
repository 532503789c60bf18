//! Order data models as seen by the pickup scanner.
//!
//! This module defines:
//! - `Order`: an order record returned by the backend
//! - `OrderStatus`: the order lifecycle states
//! - `OfferWindow`: the offer fields the pickup deadline is derived from

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order identifier.
///
/// The backend has used both numeric and string ids, so both are accepted
/// and written back in the same form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderId::Numeric(id) => write!(f, "{id}"),
            OrderId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        OrderId::Numeric(id)
    }
}

impl From<i32> for OrderId {
    fn from(id: i32) -> Self {
        OrderId::Numeric(i64::from(id))
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        OrderId::Text(id.to_string())
    }
}

/// Order lifecycle state.
///
/// # Transitions
///
/// This crate only ever moves an order forward:
/// - `pending → confirmed` after a successful scan
/// - `pending → expired` once the pickup window has elapsed
///
/// `cancelled` is set elsewhere and never touched here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cancelled,
    Expired,
}

impl OrderStatus {
    /// Whether this subsystem may move an order from `self` to `next`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Pending, OrderStatus::Expired)
        )
    }
}

/// Pickup-related fields of the offer an order was placed on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferWindow {
    /// End of the pickup window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_end_time: Option<DateTime<Utc>>,

    /// Expiration of the offer itself, used when no pickup end is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
}

/// An order record.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 42,
///   "status": "pending",
///   "createdAt": "2026-10-16T09:00:00Z",
///   "offer": { "pickupEndTime": "2026-10-16T18:00:00Z" }
/// }
/// ```
///
/// Fields not listed here are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,

    pub status: OrderStatus,

    /// Explicit pickup deadline, when the backend provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_window_end: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<OfferWindow>,
}

impl Order {
    pub fn new(id: impl Into<OrderId>, status: OrderStatus) -> Self {
        Self {
            id: id.into(),
            status,
            pickup_window_end: None,
            created_at: None,
            offer: None,
        }
    }

    pub fn with_pickup_window_end(mut self, end: DateTime<Utc>) -> Self {
        self.pickup_window_end = Some(end);
        self
    }

    /// End of the pickup window.
    ///
    /// Taken from the explicit field, then the offer's `pickupEndTime`, then
    /// the offer's `expirationDate`. `None` means the order never expires
    /// client-side.
    pub fn pickup_deadline(&self) -> Option<DateTime<Utc>> {
        self.pickup_window_end.or_else(|| {
            self.offer
                .as_ref()
                .and_then(|offer| offer.pickup_end_time.or(offer.expiration_date))
        })
    }

    /// Whether a pending order's pickup window has elapsed at `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == OrderStatus::Pending
            && self.pickup_deadline().is_some_and(|deadline| deadline <= now)
    }

    /// Move to `next` if the transition is allowed. Returns whether it happened.
    pub fn transition(&mut self, next: OrderStatus) -> bool {
        if self.status.can_transition_to(next) {
            self.status = next;
            true
        } else {
            false
        }
    }
}
