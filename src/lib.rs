//! Pickup Scanner - QR pickup confirmation for a surplus-food marketplace.
//!
//! Providers scan the customer's QR code (or type the code by hand) to confirm
//! that an order was collected. This crate holds the logic behind that flow:
//!
//! - [`token`]: reduce whatever the QR code encodes to a confirmation token
//! - [`camera`]: acquire and release the camera safely across lifecycle races
//! - [`scanner`]: camera/manual input switching and single-in-flight confirmation
//! - [`reconciler`]: client-side expiry of orders whose pickup window has ended
//! - [`services`]: HTTP client for the marketplace backend
//!
//! # Flow
//!
//! 1. Open the scanner (camera, or manual entry if no camera is available)
//! 2. Each decoded frame or manual submission is reduced to a token
//! 3. The token is confirmed with `POST /orders/scan`, one request at a time
//! 4. On success the camera is released, then the listener is notified
//! 5. The caller refreshes the order list, which is reconciled for expiry

pub mod auth;
pub mod camera;
pub mod config;
pub mod error;
pub mod models;
pub mod reconciler;
pub mod scanner;
pub mod services;
pub mod token;

pub use auth::{CredentialSource, StaticCredentials};
pub use config::Config;
pub use error::{ConfirmError, ConfirmReason, DeviceError, ScannerError};
pub use models::order::{Order, OrderId, OrderStatus};
pub use models::scan::ScanToken;
pub use reconciler::{Clock, OrderBoard, SystemClock, reconcile};
pub use scanner::{InputMode, ScanListener, ScanOutcome, Scanner};
pub use token::extract_token;
