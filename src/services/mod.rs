//! Clients for the marketplace backend.
//!
//! Services hide HTTP details behind the traits the scanner and the order
//! board depend on.

pub mod api_client;

pub use api_client::{ApiClient, ConfirmBackend, OrderSource};
