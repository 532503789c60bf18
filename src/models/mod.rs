//! Data models exchanged with the marketplace backend.

/// Order record and lifecycle states
pub mod order;
/// Scan token and confirmation request/response bodies
pub mod scan;
