//! # Paytrack Shared Library
//!
//! Domain types, storage and business rules for the Paytrack bill tracker,
//! used by the API server.
//!
//! ## Module Organization
//!
//! - `models`: Payments, users, recurrence, derived status and summaries
//! - `store`: Owner-scoped storage traits with PostgreSQL and in-memory backends
//! - `service`: The payment domain service
//! - `auth`: Token validation and caller identity resolution
//! - `db`: Connection pool and migrations
//! - `validation`: Field rules shared by request types
//! - `error`: Common error types

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod validation;

/// Current version of the Paytrack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
