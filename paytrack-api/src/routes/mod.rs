/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `me`: Resolved caller identity
/// - `payments`: Owner-scoped payment endpoints
/// - `users`: User management

pub mod health;
pub mod me;
pub mod payments;
pub mod users;
