/// Database layer for Paytrack
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: Embedded migration runner
///
/// The queries themselves live in [`crate::store::postgres`].

pub mod migrations;
pub mod pool;
