/// Domain services
///
/// - [`payments::PaymentService`]: owner-scoped payment operations, status
///   derivation, recurring rollover and summaries
/// - [`clock::Clock`]: where "today" comes from
pub mod clock;
pub mod payments;

pub use clock::Clock;
pub use payments::{MarkedPaid, PaymentService};
