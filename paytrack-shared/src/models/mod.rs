/// Domain models for Paytrack
///
/// # Models
///
/// - `payment`: Payments, recurrence, derived status and inputs
/// - `summary`: Per-user aggregate counts and totals
/// - `user`: Users that own payments
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use paytrack_shared::models::payment::{CreatePayment, PaymentStatus, RecurrenceKind};
/// use rust_decimal::Decimal;
///
/// let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
/// let input = CreatePayment {
///     name: "Rent".to_string(),
///     amount: Decimal::new(120000, 2),
///     due_date: today.succ_opt(),
///     is_recurring: true,
///     recurrence: RecurrenceKind::Monthly,
///     notes: None,
/// };
///
/// let payment = input.into_new_payment(1).unwrap().with_id(1);
/// assert_eq!(payment.status(today), PaymentStatus::DueSoon);
/// ```

pub mod payment;
pub mod summary;
pub mod user;
