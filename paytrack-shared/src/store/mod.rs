/// Storage abstraction for payments and users
///
/// The domain service talks to storage only through these traits, which
/// makes owner scoping a property of the interface: every payment
/// operation takes the owning user's id, and a payment owned by someone
/// else is indistinguishable from one that does not exist.
///
/// # Implementations
///
/// - [`postgres::PgStore`]: PostgreSQL via sqlx
/// - [`memory::MemoryStore`]: process-local store for tests and for running
///   without a database
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use paytrack_shared::models::payment::{CreatePayment, DueWindow};
/// use paytrack_shared::models::user::CreateUser;
/// use paytrack_shared::store::{memory::MemoryStore, PaymentStore, UserStore};
/// use rust_decimal::Decimal;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let user = store.create_user(CreateUser { name: "Jane".into(), email: None }).await?;
///
/// let input = CreatePayment {
///     name: "Phone Bill".into(),
///     amount: Decimal::new(6500, 2),
///     due_date: NaiveDate::from_ymd_opt(2026, 10, 28),
///     ..Default::default()
/// };
/// store.insert(input.into_new_payment(user.id).unwrap()).await?;
///
/// let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
/// let upcoming = store.list_unpaid_within(user.id, DueWindow::ahead(today, 30)).await?;
/// assert_eq!(upcoming.len(), 1);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreResult;
use crate::models::payment::{DueWindow, NewPayment, Payment, UpdatePayment};
use crate::models::user::{CreateUser, UpdateUser, User};

pub mod memory;
pub mod postgres;

/// Result of marking a payment as paid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaidOutcome {
    /// The payment with its paid date set
    pub payment: Payment,

    /// Successor spawned for a recurring payment, if any
    pub next: Option<Payment>,
}

/// Owner-scoped payment persistence
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// All payments of `owner_id`, ordered by due date then id
    async fn list_by_owner(&self, owner_id: i64) -> StoreResult<Vec<Payment>>;

    /// Unpaid payments of `owner_id` due inside `window`, ordered by due date then id
    async fn list_unpaid_within(&self, owner_id: i64, window: DueWindow)
        -> StoreResult<Vec<Payment>>;

    async fn find(&self, owner_id: i64, id: i64) -> StoreResult<Option<Payment>>;

    /// Inserts a payment; fails with `OwnerMissing` if the user does not exist
    async fn insert(&self, payment: NewPayment) -> StoreResult<Payment>;

    /// Applies the present fields of `changes`; `None` if no such payment
    async fn update(
        &self,
        owner_id: i64,
        id: i64,
        changes: UpdatePayment,
    ) -> StoreResult<Option<Payment>>;

    /// Removes a payment; `false` if no such payment
    async fn delete(&self, owner_id: i64, id: i64) -> StoreResult<bool>;

    /// Sets the paid date and, for a recurring payment, inserts its next
    /// occurrence
    ///
    /// Every call on a recurring payment inserts a successor, even when the
    /// payment was already paid. Both writes happen in one atomic unit:
    /// either both persist or neither does. Returns `None` if no such
    /// payment, and `StoreError::Rollover` without writing anything if the
    /// next due date is out of range.
    async fn mark_paid(
        &self,
        owner_id: i64,
        id: i64,
        paid_date: NaiveDate,
    ) -> StoreResult<Option<PaidOutcome>>;

    /// Verifies the backing store is reachable
    async fn health_check(&self) -> StoreResult<()>;
}

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>>;

    /// All users ordered by id
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn update_user(&self, id: i64, data: UpdateUser) -> StoreResult<Option<User>>;

    /// Deletes the user and every payment it owns
    async fn delete_user(&self, id: i64) -> StoreResult<bool>;

    async fn count_users(&self) -> StoreResult<i64>;
}
