/// Payment domain service
///
/// Every operation takes the id of the owning user and goes through
/// [`PaymentStore`], whose methods are all owner-scoped. A payment that
/// belongs to somebody else is reported exactly like a missing one.
///
/// Results are returned as [`PaymentView`]s with derived fields evaluated
/// against the service's [`Clock`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use chrono::NaiveDate;
/// use paytrack_shared::models::payment::{CreatePayment, RecurrenceKind};
/// use paytrack_shared::models::user::CreateUser;
/// use paytrack_shared::service::{Clock, PaymentService};
/// use paytrack_shared::store::{memory::MemoryStore, UserStore};
/// use rust_decimal::Decimal;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
/// let store = Arc::new(MemoryStore::new());
/// let user = store.create_user(CreateUser { name: "Jane".into(), email: None }).await?;
/// let service = PaymentService::with_clock(store, Clock::Fixed(today));
///
/// let rent = service
///     .create(user.id, CreatePayment {
///         name: "Rent".into(),
///         amount: Decimal::new(120000, 2),
///         due_date: today.succ_opt(),
///         is_recurring: true,
///         recurrence: RecurrenceKind::Monthly,
///         notes: None,
///     })
///     .await?;
///
/// let paid = service.mark_paid(user.id, rent.payment.id, None).await?;
/// assert!(paid.payment.is_paid);
/// assert!(paid.next_payment.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::clock::Clock;
use crate::error::{ServiceError, ServiceResult};
use crate::models::payment::{CreatePayment, DueWindow, Payment, PaymentView, UpdatePayment};
use crate::models::summary::PaymentSummary;
use crate::store::PaymentStore;

/// Default look-ahead for the upcoming listing
pub const DEFAULT_UPCOMING_DAYS: u32 = 30;

/// Default look-ahead for the due-soon listing
pub const DEFAULT_DUE_SOON_DAYS: u32 = 7;

/// Look-ahead for the due-soon half of the reminder set
pub const REMINDER_DAYS: u32 = 3;

/// Outcome of marking a payment as paid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkedPaid {
    pub payment: PaymentView,

    /// Successor created for a recurring payment
    pub next_payment: Option<PaymentView>,
}

/// Owner-scoped payment operations
#[derive(Clone)]
pub struct PaymentService {
    store: Arc<dyn PaymentStore>,
    clock: Clock,
}

impl PaymentService {
    /// Creates a service that uses the system date
    pub fn new(store: Arc<dyn PaymentStore>) -> Self {
        Self::with_clock(store, Clock::System)
    }

    pub fn with_clock(store: Arc<dyn PaymentStore>, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Reference date for derived fields
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Backing store
    pub fn store(&self) -> &Arc<dyn PaymentStore> {
        &self.store
    }

    fn views(&self, payments: Vec<Payment>) -> Vec<PaymentView> {
        let today = self.today();
        payments.into_iter().map(|p| p.view(today)).collect()
    }

    /// All payments of `owner_id`, ordered by due date
    pub async fn list(&self, owner_id: i64) -> ServiceResult<Vec<PaymentView>> {
        let payments = self.store.list_by_owner(owner_id).await?;
        debug!(user_id = owner_id, count = payments.len(), "Listed payments");
        Ok(self.views(payments))
    }

    /// Unpaid payments due from today through `today + days`
    pub async fn list_upcoming(
        &self,
        owner_id: i64,
        days: Option<u32>,
    ) -> ServiceResult<Vec<PaymentView>> {
        let days = days.unwrap_or(DEFAULT_UPCOMING_DAYS);
        let window = DueWindow::ahead(self.today(), days);
        let payments = self.store.list_unpaid_within(owner_id, window).await?;
        debug!(user_id = owner_id, days, count = payments.len(), "Listed upcoming payments");
        Ok(self.views(payments))
    }

    /// Unpaid payments due before today
    pub async fn list_overdue(&self, owner_id: i64) -> ServiceResult<Vec<PaymentView>> {
        let window = DueWindow::overdue(self.today());
        let payments = self.store.list_unpaid_within(owner_id, window).await?;
        debug!(user_id = owner_id, count = payments.len(), "Listed overdue payments");
        Ok(self.views(payments))
    }

    /// Unpaid payments due from today through `today + days`
    ///
    /// Same window as [`list_upcoming`](Self::list_upcoming) with a shorter
    /// default.
    pub async fn list_due_soon(
        &self,
        owner_id: i64,
        days: Option<u32>,
    ) -> ServiceResult<Vec<PaymentView>> {
        let days = days.unwrap_or(DEFAULT_DUE_SOON_DAYS);
        let window = DueWindow::ahead(self.today(), days);
        let payments = self.store.list_unpaid_within(owner_id, window).await?;
        debug!(user_id = owner_id, days, count = payments.len(), "Listed due-soon payments");
        Ok(self.views(payments))
    }

    /// Overdue payments followed by those due within three days
    ///
    /// The two windows are disjoint, so no payment appears twice.
    pub async fn list_reminders(&self, owner_id: i64) -> ServiceResult<Vec<PaymentView>> {
        let today = self.today();
        let mut payments = self
            .store
            .list_unpaid_within(owner_id, DueWindow::overdue(today))
            .await?;
        payments.extend(
            self.store
                .list_unpaid_within(owner_id, DueWindow::ahead(today, REMINDER_DAYS))
                .await?,
        );
        payments.sort_by_key(|p| (p.due_date, p.id));

        debug!(user_id = owner_id, count = payments.len(), "Listed reminders");
        Ok(self.views(payments))
    }

    pub async fn get(&self, owner_id: i64, id: i64) -> ServiceResult<PaymentView> {
        let payment = self
            .store
            .find(owner_id, id)
            .await?
            .ok_or_else(|| ServiceError::payment_not_found(id))?;

        Ok(payment.view(self.today()))
    }

    /// Validates and stores a new payment owned by `owner_id`
    ///
    /// Nothing is written if any field rule fails.
    pub async fn create(&self, owner_id: i64, input: CreatePayment) -> ServiceResult<PaymentView> {
        let new_payment = input
            .into_new_payment(owner_id)
            .map_err(ServiceError::Validation)?;

        let payment = self.store.insert(new_payment).await?;
        info!(
            user_id = owner_id,
            payment_id = payment.id,
            amount = %payment.amount,
            due_date = %payment.due_date,
            "Created payment"
        );

        Ok(payment.view(self.today()))
    }

    /// Applies the fields present in `changes`
    ///
    /// An empty update is a read: the payment is returned unchanged.
    pub async fn update(
        &self,
        owner_id: i64,
        id: i64,
        changes: UpdatePayment,
    ) -> ServiceResult<PaymentView> {
        let changes = changes.normalized().map_err(ServiceError::Validation)?;
        if changes.is_empty() {
            return self.get(owner_id, id).await;
        }

        let payment = self
            .store
            .update(owner_id, id, changes)
            .await?
            .ok_or_else(|| ServiceError::payment_not_found(id))?;
        info!(user_id = owner_id, payment_id = id, "Updated payment");

        Ok(payment.view(self.today()))
    }

    pub async fn delete(&self, owner_id: i64, id: i64) -> ServiceResult<()> {
        if !self.store.delete(owner_id, id).await? {
            return Err(ServiceError::payment_not_found(id));
        }

        info!(user_id = owner_id, payment_id = id, "Deleted payment");
        Ok(())
    }

    /// Records a payment as paid on `paid_date`, or today when omitted
    ///
    /// A recurring payment also spawns its next occurrence in the same
    /// atomic write, on every call. A next due date past the calendar range
    /// is a `dueDate` validation error and leaves the payment unpaid.
    pub async fn mark_paid(
        &self,
        owner_id: i64,
        id: i64,
        paid_date: Option<NaiveDate>,
    ) -> ServiceResult<MarkedPaid> {
        let today = self.today();
        let paid_date = paid_date.unwrap_or(today);

        let outcome = self
            .store
            .mark_paid(owner_id, id, paid_date)
            .await?
            .ok_or_else(|| ServiceError::payment_not_found(id))?;

        info!(
            user_id = owner_id,
            payment_id = id,
            paid_date = %paid_date,
            next_payment_id = ?outcome.next.as_ref().map(|p| p.id),
            "Marked payment as paid"
        );

        Ok(MarkedPaid {
            payment: outcome.payment.view(today),
            next_payment: outcome.next.map(|p| p.view(today)),
        })
    }

    /// Counts and exact totals over every payment of `owner_id`
    pub async fn summary(&self, owner_id: i64) -> ServiceResult<PaymentSummary> {
        let payments = self.store.list_by_owner(owner_id).await?;
        Ok(PaymentSummary::from_payments(&payments, self.today()))
    }

    pub async fn health_check(&self) -> ServiceResult<()> {
        Ok(self.store.health_check().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payment::{PaymentStatus, RecurrenceKind};
    use crate::models::user::CreateUser;
    use crate::store::{memory::MemoryStore, UserStore};
    use rust_decimal::Decimal;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    async fn setup() -> (PaymentService, i64) {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .create_user(CreateUser {
                name: "john_doe".to_string(),
                email: None,
            })
            .await
            .unwrap();
        (
            PaymentService::with_clock(store, Clock::Fixed(today())),
            user.id,
        )
    }

    fn input(name: &str, cents: i64, due_offset: i64) -> CreatePayment {
        CreatePayment {
            name: name.to_string(),
            amount: Decimal::new(cents, 2),
            due_date: Some(today() + chrono::Duration::days(due_offset)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (service, user_id) = setup().await;

        let created = service.create(user_id, input("Gym", 4000, 10)).await.unwrap();
        assert_eq!(created.status, PaymentStatus::Upcoming);
        assert_eq!(created.days_until_due, 10);

        let fetched = service.get(user_id, created.payment.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_for_unknown_user() {
        let (service, _) = setup().await;

        let err = service.create(99, input("Gym", 4000, 10)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "User", id: 99 }));
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let (service, user_id) = setup().await;
        let created = service.create(user_id, input("Gym", 4000, 10)).await.unwrap();

        service.delete(user_id, created.payment.id).await.unwrap();
        let err = service.delete(user_id, created.payment.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "Payment", .. }));
    }

    #[tokio::test]
    async fn test_reminders_merge_overdue_and_next_three_days() {
        let (service, user_id) = setup().await;
        service.create(user_id, input("Late", 100, -1)).await.unwrap();
        service.create(user_id, input("Today", 100, 0)).await.unwrap();
        service.create(user_id, input("Edge", 100, 3)).await.unwrap();
        service.create(user_id, input("Later", 100, 4)).await.unwrap();

        let names: Vec<String> = service
            .list_reminders(user_id)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.payment.name)
            .collect();
        assert_eq!(names, vec!["Late", "Today", "Edge"]);
    }

    #[tokio::test]
    async fn test_mark_paid_defaults_to_today() {
        let (service, user_id) = setup().await;
        let mut rent = input("Rent", 120000, 1);
        rent.is_recurring = true;
        rent.recurrence = RecurrenceKind::Yearly;
        let created = service.create(user_id, rent).await.unwrap();

        let marked = service.mark_paid(user_id, created.payment.id, None).await.unwrap();
        assert_eq!(marked.payment.payment.paid_date, Some(today()));
        assert_eq!(marked.payment.status, PaymentStatus::Paid);

        let next = marked.next_payment.unwrap();
        assert_eq!(next.payment.due_date, NaiveDate::from_ymd_opt(2027, 10, 19).unwrap());
        assert_eq!(next.status, PaymentStatus::Upcoming);
    }
}
