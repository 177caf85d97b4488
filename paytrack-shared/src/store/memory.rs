/// In-process store for tests and for running without a database
///
/// All state lives behind one `RwLock`, so every operation, including the
/// paired update and insert of `mark_paid`, is atomic with respect to
/// other callers. Ids are assigned from counters starting at 1.
///
/// # Example
///
/// ```
/// use paytrack_shared::models::user::CreateUser;
/// use paytrack_shared::store::{memory::MemoryStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let user = store
///     .create_user(CreateUser { name: "john_doe".into(), email: Some("john@example.com".into()) })
///     .await?;
/// assert_eq!(user.id, 1);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{PaidOutcome, PaymentStore, UserStore};
use crate::error::{StoreError, StoreResult};
use crate::models::payment::{DueWindow, NewPayment, Payment, UpdatePayment};
use crate::models::user::{CreateUser, UpdateUser, User};

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<i64, User>,
    payments: BTreeMap<i64, Payment>,
    last_user_id: i64,
    last_payment_id: i64,
}

impl State {
    fn insert_payment(&mut self, payment: NewPayment) -> StoreResult<Payment> {
        if !self.users.contains_key(&payment.user_id) {
            return Err(StoreError::OwnerMissing(payment.user_id));
        }

        self.last_payment_id += 1;
        let payment = payment.with_id(self.last_payment_id);
        self.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    fn owned_mut(&mut self, owner_id: i64, id: i64) -> Option<&mut Payment> {
        self.payments
            .get_mut(&id)
            .filter(|payment| payment.user_id == owner_id)
    }

    fn owned_sorted<F>(&self, owner_id: i64, keep: F) -> Vec<Payment>
    where
        F: Fn(&Payment) -> bool,
    {
        let mut payments: Vec<Payment> = self
            .payments
            .values()
            .filter(|payment| payment.user_id == owner_id && keep(payment))
            .cloned()
            .collect();
        // BTreeMap iteration is already by id, so a stable sort keeps id as tie-breaker
        payments.sort_by_key(|payment| payment.due_date);
        payments
    }
}

/// Store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn list_by_owner(&self, owner_id: i64) -> StoreResult<Vec<Payment>> {
        Ok(self.state.read().await.owned_sorted(owner_id, |_| true))
    }

    async fn list_unpaid_within(
        &self,
        owner_id: i64,
        window: DueWindow,
    ) -> StoreResult<Vec<Payment>> {
        Ok(self
            .state
            .read()
            .await
            .owned_sorted(owner_id, |payment| window.selects(payment)))
    }

    async fn find(&self, owner_id: i64, id: i64) -> StoreResult<Option<Payment>> {
        Ok(self
            .state
            .read()
            .await
            .payments
            .get(&id)
            .filter(|payment| payment.user_id == owner_id)
            .cloned())
    }

    async fn insert(&self, payment: NewPayment) -> StoreResult<Payment> {
        self.state.write().await.insert_payment(payment)
    }

    async fn update(
        &self,
        owner_id: i64,
        id: i64,
        changes: UpdatePayment,
    ) -> StoreResult<Option<Payment>> {
        let mut state = self.state.write().await;
        Ok(state.owned_mut(owner_id, id).map(|payment| {
            changes.apply_to(payment);
            payment.clone()
        }))
    }

    async fn delete(&self, owner_id: i64, id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        if state.owned_mut(owner_id, id).is_none() {
            return Ok(false);
        }
        Ok(state.payments.remove(&id).is_some())
    }

    async fn mark_paid(
        &self,
        owner_id: i64,
        id: i64,
        paid_date: NaiveDate,
    ) -> StoreResult<Option<PaidOutcome>> {
        let mut state = self.state.write().await;

        let Some(payment) = state.owned_mut(owner_id, id) else {
            return Ok(None);
        };
        // Computed before any write so a failed rollover leaves the store untouched
        let successor = payment.next_occurrence().map_err(StoreError::Rollover)?;
        payment.paid_date = Some(paid_date);
        let payment = payment.clone();

        let next = match successor {
            Some(successor) => Some(state.insert_payment(successor)?),
            None => None,
        };

        Ok(Some(PaidOutcome { payment, next }))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut state = self.state.write().await;
        state.last_user_id += 1;

        let user = User {
            id: state.last_user_id,
            name: data.name,
            email: data.email,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn update_user(&self, id: i64, data: UpdateUser) -> StoreResult<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(&id).map(|user| {
            data.apply_to(user);
            user.clone()
        }))
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        state.payments.retain(|_, payment| payment.user_id != id);
        Ok(true)
    }

    async fn count_users(&self) -> StoreResult<i64> {
        Ok(self.state.read().await.users.len() as i64)
    }
}
