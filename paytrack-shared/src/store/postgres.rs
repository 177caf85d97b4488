/// PostgreSQL store
///
/// Every payment query carries `user_id = $owner` in its WHERE clause, so a
/// payment owned by another user never leaves the database. `mark_paid`
/// runs in a transaction that locks the row, updates it and inserts the
/// successor before committing.
///
/// # Example
///
/// ```no_run
/// # use paytrack_shared::store::{postgres::PgStore, PaymentStore};
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let store = PgStore::new(pool);
/// let payments = store.list_by_owner(1).await?;
/// println!("{} payments", payments.len());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};

use super::{PaidOutcome, PaymentStore, UserStore};
use crate::db;
use crate::error::{StoreError, StoreResult};
use crate::models::payment::{DueWindow, NewPayment, Payment, UpdatePayment};
use crate::models::user::{CreateUser, UpdateUser, User};

const PAYMENT_COLUMNS: &str =
    "id, user_id, name, amount, due_date, paid_date, is_recurring, recurrence, notes";

const USER_COLUMNS: &str = "id, name, email, created_at";

/// Store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Inserts a payment through any executor, pool or open transaction
async fn insert_payment<'e, E>(executor: E, payment: NewPayment) -> StoreResult<Payment>
where
    E: PgExecutor<'e>,
{
    let owner_id = payment.user_id;
    let query = format!(
        r#"
        INSERT INTO payments (user_id, name, amount, due_date, paid_date, is_recurring, recurrence, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {PAYMENT_COLUMNS}
        "#
    );

    let result = sqlx::query_as::<_, Payment>(&query)
        .bind(payment.user_id)
        .bind(payment.name)
        .bind(payment.amount)
        .bind(payment.due_date)
        .bind(payment.paid_date)
        .bind(payment.is_recurring)
        .bind(payment.recurrence)
        .bind(payment.notes)
        .fetch_one(executor)
        .await;

    match result {
        Ok(payment) => Ok(payment),
        Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
            Err(StoreError::OwnerMissing(owner_id))
        }
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl PaymentStore for PgStore {
    async fn list_by_owner(&self, owner_id: i64) -> StoreResult<Vec<Payment>> {
        let query = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE user_id = $1 ORDER BY due_date, id"
        );

        let payments = sqlx::query_as::<_, Payment>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(payments)
    }

    async fn list_unpaid_within(
        &self,
        owner_id: i64,
        window: DueWindow,
    ) -> StoreResult<Vec<Payment>> {
        let query = format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM payments
            WHERE user_id = $1
              AND paid_date IS NULL
              AND ($2::date IS NULL OR due_date >= $2)
              AND ($3::date IS NULL OR due_date <= $3)
            ORDER BY due_date, id
            "#
        );

        let payments = sqlx::query_as::<_, Payment>(&query)
            .bind(owner_id)
            .bind(window.from)
            .bind(window.until)
            .fetch_all(&self.pool)
            .await?;

        Ok(payments)
    }

    async fn find(&self, owner_id: i64, id: i64) -> StoreResult<Option<Payment>> {
        let query =
            format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1 AND user_id = $2");

        let payment = sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    async fn insert(&self, payment: NewPayment) -> StoreResult<Payment> {
        insert_payment(&self.pool, payment).await
    }

    async fn update(
        &self,
        owner_id: i64,
        id: i64,
        changes: UpdatePayment,
    ) -> StoreResult<Option<Payment>> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE payments SET updated_at = NOW()");
        let mut bind_count = 2;

        if changes.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if changes.amount.is_some() {
            bind_count += 1;
            query.push_str(&format!(", amount = ${}", bind_count));
        }
        if changes.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if changes.is_recurring.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_recurring = ${}", bind_count));
        }
        if changes.recurrence.is_some() {
            bind_count += 1;
            query.push_str(&format!(", recurrence = ${}", bind_count));
        }
        if changes.notes.is_some() {
            bind_count += 1;
            query.push_str(&format!(", notes = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND user_id = $2 RETURNING {PAYMENT_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Payment>(&query).bind(id).bind(owner_id);

        if let Some(name) = changes.name {
            q = q.bind(name);
        }
        if let Some(amount) = changes.amount {
            q = q.bind(amount);
        }
        if let Some(due_date) = changes.due_date {
            q = q.bind(due_date);
        }
        if let Some(is_recurring) = changes.is_recurring {
            q = q.bind(is_recurring);
        }
        if let Some(recurrence) = changes.recurrence {
            q = q.bind(recurrence);
        }
        if let Some(notes) = changes.notes {
            q = q.bind(notes);
        }

        let payment = q.fetch_optional(&self.pool).await?;

        Ok(payment)
    }

    async fn delete(&self, owner_id: i64, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_paid(
        &self,
        owner_id: i64,
        id: i64,
        paid_date: NaiveDate,
    ) -> StoreResult<Option<PaidOutcome>> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1 AND user_id = $2 FOR UPDATE"
        );
        let locked = sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?;

        // Dropping the transaction rolls it back
        let Some(locked) = locked else {
            return Ok(None);
        };
        let successor = locked.next_occurrence().map_err(StoreError::Rollover)?;

        let query = format!(
            r#"
            UPDATE payments
            SET paid_date = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {PAYMENT_COLUMNS}
            "#
        );
        let payment = sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(paid_date)
            .fetch_one(&mut *tx)
            .await?;

        let next = match successor {
            Some(successor) => Some(insert_payment(&mut *tx, successor).await?),
            None => None,
        };

        tx.commit().await?;

        Ok(Some(PaidOutcome { payment, next }))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(db::pool::health_check(&self.pool).await?)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let query = format!(
            "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(data.name)
            .bind(data.email)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");

        let users = sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn update_user(&self, id: i64, data: UpdateUser) -> StoreResult<Option<User>> {
        let query = format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(data.name)
            .bind(data.email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        // payments go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_users(&self) -> StoreResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
