/// Payment model and derived status logic
///
/// A payment is a single bill owned by exactly one user. Whether it is paid,
/// overdue or due soon is never stored: those fields are computed against a
/// reference date every time a payment is read.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE recurrence_kind AS ENUM ('none', 'monthly', 'quarterly', 'yearly');
///
/// CREATE TABLE payments (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(100) NOT NULL,
///     amount NUMERIC(18, 2) NOT NULL CHECK (amount > 0),
///     due_date DATE NOT NULL,
///     paid_date DATE,
///     is_recurring BOOLEAN NOT NULL DEFAULT FALSE,
///     recurrence recurrence_kind NOT NULL DEFAULT 'none',
///     notes VARCHAR(500),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Status precedence
///
/// ```text
/// paid date set            → Paid
/// due date before today    → Overdue
/// due within 7 days        → Due Soon
/// otherwise                → Upcoming
/// ```

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::error::FieldError;
use crate::validation::{check_amount, check_not_blank, field_errors};

/// Number of days ahead of today at which an unpaid payment counts as "Due Soon"
pub const DUE_SOON_THRESHOLD_DAYS: i64 = 7;

/// Decimal places stored for every amount
pub const AMOUNT_SCALE: u32 = 2;

/// How a recurring payment rolls over once it is paid
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "recurrence_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    /// One-off payment
    #[default]
    None,

    /// Next occurrence one calendar month later
    Monthly,

    /// Next occurrence three calendar months later
    Quarterly,

    /// Next occurrence one calendar year later
    Yearly,
}

impl RecurrenceKind {
    /// Converts the kind to its storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceKind::None => "none",
            RecurrenceKind::Monthly => "monthly",
            RecurrenceKind::Quarterly => "quarterly",
            RecurrenceKind::Yearly => "yearly",
        }
    }

    /// Calendar months between two occurrences (0 for one-off payments)
    pub fn months(&self) -> u32 {
        match self {
            RecurrenceKind::None => 0,
            RecurrenceKind::Monthly => 1,
            RecurrenceKind::Quarterly => 3,
            RecurrenceKind::Yearly => 12,
        }
    }

    /// Advances a due date by one recurrence period
    ///
    /// Month arithmetic clamps to the last day of the target month, so
    /// January 31st advances to February 28th (or 29th) and February 29th
    /// advances one year to February 28th. `None` leaves the date as is.
    /// Returns `None` only if the result falls outside the supported
    /// calendar range.
    pub fn advance(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self.months() {
            0 => Some(date),
            months => date.checked_add_months(Months::new(months)),
        }
    }
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status derived from a payment's dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Overdue,
    #[serde(rename = "Due Soon")]
    DueSoon,
    Upcoming,
}

impl PaymentStatus {
    /// Human-readable label, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Overdue => "Overdue",
            PaymentStatus::DueSoon => "Due Soon",
            PaymentStatus::Upcoming => "Upcoming",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored payment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Store-assigned id
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    /// Payment name, at most 100 characters
    pub name: String,

    /// Positive amount with two decimal places
    pub amount: Decimal,

    pub due_date: NaiveDate,

    /// Presence of a paid date is what makes a payment paid
    pub paid_date: Option<NaiveDate>,

    pub is_recurring: bool,

    pub recurrence: RecurrenceKind,

    /// Optional notes, at most 500 characters
    pub notes: Option<String>,
}

impl Payment {
    pub fn is_paid(&self) -> bool {
        self.paid_date.is_some()
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_paid() && self.due_date < today
    }

    /// Signed number of days from `today` to the due date
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }

    pub fn status(&self, today: NaiveDate) -> PaymentStatus {
        if self.is_paid() {
            PaymentStatus::Paid
        } else if self.is_overdue(today) {
            PaymentStatus::Overdue
        } else if self.days_until_due(today) <= DUE_SOON_THRESHOLD_DAYS {
            PaymentStatus::DueSoon
        } else {
            PaymentStatus::Upcoming
        }
    }

    /// Whether this payment rolls over into a new one when paid
    pub fn rolls_over(&self) -> bool {
        self.is_recurring && self.recurrence != RecurrenceKind::None
    }

    /// Builds the successor of a recurring payment
    ///
    /// The successor copies name, amount, notes and recurrence verbatim,
    /// moves the due date forward by one period and starts unpaid.
    /// Returns `Ok(None)` for one-off payments.
    ///
    /// # Errors
    ///
    /// A `dueDate` field error if the next due date falls outside the
    /// supported calendar range.
    pub fn next_occurrence(&self) -> Result<Option<NewPayment>, FieldError> {
        if !self.rolls_over() {
            return Ok(None);
        }

        let due_date = self.recurrence.advance(self.due_date).ok_or_else(|| {
            FieldError::new(
                "dueDate",
                format!("Next {} due date after {} is out of range", self.recurrence, self.due_date),
            )
        })?;

        Ok(Some(NewPayment {
            user_id: self.user_id,
            name: self.name.clone(),
            amount: self.amount,
            due_date,
            paid_date: None,
            is_recurring: self.is_recurring,
            recurrence: self.recurrence,
            notes: self.notes.clone(),
        }))
    }

    /// Attaches the fields derived from `today`
    pub fn view(self, today: NaiveDate) -> PaymentView {
        PaymentView {
            is_paid: self.is_paid(),
            is_overdue: self.is_overdue(today),
            days_until_due: self.days_until_due(today),
            status: self.status(today),
            payment: self,
        }
    }
}

/// Payment as returned to callers, with derived fields evaluated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    #[serde(flatten)]
    pub payment: Payment,

    pub is_paid: bool,

    pub is_overdue: bool,

    pub days_until_due: i64,

    pub status: PaymentStatus,
}

/// Fully-formed payment ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub user_id: i64,
    pub name: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub is_recurring: bool,
    pub recurrence: RecurrenceKind,
    pub notes: Option<String>,
}

impl NewPayment {
    /// Materializes the record with a store-assigned id
    pub fn with_id(self, id: i64) -> Payment {
        Payment {
            id,
            user_id: self.user_id,
            name: self.name,
            amount: self.amount,
            due_date: self.due_date,
            paid_date: self.paid_date,
            is_recurring: self.is_recurring,
            recurrence: self.recurrence,
            notes: self.notes,
        }
    }
}

/// Input for creating a payment
///
/// `name`, `amount` and `dueDate` default to empty values when missing so
/// that absence is reported as a field error rather than a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayment {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[serde(default)]
    pub amount: Decimal,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub is_recurring: bool,

    #[serde(default)]
    pub recurrence: RecurrenceKind,

    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

impl CreatePayment {
    /// Collects every rule violation in the input
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => field_errors(&e),
        };

        if let Some(err) = check_not_blank("name", &self.name) {
            if !errors.iter().any(|e| e.field == "name") {
                errors.push(err);
            }
        }
        if let Some(err) = check_amount(&self.amount) {
            errors.push(err);
        }
        if self.due_date.is_none() {
            errors.push(FieldError::new("dueDate", "Due date is required"));
        }

        errors
    }

    /// Converts validated input into an insertable payment for `user_id`
    ///
    /// Returns the field errors instead if the input breaks any rule.
    pub fn into_new_payment(self, user_id: i64) -> Result<NewPayment, Vec<FieldError>> {
        let errors = self.field_errors();
        let due_date = match self.due_date {
            Some(due_date) if errors.is_empty() => due_date,
            _ => return Err(errors),
        };

        Ok(NewPayment {
            user_id,
            name: self.name,
            amount: normalize_amount(self.amount),
            due_date,
            paid_date: None,
            is_recurring: self.is_recurring,
            recurrence: self.recurrence,
            notes: self.notes,
        })
    }
}

/// Partial update; only fields that are present change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayment {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    pub amount: Option<Decimal>,

    pub due_date: Option<NaiveDate>,

    pub is_recurring: Option<bool>,

    pub recurrence: Option<RecurrenceKind>,

    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

impl UpdatePayment {
    /// True when the update would change nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.amount.is_none()
            && self.due_date.is_none()
            && self.is_recurring.is_none()
            && self.recurrence.is_none()
            && self.notes.is_none()
    }

    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => field_errors(&e),
        };

        if let Some(name) = &self.name {
            if let Some(err) = check_not_blank("name", name) {
                if !errors.iter().any(|e| e.field == "name") {
                    errors.push(err);
                }
            }
        }
        if let Some(amount) = &self.amount {
            if let Some(err) = check_amount(amount) {
                errors.push(err);
            }
        }

        errors
    }

    /// Validates the update and normalizes the amount scale
    pub fn normalized(mut self) -> Result<Self, Vec<FieldError>> {
        let errors = self.field_errors();
        if !errors.is_empty() {
            return Err(errors);
        }

        self.amount = self.amount.map(normalize_amount);
        Ok(self)
    }

    /// Applies the present fields to a stored payment
    pub fn apply_to(&self, payment: &mut Payment) {
        if let Some(name) = &self.name {
            payment.name = name.clone();
        }
        if let Some(amount) = self.amount {
            payment.amount = amount;
        }
        if let Some(due_date) = self.due_date {
            payment.due_date = due_date;
        }
        if let Some(is_recurring) = self.is_recurring {
            payment.is_recurring = is_recurring;
        }
        if let Some(recurrence) = self.recurrence {
            payment.recurrence = recurrence;
        }
        if let Some(notes) = &self.notes {
            payment.notes = Some(notes.clone());
        }
    }
}

/// Inclusive range of due dates used to select unpaid payments
///
/// A missing bound means the window is open on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueWindow {
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl DueWindow {
    /// Everything due strictly before `today`
    pub fn overdue(today: NaiveDate) -> Self {
        Self {
            from: None,
            until: Some(today.pred_opt().unwrap_or(NaiveDate::MIN)),
        }
    }

    /// From `today` through `today + days`
    pub fn ahead(today: NaiveDate, days: u32) -> Self {
        Self {
            from: Some(today),
            until: Some(
                today
                    .checked_add_days(Days::new(u64::from(days)))
                    .unwrap_or(NaiveDate::MAX),
            ),
        }
    }

    /// Everything due on or before `today + days`, including overdue dates
    pub fn through(today: NaiveDate, days: u32) -> Self {
        Self {
            from: None,
            ..Self::ahead(today, days)
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.until.map_or(true, |until| date <= until)
    }

    /// Whether `payment` is unpaid and due inside the window
    pub fn selects(&self, payment: &Payment) -> bool {
        !payment.is_paid() && self.contains(payment.due_date)
    }
}

/// Rescales an amount to the stored two decimal places
pub fn normalize_amount(mut amount: Decimal) -> Decimal {
    amount.rescale(AMOUNT_SCALE);
    amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payment(due_date: NaiveDate, paid_date: Option<NaiveDate>) -> Payment {
        Payment {
            id: 1,
            user_id: 1,
            name: "Rent".to_string(),
            amount: Decimal::from_str("1200.00").unwrap(),
            due_date,
            paid_date,
            is_recurring: true,
            recurrence: RecurrenceKind::Monthly,
            notes: Some("Monthly rent payment".to_string()),
        }
    }

    #[test]
    fn test_status_precedence() {
        let today = date(2026, 3, 10);

        // Paid wins even when the due date has passed
        let paid = payment(date(2026, 3, 1), Some(date(2026, 3, 2)));
        assert_eq!(paid.status(today), PaymentStatus::Paid);
        assert!(!paid.is_overdue(today));

        let overdue = payment(date(2026, 3, 9), None);
        assert_eq!(overdue.status(today), PaymentStatus::Overdue);
        assert_eq!(overdue.days_until_due(today), -1);

        let due_today = payment(today, None);
        assert_eq!(due_today.status(today), PaymentStatus::DueSoon);

        let edge = payment(date(2026, 3, 17), None);
        assert_eq!(edge.days_until_due(today), 7);
        assert_eq!(edge.status(today), PaymentStatus::DueSoon);

        let later = payment(date(2026, 3, 18), None);
        assert_eq!(later.status(today), PaymentStatus::Upcoming);
    }

    #[test]
    fn test_status_serializes_with_space() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::DueSoon).unwrap(),
            "\"Due Soon\""
        );
        assert_eq!(PaymentStatus::Overdue.to_string(), "Overdue");
    }

    #[test]
    fn test_advance_is_calendar_aware() {
        assert_eq!(
            RecurrenceKind::Monthly.advance(date(2026, 1, 31)),
            Some(date(2026, 2, 28))
        );
        assert_eq!(
            RecurrenceKind::Monthly.advance(date(2028, 1, 31)),
            Some(date(2028, 2, 29))
        );
        assert_eq!(
            RecurrenceKind::Quarterly.advance(date(2026, 11, 30)),
            Some(date(2027, 2, 28))
        );
        assert_eq!(
            RecurrenceKind::Yearly.advance(date(2028, 2, 29)),
            Some(date(2029, 2, 28))
        );
        assert_eq!(
            RecurrenceKind::None.advance(date(2026, 5, 5)),
            Some(date(2026, 5, 5))
        );
    }

    #[test]
    fn test_next_occurrence() {
        let rent = payment(date(2026, 10, 19), None);
        let next = rent
            .next_occurrence()
            .unwrap()
            .expect("monthly payment rolls over");

        assert_eq!(next.due_date, date(2026, 11, 19));
        assert_eq!(next.paid_date, None);
        assert_eq!(next.name, rent.name);
        assert_eq!(next.amount, rent.amount);
        assert_eq!(next.notes, rent.notes);
        assert_eq!(next.recurrence, RecurrenceKind::Monthly);
        assert!(next.is_recurring);
    }

    #[test]
    fn test_no_next_occurrence_for_one_off() {
        let mut one_off = payment(date(2026, 10, 19), None);
        one_off.is_recurring = false;
        assert_eq!(one_off.next_occurrence(), Ok(None));

        // Flagged recurring without a period does not roll over either
        let mut no_kind = payment(date(2026, 10, 19), None);
        no_kind.recurrence = RecurrenceKind::None;
        assert_eq!(no_kind.next_occurrence(), Ok(None));
    }

    #[test]
    fn test_next_occurrence_out_of_range() {
        let last = payment(NaiveDate::MAX, None);

        let err = last.next_occurrence().unwrap_err();
        assert_eq!(err.field, "dueDate");
    }

    #[test]
    fn test_view_serializes_flat_camel_case() {
        let today = date(2026, 10, 18);
        let view = payment(date(2026, 10, 19), None).view(today);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["userId"], 1);
        assert_eq!(json["amount"], "1200.00");
        assert_eq!(json["dueDate"], "2026-10-19");
        assert_eq!(json["paidDate"], serde_json::Value::Null);
        assert_eq!(json["recurrence"], "monthly");
        assert_eq!(json["isPaid"], false);
        assert_eq!(json["daysUntilDue"], 1);
        assert_eq!(json["status"], "Due Soon");
    }

    #[test]
    fn test_create_rejects_zero_amount() {
        let input = CreatePayment {
            name: "Water".to_string(),
            amount: Decimal::ZERO,
            due_date: Some(date(2026, 11, 1)),
            ..Default::default()
        };

        let errors = input.into_new_payment(1).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "amount");
    }

    #[test]
    fn test_create_reports_every_missing_field() {
        let errors = CreatePayment::default().field_errors();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();

        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"amount"));
        assert!(fields.contains(&"dueDate"));
    }

    #[test]
    fn test_create_normalizes_amount_scale() {
        let input = CreatePayment {
            name: "Gym".to_string(),
            amount: Decimal::from(40),
            due_date: Some(date(2026, 11, 1)),
            ..Default::default()
        };

        let new_payment = input.into_new_payment(7).unwrap();
        assert_eq!(new_payment.user_id, 7);
        assert_eq!(new_payment.amount.to_string(), "40.00");
    }

    #[test]
    fn test_update_apply_only_touches_present_fields() {
        let original = payment(date(2026, 10, 19), None);

        let mut unchanged = original.clone();
        UpdatePayment::default().apply_to(&mut unchanged);
        assert_eq!(unchanged, original);

        let mut renamed = original.clone();
        UpdatePayment {
            name: Some("Rent (flat 2)".to_string()),
            ..Default::default()
        }
        .apply_to(&mut renamed);
        assert_eq!(renamed.name, "Rent (flat 2)");
        assert_eq!(renamed.amount, original.amount);
        assert_eq!(renamed.notes, original.notes);
    }

    #[test]
    fn test_update_rejects_bad_amount() {
        let update = UpdatePayment {
            amount: Some(Decimal::from_str("10.005").unwrap()),
            ..Default::default()
        };
        let errors = update.normalized().unwrap_err();
        assert_eq!(errors[0].field, "amount");
    }

    #[test]
    fn test_due_windows() {
        let today = date(2026, 10, 18);

        let overdue = DueWindow::overdue(today);
        assert!(overdue.contains(date(2026, 10, 17)));
        assert!(!overdue.contains(today));

        let ahead = DueWindow::ahead(today, 3);
        assert!(ahead.contains(today));
        assert!(ahead.contains(date(2026, 10, 21)));
        assert!(!ahead.contains(date(2026, 10, 22)));
        assert!(!ahead.contains(date(2026, 10, 17)));

        let through = DueWindow::through(today, 7);
        assert!(through.contains(date(2020, 1, 1)));
        assert!(through.contains(date(2026, 10, 25)));
        assert!(!through.contains(date(2026, 10, 26)));

        let paid = payment(date(2026, 10, 10), Some(date(2026, 10, 10)));
        assert!(!overdue.selects(&paid));
    }
}
