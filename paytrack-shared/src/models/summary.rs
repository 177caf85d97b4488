/// Aggregate counts and totals over one user's payments

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payment::{normalize_amount, DueWindow, Payment};

/// Days ahead of today counted by `dueSoonCount`
pub const SUMMARY_DUE_SOON_DAYS: u32 = 7;

/// Payment summary statistics
///
/// `due_soon_count` counts unpaid payments due on or before `today + 7`
/// without a lower bound, so overdue payments are included in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub total_payments: usize,
    pub paid_count: usize,
    pub unpaid_count: usize,
    pub overdue_count: usize,
    pub due_soon_count: usize,
    pub total_amount_paid: Decimal,
    pub total_amount_due: Decimal,
    pub total_overdue_amount: Decimal,
}

impl PaymentSummary {
    /// Computes the summary with exact decimal arithmetic
    pub fn from_payments(payments: &[Payment], today: NaiveDate) -> Self {
        let overdue = DueWindow::overdue(today);
        let due_soon = DueWindow::through(today, SUMMARY_DUE_SOON_DAYS);

        let mut summary = PaymentSummary {
            total_payments: payments.len(),
            paid_count: 0,
            unpaid_count: 0,
            overdue_count: 0,
            due_soon_count: 0,
            total_amount_paid: Decimal::ZERO,
            total_amount_due: Decimal::ZERO,
            total_overdue_amount: Decimal::ZERO,
        };

        for payment in payments {
            if payment.is_paid() {
                summary.paid_count += 1;
                summary.total_amount_paid += payment.amount;
                continue;
            }

            summary.unpaid_count += 1;
            summary.total_amount_due += payment.amount;

            if overdue.selects(payment) {
                summary.overdue_count += 1;
                summary.total_overdue_amount += payment.amount;
            }
            if due_soon.selects(payment) {
                summary.due_soon_count += 1;
            }
        }

        summary.total_amount_paid = normalize_amount(summary.total_amount_paid);
        summary.total_amount_due = normalize_amount(summary.total_amount_due);
        summary.total_overdue_amount = normalize_amount(summary.total_overdue_amount);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payment::RecurrenceKind;
    use std::str::FromStr;

    fn payment(id: i64, amount: &str, due_offset: i64, paid: bool, today: NaiveDate) -> Payment {
        Payment {
            id,
            user_id: 1,
            name: format!("payment-{id}"),
            amount: Decimal::from_str(amount).unwrap(),
            due_date: today + chrono::Duration::days(due_offset),
            paid_date: paid.then_some(today),
            is_recurring: false,
            recurrence: RecurrenceKind::None,
            notes: None,
        }
    }

    #[test]
    fn test_empty_summary() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let summary = PaymentSummary::from_payments(&[], today);

        assert_eq!(summary.total_payments, 0);
        assert_eq!(summary.total_amount_due.to_string(), "0.00");
    }

    #[test]
    fn test_summary_counts_and_totals() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let payments = vec![
            payment(1, "1200.00", 1, false, today),
            payment(2, "85.50", 15, false, today),
            payment(3, "15.99", -2, true, today),
            payment(4, "450.00", -5, false, today),
            payment(5, "65.00", 10, false, today),
            payment(6, "0.10", 7, false, today),
            payment(7, "0.20", 8, false, today),
        ];

        let summary = PaymentSummary::from_payments(&payments, today);

        assert_eq!(summary.total_payments, 7);
        assert_eq!(summary.paid_count, 1);
        assert_eq!(summary.unpaid_count, 6);
        assert_eq!(summary.paid_count + summary.unpaid_count, summary.total_payments);
        assert_eq!(summary.overdue_count, 1);
        // rent (+1), the 0.10 item (+7) and the overdue insurance (-5)
        assert_eq!(summary.due_soon_count, 3);
        assert_eq!(summary.total_amount_paid.to_string(), "15.99");
        assert_eq!(summary.total_amount_due.to_string(), "1800.80");
        assert_eq!(summary.total_overdue_amount.to_string(), "450.00");
    }
}
