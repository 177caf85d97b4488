/// Input validation helpers shared by the domain service and the HTTP layer
///
/// Length and format rules are declared with `validator` derives on the
/// input structs. Rules `validator` cannot express for decimals live here.

use rust_decimal::Decimal;
use validator::ValidationErrors;

use crate::error::FieldError;
use crate::models::payment::AMOUNT_SCALE;

/// Largest amount that fits a NUMERIC(18, 2) column
const MAX_AMOUNT_INTEGER_DIGITS: u32 = 16;

/// Flattens `validator` errors into field/message pairs
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: camel_case(field),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect()
}

/// Checks that an amount is positive, has at most two decimal places and fits storage
pub fn check_amount(amount: &Decimal) -> Option<FieldError> {
    if amount.is_sign_negative() || amount.is_zero() {
        return Some(FieldError::new("amount", "Amount must be greater than 0"));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Some(FieldError::new(
            "amount",
            "Amount must have at most 2 decimal places",
        ));
    }
    if amount.trunc() >= Decimal::from(10_i64.pow(MAX_AMOUNT_INTEGER_DIGITS)) {
        return Some(FieldError::new("amount", "Amount is too large"));
    }
    None
}

/// Rejects strings made only of whitespace
pub fn check_not_blank(field: &str, value: &str) -> Option<FieldError> {
    if value.trim().is_empty() {
        Some(FieldError::new(field, format!("{} is required", title_case(field))))
    } else {
        None
    }
}

// struct fields are snake_case; the wire format is camelCase
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn title_case(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_check_amount() {
        assert!(check_amount(&Decimal::from_str("0.01").unwrap()).is_none());
        assert!(check_amount(&Decimal::from_str("1200.50").unwrap()).is_none());
        // trailing zeros beyond two places are still two-place values
        assert!(check_amount(&Decimal::from_str("19.900").unwrap()).is_none());

        assert!(check_amount(&Decimal::ZERO).is_some());
        assert!(check_amount(&Decimal::from_str("-5").unwrap()).is_some());
        assert!(check_amount(&Decimal::from_str("0.001").unwrap()).is_some());
        assert!(check_amount(&Decimal::from_str("10000000000000000").unwrap()).is_some());
    }

    #[test]
    fn test_check_not_blank() {
        assert!(check_not_blank("name", "Rent").is_none());
        let err = check_not_blank("name", "   ").unwrap();
        assert_eq!(err.field, "name");
        assert_eq!(err.message, "Name is required");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("due_date"), "dueDate");
        assert_eq!(camel_case("name"), "name");
    }
}
