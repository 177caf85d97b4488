/// User model
///
/// Users own payments. Deleting a user deletes every payment it owns.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(100) NOT NULL,
///     email VARCHAR(100),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::FieldError;
use crate::validation::{check_not_blank, field_errors};

/// User account that owns payments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned id
    pub id: i64,

    /// Display name
    pub name: String,

    /// Optional contact email
    pub email: Option<String>,

    /// When the user was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(
        email(message = "Invalid email format"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    pub email: Option<String>,
}

impl CreateUser {
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => field_errors(&e),
        };
        if !self.name.is_empty() {
            errors.extend(check_not_blank("name", &self.name));
        }
        errors
    }
}

/// Input for updating an existing user
///
/// All fields are optional. Only present fields are updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(
        email(message = "Invalid email format"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    pub email: Option<String>,
}

impl UpdateUser {
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => field_errors(&e),
        };
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            errors.extend(check_not_blank("name", name));
        }
        errors
    }

    /// Applies the present fields to a stored user
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = Some(email.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_validation() {
        let valid = CreateUser {
            name: "John Doe".to_string(),
            email: Some("john@example.com".to_string()),
        };
        assert!(valid.field_errors().is_empty());

        let invalid = CreateUser {
            name: String::new(),
            email: Some("not-an-email".to_string()),
        };
        let fields: Vec<String> = invalid.field_errors().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"name".to_string()));
        assert!(fields.contains(&"email".to_string()));
    }

    #[test]
    fn test_update_user_default() {
        let update = UpdateUser::default();
        assert!(update.name.is_none());
        assert!(update.email.is_none());
        assert!(update.field_errors().is_empty());
    }

    #[test]
    fn test_blank_name_rejected() {
        let update = UpdateUser {
            name: Some("   ".to_string()),
            email: None,
        };
        assert_eq!(update.field_errors().len(), 1);
    }
}
