//! The enrolled user record

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Field, FieldRules, FieldValue};
use crate::error::{Error, Result};

/// A user as produced by the enrollment workflow.
///
/// The password is held in plain text only until the record reaches a
/// store, which keeps a salted hash instead.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub initial_preferences: Vec<String>,
}

impl User {
    /// Check that every field already is in its normalized, valid form.
    ///
    /// Records built by the enrollment workflow always pass, so this is only
    /// run on records that never went through it, such as JSON-lines imports.
    pub fn validate(&self, rules: &FieldRules) -> Result<()> {
        let checks = [
            (Field::Name, FieldValue::Text(self.name.clone()), self.name.clone()),
            (Field::Email, FieldValue::Text(self.email.clone()), self.email.clone()),
            (Field::Password, FieldValue::Text(self.password.clone()), self.password.clone()),
            (
                Field::InitialPreferences,
                FieldValue::Tags(self.initial_preferences.clone()),
                self.initial_preferences.join(","),
            ),
        ];

        for (field, expected, raw) in checks {
            let normalized = rules.normalize(field, &raw)?;
            if normalized != expected {
                return Err(Error::invalid_field(
                    field.column(),
                    "is not in normalized form",
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("initial_preferences", &self.initial_preferences)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn ada() -> User {
        User {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "analytical".to_string(),
            initial_preferences: vec!["news".to_string()],
        }
    }

    #[test]
    fn test_valid_user() {
        assert!(ada().validate(&FieldRules::default()).is_ok());
    }

    #[test]
    fn test_unnormalized_email_is_rejected() {
        let mut user = ada();
        user.email = "Ada@Example.com".to_string();
        let err = user.validate(&FieldRules::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidField);
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn test_short_password_is_rejected() {
        let mut user = ada();
        user.password = "abc".to_string();
        assert!(user.validate(&FieldRules::default()).is_err());
    }

    #[test]
    fn test_duplicate_preferences_are_rejected() {
        let mut user = ada();
        user.initial_preferences = vec!["news".to_string(), "news".to_string()];
        assert!(user.validate(&FieldRules::default()).is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", ada());
        assert!(!debug.contains("analytical"));
        assert!(debug.contains("<redacted>"));
    }
}
