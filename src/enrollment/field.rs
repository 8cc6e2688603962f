//! Enrollment fields and the rules that normalize them

use std::fmt;

use crate::config::EnrollmentSettings;
use crate::error::{Error, Result};

const MAX_NAME_CHARS: usize = 100;

/// A field of the enrollment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Password,
    InitialPreferences,
}

impl Field {
    /// Order in which the enrollment asks for fields
    pub const ORDER: [Field; 4] = [
        Field::Name,
        Field::Email,
        Field::Password,
        Field::InitialPreferences,
    ];

    /// Column name used in tabular input
    pub fn column(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
            Field::InitialPreferences => "initial_preferences",
        }
    }

    /// Whether the value must never be echoed or logged
    pub fn is_secret(&self) -> bool {
        matches!(self, Field::Password)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A field value after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Tags(Vec<String>),
}

/// Validation rules applied to each field
#[derive(Debug, Clone)]
pub struct FieldRules {
    /// Minimum password length in characters
    pub min_password_length: usize,

    /// Accepted preference tags (empty = anything goes)
    pub allowed_preferences: Vec<String>,
}

impl Default for FieldRules {
    fn default() -> Self {
        Self::from(&EnrollmentSettings::default())
    }
}

impl From<&EnrollmentSettings> for FieldRules {
    fn from(settings: &EnrollmentSettings) -> Self {
        Self {
            min_password_length: settings.min_password_length,
            allowed_preferences: settings
                .allowed_preferences
                .iter()
                .map(|p| p.trim().to_lowercase())
                .collect(),
        }
    }
}

impl FieldRules {
    /// Normalize a raw value for `field`, or reject it with `InvalidField`.
    pub fn normalize(&self, field: Field, raw: &str) -> Result<FieldValue> {
        match field {
            Field::Name => normalize_name(raw).map(FieldValue::Text),
            Field::Email => normalize_email(raw).map(FieldValue::Text),
            Field::Password => self.check_password(raw).map(FieldValue::Text),
            Field::InitialPreferences => self.normalize_preferences(raw).map(FieldValue::Tags),
        }
    }

    fn check_password(&self, raw: &str) -> Result<String> {
        // Passwords are taken verbatim, only the line terminator is stripped upstream
        if raw.chars().count() < self.min_password_length {
            return Err(Error::invalid_field(
                Field::Password.column(),
                format!("must be at least {} characters long", self.min_password_length),
            ));
        }
        Ok(raw.to_string())
    }

    fn normalize_preferences(&self, raw: &str) -> Result<Vec<String>> {
        let mut tags: Vec<String> = Vec::new();
        for tag in raw.split(',').map(|t| t.trim().to_lowercase()) {
            if tag.is_empty() || tags.contains(&tag) {
                continue;
            }
            if !self.allowed_preferences.is_empty() && !self.allowed_preferences.contains(&tag) {
                return Err(Error::invalid_field(
                    Field::InitialPreferences.column(),
                    format!(
                        "unknown preference '{}' (allowed: {})",
                        tag,
                        self.allowed_preferences.join(", ")
                    ),
                ));
            }
            tags.push(tag);
        }
        Ok(tags)
    }
}

fn normalize_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::invalid_field(Field::Name.column(), "must not be empty"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(Error::invalid_field(
            Field::Name.column(),
            format!("must be at most {} characters long", MAX_NAME_CHARS),
        ));
    }
    Ok(name.to_string())
}

fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    let reject = |reason: &str| -> Result<String> {
        Err(Error::invalid_field(Field::Email.column(), reason))
    };

    if email.is_empty() {
        return reject("must not be empty");
    }
    if email.chars().any(char::is_whitespace) {
        return reject("must not contain whitespace");
    }
    let Some((local, domain)) = email.split_once('@') else {
        return reject("must contain '@'");
    };
    if domain.contains('@') {
        return reject("must contain exactly one '@'");
    }
    if local.is_empty() {
        return reject("is missing the part before '@'");
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return reject("must have a domain like example.com");
    }
    Ok(email)
}
