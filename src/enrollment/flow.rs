//! The enrollment state machine

use std::fmt;

use tracing::debug;

use super::{Field, FieldRules, FieldValue, User};
use crate::config::EnrollmentSettings;
use crate::error::{Error, Result};
use crate::workflow::{Phase, Step, Workflow};

/// What the enrollment is waiting for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRequest {
    /// The field to supply
    pub field: Field,

    /// 1 for the first ask, incremented on every rejection
    pub attempt: u32,

    /// Why the previous value was rejected
    pub rejection: Option<String>,
}

impl FieldRequest {
    fn first(field: Field) -> Self {
        Self {
            field,
            attempt: 1,
            rejection: None,
        }
    }

    /// Whether this is a re-ask after a rejected value
    pub fn is_retry(&self) -> bool {
        self.rejection.is_some()
    }
}

impl fmt::Display for FieldRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}'", self.field)
    }
}

/// Fields collected so far
#[derive(Debug, Default)]
struct Draft {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    initial_preferences: Option<Vec<String>>,
}

impl Draft {
    fn set(&mut self, field: Field, value: FieldValue) -> Result<()> {
        match (field, value) {
            (Field::Name, FieldValue::Text(v)) => self.name = Some(v),
            (Field::Email, FieldValue::Text(v)) => self.email = Some(v),
            (Field::Password, FieldValue::Text(v)) => self.password = Some(v),
            (Field::InitialPreferences, FieldValue::Tags(v)) => self.initial_preferences = Some(v),
            (field, _) => {
                return Err(Error::Internal(format!("wrong value kind for field '{}'", field)))
            }
        }
        Ok(())
    }

    fn take_user(&mut self) -> Result<User> {
        let missing = |field: Field| Error::Internal(format!("field '{}' was never collected", field));
        Ok(User {
            name: self.name.take().ok_or_else(|| missing(Field::Name))?,
            email: self.email.take().ok_or_else(|| missing(Field::Email))?,
            password: self.password.take().ok_or_else(|| missing(Field::Password))?,
            initial_preferences: self
                .initial_preferences
                .take()
                .ok_or_else(|| missing(Field::InitialPreferences))?,
        })
    }
}

/// Collects `name`, `email`, `password` and `initial_preferences`, in that
/// order, and completes with a `User`.
///
/// A rejected value re-requests the same field until `max_attempts` is
/// reached; after that `resume` fails with `InvalidField` and the workflow
/// is finished.
#[derive(Debug)]
pub struct Enrollment {
    rules: FieldRules,
    max_attempts: u32,
    phase: Phase,
    position: usize,
    pending: Option<FieldRequest>,
    draft: Draft,
}

impl Enrollment {
    /// Create an enrollment with explicit rules
    pub fn new(rules: FieldRules, max_attempts: u32) -> Self {
        Self {
            rules,
            max_attempts: max_attempts.max(1),
            phase: Phase::Fresh,
            position: 0,
            pending: None,
            draft: Draft::default(),
        }
    }

    /// Create an enrollment from the `[enrollment]` settings
    pub fn from_settings(settings: &EnrollmentSettings) -> Self {
        Self::new(FieldRules::from(settings), settings.max_attempts)
    }

    fn suspend(&mut self, request: FieldRequest) -> Step<FieldRequest, User> {
        self.pending = Some(request.clone());
        Step::Suspend(request)
    }
}

impl Default for Enrollment {
    fn default() -> Self {
        Self::from_settings(&EnrollmentSettings::default())
    }
}

impl Workflow for Enrollment {
    type Request = FieldRequest;
    type Value = String;
    type Output = User;

    fn name(&self) -> &'static str {
        "enrollment"
    }

    fn start(&mut self) -> Result<Step<FieldRequest, User>> {
        self.phase.begin(self.name())?;
        Ok(self.suspend(FieldRequest::first(Field::ORDER[0])))
    }

    fn resume(&mut self, value: String) -> Result<Step<FieldRequest, User>> {
        self.phase.ensure_suspended(self.name())?;
        let request = self
            .pending
            .take()
            .ok_or_else(|| Error::Internal("enrollment suspended without a request".to_string()))?;
        let field = request.field;

        match self.rules.normalize(field, &value) {
            Ok(normalized) => {
                self.draft.set(field, normalized)?;
                self.position += 1;
                match Field::ORDER.get(self.position) {
                    Some(&next) => Ok(self.suspend(FieldRequest::first(next))),
                    None => {
                        self.phase.finish();
                        Ok(Step::Complete(self.draft.take_user()?))
                    }
                }
            }
            Err(Error::InvalidField { field: column, reason }) => {
                debug!(field = %field, attempt = request.attempt, reason = %reason, "Field value rejected");
                if request.attempt >= self.max_attempts {
                    self.phase.finish();
                    return Err(Error::InvalidField {
                        field: column,
                        reason: format!("{} (gave up after {} attempts)", reason, request.attempt),
                    });
                }
                Ok(self.suspend(FieldRequest {
                    field,
                    attempt: request.attempt + 1,
                    rejection: Some(reason),
                }))
            }
            Err(other) => Err(other),
        }
    }

    fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }
}
