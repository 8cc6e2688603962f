//! Error types for coflow
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for coflow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Input errors (3xx)
    InputClosed = 300,
    MissingField = 301,
    InvalidField = 302,
    MalformedRow = 303,

    // Workflow protocol errors (4xx)
    WorkflowNotStarted = 400,
    WorkflowAlreadyStarted = 401,
    WorkflowFinished = 402,

    // Storage errors (5xx)
    DuplicateUser = 500,
    StoreCorrupt = 501,
    Serialization = 502,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // Input errors
            400..=499 => 40, // Workflow errors
            500..=599 => 50, // Storage errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Input Errors
    // ─────────────────────────────────────────────────────────────

    /// The input source ran out while a value was still needed
    #[error("Input closed while waiting for {waiting_for}")]
    InputClosed { waiting_for: String },

    /// A requested field has no value in the input
    #[error("Missing value for field '{field}'")]
    MissingField { field: String },

    /// A supplied value was rejected
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// A tabular row could not be read
    #[error("Malformed row{}: {message}", at_line(.line))]
    MalformedRow { line: Option<u64>, message: String },

    // ─────────────────────────────────────────────────────────────
    // Workflow Errors
    // ─────────────────────────────────────────────────────────────

    /// Resume called before the workflow was started
    #[error("Workflow '{workflow}' was resumed before it was started")]
    WorkflowNotStarted { workflow: &'static str },

    /// Start called twice
    #[error("Workflow '{workflow}' was already started")]
    WorkflowAlreadyStarted { workflow: &'static str },

    /// Resume called after the workflow completed
    #[error("Workflow '{workflow}' has already finished")]
    WorkflowFinished { workflow: &'static str },

    // ─────────────────────────────────────────────────────────────
    // Storage Errors
    // ─────────────────────────────────────────────────────────────

    /// A user with this e-mail already exists
    #[error("A user with e-mail '{email}' already exists")]
    DuplicateUser { email: String },

    /// The user store file contains an unreadable record
    #[error("User store {path} is corrupt at line {line}: {message}")]
    StoreCorrupt {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

fn at_line(line: &Option<u64>) -> String {
    line.map(|l| format!(" at line {}", l)).unwrap_or_default()
}

impl Error {
    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::InputClosed { .. } => ErrorCode::InputClosed,
            Error::MissingField { .. } => ErrorCode::MissingField,
            Error::InvalidField { .. } => ErrorCode::InvalidField,
            Error::MalformedRow { .. } => ErrorCode::MalformedRow,

            Error::WorkflowNotStarted { .. } => ErrorCode::WorkflowNotStarted,
            Error::WorkflowAlreadyStarted { .. } => ErrorCode::WorkflowAlreadyStarted,
            Error::WorkflowFinished { .. } => ErrorCode::WorkflowFinished,

            Error::DuplicateUser { .. } => ErrorCode::DuplicateUser,
            Error::StoreCorrupt { .. } => ErrorCode::StoreCorrupt,
            Error::Json(_) => ErrorCode::Serialization,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Whether the error only concerns the record being processed.
    ///
    /// Batch imports keep going past these; anything else stops the run.
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            Error::MissingField { .. }
                | Error::InvalidField { .. }
                | Error::MalformedRow { .. }
                | Error::DuplicateUser { .. }
        )
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'coflow config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'coflow config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values."
            ),
            Error::InputClosed { .. } => Some(
                "The input ended before every field was supplied. Run again and answer each prompt."
            ),
            Error::MissingField { .. } => Some(
                "Make sure the CSV header has the columns name, email, password and initial_preferences."
            ),
            Error::MalformedRow { .. } => Some(
                "Check the CSV file for unbalanced quotes or a wrong delimiter (see [import] delimiter)."
            ),
            Error::DuplicateUser { .. } => Some(
                "Each e-mail can only be enrolled once. Run 'coflow users list' to see existing users."
            ),
            Error::StoreCorrupt { .. } => Some(
                "Fix or remove the offending line in the users file (see [storage] users_file)."
            ),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            self.code().as_str(),
            self
        );

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Error::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an invalid field error
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Error::MissingField {
            field: field.into(),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line());
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(e) => Error::Io(e),
            _ => Error::MalformedRow { line, message },
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
