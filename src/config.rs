//! Configuration system for coflow
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (COFLOW_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::i18n::Locale;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoflowConfig {
    /// Enrollment rules
    pub enrollment: EnrollmentSettings,

    /// Interactive prompt settings
    pub prompt: PromptSettings,

    /// CSV import settings
    pub import: ImportSettings,

    /// Where enrolled users are kept
    pub storage: StorageSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Enrollment rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollmentSettings {
    /// How many times a field may be supplied before the enrollment gives up
    pub max_attempts: u32,

    /// Minimum password length in characters
    pub min_password_length: usize,

    /// Accepted preference tags (empty = any tag)
    pub allowed_preferences: Vec<String>,
}

/// Interactive prompt settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Prompt language: en, es, fr
    pub locale: Locale,
}

/// CSV import settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Single-character field delimiter
    pub delimiter: String,

    /// Stop at the first rejected row
    pub fail_fast: bool,
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// JSON-lines file holding enrolled users
    pub users_file: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (unset = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Log file rotation: hourly, daily, never
    pub rotation: String,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for EnrollmentSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_password_length: 8,
            allowed_preferences: vec![],
        }
    }
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            fail_fast: false,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            users_file: "~/.coflow/users.jsonl".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            rotation: "daily".to_string(),
            max_files: 5,
            json_format: false,
        }
    }
}

impl ImportSettings {
    /// The delimiter as the byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [byte] => Ok(*byte),
            _ => Err(Error::config_field_invalid(
                "import.delimiter",
                format!(
                    "Delimiter must be a single ASCII character, got '{}'",
                    self.delimiter
                ),
            )),
        }
    }
}

impl StorageSettings {
    /// Users file as a path
    pub fn users_path(&self) -> PathBuf {
        PathBuf::from(&self.users_file)
    }
}

impl CoflowConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            config = Self::from_file(&path)?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides()?;

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Parse a configuration file without overrides or validation
    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            message: format!("{}: {}", path.display(), e.message()),
            source: Some(e),
        })
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // An explicit path must exist
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::ConfigNotFound { path });
        }

        let search_paths = [
            PathBuf::from("coflow.toml"),
            dirs::config_dir()
                .map(|p| p.join("coflow").join("config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".coflow").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &search_paths {
            if !path.as_os_str().is_empty() && path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // Enrollment settings
        if let Ok(val) = std::env::var("COFLOW_MAX_ATTEMPTS") {
            if let Ok(n) = val.parse() {
                self.enrollment.max_attempts = n;
            }
        }
        if let Ok(val) = std::env::var("COFLOW_MIN_PASSWORD_LENGTH") {
            if let Ok(n) = val.parse() {
                self.enrollment.min_password_length = n;
            }
        }

        // Prompt settings
        if let Ok(val) = std::env::var("COFLOW_LOCALE") {
            self.prompt.locale = val.parse()?;
        }

        // Import settings
        if let Ok(val) = std::env::var("COFLOW_IMPORT_DELIMITER") {
            self.import.delimiter = val;
        }
        if let Ok(val) = std::env::var("COFLOW_FAIL_FAST") {
            self.import.fail_fast = parse_flag(&val);
        }

        // Storage settings
        if let Ok(val) = std::env::var("COFLOW_USERS_FILE") {
            self.storage.users_file = val;
        }

        // Logging settings
        if let Ok(val) = std::env::var("COFLOW_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("COFLOW_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("COFLOW_LOG_JSON") {
            self.logging.json_format = parse_flag(&val);
        }

        Ok(())
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        self.storage.users_file = expand_path(&self.storage.users_file);

        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.enrollment.max_attempts == 0 {
            return Err(Error::config_field_invalid(
                "enrollment.max_attempts",
                "max_attempts must be at least 1",
            ));
        }
        if self.enrollment.min_password_length == 0 {
            return Err(Error::config_field_invalid(
                "enrollment.min_password_length",
                "min_password_length must be at least 1",
            ));
        }
        if self.enrollment.allowed_preferences.iter().any(|p| p.trim().is_empty()) {
            return Err(Error::config_field_invalid(
                "enrollment.allowed_preferences",
                "allowed_preferences must not contain empty tags",
            ));
        }

        self.import.delimiter_byte()?;

        if self.storage.users_file.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "storage.users_file",
                "users_file cannot be empty",
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        let valid_rotations = ["hourly", "daily", "never"];
        if !valid_rotations.contains(&self.logging.rotation.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.rotation",
                format!(
                    "Invalid rotation '{}'. Must be one of: {}",
                    self.logging.rotation,
                    valid_rotations.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

fn parse_flag(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or(std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".coflow")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::ConfigValidation {
            message: format!(
                "Configuration file already exists: {}. Use --force to overwrite.",
                config_path.display()
            ),
            field: None,
        });
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# coflow configuration

[enrollment]
# How many times a field may be supplied before the enrollment gives up
max_attempts = 3

# Minimum password length in characters
min_password_length = 8

# Accepted preference tags (empty = any tag)
allowed_preferences = []

[prompt]
# Prompt language: en, es, fr
locale = "en"

[import]
# Single-character CSV field delimiter
delimiter = ","

# Stop at the first rejected row
fail_fast = false

[storage]
# JSON-lines file holding enrolled users
users_file = "~/.coflow/users.jsonl"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log file path (comment out to disable file logging)
# file = "~/.coflow/logs/coflow.log"

# Log file rotation: hourly, daily, never
rotation = "daily"

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}
