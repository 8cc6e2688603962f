//! Common test utilities and fixtures
//!
//! This module provides shared test infrastructure

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Get the valid config fixture path
pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

/// Get the invalid config fixture path
pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// Isolated home and working directory for running the binary.
///
/// Commands started from here never see the developer's own
/// configuration or users file.
pub struct TestEnvironment {
    pub root: TempDir,
    pub users_file: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory");
        let users_file = root.path().join("data").join("users.jsonl");
        Self { root, users_file }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write a file relative to the environment root
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn users_arg(&self) -> &str {
        self.users_file.to_str().unwrap()
    }

    /// Lines of the users file (empty if nothing was enrolled)
    pub fn stored_lines(&self) -> Vec<String> {
        fs::read_to_string(&self.users_file)
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// A coflow command confined to this environment
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("coflow").unwrap();
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env("COFLOW_USERS_FILE", &self.users_file)
            .env_remove("COFLOW_CONFIG")
            .env_remove("COFLOW_LOCALE")
            .env_remove("COFLOW_MAX_ATTEMPTS")
            .env_remove("COFLOW_MIN_PASSWORD_LENGTH")
            .env_remove("COFLOW_IMPORT_DELIMITER")
            .env_remove("COFLOW_FAIL_FAST")
            .env_remove("COFLOW_LOG_LEVEL")
            .env_remove("COFLOW_LOG_FILE")
            .env_remove("COFLOW_LOG_JSON")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
    }

    #[test]
    fn test_valid_config_exists() {
        assert!(
            valid_config_fixture().exists(),
            "Valid config fixture should exist"
        );
    }

    #[test]
    fn test_invalid_config_exists() {
        assert!(
            invalid_config_fixture().exists(),
            "Invalid config fixture should exist"
        );
    }
}
