//! Build script for coflow
//!
//! Embeds build-time information into the binary:
//! - Git commit hash
//! - Build timestamp
//! - Target triple
//! - Rust version

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let git_hash = git_output(&["rev-parse", "--short=8", "HEAD"]);
    let git_dirty = is_git_dirty();

    let build_timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let rustc_version = command_output("rustc", &["--version"]);

    println!("cargo:rustc-env=COFLOW_GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=COFLOW_GIT_DIRTY={}", git_dirty);
    println!("cargo:rustc-env=COFLOW_BUILD_TIMESTAMP={}", build_timestamp);
    println!("cargo:rustc-env=COFLOW_TARGET={}", target);
    println!("cargo:rustc-env=COFLOW_PROFILE={}", profile);
    println!("cargo:rustc-env=COFLOW_RUSTC_VERSION={}", rustc_version);
}

/// Run git with the given arguments, falling back to "unknown"
fn git_output(args: &[&str]) -> String {
    command_output("git", args)
}

/// Run a command and return its trimmed stdout
fn command_output(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout).ok()
            } else {
                None
            }
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Check if the git working directory is dirty
fn is_git_dirty() -> &'static str {
    Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .map(|output| {
            if output.status.success() && !output.stdout.is_empty() {
                "true"
            } else {
                "false"
            }
        })
        .unwrap_or("unknown")
}
