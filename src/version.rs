//! Version and build information
//!
//! Provides access to build-time embedded information.

use std::fmt;

/// Build information embedded at compile time
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Package version from Cargo.toml
    pub version: &'static str,
    /// Package name
    pub name: &'static str,
    /// Git commit hash (short)
    pub git_hash: &'static str,
    /// Raw git dirty string ("true" or "false")
    git_dirty_str: &'static str,
    /// Build timestamp
    pub build_timestamp: &'static str,
    /// Target triple (e.g., x86_64-unknown-linux-gnu)
    pub target: &'static str,
    /// Build profile (debug/release)
    pub profile: &'static str,
    /// Rustc version used to build
    pub rustc_version: &'static str,
}

impl BuildInfo {
    /// Get the current build information
    pub const fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            name: env!("CARGO_PKG_NAME"),
            git_hash: env!("COFLOW_GIT_HASH"),
            git_dirty_str: env!("COFLOW_GIT_DIRTY"),
            build_timestamp: env!("COFLOW_BUILD_TIMESTAMP"),
            target: env!("COFLOW_TARGET"),
            profile: env!("COFLOW_PROFILE"),
            rustc_version: env!("COFLOW_RUSTC_VERSION"),
        }
    }

    /// Whether the working directory was dirty at build time
    pub fn git_dirty(&self) -> bool {
        self.git_dirty_str == "true"
    }

    /// Full version string (e.g., "0.1.0-abc1234")
    pub fn full_version(&self) -> String {
        if self.git_dirty() {
            format!("{}-{}-dirty", self.version, self.git_hash)
        } else {
            format!("{}-{}", self.version, self.git_hash)
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.name, self.full_version())?;
        writeln!(f)?;
        writeln!(f, "Build Information:")?;
        writeln!(f, "  Version:    {}", self.version)?;
        writeln!(f, "  Git Hash:   {}{}", self.git_hash, if self.git_dirty() { " (dirty)" } else { "" })?;
        writeln!(f, "  Built:      {}", self.build_timestamp)?;
        writeln!(f, "  Profile:    {}", self.profile)?;
        writeln!(f, "  Target:     {}", self.target)?;
        writeln!(f, "  Compiler:   {}", self.rustc_version)?;
        Ok(())
    }
}

/// Get the current build info
pub fn build_info() -> BuildInfo {
    BuildInfo::current()
}

/// Print version information to stdout
pub fn print_version() {
    print!("{}", build_info());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_exists() {
        let info = build_info();
        assert!(!info.version.is_empty());
        assert_eq!(info.name, "coflow");
    }

    #[test]
    fn test_full_version_format() {
        let info = build_info();
        let full = info.full_version();
        assert!(full.starts_with(info.version));
        assert!(full.contains(info.git_hash));
    }

    #[test]
    fn test_display_format() {
        let display = build_info().to_string();
        assert!(display.contains("Version:"));
        assert!(display.contains("Git Hash:"));
        assert!(display.contains("Target:"));
    }
}
