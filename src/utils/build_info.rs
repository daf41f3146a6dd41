use std::sync::OnceLock;

/// Compile-time build metadata produced by `build.rs`.
#[derive(Debug, Clone, Copy)]
pub struct BuildMetadata {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub timestamp: &'static str,
    pub profile: &'static str,
    pub rustc: &'static str,
}

impl BuildMetadata {
    /// Version with the build stamps, e.g. `0.1.0 (abc123 release, ...)`.
    pub fn details(&self) -> String {
        format!(
            "{} ({} {}, {}) built with {}",
            self.version, self.git_hash, self.profile, self.timestamp, self.rustc
        )
    }

    /// Single-line banner shown by `status`.
    pub fn banner(&self) -> String {
        format!("apajac_admin {}", self.details())
    }
}

/// Text printed after the program name by `--version`.
pub fn long_version() -> &'static str {
    static LONG_VERSION: OnceLock<String> = OnceLock::new();
    LONG_VERSION.get_or_init(|| current().details()).as_str()
}

/// Returns the statically-embedded build metadata.
pub fn current() -> BuildMetadata {
    BuildMetadata {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("APAJAC_ADMIN_BUILD_HASH").unwrap_or("unknown"),
        timestamp: option_env!("APAJAC_ADMIN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        profile: option_env!("APAJAC_ADMIN_BUILD_PROFILE").unwrap_or("unknown"),
        rustc: option_env!("APAJAC_ADMIN_BUILD_RUSTC").unwrap_or("unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_mentions_crate_version() {
        let banner = current().banner();
        assert!(banner.starts_with("apajac_admin "));
        assert!(banner.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn long_version_starts_with_crate_version() {
        assert!(long_version().starts_with(env!("CARGO_PKG_VERSION")));
        assert!(long_version().contains("built with"));
    }
}
