//! Namespace configuration.
//!
//! [`FsOptions`] is the whole configuration, usable at construction and
//! loadable from TOML. [`FsOption`] is a single toggle applied to a live
//! store through [`LazyFs::set`](crate::LazyFs::set).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{LazyFsError, LazyFsResult};

/// Configuration for a [`LazyFs`](crate::LazyFs).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsOptions {
    /// Lowercase every key before lookup, fulfillment and storage.
    pub case_insensitive: bool,

    /// Allow `stat` to run the fulfiller chain on a miss. Off by default,
    /// since the generated content is only kept as a cache side effect.
    pub stat_fulfills: bool,
}

impl FsOptions {
    /// Defaults: case-sensitive keys, `stat` never fulfills.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set case insensitivity.
    pub fn with_case_insensitive(mut self, on: bool) -> Self {
        self.case_insensitive = on;
        self
    }

    /// Set whether `stat` fulfills.
    pub fn with_stat_fulfills(mut self, on: bool) -> Self {
        self.stat_fulfills = on;
        self
    }

    /// Parse options from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> LazyFsResult<Self> {
        toml::from_str(s).map_err(|e| LazyFsError::Config(e.to_string()))
    }

    /// Load options from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> LazyFsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| LazyFsError::Config(format!("{}: {}", path.display(), e)))
    }

    /// The individual toggles making up this configuration, in apply order.
    pub fn to_options(self) -> [FsOption; 2] {
        [
            FsOption::CaseInsensitive(self.case_insensitive),
            FsOption::StatFulfills(self.stat_fulfills),
        ]
    }

    /// Apply one toggle. `entries` is the number of keys currently stored.
    pub(crate) fn apply(&mut self, option: FsOption, entries: usize) -> LazyFsResult<()> {
        match option {
            FsOption::CaseInsensitive(on) => {
                if entries > 0 && on != self.case_insensitive {
                    return Err(LazyFsError::invalid_configuration(
                        "cannot update case sensitivity with existing keys",
                    ));
                }
                self.case_insensitive = on;
            }
            FsOption::StatFulfills(on) => self.stat_fulfills = on,
        }
        Ok(())
    }
}

/// A single configuration toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsOption {
    /// Fold keys to lowercase. Rejected while the store holds any entry.
    CaseInsensitive(bool),
    /// Let `stat` run the fulfiller chain.
    StatFulfills(bool),
}

impl std::fmt::Display for FsOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FsOption::CaseInsensitive(on) => write!(f, "CaseInsensitive({on})"),
            FsOption::StatFulfills(on) => write!(f, "StatFulfills({on})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = FsOptions::new();
        assert!(!opts.case_insensitive);
        assert!(!opts.stat_fulfills);
    }

    #[test]
    fn test_builder() {
        let opts = FsOptions::new()
            .with_case_insensitive(true)
            .with_stat_fulfills(true);
        assert!(opts.case_insensitive);
        assert!(opts.stat_fulfills);
    }

    #[test]
    fn test_from_toml() {
        let opts = FsOptions::from_toml_str("case_insensitive = true\n").unwrap();
        assert!(opts.case_insensitive);
        assert!(!opts.stat_fulfills);

        let err = FsOptions::from_toml_str("case_insensitive = \"yes\"").unwrap_err();
        assert!(matches!(err, LazyFsError::Config(_)));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lazyfs.toml");
        std::fs::write(&path, "stat_fulfills = true\n").unwrap();

        let opts = FsOptions::load(&path).unwrap();
        assert!(opts.stat_fulfills);
        assert!(!opts.case_insensitive);

        let missing = FsOptions::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(missing.is_not_found());
    }

    #[test]
    fn test_load_invalid_file_names_path_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "stat_fulfills = \"yes\"\n").unwrap();

        let err = FsOptions::load(&path).unwrap_err();
        assert!(matches!(err, LazyFsError::Config(_)));
        let msg = err.to_string();
        assert_eq!(msg.matches("config error").count(), 1, "{msg}");
        assert!(msg.contains("bad.toml"), "{msg}");
    }

    #[test]
    fn test_case_change_rejected_with_entries() {
        let mut opts = FsOptions::new();
        assert!(opts.apply(FsOption::CaseInsensitive(true), 1).is_err());
        assert!(!opts.case_insensitive);

        // Re-asserting the current value is harmless.
        assert!(opts.apply(FsOption::CaseInsensitive(false), 1).is_ok());

        assert!(opts.apply(FsOption::CaseInsensitive(true), 0).is_ok());
        assert!(opts.case_insensitive);

        assert!(opts.apply(FsOption::StatFulfills(true), 3).is_ok());
        assert!(opts.stat_fulfills);
    }
}
