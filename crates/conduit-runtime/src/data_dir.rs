//! Data directory resolution.

use std::fmt;
use std::path::{Path, PathBuf};

use conduit_config::CONFIG_FILE_NAME;

/// Environment variable the platform uses to point at the data directory.
pub const DATA_DIR_ENV: &str = "KBC_DATADIR";

/// Data directory used when [`DATA_DIR_ENV`] is not set.
pub const DEFAULT_DATA_DIR: &str = "/data/";

/// Normalize a data directory path.
///
/// Backslashes and the platform separator become `/`, trailing slashes
/// are stripped and exactly one is appended. This is a pure string
/// transformation: symlinks are not resolved and the directory does not
/// have to exist.
///
/// ```
/// use conduit_runtime::resolve_data_dir;
///
/// assert_eq!(resolve_data_dir(None), "/data/");
/// assert_eq!(resolve_data_dir(Some(r"C:\data\\")), "C:/data/");
/// assert_eq!(resolve_data_dir(Some("/tmp/run//")), "/tmp/run/");
/// ```
#[must_use]
pub fn resolve_data_dir(env_value: Option<&str>) -> String {
    let raw = env_value.unwrap_or(DEFAULT_DATA_DIR);
    let mut normalized: String = raw
        .chars()
        .map(|c| {
            if c == '\\' || std::path::is_separator(c) {
                '/'
            } else {
                c
            }
        })
        .collect();
    let kept = normalized.trim_end_matches('/').len();
    normalized.truncate(kept);
    normalized.push('/');
    normalized
}

/// The resolved data directory of one invocation.
///
/// Always ends in exactly one `/`. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataDir(String);

impl DataDir {
    /// Resolve from an optional environment value.
    #[must_use]
    pub fn resolve(env_value: Option<&str>) -> Self {
        Self(resolve_data_dir(env_value))
    }

    /// Resolve from [`DATA_DIR_ENV`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::resolve(std::env::var(DATA_DIR_ENV).ok().as_deref())
    }

    /// The normalized path string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The directory as a filesystem path.
    #[must_use]
    pub fn path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// A path below the data directory.
    #[must_use]
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.path().join(relative)
    }

    /// Location of `config.json`.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.join(CONFIG_FILE_NAME)
    }
}

impl fmt::Display for DataDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for DataDir {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_normalized(resolved: &str) {
        assert!(resolved.ends_with('/'));
        assert!(!resolved.ends_with("//"));
        assert!(!resolved.contains('\\'));
    }

    #[test]
    fn test_default_when_unset() {
        assert_eq!(resolve_data_dir(None), DEFAULT_DATA_DIR);
        assert_eq!(resolve_data_dir(None), resolve_data_dir(Some("/data/")));
        assert_eq!(resolve_data_dir(Some("/data")), "/data/");
    }

    #[test]
    fn test_separator_styles() {
        for input in [
            "/data",
            "/data/",
            "/data///",
            r"C:\data",
            r"C:\data\",
            r"C:\data\\/",
            r"relative\dir/",
            "relative",
        ] {
            let resolved = resolve_data_dir(Some(input));
            assert_normalized(&resolved);
        }
        assert_eq!(resolve_data_dir(Some(r"C:\kbc\data\")), "C:/kbc/data/");
        assert_eq!(resolve_data_dir(Some("relative")), "relative/");
    }

    #[test]
    fn test_root_and_empty() {
        assert_eq!(resolve_data_dir(Some("/")), "/");
        assert_eq!(resolve_data_dir(Some("///")), "/");
        assert_eq!(resolve_data_dir(Some("")), "/");
    }

    #[test]
    fn test_inner_separators_untouched() {
        assert_eq!(resolve_data_dir(Some("/a//b/")), "/a//b/");
    }

    #[test]
    fn test_data_dir_paths() {
        let dir = DataDir::resolve(Some("/tmp/run"));
        assert_eq!(dir.as_str(), "/tmp/run/");
        assert_eq!(dir.to_string(), "/tmp/run/");
        assert_eq!(dir.config_path(), PathBuf::from("/tmp/run/config.json"));
        assert_eq!(
            dir.join("out/tables/orders.csv"),
            PathBuf::from("/tmp/run/out/tables/orders.csv")
        );
    }
}
