//! Test fixtures for data directories, configurations and manifests.

use std::path::{Path, PathBuf};

use conduit_config::CONFIG_FILE_NAME;
use conduit_manifest::{ManifestManager, TableManifest};
use serde_json::{Value, json};
use tempfile::TempDir;

/// A temporary data directory laid out the way the platform mounts it.
///
/// The directory is removed when the fixture is dropped.
#[derive(Debug)]
pub struct DataDirFixture {
    dir: TempDir,
    env_value: String,
}

impl DataDirFixture {
    /// Create an empty data directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create tempdir");
        let env_value = dir
            .path()
            .to_str()
            .expect("tempdir path is not UTF-8")
            .to_owned();
        Self { dir, env_value }
    }

    /// The data directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The value to pass as `KBC_DATADIR`.
    #[must_use]
    pub fn env_value(&self) -> &str {
        &self.env_value
    }

    /// Write `config.json` and return the fixture.
    #[must_use]
    pub fn with_config(self, config: &Value) -> Self {
        self.write_config(config);
        self
    }

    /// Write `config.json` as pretty JSON.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write_config(&self, config: &Value) -> PathBuf {
        let json = serde_json::to_string_pretty(config).expect("failed to encode config");
        self.write_raw_config(json)
    }

    /// Write `config.json` verbatim, valid JSON or not.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write_raw_config(&self, contents: impl AsRef<[u8]>) -> PathBuf {
        self.write_file(CONFIG_FILE_NAME, contents)
    }

    /// Write a file below the data directory, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write_file(&self, relative: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent directory");
        }
        std::fs::write(&path, contents).expect("failed to write file");
        path
    }

    /// Add an input table under `in/tables/` with its manifest.
    ///
    /// # Panics
    ///
    /// Panics if the table or its manifest cannot be written.
    #[must_use]
    pub fn with_input_table(self, file_name: &str, csv: &str, manifest: &TableManifest) -> Self {
        let relative = Path::new("in").join("tables").join(file_name);
        self.write_file(&relative, csv);
        self.manifest_manager()
            .write_manifest(&relative, manifest)
            .expect("failed to write input manifest");
        self
    }

    /// A manifest manager bound to this directory.
    #[must_use]
    pub fn manifest_manager(&self) -> ManifestManager {
        ManifestManager::new(self.path())
    }
}

impl Default for DataDirFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal valid `config.json` with the given parameters.
#[must_use]
pub fn test_config(parameters: Value) -> Value {
    json!({ "parameters": parameters })
}

/// `config.json` of an orders export.
#[must_use]
pub fn orders_config() -> Value {
    json!({
        "action": "run",
        "parameters": { "table": "orders" },
        "storage": {
            "input": {
                "tables": [
                    { "source": "in.c-shop.orders", "destination": "orders.csv" }
                ]
            },
            "output": {
                "tables": [
                    { "source": "orders.csv", "destination": "out.c-shop.orders" }
                ]
            }
        }
    })
}

/// Manifest of the orders table: `id`, `amount`, keyed by `id`.
#[must_use]
pub fn orders_manifest() -> TableManifest {
    TableManifest::new("out.c-shop.orders", ["id", "amount"]).with_primary_key(["id"])
}
