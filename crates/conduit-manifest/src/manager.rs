//! Reading and writing manifest sidecars under the data directory.
//!
//! # Layout
//!
//! ```text
//! <data dir>/
//! ├── config.json
//! ├── in/
//! │   ├── tables/   orders.csv, orders.csv.manifest, ...
//! │   └── files/
//! └── out/
//!     ├── tables/   written by the component, one .manifest per table
//!     └── files/
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ManifestError, ManifestResult, WriteFailure};
use crate::types::{FileManifest, TableManifest};

/// Extension appended to the artifact file name.
pub const MANIFEST_EXTENSION: &str = "manifest";

/// Manifest reader/writer bound to one data directory.
#[derive(Debug, Clone)]
pub struct ManifestManager {
    data_dir: PathBuf,
}

impl ManifestManager {
    /// Bind a manager to `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The bound data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// `in/tables/`.
    #[must_use]
    pub fn in_tables_dir(&self) -> PathBuf {
        self.data_dir.join("in").join("tables")
    }

    /// `in/files/`.
    #[must_use]
    pub fn in_files_dir(&self) -> PathBuf {
        self.data_dir.join("in").join("files")
    }

    /// `out/tables/`.
    #[must_use]
    pub fn out_tables_dir(&self) -> PathBuf {
        self.data_dir.join("out").join("tables")
    }

    /// `out/files/`.
    #[must_use]
    pub fn out_files_dir(&self) -> PathBuf {
        self.data_dir.join("out").join("files")
    }

    /// Path of the manifest describing `artifact`.
    ///
    /// Relative artifact paths are resolved under the data directory;
    /// absolute ones are used as given. A trailing separator is dropped, so
    /// a sliced table directory gets its manifest next to it.
    #[must_use]
    pub fn manifest_path(&self, artifact: impl AsRef<Path>) -> PathBuf {
        let artifact: PathBuf = self.data_dir.join(artifact).components().collect();
        let mut path = artifact.into_os_string();
        path.push(".");
        path.push(MANIFEST_EXTENSION);
        PathBuf::from(path)
    }

    /// Write the manifest of a table artifact, replacing any existing one.
    ///
    /// The entry is validated first; an invalid entry leaves the disk
    /// untouched. Returns the path of the written manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::WriteError`] if the entry is invalid or the
    /// write fails.
    pub fn write_manifest(
        &self,
        artifact: impl AsRef<Path>,
        manifest: &TableManifest,
    ) -> ManifestResult<PathBuf> {
        let path = self.manifest_path(artifact);
        manifest.validate().map_err(|e| write_error(&path, e.into()))?;
        write_json(&path, manifest)?;
        debug!(
            path = %path.display(),
            destination = %manifest.destination,
            columns = manifest.columns.len(),
            "wrote table manifest"
        );
        Ok(path)
    }

    /// Read the manifest of a table artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::NotFound`] if there is no manifest,
    /// [`ManifestError::DecodeError`] if it is malformed.
    pub fn read_manifest(&self, artifact: impl AsRef<Path>) -> ManifestResult<TableManifest> {
        read_json(&self.manifest_path(artifact))
    }

    /// Write the manifest of a file artifact, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::WriteError`] if the entry is invalid or the
    /// write fails.
    pub fn write_file_manifest(
        &self,
        artifact: impl AsRef<Path>,
        manifest: &FileManifest,
    ) -> ManifestResult<PathBuf> {
        let path = self.manifest_path(artifact);
        manifest.validate().map_err(|e| write_error(&path, e.into()))?;
        write_json(&path, manifest)?;
        debug!(path = %path.display(), tags = manifest.tags.len(), "wrote file manifest");
        Ok(path)
    }

    /// Read the manifest of a file artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::NotFound`] if there is no manifest,
    /// [`ManifestError::DecodeError`] if it is malformed.
    pub fn read_file_manifest(&self, artifact: impl AsRef<Path>) -> ManifestResult<FileManifest> {
        read_json(&self.manifest_path(artifact))
    }

    /// Artifacts in `dir` that have a manifest, sorted by path.
    ///
    /// A missing directory yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::ReadError`] if the directory cannot be listed.
    pub fn artifacts_with_manifests(&self, dir: impl AsRef<Path>) -> ManifestResult<Vec<PathBuf>> {
        let dir = self.data_dir.join(dir);
        let read_error = |source| ManifestError::ReadError {
            path: dir.display().to_string(),
            source,
        };

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(read_error(e)),
        };

        let mut artifacts = Vec::new();
        for entry in entries {
            let path = entry.map_err(read_error)?.path();
            if path.extension().is_some_and(|ext| ext == MANIFEST_EXTENSION) {
                artifacts.push(path.with_extension(""));
            }
        }
        artifacts.sort();
        Ok(artifacts)
    }
}

fn write_error(path: &Path, reason: WriteFailure) -> ManifestError {
    ManifestError::WriteError {
        path: path.display().to_string(),
        reason,
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> ManifestResult<()> {
    let mut json =
        serde_json::to_vec_pretty(value).map_err(|e| write_error(path, WriteFailure::Encode(e)))?;
    json.push(b'\n');
    write_atomic(path, &json).map_err(|e| write_error(path, e.into()))
}

/// Atomic write: stage in a temp file next to `path`, flush to disk, then
/// rename over the destination. Readers see the old file or the new one,
/// never a partial write.
fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut builder = tempfile::Builder::new();
    builder.prefix(".manifest-").suffix(".tmp");
    // Created like any other file: 0o666 masked by the process umask.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut staged = builder.tempfile_in(parent)?;
    staged.write_all(contents)?;
    staged.as_file().sync_all()?;
    // The temp file is removed when the failed persist error is dropped.
    staged.persist(path).map_err(|e| e.error)?;
    // The rename survives a crash only once the directory entry is on disk.
    #[cfg(unix)]
    std::fs::File::open(parent)?.sync_all()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> ManifestResult<T> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ManifestError::NotFound {
                path: path.display().to_string(),
            });
        },
        Err(e) => {
            return Err(ManifestError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    let value = serde_json::from_slice(&bytes).map_err(|e| ManifestError::DecodeError {
        path: path.display().to_string(),
        source: e,
    })?;
    debug!(path = %path.display(), "read manifest");
    Ok(value)
}
