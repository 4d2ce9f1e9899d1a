//! Manifest document types.
//!
//! A manifest is the JSON sidecar `<artifact>.manifest` that tells the
//! platform how to load an artifact without inferring its structure.
//! Optional fields are omitted from the document when unset, so a manifest
//! written by this crate reads back structurally equal.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::InvalidManifest;

/// One key/value metadata pair attached to a table or column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Metadata key, e.g. `KBC.datatype.basetype`.
    pub key: String,
    /// Metadata value.
    pub value: String,
}

impl MetadataEntry {
    /// Create a metadata pair.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Manifest of a table artifact (CSV file or sliced directory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableManifest {
    /// Destination table identifier in storage.
    pub destination: String,
    /// Column names in file order.
    pub columns: Vec<String>,
    /// Primary key columns; order matters for composite keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<Vec<String>>,
    /// Append to the destination instead of replacing it.
    #[serde(default)]
    pub incremental: bool,
    /// Field delimiter of delimited formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    /// Field enclosure of delimited formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enclosure: Option<String>,
    /// Table-level metadata.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataEntry>,
    /// Per-column metadata, keyed by column name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub column_metadata: BTreeMap<String, Vec<MetadataEntry>>,
}

impl TableManifest {
    /// Manifest for `destination` with the given columns and nothing else.
    #[must_use]
    pub fn new<I, S>(destination: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            destination: destination.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            primary_key: None,
            incremental: false,
            delimiter: None,
            enclosure: None,
            metadata: Vec::new(),
            column_metadata: BTreeMap::new(),
        }
    }

    /// Set the primary key.
    #[must_use]
    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Mark the load as incremental.
    #[must_use]
    pub fn incremental(mut self, incremental: bool) -> Self {
        self.incremental = incremental;
        self
    }

    /// Set delimiter and enclosure for delimited formats.
    #[must_use]
    pub fn with_csv_format(
        mut self,
        delimiter: impl Into<String>,
        enclosure: impl Into<String>,
    ) -> Self {
        self.delimiter = Some(delimiter.into());
        self.enclosure = Some(enclosure.into());
        self
    }

    /// Add a table-level metadata pair.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(MetadataEntry::new(key, value));
        self
    }

    /// Add a metadata pair to one column.
    #[must_use]
    pub fn with_column_metadata(
        mut self,
        column: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.column_metadata
            .entry(column.into())
            .or_default()
            .push(MetadataEntry::new(key, value));
        self
    }

    /// Check the manifest invariants.
    ///
    /// - `destination` is not empty
    /// - column names are unique
    /// - primary key columns are unique and all listed in `columns`
    /// - `column_metadata` only names listed columns
    ///
    /// # Errors
    ///
    /// Returns the first broken invariant.
    pub fn validate(&self) -> Result<(), InvalidManifest> {
        if self.destination.trim().is_empty() {
            return Err(InvalidManifest("destination must not be empty".to_owned()));
        }

        let mut columns = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !columns.insert(column.as_str()) {
                return Err(InvalidManifest(format!("duplicate column '{column}'")));
            }
        }

        if let Some(primary_key) = &self.primary_key {
            let mut seen = HashSet::with_capacity(primary_key.len());
            for column in primary_key {
                if !columns.contains(column.as_str()) {
                    return Err(InvalidManifest(format!(
                        "primary key column '{column}' is not in columns"
                    )));
                }
                if !seen.insert(column.as_str()) {
                    return Err(InvalidManifest(format!(
                        "primary key column '{column}' is listed twice"
                    )));
                }
            }
        }

        if let Some(column) = self
            .column_metadata
            .keys()
            .find(|c| !columns.contains(c.as_str()))
        {
            return Err(InvalidManifest(format!(
                "column metadata given for unknown column '{column}'"
            )));
        }

        Ok(())
    }
}

/// Manifest of a file artifact in `out/files/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileManifest {
    /// Tags attached to the uploaded file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Whether the file is publicly accessible.
    #[serde(default)]
    pub is_public: bool,
    /// Keep the file past the default retention period.
    #[serde(default)]
    pub is_permanent: bool,
    /// Encrypt the file at rest.
    #[serde(default = "default_true")]
    pub is_encrypted: bool,
    /// Notify project members about the upload.
    #[serde(default)]
    pub notify: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FileManifest {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            is_public: false,
            is_permanent: false,
            is_encrypted: true,
            notify: false,
        }
    }
}

impl FileManifest {
    /// Add a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Keep the file permanently.
    #[must_use]
    pub fn permanent(mut self) -> Self {
        self.is_permanent = true;
        self
    }

    /// Check that tags are non-empty and unique.
    ///
    /// # Errors
    ///
    /// Returns the first offending tag.
    pub fn validate(&self) -> Result<(), InvalidManifest> {
        let mut seen = HashSet::with_capacity(self.tags.len());
        for tag in &self.tags {
            if tag.trim().is_empty() {
                return Err(InvalidManifest("tags must not be empty".to_owned()));
            }
            if !seen.insert(tag.as_str()) {
                return Err(InvalidManifest(format!("duplicate tag '{tag}'")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn orders() -> TableManifest {
        TableManifest::new("in.c-shop.orders", ["id", "amount"]).with_primary_key(["id"])
    }

    #[test]
    fn test_valid_table_manifest() {
        assert!(orders().validate().is_ok());
        assert!(TableManifest::new("in.c-shop.orders", ["id"]).validate().is_ok());
    }

    #[test]
    fn test_primary_key_must_be_subset_of_columns() {
        let manifest =
            TableManifest::new("in.c-shop.orders", ["id", "name"]).with_primary_key(["id", "missing"]);
        let err = manifest.validate().unwrap_err();
        assert_eq!(err.0, "primary key column 'missing' is not in columns");
    }

    #[test]
    fn test_primary_key_columns_unique() {
        let manifest = orders().with_primary_key(["id", "id"]);
        assert!(manifest.validate().unwrap_err().0.contains("listed twice"));
    }

    #[test]
    fn test_composite_primary_key_order_preserved() {
        let manifest = TableManifest::new("in.c-shop.lines", ["order_id", "line", "sku"])
            .with_primary_key(["line", "order_id"]);
        assert!(manifest.validate().is_ok());
        assert_eq!(
            manifest.primary_key.as_deref(),
            Some(["line".to_owned(), "order_id".to_owned()].as_slice())
        );
    }

    #[test]
    fn test_duplicate_columns_and_empty_destination() {
        assert!(TableManifest::new("t", ["a", "a"]).validate().is_err());
        assert!(TableManifest::new(" ", ["a"]).validate().is_err());
    }

    #[test]
    fn test_column_metadata_must_name_known_column() {
        let manifest = orders().with_column_metadata("total", "KBC.datatype.basetype", "NUMERIC");
        assert!(manifest.validate().is_err());

        let manifest = orders().with_column_metadata("amount", "KBC.datatype.basetype", "NUMERIC");
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_table_manifest_json_shape() {
        let value = serde_json::to_value(orders().incremental(true)).unwrap();
        assert_eq!(
            value,
            json!({
                "destination": "in.c-shop.orders",
                "columns": ["id", "amount"],
                "primary_key": ["id"],
                "incremental": true
            })
        );
    }

    #[test]
    fn test_table_manifest_defaults_when_decoding() {
        let manifest: TableManifest =
            serde_json::from_value(json!({"destination": "out.c-a.b", "columns": ["x"]})).unwrap();
        assert!(!manifest.incremental);
        assert!(manifest.primary_key.is_none());
        assert!(manifest.metadata.is_empty());
    }

    #[test]
    fn test_table_manifest_requires_destination_and_columns() {
        assert!(serde_json::from_value::<TableManifest>(json!({"columns": ["x"]})).is_err());
        assert!(serde_json::from_value::<TableManifest>(json!({"destination": "t"})).is_err());
    }

    #[test]
    fn test_file_manifest_defaults() {
        let manifest: FileManifest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(manifest, FileManifest::default());
        assert!(manifest.is_encrypted);
    }

    #[test]
    fn test_file_manifest_validate() {
        assert!(FileManifest::default().with_tag("export").validate().is_ok());
        assert!(FileManifest::default().with_tag("").validate().is_err());
        assert!(
            FileManifest::default()
                .with_tag("a")
                .with_tag("a")
                .validate()
                .is_err()
        );
    }
}
