//! The validated configuration.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult, ValidationRule};
use crate::schema::DEFAULT_ACTION;

/// Placeholder printed instead of secret values.
const REDACTED: &str = "***";

/// Validated contents of `config.json`.
///
/// `P` is the typed shape of the `parameters` object; the default keeps it
/// as an untyped JSON map. A `Config` is only ever built from a document
/// that already passed schema validation and is never mutated afterwards.
#[derive(Clone)]
pub struct Config<P = Map<String, Value>> {
    parameters: P,
    action: String,
    image_parameters: Map<String, Value>,
    authorization: Option<Map<String, Value>>,
    storage: Map<String, Value>,
    raw: Value,
}

impl<P: DeserializeOwned> Config<P> {
    /// Build the typed view of a validated document.
    pub(crate) fn from_validated(raw: Value) -> ConfigResult<Self> {
        let parameters = raw
            .get("parameters")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let parameters: P =
            serde_json::from_value(parameters).map_err(|e| ConfigError::ValidationError {
                field: "parameters".to_owned(),
                rule: ValidationRule::Shape,
                message: e.to_string(),
            })?;

        let action = raw
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_ACTION)
            .to_owned();

        Ok(Self {
            parameters,
            action,
            image_parameters: object_at(&raw, "image_parameters").unwrap_or_default(),
            authorization: object_at(&raw, "authorization"),
            storage: object_at(&raw, "storage").unwrap_or_default(),
            raw,
        })
    }
}

impl<P> Config<P> {
    /// Component-specific parameters.
    pub fn parameters(&self) -> &P {
        &self.parameters
    }

    /// Requested action (`run` unless the platform asks for a sync action).
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Parameters shared by every configuration of the component image.
    pub fn image_parameters(&self) -> &Map<String, Value> {
        &self.image_parameters
    }

    /// OAuth and other credentials injected by the platform.
    pub fn authorization(&self) -> Option<&Map<String, Value>> {
        self.authorization.as_ref()
    }

    /// Input and output mapping.
    pub fn storage(&self) -> &Map<String, Value> {
        &self.storage
    }

    /// Tables mapped into `in/tables/`.
    pub fn input_tables(&self) -> &[Value] {
        self.array_at("storage.input.tables")
    }

    /// Files mapped into `in/files/`.
    pub fn input_files(&self) -> &[Value] {
        self.array_at("storage.input.files")
    }

    /// Tables the platform expects to find in `out/tables/`.
    pub fn expected_output_tables(&self) -> &[Value] {
        self.array_at("storage.output.tables")
    }

    /// Look up a value by dotted path, e.g. `parameters.db.host` or
    /// `storage.input.tables.0.source`. Numeric segments index arrays.
    pub fn value(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(&self.raw, |current, segment| match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }

    /// The validated document, defaults included.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    fn array_at(&self, path: &str) -> &[Value] {
        self.value(path)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl<P> fmt::Debug for Config<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parameters = self
            .raw
            .get("parameters")
            .map_or(Value::Null, redact_secrets);
        f.debug_struct("Config")
            .field("action", &self.action)
            .field("parameters", &parameters)
            .field(
                "image_parameters",
                &redact_secrets(&Value::Object(self.image_parameters.clone())),
            )
            .field("has_authorization", &self.authorization.is_some())
            .field("input_tables", &self.input_tables().len())
            .field("expected_output_tables", &self.expected_output_tables().len())
            .finish()
    }
}

fn object_at(raw: &Value, key: &str) -> Option<Map<String, Value>> {
    raw.get(key).and_then(Value::as_object).cloned()
}

/// Replace the value of every key starting with `#` (platform-encrypted
/// values) with a placeholder.
fn redact_secrets(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| {
                    let v = if key.starts_with('#') {
                        Value::String(REDACTED.to_owned())
                    } else {
                        redact_secrets(v)
                    };
                    (key.clone(), v)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_secrets).collect()),
        other => other.clone(),
    }
}
