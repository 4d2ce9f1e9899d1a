//! Declarative schema definitions.
//!
//! A schema is a tree of [`SchemaNode`]s. Objects list their [`Field`]s
//! explicitly and reject undeclared keys unless built with
//! [`ObjectSchema::allow_unknown`].
//!
//! ```
//! use conduit_config::{Field, ObjectSchema, SchemaNode};
//!
//! let parameters = ObjectSchema::new()
//!     .field("table", Field::required(SchemaNode::String))
//!     .field("incremental", Field::optional(SchemaNode::Boolean).with_default(false));
//! ```

use std::collections::BTreeMap;

use serde_json::{Value, json};

/// Expected shape of a JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Any JSON value; validation stops here.
    Any,
    /// A JSON string.
    String,
    /// A JSON number without a fractional part.
    Integer,
    /// Any JSON number.
    Number,
    /// A JSON boolean.
    Boolean,
    /// A JSON array whose items all match the inner node.
    Array(Box<SchemaNode>),
    /// A JSON object.
    Object(ObjectSchema),
}

impl SchemaNode {
    /// Array of `item`.
    #[must_use]
    pub fn array(item: impl Into<SchemaNode>) -> Self {
        Self::Array(Box::new(item.into()))
    }

    /// Name used in type-mismatch messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

impl From<ObjectSchema> for SchemaNode {
    fn from(schema: ObjectSchema) -> Self {
        Self::Object(schema)
    }
}

/// A named entry of an [`ObjectSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub(crate) node: SchemaNode,
    pub(crate) required: bool,
    pub(crate) default: Option<Value>,
    pub(crate) nullable: bool,
}

impl Field {
    /// A field that must be present.
    #[must_use]
    pub fn required(node: impl Into<SchemaNode>) -> Self {
        Self {
            node: node.into(),
            required: true,
            default: None,
            nullable: false,
        }
    }

    /// A field that may be absent.
    #[must_use]
    pub fn optional(node: impl Into<SchemaNode>) -> Self {
        Self {
            required: false,
            ..Self::required(node)
        }
    }

    /// Value inserted when the field is absent. The default is validated
    /// like any user-supplied value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Accept an explicit `null`.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Whether the field must be present.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The field's value schema.
    #[must_use]
    pub fn node(&self) -> &SchemaNode {
        &self.node
    }
}

/// Schema of a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub(crate) fields: BTreeMap<String, Field>,
    pub(crate) allow_unknown: bool,
}

impl ObjectSchema {
    /// A strict object with no declared fields yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep undeclared keys instead of rejecting them.
    #[must_use]
    pub fn allow_unknown(mut self) -> Self {
        self.allow_unknown = true;
        self
    }

    /// Declare a field. Re-declaring a name replaces the previous field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Look up a declared field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Whether undeclared keys are accepted.
    #[must_use]
    pub fn allows_unknown(&self) -> bool {
        self.allow_unknown
    }
}

/// Default action when `config.json` does not name one.
pub const DEFAULT_ACTION: &str = "run";

/// Describes which `config.json` documents a component accepts.
///
/// Components usually override only [`parameters_schema`](Self::parameters_schema);
/// overriding [`root_schema`](Self::root_schema) replaces the platform
/// keys as well.
pub trait ConfigDefinition {
    /// Schema of the component-specific `parameters` object. Defaults to an
    /// object accepting anything.
    fn parameters_schema(&self) -> ObjectSchema {
        ObjectSchema::new().allow_unknown()
    }

    /// Schema of the whole document.
    fn root_schema(&self) -> ObjectSchema {
        base_root_schema(self.parameters_schema())
    }
}

/// The definition used when a component does not provide its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseDefinition;

impl ConfigDefinition for BaseDefinition {}

/// Root schema with the platform-reserved keys and the given `parameters`
/// schema.
#[must_use]
pub fn base_root_schema(parameters: ObjectSchema) -> ObjectSchema {
    let open = || ObjectSchema::new().allow_unknown();

    ObjectSchema::new()
        .field("parameters", Field::required(parameters))
        .field(
            "action",
            Field::optional(SchemaNode::String).with_default(DEFAULT_ACTION),
        )
        .field(
            "image_parameters",
            Field::optional(open()).with_default(json!({})),
        )
        .field("authorization", Field::optional(open()))
        .field("storage", Field::optional(open()).with_default(json!({})))
        .field("processors", Field::optional(open()))
        .field(
            "shared_code_row_ids",
            Field::optional(SchemaNode::array(SchemaNode::String)),
        )
        .field(
            "variables_id",
            Field::optional(SchemaNode::String).nullable(),
        )
        .field(
            "variables_values_id",
            Field::optional(SchemaNode::String).nullable(),
        )
}
