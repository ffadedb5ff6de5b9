//! Field domains and the schema descriptor.
//!
//! Supported value domains:
//! - integer: 32-bit signed integer
//! - long: 64-bit signed integer
//! - double: 64-bit floating point
//! - string: UTF-8 string
//! - boolean: Boolean
//!
//! Domain tags on the wire follow the document-store type aliases
//! (`integer`, `long`, `double`, `string`, `boolean`).

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::errors::{SchemaError, SchemaResult};

/// Value domain a field's contents must inhabit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldDomain {
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Long,
    /// 64-bit floating point
    Double,
    /// UTF-8 string
    String,
    /// Boolean
    Boolean,
}

impl FieldDomain {
    /// Returns the domain name used in violation reports and validator specs.
    pub fn name(&self) -> &'static str {
        match self {
            FieldDomain::Integer => "integer",
            FieldDomain::Long => "long",
            FieldDomain::Double => "double",
            FieldDomain::String => "string",
            FieldDomain::Boolean => "boolean",
        }
    }
}

impl std::fmt::Display for FieldDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single field's contract: name, value domain, and whether it must be
/// present on every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as it appears in documents
    pub name: String,
    /// Value domain
    #[serde(rename = "type")]
    pub domain: FieldDomain,
    /// Whether the field must be present
    #[serde(default)]
    pub required: bool,
    /// Operator-facing description, carried into the engine validator spec
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldSpec {
    /// Create a required field.
    pub fn required(name: impl Into<String>, domain: FieldDomain) -> Self {
        Self {
            name: name.into(),
            domain,
            required: true,
            description: None,
        }
    }

    /// Create an optional field.
    pub fn optional(name: impl Into<String>, domain: FieldDomain) -> Self {
        Self {
            name: name.into(),
            domain,
            required: false,
            description: None,
        }
    }

    /// Attach an operator-facing description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Declarative description of a document type's structural contract.
///
/// Field declaration order is preserved. Immutable after construction;
/// the constructor enforces the descriptor invariants:
/// - at least one field is marked required
/// - field names are unique and non-empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldSpec>", into = "Vec<FieldSpec>")]
pub struct SchemaDescriptor {
    fields: Vec<FieldSpec>,
}

impl SchemaDescriptor {
    /// Build a descriptor, rejecting invalid static configuration.
    pub fn new(fields: Vec<FieldSpec>) -> SchemaResult<Self> {
        let mut seen = std::collections::HashSet::new();
        for field in &fields {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName);
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }
        if !fields.iter().any(|f| f.required) {
            return Err(SchemaError::NoRequiredFields);
        }
        Ok(Self { fields })
    }

    /// Look up a field's contract by name.
    pub fn describe(&self, field_name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == field_name)
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Names of all required fields, in declaration order.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter(|f| f.required).map(|f| f.name.as_str())
    }

    /// Whether `field_name` is declared and marked required.
    pub fn is_required(&self, field_name: &str) -> bool {
        self.describe(field_name).map_or(false, |f| f.required)
    }

    /// Project the descriptor into the JSON validator payload handed to the
    /// storage engine: a `required` name list plus a `properties` object with
    /// per-field `type` and `description` entries.
    pub fn validator_spec(&self) -> Value {
        let required: Vec<&str> = self.required_fields().collect();
        let mut properties = Map::new();
        for field in &self.fields {
            let mut prop = Map::new();
            prop.insert("type".into(), json!(field.domain.name()));
            if let Some(ref description) = field.description {
                prop.insert("description".into(), json!(description));
            }
            properties.insert(field.name.clone(), Value::Object(prop));
        }
        json!({
            "required": required,
            "properties": properties,
        })
    }
}

impl TryFrom<Vec<FieldSpec>> for SchemaDescriptor {
    type Error = SchemaError;

    fn try_from(fields: Vec<FieldSpec>) -> SchemaResult<Self> {
        Self::new(fields)
    }
}

impl From<SchemaDescriptor> for Vec<FieldSpec> {
    fn from(descriptor: SchemaDescriptor) -> Self {
        descriptor.fields
    }
}
