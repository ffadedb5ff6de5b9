//! Validation outcomes and violation reports.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::FieldDomain;

/// Policy for what happens when a document fails its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Any violation rejects the write
    Enforce,
    /// Violations are surfaced as warnings; the write is persisted
    Warn,
    /// No check is performed
    Off,
}

impl ValidationMode {
    /// Returns the mode name as declared in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationMode::Enforce => "enforce",
            ValidationMode::Warn => "warn",
            ValidationMode::Off => "off",
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Runtime kind observed for a JSON value.
///
/// Integral numbers within i32 range observe as `Integer`; integral numbers
/// outside that range observe as `Long`; fractional numbers as `Double`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Integral number in i32 range
    Integer,
    /// Integral number outside i32 range
    Long,
    /// Fractional number
    Double,
    /// UTF-8 string
    String,
    /// Boolean
    Boolean,
    /// JSON null
    Null,
    /// JSON array
    Array,
    /// JSON object
    Object,
    /// Field absent from the document
    Missing,
}

impl ValueKind {
    /// Classify a JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    if i >= i64::from(i32::MIN) && i <= i64::from(i32::MAX) {
                        ValueKind::Integer
                    } else {
                        ValueKind::Long
                    }
                } else if n.is_u64() {
                    ValueKind::Long
                } else {
                    ValueKind::Double
                }
            }
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Returns the kind name for violation reports.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Integer => "integer",
            ValueKind::Long => "long",
            ValueKind::Double => "double",
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Null => "null",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
            ValueKind::Missing => "missing",
        }
    }

    /// Whether this observed kind satisfies the declared domain.
    ///
    /// No implicit coercion between integer, long, and double, with one
    /// representational exception: `long` accepts any integral value, since
    /// an i32-range integral on the wire is indistinguishable from a long
    /// holding the same value.
    pub fn satisfies(&self, domain: FieldDomain) -> bool {
        match domain {
            FieldDomain::Integer => *self == ValueKind::Integer,
            FieldDomain::Long => matches!(self, ValueKind::Integer | ValueKind::Long),
            FieldDomain::Double => *self == ValueKind::Double,
            FieldDomain::String => *self == ValueKind::String,
            FieldDomain::Boolean => *self == ValueKind::Boolean,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A required field is absent.
    MissingField {
        /// Offending field name
        field: String,
        /// Declared domain
        expected: FieldDomain,
    },
    /// A present field holds a value of the wrong kind.
    KindMismatch {
        /// Offending field name
        field: String,
        /// Declared domain
        expected: FieldDomain,
        /// Observed kind
        actual: ValueKind,
    },
    /// The candidate document is not an object at all.
    NotADocument {
        /// Observed kind of the candidate
        actual: ValueKind,
    },
}

impl Violation {
    /// The offending field name (`$document` for non-object candidates).
    pub fn field(&self) -> &str {
        match self {
            Violation::MissingField { field, .. } => field,
            Violation::KindMismatch { field, .. } => field,
            Violation::NotADocument { .. } => "$document",
        }
    }

    /// The observed kind.
    pub fn actual(&self) -> ValueKind {
        match self {
            Violation::MissingField { .. } => ValueKind::Missing,
            Violation::KindMismatch { actual, .. } => *actual,
            Violation::NotADocument { actual } => *actual,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingField { field, expected } => {
                write!(f, "field '{}': expected {}, got missing", field, expected)
            }
            Violation::KindMismatch {
                field,
                expected,
                actual,
            } => write!(f, "field '{}': expected {}, got {}", field, expected, actual),
            Violation::NotADocument { actual } => {
                write!(f, "candidate is not a document: got {}", actual)
            }
        }
    }
}

/// Result of validating one document against one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Document satisfies the contract
    Accepted,
    /// Document violates the contract; the write persists, violations are
    /// surfaced (warn mode)
    AcceptedWithWarnings(Vec<Violation>),
    /// Document violates the contract; the write must not be persisted
    /// (enforce mode)
    Rejected(Vec<Violation>),
}

impl ValidationOutcome {
    /// Whether the write may be persisted.
    pub fn is_accepted(&self) -> bool {
        !matches!(self, ValidationOutcome::Rejected(_))
    }

    /// Whether the write must be blocked.
    pub fn is_rejected(&self) -> bool {
        matches!(self, ValidationOutcome::Rejected(_))
    }

    /// All violations carried by this outcome.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationOutcome::Accepted => &[],
            ValidationOutcome::AcceptedWithWarnings(v) => v,
            ValidationOutcome::Rejected(v) => v,
        }
    }
}
