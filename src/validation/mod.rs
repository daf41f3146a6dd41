//! Declarative per-step validation.
//!
//! A [`StepSchema`] lists the fields of one form step. Each [`FieldSpec`]
//! runs its input through a fixed pipeline (transforms, type coercion,
//! empty-to-null, requirement, rules) and produces either a JSON value or a
//! field-level [`ValidationError`]. Schema validation collects the errors of
//! every field before reporting.

mod field;
mod schema;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use field::{
    option_label, Condition, FieldKind, FieldSpec, Requirement, Rule, Transform, LIST_ITEM_KEY,
};
pub use schema::StepSchema;

/// Unvalidated input exactly as typed (masks included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawInput {
    Text(String),
    List(Vec<String>),
}

impl RawInput {
    pub fn text(value: impl Into<String>) -> Self {
        RawInput::Text(value.into())
    }

    /// Text content; lists yield an empty string.
    pub fn as_text(&self) -> &str {
        match self {
            RawInput::Text(value) => value,
            RawInput::List(_) => "",
        }
    }

    /// List content; a single text value is treated as a one-element list.
    pub fn as_list(&self) -> Vec<String> {
        match self {
            RawInput::Text(value) => vec![value.clone()],
            RawInput::List(values) => values.clone(),
        }
    }
}

impl From<&str> for RawInput {
    fn from(value: &str) -> Self {
        RawInput::Text(value.to_string())
    }
}

impl From<String> for RawInput {
    fn from(value: String) -> Self {
        RawInput::Text(value)
    }
}

impl From<Vec<String>> for RawInput {
    fn from(values: Vec<String>) -> Self {
        RawInput::List(values)
    }
}

/// Working copy of a step: field key to raw input.
pub type RawValues = BTreeMap<String, RawInput>;

/// Validated values of a step, ready to be merged into the result object.
pub type StepData = Map<String, Value>;

/// Field-level validation failure. `field` is the field key, or
/// `key.index` for an element of a list field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field error found while validating a step, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<ValidationError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Message reported for `field` (exact key, e.g. `phones.1`).
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.message_for(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    fn extend(&mut self, other: FieldErrors) {
        self.errors.extend(other.errors);
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", lines.join("; "))
    }
}

impl std::error::Error for FieldErrors {}
