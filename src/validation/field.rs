use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{FieldErrors, RawInput, ValidationError};
use crate::transform;

/// Shape of a field's value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    /// Closed set of `(value, label)` options.
    Choice(&'static [(&'static str, &'static str)]),
    /// Repeated phone inputs; at least `min` and at most `max` entries.
    PhoneList { min: usize, max: usize },
}

/// Display label of a choice value, falling back to the value itself.
pub fn option_label<'a>(options: &'a [(&'a str, &'a str)], value: &'a str) -> &'a str {
    options
        .iter()
        .find(|(candidate, _)| *candidate == value)
        .map(|(_, label)| *label)
        .unwrap_or(value)
}

/// Input transforms, applied in declaration order before coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Trim,
    Uppercase,
    UnmaskPhone,
    UnmaskMoney,
}

impl Transform {
    fn apply(self, value: &str) -> String {
        match self {
            Transform::Trim => transform::trim(value),
            Transform::Uppercase => transform::to_upper(value),
            Transform::UnmaskPhone => transform::unmask_phone(value),
            Transform::UnmaskMoney => transform::unmask_money(value),
        }
    }
}

/// Key holding the value of each entry of a list field on the wire.
pub const LIST_ITEM_KEY: &str = "value";

/// Unwraps a `{"value": ...}` list entry; bare values pass through.
fn list_item(item: &Value) -> &Value {
    match item {
        Value::Object(entry) => entry.get(LIST_ITEM_KEY).unwrap_or(&Value::Null),
        other => other,
    }
}

type CustomCheck = dyn Fn(&Value) -> Result<(), String> + Send + Sync;

/// Constraint checked once a field holds a non-null value.
#[derive(Clone)]
pub enum Rule {
    MinLength(usize, &'static str),
    MaxLength(usize, &'static str),
    MinValue(f64, &'static str),
    OneOf(&'static [&'static str], &'static str),
    NoSpaces(&'static str),
    NoUppercase(&'static str),
    /// Digit count must match the phone mask selected by the digits.
    PhoneDigits {
        incomplete: &'static str,
        overflow: &'static str,
    },
    /// Must equal the (transformed) value of another field, null included.
    EqualsField(&'static str, &'static str),
    Custom(Arc<CustomCheck>),
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::MinLength(n, _) => write!(f, "MinLength({n})"),
            Rule::MaxLength(n, _) => write!(f, "MaxLength({n})"),
            Rule::MinValue(n, _) => write!(f, "MinValue({n})"),
            Rule::OneOf(options, _) => write!(f, "OneOf({options:?})"),
            Rule::NoSpaces(_) => f.write_str("NoSpaces"),
            Rule::NoUppercase(_) => f.write_str("NoUppercase"),
            Rule::PhoneDigits { .. } => f.write_str("PhoneDigits"),
            Rule::EqualsField(other, _) => write!(f, "EqualsField({other})"),
            Rule::Custom(_) => f.write_str("Custom"),
        }
    }
}

impl Rule {
    /// Cross-field rules still run when the field itself is empty.
    fn checks_null(&self) -> bool {
        matches!(self, Rule::EqualsField(..))
    }

    fn check(&self, value: &Value, siblings: &dyn Fn(&str) -> Value) -> Result<(), String> {
        match self {
            Rule::MinLength(min, message) => match value.as_str() {
                Some(text) if text.chars().count() < *min => Err((*message).into()),
                _ => Ok(()),
            },
            Rule::MaxLength(max, message) => match value.as_str() {
                Some(text) if text.chars().count() > *max => Err((*message).into()),
                _ => Ok(()),
            },
            Rule::MinValue(min, message) => match value.as_f64() {
                Some(number) if number < *min => Err((*message).into()),
                _ => Ok(()),
            },
            Rule::OneOf(options, message) => match value.as_str() {
                Some(text) if options.iter().any(|option| *option == text) => Ok(()),
                _ => Err((*message).into()),
            },
            Rule::NoSpaces(message) => match value.as_str() {
                Some(text) if text.contains(' ') => Err((*message).into()),
                _ => Ok(()),
            },
            Rule::NoUppercase(message) => match value.as_str() {
                Some(text) if transform::contains_uppercase(text) => Err((*message).into()),
                _ => Ok(()),
            },
            Rule::PhoneDigits {
                incomplete,
                overflow,
            } => {
                let digits = value.as_str().unwrap_or_default();
                let expected = transform::phone_mask_for(digits).digit_count();
                if digits.len() < expected {
                    Err((*incomplete).into())
                } else if digits.len() > expected {
                    Err((*overflow).into())
                } else {
                    Ok(())
                }
            }
            Rule::EqualsField(other, message) => {
                if &siblings(*other) == value {
                    Ok(())
                } else {
                    Err((*message).into())
                }
            }
            Rule::Custom(check) => check(value),
        }
    }
}

/// Requirement that only applies while a sibling holds a given value, e.g.
/// a description that is required when the relationship is `outro`.
#[derive(Debug, Clone)]
pub struct Condition {
    pub field: &'static str,
    pub equals: &'static str,
    pub required: &'static str,
    pub rules: Vec<Rule>,
}

impl Condition {
    fn holds(&self, siblings: &dyn Fn(&str) -> Value) -> bool {
        siblings(self.field).as_str() == Some(self.equals)
    }
}

#[derive(Debug, Clone)]
pub enum Requirement {
    Optional,
    Required(&'static str),
    When(Condition),
}

/// Declarative description of one form field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub transforms: Vec<Transform>,
    pub requirement: Requirement,
    pub rules: Vec<Rule>,
    pub type_error: &'static str,
    /// Field is shown only while `(sibling, value)` holds.
    pub visible_when: Option<(&'static str, &'static str)>,
}

impl FieldSpec {
    pub fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            transforms: Vec::new(),
            requirement: Requirement::Optional,
            rules: Vec::new(),
            type_error: "Valor inválido",
            visible_when: None,
        }
    }

    pub fn text(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Text)
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn required(mut self, message: &'static str) -> Self {
        self.requirement = Requirement::Required(message);
        self
    }

    pub fn required_when(mut self, condition: Condition) -> Self {
        self.requirement = Requirement::When(condition);
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_type_error(mut self, message: &'static str) -> Self {
        self.type_error = message;
        self
    }

    pub fn visible_when(mut self, field: &'static str, equals: &'static str) -> Self {
        self.visible_when = Some((field, equals));
        self
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, FieldKind::PhoneList { .. })
    }

    /// Runs transforms and coercion. Empty input becomes `null`; a value that
    /// cannot be coerced reports the field's type error.
    pub(crate) fn prepare(&self, raw: Option<&RawInput>) -> Result<Value, String> {
        if self.is_list() {
            let items = raw.map(RawInput::as_list).unwrap_or_default();
            return Ok(Value::Array(
                items.iter().map(|item| self.prepare_scalar(item)).collect(),
            ));
        }
        let text = raw.map(RawInput::as_text).unwrap_or_default();
        let prepared = self.prepare_scalar(text);
        match (&self.kind, prepared) {
            (FieldKind::Number, Value::String(text)) => transform::parse_money(&text)
                .map(Value::from)
                .ok_or_else(|| self.type_error.to_string()),
            (_, other) => Ok(other),
        }
    }

    fn prepare_scalar(&self, raw: &str) -> Value {
        let transformed = self
            .transforms
            .iter()
            .fold(raw.to_string(), |acc, transform| transform.apply(&acc));
        if transformed.is_empty() {
            Value::Null
        } else {
            Value::String(transformed)
        }
    }

    /// Validates an already prepared value against requirement and rules.
    pub(crate) fn check(
        &self,
        prepared: &Value,
        siblings: &dyn Fn(&str) -> Value,
    ) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        match (&self.kind, prepared) {
            (FieldKind::PhoneList { min, max }, Value::Array(items)) => {
                if items.len() < *min {
                    errors.push(ValidationError::new(
                        self.key,
                        format!("Adicione pelo menos {min} telefone(s)"),
                    ));
                } else if items.len() > *max {
                    errors.push(ValidationError::new(
                        self.key,
                        format!("Quantidade máxima de telefones: {max}"),
                    ));
                }
                for (index, item) in items.iter().enumerate() {
                    if let Err(message) = self.check_scalar(item, siblings) {
                        errors.push(ValidationError::new(
                            format!("{}.{}", self.key, index),
                            message,
                        ));
                    }
                }
            }
            (_, value) => {
                if let Err(message) = self.check_scalar(value, siblings) {
                    errors.push(ValidationError::new(self.key, message));
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn check_scalar(&self, value: &Value, siblings: &dyn Fn(&str) -> Value) -> Result<(), String> {
        let none: &[Rule] = &[];
        let (required, conditional_rules) = match &self.requirement {
            Requirement::Optional => (None, none),
            Requirement::Required(message) => (Some(*message), none),
            Requirement::When(condition) if condition.holds(siblings) => {
                (Some(condition.required), condition.rules.as_slice())
            }
            Requirement::When(_) => (None, none),
        };

        let rules = self.rules.iter().chain(conditional_rules.iter());

        if value.is_null() {
            if let Some(message) = required {
                return Err(message.to_string());
            }
            for rule in rules.filter(|rule| rule.checks_null()) {
                rule.check(value, siblings)?;
            }
            return Ok(());
        }

        for rule in rules {
            rule.check(value, siblings)?;
        }
        Ok(())
    }

    /// Shape sent to the API. List entries travel as `{"value": ...}`
    /// objects; scalars go as they are.
    pub fn wire_value(&self, prepared: Value) -> Value {
        match prepared {
            Value::Array(items) if self.is_list() => Value::Array(
                items
                    .into_iter()
                    .map(|item| {
                        let mut entry = Map::new();
                        entry.insert(LIST_ITEM_KEY.to_string(), item);
                        Value::Object(entry)
                    })
                    .collect(),
            ),
            other => other,
        }
    }

    /// Renders a stored value back into the form's display representation.
    pub fn display_input(&self, value: &Value) -> RawInput {
        if self.is_list() {
            let items = match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| self.display_scalar(list_item(item)))
                    .collect(),
                Value::Null => Vec::new(),
                other => vec![self.display_scalar(list_item(other))],
            };
            return RawInput::List(items);
        }
        RawInput::Text(self.display_scalar(value))
    }

    fn display_scalar(&self, value: &Value) -> String {
        let plain = match value {
            Value::Null => String::new(),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        if self.transforms.contains(&Transform::UnmaskMoney) {
            transform::mask_money(&plain)
        } else if self.transforms.contains(&Transform::UnmaskPhone) {
            transform::mask_phone(&plain)
        } else {
            plain
        }
    }
}
