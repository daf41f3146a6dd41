use std::collections::BTreeMap;

use serde_json::Value;

use super::{FieldErrors, FieldSpec, RawValues, StepData, ValidationError};

/// Ordered field specifications for one form step.
#[derive(Debug, Clone)]
pub struct StepSchema {
    pub name: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl StepSchema {
    pub fn new(name: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self { name, fields }
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.key)
    }

    /// Validates the whole step (submit). Every field is checked; all errors
    /// are returned together.
    pub fn validate(&self, raw: &RawValues) -> Result<StepData, FieldErrors> {
        let prepared = self.prepare_all(raw);
        let siblings = sibling_lookup(&prepared);
        let mut data = StepData::new();
        let mut errors = FieldErrors::new();

        for field in &self.fields {
            match &prepared[field.key] {
                Err(type_error) => errors.push(ValidationError::new(field.key, type_error.clone())),
                Ok(value) => match field.check(value, &siblings) {
                    Ok(()) => {
                        data.insert(field.key.to_string(), field.wire_value(value.clone()));
                    }
                    Err(field_errors) => errors.extend(field_errors),
                },
            }
        }

        if errors.is_empty() {
            Ok(data)
        } else {
            tracing::debug!(step = self.name, errors = errors.len(), "step validation failed");
            Err(errors)
        }
    }

    /// Validates a single field in the context of its siblings (blur).
    pub fn validate_field(&self, key: &str, raw: &RawValues) -> Result<Value, FieldErrors> {
        let Some(field) = self.field(key) else {
            let mut errors = FieldErrors::new();
            errors.push(ValidationError::new(key, "Campo desconhecido"));
            return Err(errors);
        };
        let prepared = self.prepare_all(raw);
        let siblings = sibling_lookup(&prepared);
        match &prepared[field.key] {
            Err(type_error) => {
                let mut errors = FieldErrors::new();
                errors.push(ValidationError::new(field.key, type_error.clone()));
                Err(errors)
            }
            Ok(value) => field
                .check(value, &siblings)
                .map(|()| field.wire_value(value.clone())),
        }
    }

    /// Fields currently shown for the given working copy.
    pub fn visible_fields(&self, raw: &RawValues) -> Vec<&FieldSpec> {
        let prepared = self.prepare_all(raw);
        let siblings = sibling_lookup(&prepared);
        self.fields
            .iter()
            .filter(|field| match field.visible_when {
                Some((other, equals)) => siblings(other).as_str() == Some(equals),
                None => true,
            })
            .collect()
    }

    /// Renders stored step data back into display inputs.
    pub fn display_values(&self, data: &StepData) -> RawValues {
        self.fields
            .iter()
            .filter_map(|field| {
                data.get(field.key)
                    .map(|value| (field.key.to_string(), field.display_input(value)))
            })
            .collect()
    }

    fn prepare_all(&self, raw: &RawValues) -> BTreeMap<&'static str, Result<Value, String>> {
        self.fields
            .iter()
            .map(|field| (field.key, field.prepare(raw.get(field.key))))
            .collect()
    }
}

fn sibling_lookup<'a>(
    prepared: &'a BTreeMap<&'static str, Result<Value, String>>,
) -> impl Fn(&str) -> Value + 'a {
    move |key: &str| {
        prepared
            .get(key)
            .and_then(|result| result.as_ref().ok())
            .cloned()
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{option_label, Condition, FieldKind, RawInput, Rule, Transform};

    const KINDS: &[&str] = &["a", "outro"];
    const KIND_OPTIONS: &[(&str, &str)] = &[("a", "A"), ("outro", "Outro")];

    fn schema() -> StepSchema {
        StepSchema::new(
            "sample",
            vec![
                FieldSpec::text("name", "Nome")
                    .with_transform(Transform::Uppercase)
                    .with_transform(Transform::Trim)
                    .required("Nome obrigatório")
                    .with_rule(Rule::MinLength(3, "Nome curto")),
                FieldSpec::new("kind", "Tipo", FieldKind::Choice(KIND_OPTIONS))
                    .required("Tipo obrigatório")
                    .with_rule(Rule::OneOf(KINDS, "Tipo inválido")),
                FieldSpec::text("desc", "Qual?")
                    .with_transform(Transform::Trim)
                    .visible_when("kind", "outro")
                    .required_when(Condition {
                        field: "kind",
                        equals: "outro",
                        required: "Descreva",
                        rules: vec![Rule::MaxLength(5, "Longo demais")],
                    }),
                FieldSpec::new("amount", "Valor", FieldKind::Number)
                    .with_transform(Transform::UnmaskMoney)
                    .with_rule(Rule::MinValue(0.0, "Negativo"))
                    .with_type_error("Valor inválido"),
            ],
        )
    }

    fn raw(pairs: &[(&str, &str)]) -> RawValues {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), RawInput::text(*value)))
            .collect()
    }

    #[test]
    fn collects_errors_from_every_field() {
        let errors = schema()
            .validate(&raw(&[("name", "ab"), ("kind", "x"), ("amount", "abc")]))
            .unwrap_err();
        assert_eq!(errors.message_for("name"), Some("Nome curto"));
        assert_eq!(errors.message_for("kind"), Some("Tipo inválido"));
        assert_eq!(errors.message_for("amount"), Some("Valor inválido"));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn applies_transform_pipeline_before_rules() {
        let data = schema()
            .validate(&raw(&[("name", "  joão  "), ("kind", "a"), ("amount", "R$ 10,5")]))
            .unwrap();
        assert_eq!(data["name"], Value::from("JOÃO"));
        assert_eq!(data["amount"], Value::from(10.5));
        assert_eq!(data["desc"], Value::Null);
    }

    #[test]
    fn conditional_requirement_follows_sibling() {
        let schema = schema();
        let errors = schema
            .validate(&raw(&[("name", "Ana"), ("kind", "outro")]))
            .unwrap_err();
        assert_eq!(errors.message_for("desc"), Some("Descreva"));

        let errors = schema
            .validate(&raw(&[("name", "Ana"), ("kind", "outro"), ("desc", "longo demais")]))
            .unwrap_err();
        assert_eq!(errors.message_for("desc"), Some("Longo demais"));

        assert!(schema
            .validate(&raw(&[("name", "Ana"), ("kind", "a"), ("desc", "")]))
            .is_ok());
    }

    #[test]
    fn single_field_validation_uses_siblings() {
        let schema = schema();
        let values = raw(&[("kind", "outro"), ("desc", "")]);
        let errors = schema.validate_field("desc", &values).unwrap_err();
        assert_eq!(errors.message_for("desc"), Some("Descreva"));
        assert!(schema.validate_field("missing", &values).is_err());
    }

    #[test]
    fn visibility_tracks_sibling_value() {
        let schema = schema();
        let hidden: Vec<&str> = schema
            .visible_fields(&raw(&[("kind", "a")]))
            .iter()
            .map(|field| field.key)
            .collect();
        assert!(!hidden.contains(&"desc"));
        let shown: Vec<&str> = schema
            .visible_fields(&raw(&[("kind", "outro")]))
            .iter()
            .map(|field| field.key)
            .collect();
        assert!(shown.contains(&"desc"));
    }

    #[test]
    fn display_values_remask_money() {
        let mut data = StepData::new();
        data.insert("amount".into(), Value::from(10.5));
        data.insert("name".into(), Value::from("ANA"));
        let display = schema().display_values(&data);
        assert_eq!(display["amount"], RawInput::text("R$ 10,5"));
        assert_eq!(display["name"], RawInput::text("ANA"));
    }

    #[test]
    fn choice_labels_fall_back_to_value() {
        assert_eq!(option_label(KIND_OPTIONS, "outro"), "Outro");
        assert_eq!(option_label(KIND_OPTIONS, "zzz"), "zzz");
    }

    #[test]
    fn list_entries_travel_as_value_objects() {
        let schema = StepSchema::new(
            "contato",
            vec![FieldSpec::new("phones", "Telefone", FieldKind::PhoneList { min: 1, max: 2 })
                .with_transform(Transform::UnmaskPhone)
                .required("Telefone obrigatório")],
        );
        let mut values = RawValues::new();
        values.insert("phones".into(), RawInput::List(vec!["(11) 3333-4444".into()]));
        let data = schema.validate(&values).unwrap();
        assert_eq!(data["phones"], serde_json::json!([{ "value": "1133334444" }]));

        let display = schema.display_values(&data);
        assert_eq!(display["phones"], RawInput::List(vec!["(11) 3333-4444".into()]));
    }
}
