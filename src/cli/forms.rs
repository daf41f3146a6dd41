//! Terminal rendering of declarative field schemas.
//!
//! Fields are asked in schema order and only while visible, so a choice made
//! earlier in the step decides which follow-up questions appear. Blur errors
//! are shown as warnings and do not block; the step submission decides.

use crate::cli::output;
use crate::cli::prompter::Prompter;
use crate::errors::AppError;
use crate::transform::{apply_money_keystroke, mask_phone};
use crate::validation::{
    option_label, FieldErrors, FieldKind, FieldSpec, RawInput, RawValues, StepSchema, Transform,
};

/// Asks every visible field of `schema`, updating `raw` in place. Inputs of
/// fields hidden by the final answers are dropped.
pub fn fill_step<P: Prompter + ?Sized>(
    prompter: &mut P,
    schema: &StepSchema,
    raw: &mut RawValues,
) -> Result<(), AppError> {
    for field in &schema.fields {
        if !is_visible(schema, field, raw) {
            continue;
        }
        let answer = ask_field(prompter, field, raw.get(field.key))?;
        raw.insert(field.key.to_string(), answer);
        if let Err(errors) = schema.validate_field(field.key, raw) {
            warn_field_errors(schema, &errors);
        }
    }
    let visible: Vec<&str> = schema.visible_fields(raw).iter().map(|field| field.key).collect();
    raw.retain(|key, _| visible.contains(&key.as_str()));
    Ok(())
}

/// Prints the visible fields of a read-only step.
pub fn show_step(schema: &StepSchema, raw: &RawValues) {
    for field in schema.visible_fields(raw) {
        let value = match raw.get(field.key) {
            Some(RawInput::List(items)) => items.join(", "),
            Some(RawInput::Text(text)) => display_choice(field, text),
            None => String::new(),
        };
        output::info(format!("{}: {}", field.label, value));
    }
}

/// Reports submission errors, one line per field.
pub fn report_field_errors(schema: &StepSchema, errors: &FieldErrors) {
    for error in errors.iter() {
        output::error(format!("{}: {}", field_label(schema, &error.field), error.message));
    }
}

fn warn_field_errors(schema: &StepSchema, errors: &FieldErrors) {
    for error in errors.iter() {
        output::warning(format!("{}: {}", field_label(schema, &error.field), error.message));
    }
}

/// Label for an error key; list entries (`phones.1`) are numbered from one.
fn field_label(schema: &StepSchema, key: &str) -> String {
    let (base, index) = match key.split_once('.') {
        Some((base, index)) => (base, index.parse::<usize>().ok()),
        None => (key, None),
    };
    let label = schema.field(base).map(|field| field.label).unwrap_or(base);
    match index {
        Some(index) => format!("{label} {}", index + 1),
        None => label.to_string(),
    }
}

fn is_visible(schema: &StepSchema, field: &FieldSpec, raw: &RawValues) -> bool {
    schema
        .visible_fields(raw)
        .iter()
        .any(|visible| visible.key == field.key)
}

fn display_choice(field: &FieldSpec, value: &str) -> String {
    match &field.kind {
        FieldKind::Choice(options) => option_label(options, value).to_string(),
        _ => value.to_string(),
    }
}

fn ask_field<P: Prompter + ?Sized>(
    prompter: &mut P,
    field: &FieldSpec,
    current: Option<&RawInput>,
) -> Result<RawInput, AppError> {
    match &field.kind {
        FieldKind::Choice(options) => {
            let labels: Vec<&str> = options.iter().map(|(_, label)| *label).collect();
            let current = current.map(RawInput::as_text).unwrap_or_default();
            let default = options
                .iter()
                .position(|(value, _)| *value == current)
                .unwrap_or(0);
            let picked = prompter.select(field.label, &labels, default)?;
            Ok(RawInput::text(options[picked].0))
        }
        FieldKind::PhoneList { min, max } => ask_phones(prompter, field, current, *min, *max),
        FieldKind::Number | FieldKind::Text => {
            let initial = current.map(RawInput::as_text).unwrap_or_default();
            let typed = prompter.text(field.label, initial)?;
            if field.transforms.contains(&Transform::UnmaskMoney) {
                Ok(RawInput::text(apply_money_keystroke(&typed)))
            } else {
                Ok(RawInput::text(typed))
            }
        }
    }
}

fn ask_phones<P: Prompter + ?Sized>(
    prompter: &mut P,
    field: &FieldSpec,
    current: Option<&RawInput>,
    min: usize,
    max: usize,
) -> Result<RawInput, AppError> {
    let existing = current.map(RawInput::as_list).unwrap_or_default();
    let mut phones = Vec::new();
    while phones.len() < max {
        let position = phones.len();
        let initial = existing.get(position).map(String::as_str).unwrap_or_default();
        let typed = prompter.text(&format!("{} {}", field.label, position + 1), initial)?;
        phones.push(mask_phone(&typed));
        if phones.len() >= min.max(1)
            && phones.len() < max
            && !prompter.confirm("Adicionar outro telefone?", existing.len() > phones.len())?
        {
            break;
        }
    }
    Ok(RawInput::List(phones))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::prompter::ScriptPrompter;
    use crate::wizard::steps::parents_schema;

    #[test]
    fn follow_up_questions_depend_on_earlier_answers() {
        let schema = parents_schema();
        let mut raw = RawValues::new();
        // name, phone 1, add another? no, ocupation = Do lar
        let mut prompter = ScriptPrompter::new("maria\n11987654321\nn\n1\n".as_bytes());
        fill_step(&mut prompter, &schema, &mut raw).unwrap();
        assert_eq!(raw["name"], RawInput::text("maria"));
        assert_eq!(
            raw["phones"],
            RawInput::List(vec!["(11) 9 8765-4321".into()])
        );
        assert_eq!(raw["ocupation"], RawInput::text("do_lar"));
        assert!(!raw.contains_key("salary"));
    }

    #[test]
    fn money_input_is_filtered_as_typed() {
        let schema = parents_schema();
        let mut raw = RawValues::new();
        // ocupation Outro opens place of work, salary and relationship (CLT)
        let script = "ana\n1133334444\nn\n4\nMercado\n12a,345\n1\n";
        let mut prompter = ScriptPrompter::new(script.as_bytes());
        fill_step(&mut prompter, &schema, &mut raw).unwrap();
        assert_eq!(raw["salary"], RawInput::text("R$ 12,34"));
        assert_eq!(raw["employmentRelationship"], RawInput::text("clt"));
        assert!(!raw.contains_key("employmentRelationshipDesc"));
    }

    #[test]
    fn list_error_labels_are_numbered() {
        let schema = parents_schema();
        assert_eq!(field_label(&schema, "phones.1"), "Telefone 2");
        assert_eq!(field_label(&schema, "name"), "Nome");
        assert_eq!(field_label(&schema, "other"), "other");
    }
}
