//! Step definitions of the acolhido wizard.

use super::{StepId, WizardStep};
use crate::validation::{Condition, FieldKind, FieldSpec, Rule, StepSchema, Transform};

/// Sentinel option that opens the dependent fields.
pub const OTHER: &str = "outro";

pub const OCUPATION: &[&str] = &["desempregado", "do_lar", "desconhecido", OTHER];
pub const OCUPATION_OPTIONS: &[(&str, &str)] = &[
    ("do_lar", "Do lar"),
    ("desempregado", "Desempregado"),
    ("desconhecido", "Desconhecido"),
    (OTHER, "Outro"),
];

pub const EMPLOYMENT_RELATIONSHIP: &[&str] = &["clt", "autonomo", OTHER];
pub const EMPLOYMENT_RELATIONSHIP_OPTIONS: &[(&str, &str)] =
    &[("clt", "CLT"), ("autonomo", "Autônoma"), (OTHER, "Outro")];

pub const MAX_PHONE_NUMBERS: usize = 5;
const MAX_PHONE_DIGITS: usize = 11;

const REQUIRED_SELECTION: &str = "Obrigatório selecionar uma opção";
const INVALID_SELECTION: &str = "Selecione uma opção válida";
const MAX_255: &str = "Quantidade máxima permitida de carácteres: 255";
const MAX_50: &str = "Quantidade máxima permitida de carácteres: 50";
const MIN_2: &str = "Quantidade mínima necessária de caracteres: 2";

/// Mother and father steps share this schema.
pub fn parents_schema() -> StepSchema {
    StepSchema::new(
        "pais",
        vec![
            FieldSpec::text("name", "Nome")
                .with_transform(Transform::Uppercase)
                .with_transform(Transform::Trim)
                .required("Obrigatório inserir o nome")
                .with_rule(Rule::MinLength(3, "Nome precisa ter no mínimo 3 caracteres"))
                .with_rule(Rule::MaxLength(255, MAX_255))
                .with_type_error("Insira o nome"),
            FieldSpec::new(
                "phones",
                "Telefone",
                FieldKind::PhoneList {
                    min: 1,
                    max: MAX_PHONE_NUMBERS,
                },
            )
            .with_transform(Transform::UnmaskPhone)
            .required("Obrigatório preencher todos telefones adicionados")
            .with_rule(Rule::PhoneDigits {
                incomplete: "Insira todos os dígitos do telefone",
                overflow: "Verifique se inseriu corretamente o telefone",
            })
            .with_rule(Rule::MaxLength(
                MAX_PHONE_DIGITS,
                "Quantidade máxima permitida de carácteres: 11",
            ))
            .with_type_error("Verifique se inseriu corretamente o telefone"),
            FieldSpec::new("ocupation", "Ocupação", FieldKind::Choice(OCUPATION_OPTIONS))
                .with_transform(Transform::Trim)
                .required(REQUIRED_SELECTION)
                .with_rule(Rule::MinLength(2, MIN_2))
                .with_rule(Rule::MaxLength(50, MAX_50))
                .with_rule(Rule::OneOf(OCUPATION, INVALID_SELECTION))
                .with_type_error("Verifique se selecionou uma opção correta"),
            FieldSpec::text("placeOfWork", "Local de trabalho")
                .with_transform(Transform::Trim)
                .with_rule(Rule::MinLength(2, MIN_2))
                .with_rule(Rule::MaxLength(255, MAX_255))
                .with_type_error("Verifique se inseriu corretamente o local de trabalho")
                .visible_when("ocupation", OTHER),
            FieldSpec::new("salary", "Salário", FieldKind::Number)
                .with_transform(Transform::UnmaskMoney)
                .with_rule(Rule::MinValue(
                    0.0,
                    "Não é possível inserir um valor negativo para salário",
                ))
                .with_type_error("Verifique se inseriu corretamente o salário")
                .visible_when("ocupation", OTHER),
            FieldSpec::new(
                "employmentRelationship",
                "Vínculo empregatício",
                FieldKind::Choice(EMPLOYMENT_RELATIONSHIP_OPTIONS),
            )
            .with_transform(Transform::Trim)
            .required_when(Condition {
                field: "ocupation",
                equals: OTHER,
                required: REQUIRED_SELECTION,
                rules: vec![Rule::OneOf(EMPLOYMENT_RELATIONSHIP, INVALID_SELECTION)],
            })
            .visible_when("ocupation", OTHER),
            FieldSpec::text("employmentRelationshipDesc", "Qual?")
                .with_transform(Transform::Trim)
                .required_when(Condition {
                    field: "employmentRelationship",
                    equals: OTHER,
                    required: "Obrigatório descrever o vínculo empregatício",
                    rules: vec![Rule::MaxLength(50, MAX_50)],
                })
                .visible_when("employmentRelationship", OTHER),
        ],
    )
}

pub fn closing_schema() -> StepSchema {
    StepSchema::new(
        "finalizar",
        vec![FieldSpec::text("comments", "Observações adicionais")
            .with_rule(Rule::MaxLength(
                1000,
                "Quantidade máxima permitida de carácteres: 1000",
            ))
            .with_type_error("Verifique se inseriu corretamente as informações")],
    )
}

pub fn mother_step() -> WizardStep {
    WizardStep {
        id: StepId::Mae,
        title: "Dados da mãe",
        schema: parents_schema(),
    }
}

pub fn father_step() -> WizardStep {
    WizardStep {
        id: StepId::Pai,
        title: "Dados do pai",
        schema: parents_schema(),
    }
}

pub fn closing_step() -> WizardStep {
    WizardStep {
        id: StepId::Finalizar,
        title: "Observações adicionais",
        schema: closing_schema(),
    }
}

/// Registered steps of the acolhido wizard, in order.
pub fn acolhido_steps() -> Vec<WizardStep> {
    vec![mother_step(), father_step(), closing_step()]
}
