mod common;

use apajac_admin::api::{ApiGateway, InMemoryGateway};
use apajac_admin::session::Route;
use apajac_admin::submission::SubmissionError;
use apajac_admin::validation::RawInput;
use apajac_admin::wizard::steps::acolhido_steps;
use apajac_admin::wizard::{
    MultistepController, PersonRecord, StepError, StepId, StepOutcome, WizardSession,
};
use common::{parent, raw};

fn new_session() -> WizardSession {
    apajac_admin::init();
    WizardSession::new(MultistepController::new(acolhido_steps()).expect("valid steps"))
}

fn working_mother() -> apajac_admin::validation::RawValues {
    let mut mother = parent("Maria", "outro", "(11) 9 8765-4321");
    mother.insert("placeOfWork".into(), RawInput::text("Mercado"));
    mother.insert("salary".into(), RawInput::text("R$ 1500,50"));
    mother.insert("employmentRelationship".into(), RawInput::text("outro"));
    mother.insert("employmentRelationshipDesc".into(), RawInput::text("Diarista"));
    mother
}

#[test]
fn other_ocupation_requires_relationship_and_description() {
    let mut wizard = new_session();

    let Err(StepError::Invalid(errors)) = wizard.submit(&parent("Maria", "outro", "(11) 3333-4444"))
    else {
        panic!("relationship should be required");
    };
    assert_eq!(
        errors.message_for("employmentRelationship"),
        Some("Obrigatório selecionar uma opção")
    );

    let mut mother = parent("Maria", "outro", "(11) 3333-4444");
    mother.insert("employmentRelationship".into(), RawInput::text("outro"));
    let Err(StepError::Invalid(errors)) = wizard.submit(&mother) else {
        panic!("description should be required");
    };
    assert_eq!(
        errors.message_for("employmentRelationshipDesc"),
        Some("Obrigatório descrever o vínculo empregatício")
    );
    assert_eq!(wizard.current_step().id, StepId::Mae);
}

#[test]
fn going_back_and_forth_without_edits_changes_nothing() {
    let mut wizard = new_session();
    wizard.submit(&working_mother()).unwrap();
    let stored = wizard.controller().step_data(StepId::Mae).cloned();

    let father_draft = raw(&[("name", "Jo")]);
    assert_eq!(
        wizard.back(&father_draft).unwrap(),
        StepOutcome::Retreated(StepId::Mae)
    );
    let restored = wizard.working_copy();
    assert_eq!(restored, working_mother());
    assert_eq!(
        wizard.submit(&restored).unwrap(),
        StepOutcome::Advanced(StepId::Pai)
    );
    assert_eq!(wizard.controller().step_data(StepId::Mae).cloned(), stored);
    assert_eq!(wizard.working_copy()["name"], RawInput::text("Jo"));
}

#[test]
fn result_object_holds_every_step() {
    let gateway = InMemoryGateway::new();
    let mut wizard = new_session();
    wizard.submit(&working_mother()).unwrap();
    wizard
        .submit(&parent("José", "desconhecido", "(11) 3333-4444"))
        .unwrap();
    let route = wizard
        .finish(&raw(&[("comments", "Sem observações")]), &gateway)
        .unwrap();
    assert_eq!(route, Route::Menu);
    assert_eq!(route.path(), "/menu");

    let saved = gateway.persons().remove(0);
    let fetched = gateway.get_person(saved.id.unwrap()).unwrap();
    assert_eq!(fetched, saved);

    let record = wizard.controller().result_object();
    insta::assert_snapshot!(record.to_json_pretty().unwrap(), @r#"
    {
      "comments": "Sem observações",
      "father": {
        "employmentRelationship": null,
        "employmentRelationshipDesc": null,
        "name": "JOSÉ",
        "ocupation": "desconhecido",
        "phones": [
          {
            "value": "1133334444"
          }
        ],
        "placeOfWork": null,
        "salary": null
      },
      "mother": {
        "employmentRelationship": "outro",
        "employmentRelationshipDesc": "Diarista",
        "name": "MARIA",
        "ocupation": "outro",
        "phones": [
          {
            "value": "11987654321"
          }
        ],
        "placeOfWork": "Mercado",
        "salary": 1500.5
      }
    }
    "#);
}

#[test]
fn failed_submission_keeps_wizard_state() {
    let gateway = InMemoryGateway::new();
    let mut wizard = new_session();
    wizard.submit(&working_mother()).unwrap();
    wizard
        .submit(&parent("José", "do_lar", "(11) 3333-4444"))
        .unwrap();
    let before = wizard.controller().result_object();

    gateway.fail_next(1);
    let err = wizard.finish(&raw(&[]), &gateway).unwrap_err();
    assert!(matches!(err, StepError::Submission(SubmissionError::Api(_))));
    assert!(wizard.leave_guard().is_armed());
    assert!(!wizard.is_busy());
    assert_eq!(wizard.current_step().id, StepId::Finalizar);

    let after = wizard.controller().result_object();
    assert_eq!(after.fields["mother"], before.fields["mother"]);
    assert_eq!(after.fields["father"], before.fields["father"]);
    assert!(gateway.persons().is_empty());
}

#[test]
fn reopened_record_is_updated_in_place() {
    let gateway = InMemoryGateway::new();
    let mut wizard = new_session();
    wizard.submit(&working_mother()).unwrap();
    wizard
        .submit(&parent("José", "do_lar", "(11) 3333-4444"))
        .unwrap();
    wizard.finish(&raw(&[]), &gateway).unwrap();
    let id = gateway.persons()[0].id.unwrap();

    let record = gateway.get_person(id).unwrap();
    let controller = MultistepController::for_record(acolhido_steps(), &record, true).unwrap();
    let mut wizard = WizardSession::new(controller);
    let mother = wizard.working_copy();
    assert_eq!(mother["salary"], RawInput::text("R$ 1500,5"));
    wizard.submit(&mother).unwrap();
    let father = wizard.working_copy();
    wizard.submit(&father).unwrap();
    wizard
        .finish(&raw(&[("comments", "Revisado")]), &gateway)
        .unwrap();

    let persons = gateway.persons();
    assert_eq!(persons.len(), 1);
    assert_eq!(persons[0].id, Some(id));
    assert_eq!(persons[0].fields["comments"], "Revisado");
    assert_eq!(persons[0].fields["mother"]["salary"], 1500.5);
}

#[test]
fn stored_phone_entries_round_trip_through_the_wizard() {
    let gateway = InMemoryGateway::new();
    let record: PersonRecord = serde_json::from_value(serde_json::json!({
        "mother": {
            "name": "MARIA",
            "ocupation": "do_lar",
            "phones": [{ "value": "11987654321" }, { "value": "1133334444" }]
        },
        "father": {
            "name": "JOSÉ",
            "ocupation": "desconhecido",
            "phones": [{ "value": "1133334444" }]
        },
        "comments": null
    }))
    .unwrap();
    let id = gateway.insert_person(record);

    let stored = gateway.get_person(id).unwrap();
    assert!(stored.is_active());
    let controller = MultistepController::for_record(acolhido_steps(), &stored, true).unwrap();
    let mut wizard = WizardSession::new(controller);
    let mother = wizard.working_copy();
    assert_eq!(
        mother["phones"],
        RawInput::List(vec!["(11) 9 8765-4321".into(), "(11) 3333-4444".into()])
    );
    wizard.submit(&mother).unwrap();
    let father = wizard.working_copy();
    wizard.submit(&father).unwrap();
    wizard.finish(&raw(&[]), &gateway).unwrap();

    let updated = gateway.get_person(id).unwrap();
    assert_eq!(
        updated.fields["mother"]["phones"],
        serde_json::json!([{ "value": "11987654321" }, { "value": "1133334444" }])
    );
    assert_eq!(
        updated.fields["father"]["phones"],
        serde_json::json!([{ "value": "1133334444" }])
    );
}
