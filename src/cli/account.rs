use crate::account::{AccountError, AccountForm, Role, StatusOutcome, ToggleOutcome};
use crate::api::ApiGateway;
use crate::cli::forms::{fill_step, report_field_errors, show_step};
use crate::cli::output;
use crate::cli::prompter::{PromptConfirmation, Prompter};
use crate::errors::AppError;
use crate::session::Route;
use crate::validation::{RawInput, RawValues, StepSchema};

const FORM_TITLE: &str = "Cadastrar Usuário";
const SECRET_FIELDS: [&str; 2] = ["password", "repeatPassword"];

/// Drives the account form until it is saved (returns the landing route) or
/// the user leaves (returns `None`).
pub fn run_account_form<P: Prompter + ?Sized>(
    form: &mut AccountForm,
    prompter: &mut P,
    gateway: &dyn ApiGateway,
) -> Result<Option<Route>, AppError> {
    let mut pending: Option<RawValues> = None;
    loop {
        output::section(FORM_TITLE);
        let mut raw = pending.take().unwrap_or_else(|| form.defaults());

        if form.editable() {
            fill_account(prompter, form.schema(), &mut raw)?;
            ask_permissions(form, prompter)?;
        } else {
            output::warning("Usuário desativado: ative-o para alterar o cadastro");
            show_step(form.schema(), &raw);
            show_permissions(form);
        }

        let mut actions = Vec::new();
        if form.editable() {
            actions.push(form.submit_label());
        }
        if let Some(label) = form.status_label() {
            actions.push(label);
        }
        actions.push("Sair");

        let picked = actions[prompter.select("O que deseja fazer?", &actions, 0)?];
        if picked == "Sair" {
            if form.leave_guard().confirm_leave(&mut PromptConfirmation(&mut *prompter)) {
                return Ok(None);
            }
        } else if Some(picked) == form.status_label() {
            match form.toggle_status(gateway, &mut PromptConfirmation(&mut *prompter)) {
                Ok(StatusOutcome::Changed { active: true }) => output::success("Usuário ativado"),
                Ok(StatusOutcome::Changed { active: false }) => {
                    output::success("Usuário desativado")
                }
                Ok(StatusOutcome::Cancelled) => {}
                Err(err) => report_account_error(form.schema(), &err),
            }
        } else {
            match form.submit(&raw, gateway) {
                Ok(route) => {
                    output::success("Usuário salvo com sucesso");
                    return Ok(Some(route));
                }
                Err(err) => report_account_error(form.schema(), &err),
            }
        }
        pending = Some(raw);
    }
}

/// Asks the form fields; password inputs are read without echo.
fn fill_account<P: Prompter + ?Sized>(
    prompter: &mut P,
    schema: &StepSchema,
    raw: &mut RawValues,
) -> Result<(), AppError> {
    let public = StepSchema::new(
        schema.name,
        schema
            .fields
            .iter()
            .filter(|field| !SECRET_FIELDS.contains(&field.key))
            .cloned()
            .collect(),
    );
    fill_step(prompter, &public, raw)?;
    for key in SECRET_FIELDS {
        let label = schema.field(key).map(|field| field.label).unwrap_or(key);
        let secret = prompter.secret(label)?;
        raw.insert(key.to_string(), RawInput::text(secret));
    }
    Ok(())
}

fn ask_permissions<P: Prompter + ?Sized>(
    form: &mut AccountForm,
    prompter: &mut P,
) -> Result<(), AppError> {
    for role in Role::ALL {
        let current = form.permissions().contains(role);
        let wanted = prompter.confirm(role.label(), current)?;
        if wanted == current {
            continue;
        }
        match form.toggle_permission(role, wanted, &mut PromptConfirmation(&mut *prompter)) {
            Ok(ToggleOutcome::Applied { granted, revoked }) => {
                for implied in granted.iter().chain(&revoked).filter(|other| **other != role) {
                    let verb = if granted.contains(implied) { "marcada" } else { "desmarcada" };
                    output::info(format!("{} também {verb}", implied.label()));
                }
            }
            Ok(ToggleOutcome::Declined) => output::warning("Permissão de administrador não concedida"),
            Err(err) => output::error(err),
        }
    }
    Ok(())
}

fn show_permissions(form: &AccountForm) {
    let roles: Vec<&str> = form.permissions().roles().into_iter().map(Role::label).collect();
    output::info(format!("Permissões: {}", roles.join(", ")));
}

fn report_account_error(schema: &StepSchema, err: &AccountError) {
    match err {
        AccountError::Invalid(errors) => report_field_errors(schema, errors),
        AccountError::Submission(inner) => {
            output::error(format!("Não foi possível salvar o usuário: {inner}"))
        }
        other => output::error(other),
    }
}
