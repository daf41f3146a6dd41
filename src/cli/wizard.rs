use crate::api::ApiGateway;
use crate::cli::forms::{fill_step, report_field_errors, show_step};
use crate::cli::output;
use crate::cli::prompter::{PromptConfirmation, Prompter};
use crate::errors::AppError;
use crate::session::Route;
use crate::validation::{RawValues, StepSchema};
use crate::wizard::{StepError, WizardSession};

const ACTION_PROMPT: &str = "O que deseja fazer?";
const ADVANCE: &str = "Avançar";
const FINISH: &str = "Concluir cadastro";
const BACK: &str = "Voltar";
const LEAVE: &str = "Sair";

/// Drives an acolhido wizard until it is saved (returns the landing route)
/// or the user leaves (returns `None`).
pub fn run_wizard<P: Prompter + ?Sized>(
    session: &mut WizardSession,
    prompter: &mut P,
    gateway: &dyn ApiGateway,
) -> Result<Option<Route>, AppError> {
    let mut pending: Option<RawValues> = None;
    loop {
        let step = session.current_step().clone();
        let controller = session.controller();
        output::section(format!(
            "{} ({}/{})",
            step.title,
            controller.current_index() + 1,
            controller.step_count()
        ));
        let last = controller.is_last_step();

        let mut raw = pending.take().unwrap_or_else(|| session.working_copy());
        if session.editable() {
            fill_step(prompter, &step.schema, &mut raw)?;
        } else {
            output::warning("Cadastro inativo: somente leitura");
            show_step(&step.schema, &raw);
        }

        // A read-only record cannot be concluded.
        let mut actions = Vec::new();
        if !last {
            actions.push(ADVANCE);
        } else if session.editable() {
            actions.push(FINISH);
        }
        actions.extend([BACK, LEAVE]);

        let result = match actions[prompter.select(ACTION_PROMPT, &actions, 0)?] {
            FINISH => match session.finish(&raw, gateway) {
                Ok(route) => {
                    output::success("Acolhido salvo com sucesso");
                    return Ok(Some(route));
                }
                Err(err) => Err(err),
            },
            ADVANCE => session.submit(&raw).map(|_| ()),
            BACK => session.back(&raw).map(|_| ()),
            _ => {
                if session.confirm_leave(&mut PromptConfirmation(&mut *prompter)) {
                    return Ok(None);
                }
                pending = Some(raw);
                continue;
            }
        };

        if let Err(err) = result {
            report_step_error(&step.schema, &err);
            pending = Some(raw);
        }
    }
}

fn report_step_error(schema: &StepSchema, err: &StepError) {
    match err {
        StepError::Invalid(errors) => report_field_errors(schema, errors),
        StepError::Submission(inner) => {
            output::error(format!("Não foi possível salvar o acolhido: {inner}"))
        }
        other => output::error(other),
    }
}
