use serde_json::Value;
use thiserror::Error;

use super::{MultistepController, StepId, WizardStep};
use crate::api::ApiGateway;
use crate::session::Route;
use crate::submission::{BusyFlag, Confirmation, LeaveGuard, SubmissionError};
use crate::validation::{FieldErrors, FieldSpec, RawValues};

/// Where the wizard ended up after a step action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced(StepId),
    Retreated(StepId),
    Stayed,
}

#[derive(Debug, Error)]
pub enum StepError {
    #[error("{0}")]
    Invalid(FieldErrors),
    #[error("Este cadastro está em modo somente leitura")]
    ReadOnly,
    #[error("O cadastro só pode ser concluído na última etapa")]
    NotLastStep,
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// A running wizard as seen by the user: the controller plus the guards that
/// live as long as the form is mounted.
#[derive(Debug)]
pub struct WizardSession {
    controller: MultistepController,
    busy: BusyFlag,
    leave_guard: LeaveGuard,
}

impl WizardSession {
    pub fn new(controller: MultistepController) -> Self {
        Self {
            controller,
            busy: BusyFlag::new(),
            leave_guard: LeaveGuard::armed(),
        }
    }

    pub fn controller(&self) -> &MultistepController {
        &self.controller
    }

    pub fn current_step(&self) -> &WizardStep {
        self.controller.current_step()
    }

    pub fn editable(&self) -> bool {
        self.controller.active_status()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn leave_guard(&self) -> &LeaveGuard {
        &self.leave_guard
    }

    /// Asks before leaving while the guard is armed.
    pub fn confirm_leave(&self, confirmation: &mut impl Confirmation) -> bool {
        self.leave_guard.confirm_leave(confirmation)
    }

    /// Inputs to display when the current step is shown.
    pub fn working_copy(&self) -> RawValues {
        self.controller.restore_step()
    }

    pub fn visible_fields(&self, raw: &RawValues) -> Vec<&FieldSpec> {
        self.current_step().schema.visible_fields(raw)
    }

    /// Single-field validation when an input loses focus.
    pub fn blur(&self, key: &str, raw: &RawValues) -> Result<Value, FieldErrors> {
        self.current_step().schema.validate_field(key, raw)
    }

    /// Submits an intermediate step: validates, stores and advances. In
    /// read-only mode nothing is stored and the wizard just moves on.
    pub fn submit(&mut self, raw: &RawValues) -> Result<StepOutcome, StepError> {
        if !self.editable() {
            return Ok(self.move_forward());
        }
        let data = self
            .current_step()
            .schema
            .validate(raw)
            .map_err(StepError::Invalid)?;
        let before = self.controller.current_index();
        self.controller.next(data, raw.clone());
        Ok(self.outcome_since(before))
    }

    /// Goes back one step. Unchanged input is cached as is; changed input is
    /// validated and stored first, and the wizard stays put if it fails.
    pub fn back(&mut self, raw: &RawValues) -> Result<StepOutcome, StepError> {
        if self.controller.current_index() == 0 {
            return Ok(StepOutcome::Stayed);
        }
        if self.editable() && self.controller.has_unsaved_changes(raw) {
            let data = self
                .current_step()
                .schema
                .validate(raw)
                .map_err(StepError::Invalid)?;
            self.controller.set_current_step_data(data, raw.clone());
        } else if self.editable() {
            self.controller.set_current_step_cache(raw.clone());
        }
        self.controller.back();
        Ok(StepOutcome::Retreated(self.current_step().id))
    }

    /// Submits the last step and sends the whole record. Creates when the
    /// wizard has no record id, updates otherwise. On success the leave guard
    /// is released and the landing route is returned; on failure every step
    /// keeps its data.
    pub fn finish(
        &mut self,
        raw: &RawValues,
        gateway: &dyn ApiGateway,
    ) -> Result<Route, StepError> {
        if !self.editable() {
            return Err(StepError::ReadOnly);
        }
        if !self.controller.is_last_step() {
            return Err(StepError::NotLastStep);
        }
        let data = self
            .current_step()
            .schema
            .validate(raw)
            .map_err(StepError::Invalid)?;
        self.controller.set_current_step_data(data, raw.clone());

        let record = self.controller.result_object();
        self.busy.run(|| match record.id {
            Some(_) => gateway.update_person(&record),
            None => gateway.create_person(&record),
        })?;

        self.leave_guard.disarm();
        tracing::info!(id = ?record.id, "acolhido saved");
        Ok(Route::Menu)
    }

    fn move_forward(&mut self) -> StepOutcome {
        let before = self.controller.current_index();
        self.controller.forward();
        self.outcome_since(before)
    }

    fn outcome_since(&self, before: usize) -> StepOutcome {
        if self.controller.current_index() == before {
            StepOutcome::Stayed
        } else {
            StepOutcome::Advanced(self.current_step().id)
        }
    }
}
