//! Multi-step acolhido registration.
//!
//! [`MultistepController`] owns the accumulated answers and the step pointer;
//! [`WizardSession`] wraps it with the per-step submit/back rules, the busy
//! flag and the leave guard, and performs the single final API call.

mod controller;
mod record;
mod session;
pub mod steps;

use std::fmt;

use thiserror::Error;

use crate::validation::StepSchema;

pub use controller::MultistepController;
pub use record::PersonRecord;
pub use session::{StepError, StepOutcome, WizardSession};

/// Steps of the acolhido wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StepId {
    Mae,
    Pai,
    Finalizar,
}

impl StepId {
    /// Key under which the step's data is nested in the result object.
    /// Steps without a namespace contribute their fields at the top level.
    pub fn namespace(self) -> Option<&'static str> {
        match self {
            StepId::Mae => Some("mother"),
            StepId::Pai => Some("father"),
            StepId::Finalizar => None,
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepId::Mae => "mae",
            StepId::Pai => "pai",
            StepId::Finalizar => "finalizar",
        };
        f.write_str(name)
    }
}

/// One registered step: identity, heading and field schema.
#[derive(Debug, Clone)]
pub struct WizardStep {
    pub id: StepId,
    pub title: &'static str,
    pub schema: StepSchema,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("wizard requires at least one step")]
    NoSteps,
    #[error("step `{0}` registered twice")]
    DuplicateStep(StepId),
    #[error("result key `{0}` is produced by more than one step")]
    DuplicateKey(String),
}
