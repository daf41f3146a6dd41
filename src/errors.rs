use thiserror::Error;

use crate::api::ApiError;
use crate::submission::SubmissionError;
use crate::wizard::WizardError;

/// Error type that captures failures surfaced to the terminal client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Falha na comunicação com o servidor: {0}")]
    Api(#[from] ApiError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}
