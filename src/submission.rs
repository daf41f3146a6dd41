//! Submit-time guards shared by the wizard and the account form.
//!
//! [`BusyFlag`] keeps a form from submitting twice while a call is in flight
//! and is released however the call settles. [`LeaveGuard`] asks before the
//! user walks away from unsaved input; it is armed when a form mounts and
//! disarmed only after a successful submission.

use std::cell::Cell;

use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Já existe um envio em andamento")]
    Busy,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Yes/no prompt shown before sensitive or destructive actions.
pub trait Confirmation {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

#[derive(Debug, Default)]
pub struct BusyFlag {
    busy: Cell<bool>,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// Runs `call` with the flag raised. A call made while another one is in
    /// flight is refused without running.
    pub fn run<T>(
        &self,
        call: impl FnOnce() -> Result<T, ApiError>,
    ) -> Result<T, SubmissionError> {
        if self.busy.replace(true) {
            return Err(SubmissionError::Busy);
        }
        let _release = Release(&self.busy);
        call().map_err(|err| {
            tracing::warn!(error = %err, "submission failed");
            SubmissionError::Api(err)
        })
    }
}

struct Release<'a>(&'a Cell<bool>);

impl Drop for Release<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub const LEAVE_CONFIRMATION: &str =
    "Deseja sair desta página?\nAs alterações não salvas serão perdidas.";

#[derive(Debug, Default)]
pub struct LeaveGuard {
    armed: bool,
}

impl LeaveGuard {
    /// Guard as installed at form mount.
    pub fn armed() -> Self {
        Self { armed: true }
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether leaving may proceed. Only asks while armed.
    pub fn confirm_leave(&self, confirmation: &mut impl Confirmation) -> bool {
        !self.armed || confirmation.confirm(LEAVE_CONFIRMATION)
    }
}
