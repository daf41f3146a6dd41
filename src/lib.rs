#![doc(test(attr(deny(warnings))))]

//! APAJAC admin client: the acolhido intake wizard, operator account
//! management and the plumbing they share (field masks, validation schemas,
//! the API gateway and session storage).

pub mod account;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod session;
pub mod submission;
pub mod transform;
pub mod utils;
pub mod validation;
pub mod wizard;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("APAJAC admin tracing initialized.");
    });
}
