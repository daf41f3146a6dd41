//! Remote API gateway. The service that persists acolhidos and operator
//! accounts is external; the rest of the crate only talks to it through
//! [`ApiGateway`].

pub mod http;
pub mod memory;

use thiserror::Error;

use crate::account::AccountRecord;
use crate::wizard::PersonRecord;

pub use http::HttpGateway;
pub use memory::InMemoryGateway;

/// Server-side identifier of a person or account.
pub type RecordId = u64;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Operations offered by the remote API. Every outcome is success or failure;
/// callers do not distinguish failure kinds.
pub trait ApiGateway {
    fn create_person(&self, record: &PersonRecord) -> Result<(), ApiError>;
    fn update_person(&self, record: &PersonRecord) -> Result<(), ApiError>;
    fn get_person(&self, id: RecordId) -> Result<PersonRecord, ApiError>;
    fn create_account(&self, record: &AccountRecord) -> Result<(), ApiError>;
    fn update_account(&self, record: &AccountRecord) -> Result<(), ApiError>;
    fn update_account_status(&self, id: RecordId, active: bool) -> Result<(), ApiError>;
    fn get_account(&self, id: RecordId) -> Result<AccountRecord, ApiError>;
}
