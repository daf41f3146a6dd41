//! Operator account registration and editing.

mod form;
mod permissions;

use serde::{Deserialize, Serialize};

use crate::api::RecordId;

pub use form::{AccountError, AccountForm, StatusOutcome, DEACTIVATION_CONFIRMATION};
pub use permissions::{Dependency, PermissionSet, Role, ToggleOutcome, ADMIN_CONFIRMATION};

/// Operator account as exchanged with the API. The password is write-only:
/// it is sent when set and never read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    pub login: String,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default = "default_status")]
    pub status: bool,
}

fn default_status() -> bool {
    true
}
