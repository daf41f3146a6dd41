use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::RecordId;

const STATUS_KEY: &str = "status";

/// The acolhido as sent to the API: every step's data merged into one object,
/// plus the id when an existing record is being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl PersonRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Whether the stored record may still be edited. Records without a
    /// `status` flag are active.
    pub fn is_active(&self) -> bool {
        self.get(STATUS_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
