use crate::codec::{insert_default, is_zero, WireDefaults};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Structured error descriptor returned by the remote service.
///
/// `code` and `message` are declared-default scalars: they are omitted when
/// zero/empty unless the codec emits defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub code: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Value>,
}

impl WireDefaults for Status {
    fn fill_defaults(&self, value: &mut Value) {
        insert_default(value, "code", json!(0));
        insert_default(value, "message", json!(""));
    }
}

/// Envelope used by the HTTP API for non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: Status,
}
