//! Outbound request bodies for create and update calls

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a create-record call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordPayload {
    #[serde(rename = "type")]
    pub app_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    pub auto_approve: bool,
    pub custom_data: Map<String, Value>,
}

/// Body of an update-record call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordPayload {
    pub name: String,
    pub approval_required: bool,
    pub custom_data: Map<String, Value>,
}

/// Either outbound body, chosen by the page context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundPayload {
    Create(CreateRecordPayload),
    Update(UpdateRecordPayload),
}

impl OutboundPayload {
    /// Wire representation of the body
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
