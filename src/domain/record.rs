//! Records, application types and session context

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::field::{skip_null_entries, FieldDefinition};

/// Entry of the application-type catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationTypeSummary {
    #[serde(default)]
    pub id: Option<String>,
}

/// Field tree of one application type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationTypeSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        alias = "fieldDefinitions",
        default,
        deserialize_with = "skip_null_entries"
    )]
    pub fields: Vec<FieldDefinition>,
}

/// Stored snapshot of an application at one version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    #[serde(rename = "type")]
    pub app_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub safe_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Value>,
}

/// Result row of an owner-identifier search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerCandidate {
    pub developer_id: String,
}

impl OwnerCandidate {
    pub fn new(developer_id: impl Into<String>) -> Self {
        Self {
            developer_id: developer_id.into(),
        }
    }
}

/// Identity of a freshly created record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRecord {
    #[serde(alias = "appId")]
    pub id: String,
}

/// Which record, if any, the session works on. Fixed for the session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContext {
    /// Creating a new record
    New,
    /// Editing an existing record version
    Edit { record_id: String, version: u32 },
}

impl PageContext {
    pub fn edit(record_id: impl Into<String>, version: u32) -> Self {
        Self::Edit {
            record_id: record_id.into(),
            version,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::New)
    }
}

impl std::fmt::Display for PageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageContext::New => write!(f, "new"),
            PageContext::Edit { record_id, version } => {
                write!(f, "edit {}@{}", record_id, version)
            }
        }
    }
}

/// Static part of the form, shaped by the page context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormShape {
    New {
        #[serde(rename = "type")]
        app_type: String,
    },
    Edit {
        name: String,
        #[serde(rename = "safeName")]
        safe_name: String,
    },
}

impl FormShape {
    pub fn new_record(app_type: impl Into<String>) -> Self {
        Self::New {
            app_type: app_type.into(),
        }
    }

    pub fn edit_record(name: impl Into<String>, safe_name: impl Into<String>) -> Self {
        Self::Edit {
            name: name.into(),
            safe_name: safe_name.into(),
        }
    }
}

/// Where the host should navigate when a session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    ApplicationList,
}

impl Navigation {
    pub fn route(&self) -> &'static str {
        match self {
            Navigation::ApplicationList => "/app-list/list",
        }
    }
}
