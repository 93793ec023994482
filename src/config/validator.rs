use thiserror::Error;

use crate::config::{SchemaSettings, ServiceSettings, Settings, WorkflowSettings};

/// Upper bound on the input quiescence window
const MAX_DEBOUNCE_MS: u64 = 10_000;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        // The service is only contacted when no fixtures replace it
        if settings.fixtures.is_none() {
            if let Err(e) = Self::validate_service(&settings.service) {
                errors.extend(e);
            }
        }

        if let Err(e) = Self::validate_workflow(&settings.workflow) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_schema(&settings.schema) {
            errors.extend(e);
        }

        if let Some(path) = &settings.fixtures {
            if !path.exists() {
                errors.push(ValidationError::InvalidValue {
                    field: "fixtures".to_string(),
                    reason: format!("Path '{}' does not exist", path.display()),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_service(service: &ServiceSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if service.endpoint.is_empty() {
            errors.push(ValidationError::MissingField("service.endpoint".to_string()));
        } else if !(service.endpoint.starts_with("http://") || service.endpoint.starts_with("https://")) {
            errors.push(ValidationError::InvalidValue {
                field: "service.endpoint".to_string(),
                reason: "Endpoint must be an http(s) URL".to_string(),
            });
        }

        if service.timeout_seconds == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "service.timeout_seconds".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_workflow(workflow: &WorkflowSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if workflow.debounce_ms > MAX_DEBOUNCE_MS {
            errors.push(ValidationError::InvalidValue {
                field: "workflow.debounce_ms".to_string(),
                reason: format!("Debounce must not exceed {}ms", MAX_DEBOUNCE_MS),
            });
        }

        if workflow.owner_page_size == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "workflow.owner_page_size".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        if workflow.app_type_page_size == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "workflow.app_type_page_size".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_schema(schema: &SchemaSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if schema.custom_data_prefix.is_empty() {
            errors.push(ValidationError::MissingField("schema.custom_data_prefix".to_string()));
        }

        if schema.max_depth == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "schema.max_depth".to_string(),
                reason: "Depth bound must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
