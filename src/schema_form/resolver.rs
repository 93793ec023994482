//! Schema resolution
//!
//! Turns an application-type schema plus a record's stored values into the
//! flat field list a renderer consumes: flatten, scope to custom data, merge
//! defaults, normalize options. Always in that order.

use std::future::Future;

use tracing::{debug, error};

use super::{defaults, flatten, options};
use crate::config::SchemaSettings;
use crate::domain::{ApplicationTypeSchema, FieldDefinition, FormResult, RecordValues, RenderableField};

/// Resolves schemas into renderable fields
#[derive(Debug, Clone, Default)]
pub struct SchemaResolutionEngine {
    settings: SchemaSettings,
}

impl SchemaResolutionEngine {
    pub fn new(settings: SchemaSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SchemaSettings {
        &self.settings
    }

    /// Resolve when both inputs are present.
    ///
    /// A missing schema or missing values is the normal "nothing selected /
    /// not loaded yet" state and yields an empty list. A schema that cannot be
    /// flattened is logged and also yields an empty list.
    pub fn resolve(
        &self,
        schema: Option<&ApplicationTypeSchema>,
        values: Option<&RecordValues>,
    ) -> Vec<RenderableField> {
        let (Some(schema), Some(values)) = (schema, values) else {
            return Vec::new();
        };

        match self.try_resolve(schema, values) {
            Ok(fields) => fields,
            Err(e) => {
                error!(schema_id = ?schema.id, "Failed to resolve schema: {}", e);
                Vec::new()
            }
        }
    }

    /// Resolve, surfacing flattening failures
    pub fn try_resolve(
        &self,
        schema: &ApplicationTypeSchema,
        values: &RecordValues,
    ) -> FormResult<Vec<RenderableField>> {
        let flat = flatten::flatten(schema.fields.clone(), self.settings.max_depth)?;
        let total = flat.len();
        let merged = defaults::merge(
            flat,
            values,
            &self.settings.custom_data_prefix,
            self.settings.default_policy,
        );
        debug!(
            schema_id = ?schema.id,
            total,
            kept = merged.len(),
            "Resolved schema fields"
        );
        Ok(merged.into_iter().map(into_renderable).collect())
    }

    /// Await both inputs, then resolve.
    ///
    /// The two futures run concurrently; nothing is resolved until both have
    /// completed.
    pub async fn load<S, V>(&self, schema: S, values: V) -> Vec<RenderableField>
    where
        S: Future<Output = Option<ApplicationTypeSchema>>,
        V: Future<Output = Option<RecordValues>>,
    {
        let (schema, values) = tokio::join!(schema, values);
        self.resolve(schema.as_ref(), values.as_ref())
    }
}

fn into_renderable(field: FieldDefinition) -> RenderableField {
    RenderableField {
        options: options::normalize(&field.options),
        path: field.path.unwrap_or_default(),
        default_value: field.default_value,
        attributes: field.attributes,
    }
}
