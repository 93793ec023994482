//! Outbound payload assembly
//!
//! Pure transformation of the current form state into the create or update
//! body. Nothing is validated beyond matching the static form shape to the
//! page context.

use serde_json::{Map, Value};

use crate::domain::{
    CreateRecordPayload, FormError, FormResult, FormShape, OutboundPayload, PageContext,
    UpdateRecordPayload,
};

/// Key of the display name inside the dynamic field values
const NAME_FIELD: &str = "name";
/// Key the safe name is stored under in an update's custom data
const SAFE_NAME_FIELD: &str = "safeName";

pub struct PayloadAssembler;

impl PayloadAssembler {
    /// Build the outbound body for `context`.
    ///
    /// NEW: `{type, name, autoApprove: true, customData: fields}` where `name`
    /// is taken from the dynamic fields.
    /// EDIT: `{name, approvalRequired: false, customData: fields + safeName}`,
    /// the static safe name overriding any dynamic one.
    pub fn assemble(
        context: &PageContext,
        shape: &FormShape,
        fields: &Map<String, Value>,
    ) -> FormResult<OutboundPayload> {
        match (context, shape) {
            (PageContext::New, FormShape::New { app_type }) => {
                Ok(OutboundPayload::Create(CreateRecordPayload {
                    app_type: app_type.clone(),
                    name: fields.get(NAME_FIELD).cloned(),
                    auto_approve: true,
                    custom_data: fields.clone(),
                }))
            }
            (PageContext::Edit { .. }, FormShape::Edit { name, safe_name }) => {
                let mut custom_data = fields.clone();
                custom_data.insert(SAFE_NAME_FIELD.to_string(), Value::String(safe_name.clone()));
                Ok(OutboundPayload::Update(UpdateRecordPayload {
                    name: name.clone(),
                    approval_required: false,
                    custom_data,
                }))
            }
            (context, _) => Err(FormError::ShapeMismatch(format!(
                "static values do not fit a {} session",
                context
            ))),
        }
    }
}
