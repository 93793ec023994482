//! Domain types and collaborator ports
//!
//! The remote data service is only ever reached through the three port
//! traits below; `adapters` provides the GraphQL and in-memory
//! implementations.

use async_trait::async_trait;

pub mod error;
pub mod field;
pub mod payload;
pub mod record;

pub use error::{FormError, FormResult};
pub use field::{FieldDefinition, OptionEntry, RecordValues, RenderableField};
pub use payload::{CreateRecordPayload, OutboundPayload, UpdateRecordPayload};
pub use record::{
    ApplicationTypeSchema, ApplicationTypeSummary, CreatedRecord, FormShape, Navigation,
    OwnerCandidate, PageContext, StoredRecord,
};

/// Application-type catalog and schemas
#[async_trait]
pub trait AppTypePort: Send + Sync {
    /// One page of the catalog (pages start at 1)
    async fn list_app_types(
        &self,
        page: u32,
        page_size: u32,
        only_enabled: bool,
    ) -> FormResult<Vec<ApplicationTypeSummary>>;

    /// Field tree of one application type
    async fn get_app_type(&self, type_id: &str) -> FormResult<ApplicationTypeSchema>;
}

/// Stored application records
#[async_trait]
pub trait AppRecordPort: Send + Sync {
    /// A record at a given version; `None` when the service has no such version
    async fn get_record_version(
        &self,
        record_id: &str,
        version: u32,
    ) -> FormResult<Option<StoredRecord>>;

    async fn create_record(&self, payload: &CreateRecordPayload) -> FormResult<CreatedRecord>;

    /// `Ok(false)` means the service refused the update
    async fn update_record(
        &self,
        record_id: &str,
        version: u32,
        payload: &UpdateRecordPayload,
    ) -> FormResult<bool>;
}

/// Developer (owner) identifier search
#[async_trait]
pub trait OwnerDirectoryPort: Send + Sync {
    async fn search_owners(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> FormResult<Vec<OwnerCandidate>>;
}
