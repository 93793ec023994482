//! Fixture-backed marketplace
//!
//! Serves application types, stored records and developer ids loaded from
//! JSON, YAML or TOML fixtures, and keeps every created or updated payload
//! for inspection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::{
    AppRecordPort, AppTypePort, ApplicationTypeSchema, ApplicationTypeSummary, CreateRecordPayload,
    CreatedRecord, FieldDefinition, FormError, FormResult, OwnerCandidate, OwnerDirectoryPort,
    StoredRecord, UpdateRecordPayload,
};

/// Contents of one fixture file. A directory of fixtures is concatenated.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceFixture {
    #[serde(default)]
    pub app_types: Vec<AppTypeFixture>,
    #[serde(default)]
    pub records: Vec<RecordFixture>,
    #[serde(default)]
    pub developers: Vec<String>,
}

impl MarketplaceFixture {
    fn extend(&mut self, other: MarketplaceFixture) {
        self.app_types.extend(other.app_types);
        self.records.extend(other.records);
        self.developers.extend(other.developers);
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppTypeFixture {
    pub id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordFixture {
    pub id: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(flatten)]
    pub record: StoredRecord,
}

fn default_version() -> u32 {
    1
}

#[derive(Default)]
struct MarketplaceState {
    records: HashMap<(String, u32), StoredRecord>,
    created: Vec<CreateRecordPayload>,
    updated: Vec<(String, u32, UpdateRecordPayload)>,
}

#[derive(Clone)]
pub struct InMemoryMarketplace {
    app_types: Arc<Vec<AppTypeFixture>>,
    developers: Arc<Vec<String>>,
    state: Arc<RwLock<MarketplaceState>>,
}

impl InMemoryMarketplace {
    pub fn new(fixture: MarketplaceFixture) -> Self {
        let records = fixture
            .records
            .into_iter()
            .map(|r| ((r.id, r.version), r.record))
            .collect();

        Self {
            app_types: Arc::new(fixture.app_types),
            developers: Arc::new(fixture.developers),
            state: Arc::new(RwLock::new(MarketplaceState {
                records,
                ..Default::default()
            })),
        }
    }

    /// Load a fixture file, or every fixture file directly inside a directory
    pub fn from_path(path: impl AsRef<Path>) -> FormResult<Self> {
        let path = path.as_ref();
        let fixture = if path.is_dir() {
            load_fixture_dir(path)?
        } else {
            load_fixture_file(path)?
        };
        info!(
            path = %path.display(),
            app_types = fixture.app_types.len(),
            records = fixture.records.len(),
            developers = fixture.developers.len(),
            "Loaded marketplace fixtures"
        );
        Ok(Self::new(fixture))
    }

    /// Create payloads received so far, oldest first
    pub async fn created(&self) -> Vec<CreateRecordPayload> {
        self.state.read().await.created.clone()
    }

    /// Update payloads received so far, with their record id and version
    pub async fn updated(&self) -> Vec<(String, u32, UpdateRecordPayload)> {
        self.state.read().await.updated.clone()
    }
}

fn load_fixture_dir(dir: &Path) -> FormResult<MarketplaceFixture> {
    let pattern = format!("{}/*", dir.display());
    let entries = glob::glob(&pattern).map_err(|e| FormError::Fixture(e.to_string()))?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => {
                if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                    if matches!(ext, "json" | "yaml" | "yml" | "toml") {
                        paths.push(path);
                    }
                }
            }
            Err(e) => warn!("Failed to read glob entry: {}", e),
        }
    }
    paths.sort();

    let mut fixture = MarketplaceFixture::default();
    for path in paths {
        fixture.extend(load_fixture_file(&path)?);
    }
    Ok(fixture)
}

fn load_fixture_file(path: &Path) -> FormResult<MarketplaceFixture> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| FormError::Fixture(format!("{}: {}", path.display(), e)))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

    let parsed = match ext {
        "json" => serde_json::from_str(&content).map_err(|e| e.to_string()),
        "toml" => toml::from_str(&content).map_err(|e| e.to_string()),
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        other => Err(format!("unsupported fixture format '{}'", other)),
    };
    parsed.map_err(|e| FormError::Fixture(format!("{}: {}", path.display(), e)))
}

/// One page of `items`; pages start at 1
fn paginate<T: Clone>(items: &[T], page: u32, page_size: u32) -> Vec<T> {
    let skip = page.saturating_sub(1) as usize * page_size as usize;
    items.iter().skip(skip).take(page_size as usize).cloned().collect()
}

/// Display name and URL-safe name for a freshly created record
fn derive_names(name: Option<&Value>) -> (String, String) {
    let name = match name {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let safe_name = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    (name, safe_name)
}

#[async_trait]
impl AppTypePort for InMemoryMarketplace {
    async fn list_app_types(
        &self,
        page: u32,
        page_size: u32,
        only_enabled: bool,
    ) -> FormResult<Vec<ApplicationTypeSummary>> {
        let summaries: Vec<_> = self
            .app_types
            .iter()
            .filter(|t| t.enabled || !only_enabled)
            .map(|t| ApplicationTypeSummary {
                id: Some(t.id.clone()),
            })
            .collect();
        Ok(paginate(&summaries, page, page_size))
    }

    async fn get_app_type(&self, type_id: &str) -> FormResult<ApplicationTypeSchema> {
        self.app_types
            .iter()
            .find(|t| t.id == type_id)
            .map(|t| ApplicationTypeSchema {
                id: Some(t.id.clone()),
                fields: t.fields.clone(),
            })
            .ok_or_else(|| FormError::Remote {
                operation: "getAppType".to_string(),
                message: format!("application type {} not found", type_id),
            })
    }
}

#[async_trait]
impl AppRecordPort for InMemoryMarketplace {
    async fn get_record_version(
        &self,
        record_id: &str,
        version: u32,
    ) -> FormResult<Option<StoredRecord>> {
        let state = self.state.read().await;
        Ok(state.records.get(&(record_id.to_string(), version)).cloned())
    }

    async fn create_record(&self, payload: &CreateRecordPayload) -> FormResult<CreatedRecord> {
        let mut state = self.state.write().await;
        state.created.push(payload.clone());

        let id = format!("app-{}", state.created.len());
        let (name, safe_name) = derive_names(payload.name.as_ref());
        state.records.insert(
            (id.clone(), 1),
            StoredRecord {
                app_type: payload.app_type.clone(),
                name,
                safe_name,
                custom_data: Some(Value::Object(payload.custom_data.clone())),
            },
        );
        Ok(CreatedRecord { id })
    }

    /// Updates a stored version in place; an unknown version is refused
    async fn update_record(
        &self,
        record_id: &str,
        version: u32,
        payload: &UpdateRecordPayload,
    ) -> FormResult<bool> {
        let mut state = self.state.write().await;
        state
            .updated
            .push((record_id.to_string(), version, payload.clone()));

        let Some(record) = state.records.get_mut(&(record_id.to_string(), version)) else {
            return Ok(false);
        };
        record.name = payload.name.clone();
        if let Some(Value::String(safe_name)) = payload.custom_data.get("safeName") {
            record.safe_name = safe_name.clone();
        }
        record.custom_data = Some(Value::Object(payload.custom_data.clone()));
        Ok(true)
    }
}

#[async_trait]
impl OwnerDirectoryPort for InMemoryMarketplace {
    /// Case-insensitive substring match on developer ids
    async fn search_owners(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> FormResult<Vec<OwnerCandidate>> {
        let needle = query.trim().to_lowercase();
        let matches: Vec<_> = self
            .developers
            .iter()
            .filter(|id| id.to_lowercase().contains(&needle))
            .map(OwnerCandidate::new)
            .collect();
        Ok(paginate(&matches, page, page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn marketplace() -> InMemoryMarketplace {
        let fixture: MarketplaceFixture = serde_json::from_value(json!({
            "appTypes": [
                {"id": "game", "fields": [{"id": "customData.platform"}]},
                {"id": "legacy", "enabled": false}
            ],
            "records": [
                {"id": "app-7", "version": 2, "type": "game", "name": "Space Race",
                 "safeName": "space-race", "customData": {"platform": "pc"}}
            ],
            "developers": ["acme-1", "acme-2", "globex"]
        }))
        .unwrap();
        InMemoryMarketplace::new(fixture)
    }

    #[tokio::test]
    async fn test_catalog_respects_enabled_flag() {
        let market = marketplace();
        let enabled = market.list_app_types(1, 10, true).await.unwrap();
        assert_eq!(enabled.len(), 1);
        let all = market.list_app_types(1, 10, false).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(market.list_app_types(2, 10, false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_type_is_remote_error() {
        let err = marketplace().get_app_type("nope").await.unwrap_err();
        assert!(matches!(err, FormError::Remote { .. }));
    }

    #[tokio::test]
    async fn test_owner_search_matches_substring() {
        let market = marketplace();
        let found = market.search_owners("ACME", 1, 20).await.unwrap();
        assert_eq!(found, vec![OwnerCandidate::new("acme-1"), OwnerCandidate::new("acme-2")]);
        assert!(market.search_owners("initech", 1, 20).await.unwrap().is_empty());
        assert_eq!(market.search_owners("acme", 2, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_created_record_is_readable() {
        let market = marketplace();
        let created = market
            .create_record(&CreateRecordPayload {
                app_type: "game".to_string(),
                name: Some(json!("My Game 2")),
                auto_approve: true,
                custom_data: json!({"platform": "pc"}).as_object().cloned().unwrap(),
            })
            .await
            .unwrap();

        let stored = market.get_record_version(&created.id, 1).await.unwrap().unwrap();
        assert_eq!(stored.name, "My Game 2");
        assert_eq!(stored.safe_name, "my-game-2");
        assert_eq!(market.created().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_version_is_refused() {
        let market = marketplace();
        let payload = UpdateRecordPayload {
            name: "Space Race".to_string(),
            approval_required: false,
            custom_data: json!({"safeName": "space-race-2"}).as_object().cloned().unwrap(),
        };

        assert!(!market.update_record("app-7", 1, &payload).await.unwrap());
        assert!(market.update_record("app-7", 2, &payload).await.unwrap());

        let stored = market.get_record_version("app-7", 2).await.unwrap().unwrap();
        assert_eq!(stored.safe_name, "space-race-2");
        assert_eq!(market.updated().await.len(), 2);
    }

    #[test]
    fn test_load_fixture_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("types.yaml"),
            "appTypes:\n  - id: game\n    fields:\n      - id: customData.platform\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("developers.toml"),
            "developers = [\"acme-1\"]\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let market = InMemoryMarketplace::from_path(dir.path()).unwrap();
        assert_eq!(market.app_types.len(), 1);
        assert_eq!(market.developers.as_slice(), ["acme-1"]);
    }

    #[test]
    fn test_bad_fixture_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = InMemoryMarketplace::from_path(&path).err().unwrap();
        assert!(matches!(err, FormError::Fixture(_)));
    }
}
