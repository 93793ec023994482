//! GraphQL client for the marketplace data service
//!
//! Every port call is one GraphQL document posted to the configured
//! endpoint. The top-level field named after the operation carries the
//! result; a non-empty `errors` array fails the call.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::ServiceSettings;
use crate::domain::{
    AppRecordPort, AppTypePort, ApplicationTypeSchema, ApplicationTypeSummary, CreateRecordPayload,
    CreatedRecord, FormError, FormResult, OwnerCandidate, OwnerDirectoryPort, StoredRecord,
    UpdateRecordPayload,
};
use crate::schema_form::defaults::is_truthy;

const GET_APP_TYPES: &str = r#"query getAppTypes($pageNumber: Int, $limit: Int, $enabled: Boolean) {
  getAppTypes(pageNumber: $pageNumber, limit: $limit, enabled: $enabled) {
    list { id }
  }
}"#;

const GET_APP_TYPE: &str = r#"query getAppType($id: String!) {
  getAppType(id: $id) { id fieldDefinitions }
}"#;

const GET_APP_BY_VERSION: &str = r#"query getAppByVersion($appId: String!, $version: Int!) {
  getAppByVersion(appId: $appId, version: $version) { type name safeName customData }
}"#;

const GET_DEVELOPERS: &str = r#"query getDevelopers($developerId: String, $pageNumber: Int, $limit: Int) {
  getDevelopers(developerId: $developerId, pageNumber: $pageNumber, limit: $limit) {
    list { developerId }
  }
}"#;

const CREATE_APP: &str = r#"mutation createApp($payload: AppInput!) {
  createApp(payload: $payload) { appId }
}"#;

const UPDATE_APP_BY_VERSION: &str = r#"mutation updateAppByVersion($appId: String!, $version: Int!, $payload: AppVersionInput!) {
  updateAppByVersion(appId: $appId, version: $version, payload: $payload)
}"#;

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    #[serde(default)]
    message: String,
}

/// Paged list wrapper used by the catalog and developer queries
#[derive(Debug, Deserialize)]
struct Page<T> {
    list: Option<Vec<T>>,
}

/// Data service client implementing every port
pub struct GraphqlClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GraphqlClient {
    /// Build a client from service settings.
    ///
    /// The bearer token is read once from the environment variable named by
    /// `api_key_env`; an unset or empty variable means no authentication.
    pub fn new(settings: &ServiceSettings) -> FormResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        let api_key = settings
            .api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty());

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post `document` and return the value of the `operation` field
    async fn execute(&self, operation: &str, document: &str, variables: Value) -> FormResult<Value> {
        debug!(operation, endpoint = %self.endpoint, "Sending GraphQL request");

        let mut request = self.client.post(&self.endpoint).json(&json!({
            "operationName": operation,
            "query": document,
            "variables": variables,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FormError::Transport(format!(
                "{} returned HTTP {}: {}",
                operation,
                status.as_u16(),
                body
            )));
        }

        let body: GraphqlResponse = response.json().await?;
        if let Some(errors) = body.errors.filter(|e| !e.is_empty()) {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(FormError::Remote {
                operation: operation.to_string(),
                message,
            });
        }

        body.data
            .and_then(|mut data| data.get_mut(operation).map(Value::take))
            .ok_or_else(|| FormError::Decode(format!("response has no data for {}", operation)))
    }

    async fn execute_as<T: DeserializeOwned>(
        &self,
        operation: &str,
        document: &str,
        variables: Value,
    ) -> FormResult<T> {
        let value = self.execute(operation, document, variables).await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl AppTypePort for GraphqlClient {
    async fn list_app_types(
        &self,
        page: u32,
        page_size: u32,
        only_enabled: bool,
    ) -> FormResult<Vec<ApplicationTypeSummary>> {
        let page: Option<Page<ApplicationTypeSummary>> = self
            .execute_as(
                "getAppTypes",
                GET_APP_TYPES,
                json!({"pageNumber": page, "limit": page_size, "enabled": only_enabled}),
            )
            .await?;
        Ok(page.and_then(|p| p.list).unwrap_or_default())
    }

    async fn get_app_type(&self, type_id: &str) -> FormResult<ApplicationTypeSchema> {
        let schema: Option<ApplicationTypeSchema> = self
            .execute_as("getAppType", GET_APP_TYPE, json!({"id": type_id}))
            .await?;
        schema.ok_or_else(|| FormError::Remote {
            operation: "getAppType".to_string(),
            message: format!("application type {} not found", type_id),
        })
    }
}

#[async_trait]
impl AppRecordPort for GraphqlClient {
    async fn get_record_version(
        &self,
        record_id: &str,
        version: u32,
    ) -> FormResult<Option<StoredRecord>> {
        self.execute_as(
            "getAppByVersion",
            GET_APP_BY_VERSION,
            json!({"appId": record_id, "version": version}),
        )
        .await
    }

    async fn create_record(&self, payload: &CreateRecordPayload) -> FormResult<CreatedRecord> {
        self.execute_as("createApp", CREATE_APP, json!({"payload": payload}))
            .await
    }

    async fn update_record(
        &self,
        record_id: &str,
        version: u32,
        payload: &UpdateRecordPayload,
    ) -> FormResult<bool> {
        let result = self
            .execute(
                "updateAppByVersion",
                UPDATE_APP_BY_VERSION,
                json!({"appId": record_id, "version": version, "payload": payload}),
            )
            .await?;
        Ok(is_truthy(&result))
    }
}

#[async_trait]
impl OwnerDirectoryPort for GraphqlClient {
    async fn search_owners(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> FormResult<Vec<OwnerCandidate>> {
        let page: Option<Page<OwnerCandidate>> = self
            .execute_as(
                "getDevelopers",
                GET_DEVELOPERS,
                json!({"developerId": query, "pageNumber": page, "limit": page_size}),
            )
            .await?;
        Ok(page.and_then(|p| p.list).unwrap_or_default())
    }
}
