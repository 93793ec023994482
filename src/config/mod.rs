use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod validator;

use crate::cli::Cli;
use crate::schema_form::{DefaultPolicy, CUSTOM_DATA_PREFIX, DEFAULT_MAX_DEPTH};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub workflow: WorkflowSettings,
    #[serde(default)]
    pub schema: SchemaSettings,
    /// Fixture file or directory; when set the in-memory marketplace replaces
    /// the remote data service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixtures: Option<PathBuf>,
}

/// Remote data service connection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceSettings {
    /// GraphQL endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Environment variable holding a bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout(),
            api_key_env: None,
        }
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:4000/graphql".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Owner search and type selection timing/paging
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowSettings {
    /// Quiescence window for free-text input, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Matches requested per owner lookup
    #[serde(default = "default_owner_page_size")]
    pub owner_page_size: u32,
    /// Catalog entries requested when a NEW session opens
    #[serde(default = "default_app_type_page_size")]
    pub app_type_page_size: u32,
    /// Restrict the catalog to enabled application types
    #[serde(default = "default_enabled")]
    pub only_enabled_types: bool,
}

impl WorkflowSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            owner_page_size: default_owner_page_size(),
            app_type_page_size: default_app_type_page_size(),
            only_enabled_types: default_enabled(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_owner_page_size() -> u32 {
    20
}

fn default_app_type_page_size() -> u32 {
    100
}

fn default_enabled() -> bool {
    true
}

/// Schema resolution behavior
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SchemaSettings {
    /// Path prefix of fields stored in a record's custom data
    #[serde(default = "default_prefix")]
    pub custom_data_prefix: String,
    /// Deepest nesting level accepted in a field tree
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Which stored values become field defaults
    #[serde(default)]
    pub default_policy: DefaultPolicy,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            custom_data_prefix: default_prefix(),
            max_depth: default_max_depth(),
            default_policy: DefaultPolicy::default(),
        }
    }
}

fn default_prefix() -> String {
    CUSTOM_DATA_PREFIX.to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (config file plus CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(File::from(cli.config.clone()).required(false))?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);
        settings.validate()?;

        Ok(settings)
    }

    /// Load `appform.{toml,yaml,json}` from `root`, if present
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let config_path = root.as_ref().join("appform");
        let settings = Self::load(File::from(config_path).required(false))?;
        settings.validate()?;
        Ok(settings)
    }

    fn load<S>(source: S) -> Result<Self, anyhow::Error>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let s = Config::builder()
            .add_source(source)
            .set_default("service.endpoint", default_endpoint())?
            .set_default("service.timeout_seconds", default_timeout() as i64)?
            .build()?;

        Ok(s.try_deserialize()?)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(endpoint) = &cli.endpoint {
            self.service.endpoint = endpoint.clone();
        }
        if let Some(fixtures) = &cli.fixtures {
            self.fixtures = Some(fixtures.clone());
        }
        if let Some(debounce_ms) = cli.debounce_ms {
            self.workflow.debounce_ms = debounce_ms;
        }
        if let Some(policy) = cli.default_policy {
            self.schema.default_policy = policy;
        }
    }
}
