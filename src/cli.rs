use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::{FormShape, PageContext};
use crate::schema_form::DefaultPolicy;

/// Resolve application forms and drive create/edit submissions against the
/// marketplace data service
#[derive(Parser, Debug, Clone)]
#[command(name = "appform", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "APPFORM_CONFIG", default_value = "appform.toml")]
    pub config: PathBuf,

    /// GraphQL endpoint of the data service
    #[arg(long, env = "APPFORM_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Fixture file or directory served instead of the data service
    #[arg(long, env = "APPFORM_FIXTURES")]
    pub fixtures: Option<PathBuf>,

    /// Quiescence window for owner and type input, in milliseconds
    #[arg(long, env = "APPFORM_DEBOUNCE_MS")]
    pub debounce_ms: Option<u64>,

    /// Which stored values become field defaults (truthy or presence)
    #[arg(long, env = "APPFORM_DEFAULT_POLICY")]
    pub default_policy: Option<DefaultPolicy>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List selectable application types
    Types,
    /// Resolve the fields of an application type with no stored values
    Fields {
        #[arg(long = "type")]
        app_type: String,
    },
    /// Open a record version for editing and print its prefilled form
    Edit {
        #[arg(long)]
        app_id: String,
        #[arg(long)]
        version: u32,
    },
    /// Look up developer ids and print the resulting owner mode
    Owner { text: String },
    /// Submit a new record or an edited record version
    Submit(SubmitArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
#[command(group(ArgGroup::new("target").required(true).args(["app_type", "app_id"])))]
pub struct SubmitArgs {
    /// Application type of a new record
    #[arg(long = "type")]
    pub app_type: Option<String>,

    /// Record to update
    #[arg(long, requires_all = ["version", "name", "safe_name"])]
    pub app_id: Option<String>,

    #[arg(long)]
    pub version: Option<u32>,

    /// Display name of the updated record
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub safe_name: Option<String>,

    /// JSON object of dynamic field values
    #[arg(long)]
    pub values: Option<PathBuf>,
}

impl SubmitArgs {
    /// Page context and static form values described by the arguments
    pub fn target(&self) -> Result<(PageContext, FormShape), String> {
        match (&self.app_type, &self.app_id) {
            (Some(app_type), None) => Ok((PageContext::New, FormShape::new_record(app_type))),
            (None, Some(app_id)) => {
                let (Some(version), Some(name), Some(safe_name)) =
                    (self.version, &self.name, &self.safe_name)
                else {
                    return Err("--app-id needs --version, --name and --safe-name".to_string());
                };
                Ok((
                    PageContext::edit(app_id, version),
                    FormShape::edit_record(name, safe_name),
                ))
            }
            _ => Err("pass either --type or --app-id".to_string()),
        }
    }
}
