//! # appform - schema-driven application forms
//!
//! Resolves marketplace application-type schemas into flat, renderable field
//! lists and drives the create/edit workflow around them: debounced owner
//! search with SEARCH/CREATE modes, debounced type selection, and guarded
//! submission of create or update payloads.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use appform::adapters::InMemoryMarketplace;
//! use appform::config::Settings;
//! use appform::domain::PageContext;
//! use appform::workflow::{FormSession, SessionPorts};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let market = InMemoryMarketplace::from_path("fixtures")?;
//!     let ports = SessionPorts::shared(Arc::new(market));
//!
//!     let session = FormSession::open(PageContext::edit("app-7", 2), ports, &settings).await?;
//!     println!("{} fields", session.fields().len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: schema, record and payload types plus the service ports
//! - **Schema form**: flatten, scope, merge defaults, normalize options
//! - **Workflow**: owner mode controller, payload assembly, form sessions
//! - **Adapters**: GraphQL client and fixture-backed marketplace
//! - **Config**: layered settings and validation

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod schema_form;
pub mod workflow;
