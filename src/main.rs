use anyhow::Context;
use appform::adapters::{GraphqlClient, InMemoryMarketplace};
use appform::cli::{Cli, Command, SubmitArgs};
use appform::config::Settings;
use appform::domain::{PageContext, RecordValues};
use appform::schema_form::SchemaResolutionEngine;
use appform::workflow::{FormSession, SessionPorts};
use clap::Parser;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the JSON result
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;
    let ports = build_ports(&settings)?;

    let output = match &cli.command {
        Command::Types => {
            let session = FormSession::open_new(ports, &settings).await;
            let types = json!(session.app_types());
            session.close().await;
            types
        }
        Command::Fields { app_type } => {
            let schema = ports
                .app_types
                .get_app_type(app_type)
                .await
                .with_context(|| format!("Failed to fetch application type {}", app_type))?;
            let engine = SchemaResolutionEngine::new(settings.schema.clone());
            let fields = engine.try_resolve(&schema, &RecordValues::empty())?;
            json!(fields)
        }
        Command::Edit { app_id, version } => {
            let session = open(PageContext::edit(app_id, *version), ports, &settings).await?;
            let output = json!({
                "form": session.initial_shape(),
                "fields": session.fields(),
            });
            session.close().await;
            output
        }
        Command::Owner { text } => owner_lookup(text, ports, &settings).await?,
        Command::Submit(args) => submit(args, ports, &settings).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn build_ports(settings: &Settings) -> anyhow::Result<SessionPorts> {
    match &settings.fixtures {
        Some(path) => {
            info!("Serving fixtures from {}", path.display());
            let market = InMemoryMarketplace::from_path(path)?;
            Ok(SessionPorts::shared(Arc::new(market)))
        }
        None => {
            info!("Using data service at {}", settings.service.endpoint);
            let client = GraphqlClient::new(&settings.service)?;
            Ok(SessionPorts::shared(Arc::new(client)))
        }
    }
}

async fn open(
    context: PageContext,
    ports: SessionPorts,
    settings: &Settings,
) -> anyhow::Result<FormSession> {
    match FormSession::open(context, ports, settings).await {
        Ok(session) => Ok(session),
        Err(e) => match e.navigation() {
            Some(navigation) => Err(anyhow::anyhow!("{} (return to {})", e, navigation.route())),
            None => Err(e.into()),
        },
    }
}

async fn owner_lookup(
    text: &str,
    ports: SessionPorts,
    settings: &Settings,
) -> anyhow::Result<Value> {
    let session = FormSession::open_new(ports, settings).await;
    let controller = session
        .owner_controller()
        .context("New sessions always search owners")?;
    let mut updates = controller.subscribe();

    session.owner_input(text).await;
    let deadline = settings.workflow.debounce() + Duration::from_secs(settings.service.timeout_seconds);
    if tokio::time::timeout(deadline, updates.changed()).await.is_err() {
        warn!("Owner lookup did not finish within {:?}", deadline);
    }

    let snapshot = controller.snapshot();
    session.close().await;
    Ok(json!({
        "mode": snapshot.mode,
        "description": snapshot.mode.description(),
        "suggestions": snapshot.suggestions,
    }))
}

async fn submit(args: &SubmitArgs, ports: SessionPorts, settings: &Settings) -> anyhow::Result<Value> {
    let (context, shape) = args.target().map_err(anyhow::Error::msg)?;
    let values: Map<String, Value> = match &args.values {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("{} is not a JSON object", path.display()))?
        }
        None => Map::new(),
    };

    let session = open(context, ports, settings).await?;
    let outcome = session.submit(shape, values).await?;
    Ok(json!({
        "navigation": outcome.navigation.route(),
        "created": outcome.created,
    }))
}
