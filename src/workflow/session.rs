//! Form session
//!
//! One `FormSession` holds everything a create/edit form needs between
//! opening and submission: the page context, the resolved field list, the
//! owner search controller (NEW only), the submission guard and every task it
//! spawned. Closing the session aborts those tasks so no late completion can
//! touch it.

use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::debounce::DebouncedInput;
use super::owner_search::{OwnerSearchSnapshot, WorkflowModeController};
use super::payload::PayloadAssembler;
use crate::config::{Settings, WorkflowSettings};
use crate::domain::{
    AppRecordPort, AppTypePort, ApplicationTypeSchema, CreatedRecord, FormError, FormResult,
    FormShape, Navigation, OutboundPayload, OwnerDirectoryPort, PageContext, RecordValues,
    RenderableField,
};
use crate::schema_form::SchemaResolutionEngine;

/// The collaborators a session talks to
#[derive(Clone)]
pub struct SessionPorts {
    pub app_types: Arc<dyn AppTypePort>,
    pub records: Arc<dyn AppRecordPort>,
    pub owners: Arc<dyn OwnerDirectoryPort>,
}

impl SessionPorts {
    /// Use one service for all three ports
    pub fn shared<P>(service: Arc<P>) -> Self
    where
        P: AppTypePort + AppRecordPort + OwnerDirectoryPort + 'static,
    {
        Self {
            app_types: service.clone(),
            records: service.clone(),
            owners: service,
        }
    }
}

/// Successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    pub navigation: Navigation,
    /// Set for NEW sessions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<CreatedRecord>,
}

/// Clears the submission flag however the submit future ends
struct SubmissionGuard<'a>(&'a AtomicBool);

impl<'a> SubmissionGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct FormSession {
    id: Uuid,
    context: PageContext,
    ports: SessionPorts,
    engine: SchemaResolutionEngine,
    debounce: Duration,
    initial_shape: Option<FormShape>,
    app_types: Vec<String>,
    owner: Option<WorkflowModeController>,
    type_selection: Arc<Mutex<DebouncedInput>>,
    fields: Arc<watch::Sender<Vec<RenderableField>>>,
    submitting: AtomicBool,
    closed: AtomicBool,
    tasks: Mutex<JoinSet<()>>,
}

impl FormSession {
    /// Open a session for `context`
    pub async fn open(
        context: PageContext,
        ports: SessionPorts,
        settings: &Settings,
    ) -> FormResult<Self> {
        match context {
            PageContext::New => Ok(Self::open_new(ports, settings).await),
            PageContext::Edit { record_id, version } => {
                Self::open_edit(ports, settings, record_id, version).await
            }
        }
    }

    /// Start a NEW session: fetch the application-type catalog and wait for a
    /// type to be selected
    pub async fn open_new(ports: SessionPorts, settings: &Settings) -> Self {
        let app_types = load_catalog(ports.app_types.as_ref(), &settings.workflow).await;
        let owner = WorkflowModeController::new(ports.owners.clone(), &settings.workflow);

        let session = Self::build(PageContext::New, ports, settings, None, Vec::new());
        info!(
            session_id = %session.id,
            app_types = app_types.len(),
            "Opened new application session"
        );
        Self {
            app_types,
            owner: Some(owner),
            ..session
        }
    }

    /// Start an EDIT session: load the record version, then its type's schema.
    ///
    /// A missing record or a failed fetch ends the session before it starts;
    /// the error's [`FormError::navigation`] says where to go.
    pub async fn open_edit(
        ports: SessionPorts,
        settings: &Settings,
        record_id: impl Into<String>,
        version: u32,
    ) -> FormResult<Self> {
        let record_id = record_id.into();
        let unavailable = || FormError::RecordUnavailable {
            record_id: record_id.clone(),
            version,
        };

        let record = match ports.records.get_record_version(&record_id, version).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                error!(record_id = %record_id, version, "Record request returned an empty response");
                return Err(unavailable());
            }
            Err(e) => {
                error!(record_id = %record_id, version, "Record request failed: {}", e);
                return Err(unavailable());
            }
        };

        let engine = SchemaResolutionEngine::new(settings.schema.clone());
        let values = RecordValues::from_custom_data(record.custom_data.as_ref());
        let fields = engine
            .load(
                fetch_schema(ports.app_types.as_ref(), &record.app_type),
                async { Some(values) },
            )
            .await;

        let shape = FormShape::edit_record(record.name, record.safe_name);
        let session = Self::build(
            PageContext::edit(record_id, version),
            ports,
            settings,
            Some(shape),
            fields,
        );
        info!(
            session_id = %session.id,
            context = %session.context,
            fields = session.fields.borrow().len(),
            "Opened edit session"
        );
        Ok(session)
    }

    fn build(
        context: PageContext,
        ports: SessionPorts,
        settings: &Settings,
        initial_shape: Option<FormShape>,
        fields: Vec<RenderableField>,
    ) -> Self {
        let (fields, _) = watch::channel(fields);
        Self {
            id: Uuid::new_v4(),
            context,
            ports,
            engine: SchemaResolutionEngine::new(settings.schema.clone()),
            debounce: settings.workflow.debounce(),
            initial_shape,
            app_types: Vec::new(),
            owner: None,
            type_selection: Arc::new(Mutex::new(DebouncedInput::new())),
            fields: Arc::new(fields),
            submitting: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    /// Selectable application type ids (NEW sessions)
    pub fn app_types(&self) -> &[String] {
        &self.app_types
    }

    /// Static values prefilled from the record (EDIT sessions)
    pub fn initial_shape(&self) -> Option<&FormShape> {
        self.initial_shape.as_ref()
    }

    /// Fields to render right now
    pub fn fields(&self) -> Vec<RenderableField> {
        self.fields.borrow().clone()
    }

    /// Receive every new field list
    pub fn subscribe_fields(&self) -> watch::Receiver<Vec<RenderableField>> {
        self.fields.subscribe()
    }

    /// Owner search state (NEW sessions)
    pub fn owner_search(&self) -> Option<OwnerSearchSnapshot> {
        self.owner.as_ref().map(WorkflowModeController::snapshot)
    }

    pub fn owner_controller(&self) -> Option<&WorkflowModeController> {
        self.owner.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Feed an edit of the owner input
    pub async fn owner_input(&self, text: impl Into<String>) {
        match &self.owner {
            Some(owner) if !self.is_closed() => owner.on_input(text).await,
            _ => debug!(session_id = %self.id, "Ignoring owner input"),
        }
    }

    /// Select an application type (NEW sessions).
    ///
    /// Debounced and deduplicated like the owner input. An empty id clears
    /// the field list; otherwise the type's schema is fetched and resolved
    /// with no stored values. Only the latest accepted selection publishes.
    pub async fn select_app_type(&self, type_id: impl Into<String>) {
        if !self.context.is_new() || self.is_closed() {
            debug!(session_id = %self.id, "Ignoring application type selection");
            return;
        }

        let type_id = type_id.into();
        let ticket = self.type_selection.lock().await.edit();

        let selection = self.type_selection.clone();
        let fields = self.fields.clone();
        let app_types = self.ports.app_types.clone();
        let engine = self.engine.clone();
        let debounce = self.debounce;

        let mut tasks = self.tasks.lock().await;
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            tokio::time::sleep(debounce).await;

            let request = {
                let mut selection = selection.lock().await;
                let Some(request) = selection.settle(ticket, &type_id) else {
                    return;
                };
                fields.send_replace(Vec::new());
                request
            };
            if type_id.is_empty() {
                return;
            }

            let resolved = engine
                .load(fetch_schema(app_types.as_ref(), &type_id), async {
                    Some(RecordValues::empty())
                })
                .await;

            // check and publish under one lock
            let selection = selection.lock().await;
            if selection.is_current(request) {
                debug!(type_id = %type_id, fields = resolved.len(), "Fields resolved for type");
                fields.send_replace(resolved);
            } else {
                debug!(type_id = %type_id, "Discarding superseded type selection");
            }
        });
    }

    /// Submit the form.
    ///
    /// Only one submission may be in flight; a concurrent call fails with
    /// [`FormError::SubmissionInProgress`] without reaching the service. On
    /// success the session closes and the host should follow the returned
    /// navigation. On failure the owner mode goes back to SEARCH.
    pub async fn submit(
        &self,
        shape: FormShape,
        values: Map<String, Value>,
    ) -> FormResult<SubmitOutcome> {
        if self.is_closed() {
            return Err(FormError::SessionClosed);
        }
        let Some(guard) = SubmissionGuard::acquire(&self.submitting) else {
            warn!(session_id = %self.id, "Submission already in progress");
            return Err(FormError::SubmissionInProgress);
        };

        let result = self.dispatch(&shape, &values).await;
        drop(guard);

        match result {
            Ok(outcome) => {
                info!(session_id = %self.id, context = %self.context, "Application saved");
                self.close().await;
                Ok(outcome)
            }
            Err(e) => {
                error!(session_id = %self.id, context = %self.context, "Can't save application: {}", e);
                if let Some(owner) = &self.owner {
                    owner.reset_mode().await;
                }
                Err(e)
            }
        }
    }

    async fn dispatch(
        &self,
        shape: &FormShape,
        values: &Map<String, Value>,
    ) -> FormResult<SubmitOutcome> {
        let payload = PayloadAssembler::assemble(&self.context, shape, values)?;
        let rejected = |e: FormError| FormError::SubmissionRejected {
            reason: e.to_string(),
        };

        match (&self.context, payload) {
            (PageContext::New, OutboundPayload::Create(body)) => {
                let created = self.ports.records.create_record(&body).await.map_err(rejected)?;
                Ok(SubmitOutcome {
                    navigation: Navigation::ApplicationList,
                    created: Some(created),
                })
            }
            (PageContext::Edit { record_id, version }, OutboundPayload::Update(body)) => {
                let accepted = self
                    .ports
                    .records
                    .update_record(record_id, *version, &body)
                    .await
                    .map_err(rejected)?;
                if !accepted {
                    return Err(FormError::SubmissionRejected {
                        reason: "service refused the update".to_string(),
                    });
                }
                Ok(SubmitOutcome {
                    navigation: Navigation::ApplicationList,
                    created: None,
                })
            }
            (context, _) => Err(FormError::ShapeMismatch(format!(
                "payload does not fit a {} session",
                context
            ))),
        }
    }

    /// Tear the session down, aborting every pending lookup
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.type_selection.lock().await.close();
        if let Some(owner) = &self.owner {
            owner.shutdown().await;
        }
        self.tasks.lock().await.abort_all();
        debug!(session_id = %self.id, "Session closed");
    }
}

/// Fetch the catalog, dropping entries without an id. Failures yield an
/// empty catalog.
async fn load_catalog(app_types: &dyn AppTypePort, settings: &WorkflowSettings) -> Vec<String> {
    match app_types
        .list_app_types(1, settings.app_type_page_size, settings.only_enabled_types)
        .await
    {
        Ok(list) => list
            .into_iter()
            .filter_map(|t| t.id)
            .filter(|id| !id.is_empty())
            .collect(),
        Err(e) => {
            error!("Can't get application types: {}", e);
            Vec::new()
        }
    }
}

/// Fetch one schema; failures are logged and yield `None`
async fn fetch_schema(app_types: &dyn AppTypePort, type_id: &str) -> Option<ApplicationTypeSchema> {
    match app_types.get_app_type(type_id).await {
        Ok(schema) => Some(schema),
        Err(e) => {
            error!(type_id = %type_id, "Can't get application type fields: {}", e);
            None
        }
    }
}
