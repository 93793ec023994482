//! Owner search / create mode controller
//!
//! Free-text developer-id input is debounced, looked up against the owner
//! directory, and toggles the session between searching for an existing
//! owner and creating a new one.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::debounce::{DebouncedInput, RequestTicket};
use crate::config::WorkflowSettings;
use crate::domain::{FormResult, OwnerCandidate, OwnerDirectoryPort};

/// Whether the owner input targets an existing or a new developer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OwnerMode {
    #[default]
    Search,
    Create,
}

impl OwnerMode {
    /// Prompt shown next to the owner input
    pub fn description(&self) -> &'static str {
        match self {
            OwnerMode::Search => "Developer ID : ",
            OwnerMode::Create => "Create new Developer with ID : ",
        }
    }
}

impl std::fmt::Display for OwnerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerMode::Search => write!(f, "SEARCH"),
            OwnerMode::Create => write!(f, "CREATE"),
        }
    }
}

/// What the autocomplete widget shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSearchSnapshot {
    pub mode: OwnerMode,
    pub query: String,
    pub suggestions: Vec<String>,
}

/// Pure state of the owner search; the controller drives it
#[derive(Debug, Default)]
pub struct OwnerSearchState {
    pub(crate) input: DebouncedInput,
    snapshot: OwnerSearchSnapshot,
}

impl OwnerSearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &OwnerSearchSnapshot {
        &self.snapshot
    }

    /// Apply the outcome of the lookup started for `ticket`.
    ///
    /// Returns false, leaving the state untouched, when a later value has
    /// been accepted since.
    pub fn apply_lookup(
        &mut self,
        ticket: RequestTicket,
        query: &str,
        result: FormResult<Vec<OwnerCandidate>>,
    ) -> bool {
        if !self.input.is_current(ticket) {
            return false;
        }

        self.snapshot.query = query.to_string();
        match result {
            Ok(candidates) if candidates.is_empty() => {
                let normalized = query.trim();
                if normalized.is_empty() {
                    self.snapshot.suggestions.clear();
                } else {
                    self.snapshot.mode = OwnerMode::Create;
                    self.snapshot.suggestions = vec![normalized.to_string()];
                }
            }
            Ok(candidates) => {
                self.snapshot.mode = OwnerMode::Search;
                self.snapshot.suggestions = candidates.into_iter().map(|c| c.developer_id).collect();
            }
            Err(_) => {
                self.snapshot.suggestions.clear();
            }
        }
        true
    }

    pub fn reset_mode(&mut self) {
        self.snapshot.mode = OwnerMode::Search;
    }
}

/// Drives [`OwnerSearchState`] from a stream of input edits.
///
/// Each edit spawns a task that waits out the debounce window, performs the
/// lookup if its value was accepted, and publishes the new snapshot if no
/// later value was accepted meanwhile.
pub struct WorkflowModeController {
    owners: Arc<dyn OwnerDirectoryPort>,
    state: Arc<Mutex<OwnerSearchState>>,
    updates: Arc<watch::Sender<OwnerSearchSnapshot>>,
    tasks: Mutex<JoinSet<()>>,
    debounce: Duration,
    page_size: u32,
}

impl WorkflowModeController {
    pub fn new(owners: Arc<dyn OwnerDirectoryPort>, settings: &WorkflowSettings) -> Self {
        let (updates, _) = watch::channel(OwnerSearchSnapshot::default());
        Self {
            owners,
            state: Arc::new(Mutex::new(OwnerSearchState::new())),
            updates: Arc::new(updates),
            tasks: Mutex::new(JoinSet::new()),
            debounce: settings.debounce(),
            page_size: settings.owner_page_size,
        }
    }

    /// Current mode and suggestions
    pub fn snapshot(&self) -> OwnerSearchSnapshot {
        self.updates.borrow().clone()
    }

    /// Receive every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<OwnerSearchSnapshot> {
        self.updates.subscribe()
    }

    /// Feed one edit of the owner input
    pub async fn on_input(&self, text: impl Into<String>) {
        let text = text.into();
        let ticket = {
            let mut state = self.state.lock().await;
            if state.input.is_closed() {
                debug!("Ignoring owner input on a closed controller");
                return;
            }
            state.input.edit()
        };

        let owners = self.owners.clone();
        let state = self.state.clone();
        let updates = self.updates.clone();
        let debounce = self.debounce;
        let page_size = self.page_size;

        let mut tasks = self.tasks.lock().await;
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            tokio::time::sleep(debounce).await;

            let Some(request) = state.lock().await.input.settle(ticket, &text) else {
                return;
            };

            debug!(query = %text, "Looking up developer ids");
            let result = owners.search_owners(&text, 1, page_size).await;
            if let Err(e) = &result {
                error!(query = %text, "Can't get developer ids: {}", e);
            }

            let mut state = state.lock().await;
            if state.apply_lookup(request, &text, result) {
                let snapshot = state.snapshot().clone();
                debug!(mode = %snapshot.mode, suggestions = snapshot.suggestions.len(), "Owner search updated");
                updates.send_replace(snapshot);
            } else {
                debug!(query = %text, "Discarding superseded lookup");
            }
        });
    }

    /// Back to SEARCH, keeping the current suggestions
    pub async fn reset_mode(&self) {
        let mut state = self.state.lock().await;
        state.reset_mode();
        self.updates.send_replace(state.snapshot().clone());
        info!("Owner mode reset to {}", OwnerMode::Search);
    }

    /// Abort pending lookups; no later completion can change the snapshot
    pub async fn shutdown(&self) {
        self.state.lock().await.input.close();
        self.tasks.lock().await.abort_all();
    }
}
