//! HistoryCache - Previously Uploaded Datasets
//!
//! Overlapping refreshes resolve last-started-wins: a response that arrives
//! after a newer refresh began (or after a clear) is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::constants::{MSG_DATASET_FAILED, MSG_HISTORY_FAILED};
use crate::domain::dataset::{DatasetId, DatasetRef};
use crate::domain::equipment::EquipmentRow;
use crate::domain::summary::Summary;
use crate::error::{Error, Result};
use crate::eventing::app_event::{AppEvent, EventBus};
use crate::services::{EquipmentApi, fetch_rows_and_summary};

use super::session_state::DatasetSession;

/// What the history view renders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryState {
    /// In server order (most recent first)
    pub datasets: Vec<DatasetRef>,
    /// A refresh is in flight
    pub loading: bool,
    /// Dataset currently being loaded into the session
    pub loading_dataset: Option<DatasetId>,
    /// Error shown in the history section only
    pub error: Option<String>,
}

/// History list plus loading datasets back into the session
pub struct HistoryCache {
    api: Arc<dyn EquipmentApi>,
    session: DatasetSession,
    events: EventBus,
    state: RwLock<HistoryState>,
    refresh_seq: AtomicU64,
}

impl HistoryCache {
    pub fn new(api: Arc<dyn EquipmentApi>, session: DatasetSession, events: EventBus) -> Self {
        Self {
            api,
            session,
            events,
            state: RwLock::new(HistoryState::default()),
            refresh_seq: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> HistoryState {
        self.state.read().clone()
    }

    pub fn datasets(&self) -> Vec<DatasetRef> {
        self.state.read().datasets.clone()
    }

    /// Fetch the list and replace the cached one wholesale
    ///
    /// Returns [`Error::Cancelled`] when a newer refresh or a clear overtook
    /// this one; the cached list and `loading` then belong to the newer call.
    pub async fn refresh(&self) -> Result<Vec<DatasetRef>> {
        let seq = {
            let mut state = self.state.write();
            state.loading = true;
            state.error = None;
            self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1
        };

        let result = self.api.list_datasets().await;

        let mut state = self.state.write();
        if self.refresh_seq.load(Ordering::SeqCst) != seq {
            tracing::debug!("History refresh #{} overtaken; response dropped", seq);
            return Err(Error::Cancelled {
                operation: "History refresh",
            });
        }
        state.loading = false;
        match result {
            Ok(datasets) => {
                tracing::info!("History refreshed: {} datasets", datasets.len());
                state.datasets = datasets.clone();
                self.events.emit(AppEvent::HistoryUpdated {
                    count: datasets.len(),
                });
                Ok(datasets)
            }
            Err(e) => {
                let message = e.user_message_or(MSG_HISTORY_FAILED);
                tracing::error!("History refresh failed: {}", message);
                state.error = Some(message);
                Err(e)
            }
        }
    }

    /// Load a dataset's rows and summary into the session
    ///
    /// Both halves must arrive; otherwise the session is left alone and the
    /// error lands in this section. A load overtaken by a newer one returns
    /// [`crate::error::Error::Superseded`] without recording an error.
    pub async fn load_dataset(&self, id: &DatasetId) -> Result<(Vec<EquipmentRow>, Summary)> {
        {
            let mut state = self.state.write();
            state.error = None;
            state.loading_dataset = Some(id.clone());
        }

        let ticket = self.session.begin_load();
        let result = fetch_rows_and_summary(self.api.as_ref(), id)
            .await
            .and_then(|(rows, summary)| {
                self.session
                    .replace_if_current(ticket, rows.clone(), Some(summary.clone()), id.clone())
                    .map(|()| (rows, summary))
            });

        let mut state = self.state.write();
        if state.loading_dataset.as_ref() == Some(id) {
            state.loading_dataset = None;
        }
        match result {
            Ok(loaded) => {
                self.events.emit(AppEvent::info(format!("Loaded dataset {id}")));
                Ok(loaded)
            }
            Err(e) if e.is_superseded() => {
                tracing::debug!("Load of dataset {} superseded", id);
                Err(e)
            }
            Err(e) => {
                let message = e.user_message_or(MSG_DATASET_FAILED);
                tracing::error!("Loading dataset {} failed: {}", id, message);
                self.events.emit(AppEvent::error(format!("Failed to load dataset {id}: {message}")));
                state.error = Some(message);
                Err(e)
            }
        }
    }

    /// Forget everything, e.g. on logout
    ///
    /// A refresh still in flight is cancelled.
    pub fn clear(&self) {
        let mut state = self.state.write();
        self.refresh_seq.fetch_add(1, Ordering::SeqCst);
        *state = HistoryState::default();
        drop(state);
        self.events.emit(AppEvent::HistoryUpdated { count: 0 });
    }
}

impl std::fmt::Debug for HistoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryCache")
            .field("state", &*self.state.read())
            .finish()
    }
}
