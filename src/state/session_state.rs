//! DatasetSession - The Currently Displayed Dataset
//!
//! Rows, summary and dataset id are only ever swapped together, so a reader
//! can never pair rows from one dataset with the summary of another. Every
//! writer goes through [`DatasetSession::replace`], [`DatasetSession::replace_if_current`]
//! or [`DatasetSession::clear`].

use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::chart::{ChartData, derive_chart_series};
use crate::domain::dataset::DatasetId;
use crate::domain::equipment::EquipmentRow;
use crate::domain::summary::Summary;
use crate::error::{Error, Result};
use crate::eventing::app_event::{AppEvent, EventBus};

/// One consistent view of the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub rows: Vec<EquipmentRow>,
    pub summary: Option<Summary>,
    pub dataset_id: Option<DatasetId>,
}

impl Session {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.summary.is_none() && self.dataset_id.is_none()
    }

    /// Chart series for the current summary
    pub fn chart_data(&self) -> ChartData {
        derive_chart_series(self.summary.as_ref())
    }
}

/// Proof that a load was started; commits only while it is the newest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    current: Arc<Session>,
    /// Last sequence number handed out; any write bumps it
    seq: u64,
}

/// Shared handle to the session
#[derive(Clone, Debug)]
pub struct DatasetSession {
    inner: Arc<RwLock<Inner>>,
    events: EventBus,
}

impl DatasetSession {
    pub fn new(events: EventBus) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            events,
        }
    }

    /// Current session; cheap to clone and never partially updated
    pub fn snapshot(&self) -> Arc<Session> {
        self.inner.read().current.clone()
    }

    pub fn dataset_id(&self) -> Option<DatasetId> {
        self.inner.read().current.dataset_id.clone()
    }

    /// Replace rows, summary and id in one step
    pub fn replace(
        &self,
        rows: Vec<EquipmentRow>,
        summary: Option<Summary>,
        dataset_id: Option<DatasetId>,
    ) {
        let mut inner = self.inner.write();
        inner.seq += 1;
        Self::install(&mut inner, &self.events, rows, summary, dataset_id);
    }

    /// Reset to the empty session and invalidate every outstanding ticket
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.seq += 1;
        inner.current = Arc::new(Session::default());
        tracing::info!("Dataset session cleared");
        self.events.emit(AppEvent::SessionChanged {
            dataset_id: None,
            rows: 0,
        });
    }

    /// Start a load; any older ticket stops being current
    pub fn begin_load(&self) -> LoadTicket {
        let mut inner = self.inner.write();
        inner.seq += 1;
        LoadTicket { seq: inner.seq }
    }

    /// Replace only if no newer load, replace or clear happened since `ticket`
    pub fn replace_if_current(
        &self,
        ticket: LoadTicket,
        rows: Vec<EquipmentRow>,
        summary: Option<Summary>,
        dataset_id: DatasetId,
    ) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.seq != ticket.seq {
            tracing::debug!("Dropping stale load of dataset {}", dataset_id);
            return Err(Error::Superseded { dataset_id });
        }
        Self::install(&mut inner, &self.events, rows, summary, Some(dataset_id));
        Ok(())
    }

    fn install(
        inner: &mut Inner,
        events: &EventBus,
        rows: Vec<EquipmentRow>,
        summary: Option<Summary>,
        dataset_id: Option<DatasetId>,
    ) {
        let row_count = rows.len();
        inner.current = Arc::new(Session {
            rows,
            summary,
            dataset_id: dataset_id.clone(),
        });
        tracing::info!(
            "Dataset session replaced: dataset {:?}, {} rows",
            dataset_id.as_ref().map(DatasetId::as_str),
            row_count
        );
        events.emit(AppEvent::SessionChanged {
            dataset_id,
            rows: row_count,
        });
    }
}

impl Default for DatasetSession {
    fn default() -> Self {
        Self::new(EventBus::detached())
    }
}
