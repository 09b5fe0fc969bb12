//! UploadWorkflow - CSV Upload State Machine
//!
//! ```text
//! Idle ──select──▶ FileSelected ──submit──▶ Submitting ──▶ Fetching ──▶ Done
//!                       ▲                        │             │
//!                       └──── select ──── Error ◀┴─────────────┘
//! ```
//!
//! The selected file survives a failure so the user can retry. A
//! [`UploadWorkflow::reset`] while a request is in flight cancels it: the
//! late result is dropped and never written back.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::constants::{MSG_NO_FILE, MSG_NOT_CSV, MSG_UPLOAD_BUSY, MSG_UPLOAD_FAILED};
use crate::domain::dataset::DatasetId;
use crate::error::{Error, Result};
use crate::eventing::app_event::{AppEvent, EventBus};
use crate::services::{CsvFile, EquipmentApi, fetch_rows_and_summary};

use super::session_state::DatasetSession;

/// Upload phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    FileSelected,
    Submitting,
    Fetching,
    Done,
    Error,
}

impl UploadPhase {
    pub fn label(&self) -> &'static str {
        match self {
            UploadPhase::Idle => "idle",
            UploadPhase::FileSelected => "file selected",
            UploadPhase::Submitting => "uploading",
            UploadPhase::Fetching => "fetching results",
            UploadPhase::Done => "done",
            UploadPhase::Error => "error",
        }
    }

    /// A request is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, UploadPhase::Submitting | UploadPhase::Fetching)
    }
}

/// Snapshot of the workflow
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadState {
    pub phase: UploadPhase,
    pub file: Option<CsvFile>,
    pub error: Option<String>,
    /// Dataset created by the last successful upload
    pub last_dataset_id: Option<DatasetId>,
}

/// Result of a submit that reached the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub dataset_id: DatasetId,
    /// False when a newer load took the session before this upload's data arrived
    pub published: bool,
}

pub struct UploadWorkflow {
    api: Arc<dyn EquipmentApi>,
    session: DatasetSession,
    events: EventBus,
    state: Mutex<UploadState>,
    /// Bumped by every reset; a submit only writes back under its own generation
    generation: AtomicU64,
}

impl UploadWorkflow {
    pub fn new(api: Arc<dyn EquipmentApi>, session: DatasetSession, events: EventBus) -> Self {
        Self {
            api,
            session,
            events,
            state: Mutex::new(UploadState::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> UploadState {
        self.state.lock().clone()
    }

    pub fn phase(&self) -> UploadPhase {
        self.state.lock().phase
    }

    /// Pick the file to upload
    ///
    /// A non-CSV file is refused and the previous selection kept.
    pub fn select_file(&self, file: CsvFile) -> Result<()> {
        let mut state = self.state.lock();
        if state.phase.is_busy() {
            return Err(Error::validation(MSG_UPLOAD_BUSY));
        }
        if !file.has_csv_extension() {
            state.error = Some(MSG_NOT_CSV.to_string());
            return Err(Error::validation(MSG_NOT_CSV));
        }

        tracing::info!("Selected {} ({} bytes)", file.file_name, file.len());
        state.file = Some(file);
        state.error = None;
        self.set_phase(&mut state, UploadPhase::FileSelected);
        Ok(())
    }

    /// Upload the selected file and load the resulting dataset into the session
    pub async fn submit(&self) -> Result<UploadOutcome> {
        let (file, generation) = {
            let mut state = self.state.lock();
            if state.phase.is_busy() {
                return Err(Error::validation(MSG_UPLOAD_BUSY));
            }
            let Some(file) = state.file.clone() else {
                state.error = Some(MSG_NO_FILE.to_string());
                self.set_phase(&mut state, UploadPhase::Error);
                return Err(Error::validation(MSG_NO_FILE));
            };
            state.error = None;
            self.set_phase(&mut state, UploadPhase::Submitting);
            (file, self.generation.load(Ordering::SeqCst))
        };

        let result = self.run(&file, generation).await;
        let mut state = self.state.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            drop(state);
            tracing::info!("Upload of {} finished after a reset; result dropped", file.file_name);
            return Err(Error::Cancelled { operation: "Upload" });
        }

        match result {
            Ok(outcome) => {
                state.file = None;
                state.last_dataset_id = Some(outcome.dataset_id.clone());
                self.set_phase(&mut state, UploadPhase::Done);
                drop(state);
                self.events.emit(AppEvent::info(format!(
                    "Uploaded {} as dataset {}",
                    file.file_name, outcome.dataset_id
                )));
                Ok(outcome)
            }
            Err(e) => {
                let message = e.user_message_or(MSG_UPLOAD_FAILED);
                tracing::error!("Upload of {} failed: {}", file.file_name, message);
                state.error = Some(message.clone());
                self.set_phase(&mut state, UploadPhase::Error);
                drop(state);
                self.events.emit(AppEvent::error(format!("Upload failed: {message}")));
                Err(e)
            }
        }
    }

    async fn run(&self, file: &CsvFile, generation: u64) -> Result<UploadOutcome> {
        let receipt = self.api.upload(file).await?;
        let dataset_id = receipt.dataset_id;

        let ticket = {
            let mut state = self.state.lock();
            if self.generation.load(Ordering::SeqCst) != generation {
                return Err(Error::Cancelled { operation: "Upload" });
            }
            self.set_phase(&mut state, UploadPhase::Fetching);
            self.session.begin_load()
        };

        let (rows, summary) = fetch_rows_and_summary(self.api.as_ref(), &dataset_id).await?;
        match self
            .session
            .replace_if_current(ticket, rows, Some(summary), dataset_id.clone())
        {
            Ok(()) => Ok(UploadOutcome {
                dataset_id,
                published: true,
            }),
            Err(e) if e.is_superseded() => {
                tracing::info!("Upload of dataset {} finished after a newer load", dataset_id);
                Ok(UploadOutcome {
                    dataset_id,
                    published: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Back to idle, forgetting the file and any error
    ///
    /// An upload still in flight is cancelled.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if state.phase.is_busy() {
            tracing::warn!("Resetting upload workflow while a request is in flight");
        }
        *state = UploadState::default();
        self.events.emit(AppEvent::UploadPhaseChanged {
            phase: UploadPhase::Idle,
        });
    }

    fn set_phase(&self, state: &mut UploadState, phase: UploadPhase) {
        tracing::debug!("Upload phase: {} -> {}", state.phase.label(), phase.label());
        state.phase = phase;
        self.events.emit(AppEvent::UploadPhaseChanged { phase });
    }
}

impl std::fmt::Debug for UploadWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadWorkflow")
            .field("state", &*self.state.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fake::FakeApi;
    use serde_json::json;

    fn workflow_with(api: Arc<FakeApi>) -> (Arc<UploadWorkflow>, DatasetSession) {
        let session = DatasetSession::default();
        let workflow = UploadWorkflow::new(api, session.clone(), EventBus::detached());
        (Arc::new(workflow), session)
    }

    fn csv() -> CsvFile {
        CsvFile::new("plant.csv", b"Equipment Name,Type\nP-1,Pump\n".to_vec())
    }

    #[tokio::test]
    async fn test_submit_without_file_is_validation_error() {
        let api = Arc::new(FakeApi::new());
        let (workflow, _) = workflow_with(api.clone());

        let err = workflow.submit().await.expect_err("no file");
        assert!(matches!(err, Error::Validation { .. }));
        let state = workflow.state();
        assert_eq!(state.phase, UploadPhase::Error);
        assert_eq!(state.error.as_deref(), Some(MSG_NO_FILE));
        assert_eq!(api.upload_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_upload_replaces_session() {
        let api = Arc::new(FakeApi::new());
        api.put_dataset("12", FakeApi::pump_rows(), FakeApi::pump_summary());
        api.accept_upload("12");
        let (workflow, session) = workflow_with(api);

        workflow.select_file(csv()).expect("select");
        let outcome = workflow.submit().await.expect("submit");
        assert_eq!(outcome.dataset_id, DatasetId::from("12"));
        assert!(outcome.published);

        let state = workflow.state();
        assert_eq!(state.phase, UploadPhase::Done);
        assert!(state.file.is_none());
        assert!(state.error.is_none());

        let snap = session.snapshot();
        assert_eq!(snap.rows.len(), 2);
        assert_eq!(snap.summary, Some(FakeApi::pump_summary()));
        assert_eq!(snap.dataset_id, Some(DatasetId::from("12")));
    }

    #[tokio::test]
    async fn test_rejected_upload_keeps_file_and_session() {
        let api = Arc::new(FakeApi::new());
        api.reject_upload(json!({"error": "bad csv"}));
        let (workflow, session) = workflow_with(api);
        session.replace(Vec::new(), Some(FakeApi::pump_summary()), Some(DatasetId::from("3")));
        let before = session.snapshot();

        workflow.select_file(csv()).expect("select");
        let err = workflow.submit().await.expect_err("rejected");
        assert_eq!(err.user_message(), "bad csv");

        let state = workflow.state();
        assert_eq!(state.phase, UploadPhase::Error);
        assert_eq!(state.error.as_deref(), Some("bad csv"));
        assert_eq!(state.file, Some(csv()));
        assert_eq!(*session.snapshot(), *before);
    }

    #[tokio::test]
    async fn test_list_error_payload_is_joined() {
        let api = Arc::new(FakeApi::new());
        api.reject_upload(json!({"error": ["missing Type column", "row 3 invalid"]}));
        let (workflow, _) = workflow_with(api);

        workflow.select_file(csv()).expect("select");
        assert!(workflow.submit().await.is_err());
        assert_eq!(
            workflow.state().error.as_deref(),
            Some("missing Type column, row 3 invalid")
        );
    }

    #[tokio::test]
    async fn test_partial_fetch_failure_is_error() {
        let api = Arc::new(FakeApi::new());
        api.put_dataset("12", FakeApi::pump_rows(), FakeApi::pump_summary());
        api.fail_summary("12", "");
        api.accept_upload("12");
        let (workflow, session) = workflow_with(api);

        workflow.select_file(csv()).expect("select");
        assert!(workflow.submit().await.is_err());
        let state = workflow.state();
        assert_eq!(state.phase, UploadPhase::Error);
        assert_eq!(state.error.as_deref(), Some(MSG_UPLOAD_FAILED));
        assert!(state.file.is_some());
        assert!(session.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let api = Arc::new(FakeApi::new());
        api.put_dataset("5", FakeApi::pump_rows(), FakeApi::pump_summary());
        let (workflow, session) = workflow_with(api.clone());

        workflow.select_file(csv()).expect("select");
        let err = workflow.submit().await.expect_err("no script means network error");
        assert_eq!(err.user_message(), "Network Error");

        api.accept_upload("5");
        workflow.submit().await.expect("retry");
        assert_eq!(session.dataset_id(), Some(DatasetId::from("5")));
        assert_eq!(api.upload_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_csv_is_refused() {
        let api = Arc::new(FakeApi::new());
        let (workflow, _) = workflow_with(api);
        workflow.select_file(csv()).expect("select");

        let err = workflow
            .select_file(CsvFile::new("plant.xlsx", vec![1, 2]))
            .expect_err("not csv");
        assert_eq!(err.user_message(), MSG_NOT_CSV);
        let state = workflow.state();
        assert_eq!(state.phase, UploadPhase::FileSelected);
        assert_eq!(state.file, Some(csv()));
    }

    #[tokio::test]
    async fn test_busy_workflow_rejects_new_requests() {
        let api = Arc::new(FakeApi::new());
        api.put_dataset("8", FakeApi::pump_rows(), FakeApi::pump_summary());
        api.accept_upload("8");
        let gate = api.gate_upload();
        let (workflow, _) = workflow_with(api.clone());
        workflow.select_file(csv()).expect("select");

        let running = {
            let workflow = workflow.clone();
            tokio::spawn(async move { workflow.submit().await })
        };
        tokio::task::yield_now().await;
        assert_eq!(workflow.phase(), UploadPhase::Submitting);

        let err = workflow.submit().await.expect_err("busy");
        assert_eq!(err.user_message(), MSG_UPLOAD_BUSY);
        assert!(workflow.select_file(csv()).is_err());

        gate.notify_one();
        running.await.expect("join").expect("upload");
        assert_eq!(workflow.phase(), UploadPhase::Done);
        assert_eq!(api.upload_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_newer_load_wins_over_upload() {
        let api = Arc::new(FakeApi::new());
        api.put_dataset("8", FakeApi::pump_rows(), FakeApi::pump_summary());
        api.accept_upload("8");
        let gate = api.gate_summary("8");
        let (workflow, session) = workflow_with(api);
        workflow.select_file(csv()).expect("select");

        let running = {
            let workflow = workflow.clone();
            tokio::spawn(async move { workflow.submit().await })
        };
        tokio::task::yield_now().await;
        assert_eq!(workflow.phase(), UploadPhase::Fetching);

        session.replace(Vec::new(), None, Some(DatasetId::from("1")));
        gate.notify_one();

        let outcome = running.await.expect("join").expect("upload");
        assert!(!outcome.published);
        assert_eq!(session.dataset_id(), Some(DatasetId::from("1")));
        assert_eq!(workflow.phase(), UploadPhase::Done);
    }

    #[tokio::test]
    async fn test_reset_cancels_upload_in_flight() {
        let api = Arc::new(FakeApi::new());
        api.put_dataset("8", FakeApi::pump_rows(), FakeApi::pump_summary());
        api.accept_upload("8");
        let gate = api.gate_upload();
        let (workflow, session) = workflow_with(api);
        workflow.select_file(csv()).expect("select");

        let running = {
            let workflow = workflow.clone();
            tokio::spawn(async move { workflow.submit().await })
        };
        tokio::task::yield_now().await;
        assert_eq!(workflow.phase(), UploadPhase::Submitting);

        workflow.reset();
        gate.notify_one();

        let err = running.await.expect("join").expect_err("cancelled");
        assert!(err.is_cancelled());
        assert_eq!(workflow.state(), UploadState::default());
        assert!(session.snapshot().is_empty());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let workflow = UploadWorkflow::new(
            Arc::new(FakeApi::new()),
            DatasetSession::default(),
            EventBus::detached(),
        );
        workflow.select_file(csv()).expect("select");
        workflow.reset();
        assert_eq!(workflow.state(), UploadState::default());
    }
}
