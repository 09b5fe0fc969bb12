//! ReportExport - PDF Report Download

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::constants::{MSG_NO_DATASET, MSG_PDF_FAILED};
use crate::domain::dataset::report_file_name;
use crate::error::{Error, Result};
use crate::eventing::app_event::{AppEvent, EventBus};
use crate::services::EquipmentApi;

use super::session_state::DatasetSession;

pub struct ReportExport {
    api: Arc<dyn EquipmentApi>,
    session: DatasetSession,
    events: EventBus,
    error: RwLock<Option<String>>,
}

impl ReportExport {
    pub fn new(api: Arc<dyn EquipmentApi>, session: DatasetSession, events: EventBus) -> Self {
        Self {
            api,
            session,
            events,
            error: RwLock::new(None),
        }
    }

    pub fn error(&self) -> Option<String> {
        self.error.read().clone()
    }

    pub fn clear(&self) {
        *self.error.write() = None;
    }

    /// Download the report for the session's dataset into `dir`
    pub async fn download(&self, dir: &Path) -> Result<PathBuf> {
        *self.error.write() = None;
        let Some(id) = self.session.dataset_id() else {
            *self.error.write() = Some(MSG_NO_DATASET.to_string());
            return Err(Error::validation(MSG_NO_DATASET));
        };

        let result = async {
            let bytes = self.api.download_report(&id).await?;
            tokio::fs::create_dir_all(dir).await?;
            let path = dir.join(report_file_name(&id));
            tokio::fs::write(&path, &bytes).await?;
            Ok::<_, Error>((path, bytes.len()))
        }
        .await;

        match result {
            Ok((path, size)) => {
                tracing::info!("Saved report for dataset {} to {} ({} bytes)", id, path.display(), size);
                self.events
                    .emit(AppEvent::info(format!("Report saved to {}", path.display())));
                Ok(path)
            }
            Err(e) => {
                tracing::error!("Report download for dataset {} failed: {}", id, e);
                *self.error.write() = Some(MSG_PDF_FAILED.to_string());
                self.events.emit(AppEvent::error(MSG_PDF_FAILED));
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for ReportExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportExport")
            .field("error", &*self.error.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::DatasetId;
    use crate::services::fake::FakeApi;

    fn export_with(api: Arc<FakeApi>) -> (ReportExport, DatasetSession) {
        let session = DatasetSession::default();
        let export = ReportExport::new(api, session.clone(), EventBus::detached());
        (export, session)
    }

    #[tokio::test]
    async fn test_download_writes_named_file() {
        let api = Arc::new(FakeApi::new());
        api.put_dataset("9", FakeApi::pump_rows(), FakeApi::pump_summary());
        api.set_report(b"%PDF-1.4 fake".to_vec());
        let (export, session) = export_with(api);
        session.replace(Vec::new(), None, Some(DatasetId::from("9")));

        let dir = tempfile::tempdir().expect("tempdir");
        let path = export.download(dir.path()).await.expect("download");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("report_9.pdf"));
        assert_eq!(std::fs::read(&path).expect("read"), b"%PDF-1.4 fake");
        assert!(export.error().is_none());
    }

    #[tokio::test]
    async fn test_no_dataset_loaded() {
        let (export, _) = export_with(Arc::new(FakeApi::new()));
        let dir = tempfile::tempdir().expect("tempdir");
        let err = export.download(dir.path()).await.expect_err("nothing loaded");
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(export.error().as_deref(), Some(MSG_NO_DATASET));
    }

    #[tokio::test]
    async fn test_server_failure_uses_fixed_message() {
        let api = Arc::new(FakeApi::new());
        api.put_dataset("9", FakeApi::pump_rows(), FakeApi::pump_summary());
        let (export, session) = export_with(api);
        session.replace(Vec::new(), None, Some(DatasetId::from("9")));

        let dir = tempfile::tempdir().expect("tempdir");
        assert!(export.download(dir.path()).await.is_err());
        assert_eq!(export.error().as_deref(), Some(MSG_PDF_FAILED));
        assert!(!dir.path().join("report_9.pdf").exists());
    }
}
