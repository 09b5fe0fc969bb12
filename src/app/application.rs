//! Application - Component Wiring
//!
//! Owns every state container and the API handle, and sequences the
//! cross-component flows: login mounts the history, a finished upload
//! refreshes it, logout tears everything down.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::constants::MSG_LOGIN_REQUIRED;
use crate::domain::chart::ChartData;
use crate::domain::config::AppConfig;
use crate::domain::dataset::{DatasetId, DatasetRef};
use crate::domain::equipment::EquipmentRow;
use crate::domain::summary::Summary;
use crate::error::{Error, Result};
use crate::eventing::app_event::EventBus;
use crate::services::{Credentials, CsvFile, EquipmentApi, HttpApi};
use crate::state::auth_state::AuthGate;
use crate::state::history_state::HistoryCache;
use crate::state::report_state::ReportExport;
use crate::state::session_state::{DatasetSession, Session};
use crate::state::upload_state::{UploadOutcome, UploadWorkflow};

pub struct Application {
    config: AppConfig,
    session: DatasetSession,
    auth: AuthGate,
    history: HistoryCache,
    upload: UploadWorkflow,
    report: ReportExport,
}

impl Application {
    /// Build with the HTTP transport described by `config`
    pub fn new(config: AppConfig, events: EventBus) -> Result<Self> {
        let api = Arc::new(HttpApi::new(&config.api)?);
        Ok(Self::with_api(config, api, events))
    }

    /// Build around any API implementation
    pub fn with_api(config: AppConfig, api: Arc<dyn EquipmentApi>, events: EventBus) -> Self {
        let session = DatasetSession::new(events.clone());
        Self {
            auth: AuthGate::new(api.clone(), session.clone(), events.clone()),
            history: HistoryCache::new(api.clone(), session.clone(), events.clone()),
            upload: UploadWorkflow::new(api.clone(), session.clone(), events.clone()),
            report: ReportExport::new(api, session.clone(), events),
            session,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn auth(&self) -> &AuthGate {
        &self.auth
    }

    pub fn history(&self) -> &HistoryCache {
        &self.history
    }

    pub fn upload(&self) -> &UploadWorkflow {
        &self.upload
    }

    pub fn report(&self) -> &ReportExport {
        &self.report
    }

    pub fn session(&self) -> Arc<Session> {
        self.session.snapshot()
    }

    pub fn chart_data(&self) -> ChartData {
        self.session.snapshot().chart_data()
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.auth.login(credentials).await?;
        self.mount().await;
        Ok(())
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<()> {
        self.auth.register(credentials).await?;
        self.mount().await;
        Ok(())
    }

    /// Clear every container; the server call is best-effort
    ///
    /// Local state is gone before the server call starts, so requests still
    /// in flight see the reset and drop their results.
    pub async fn logout(&self) {
        self.upload.reset();
        self.history.clear();
        self.report.clear();
        self.auth.logout().await;
    }

    pub fn select_file(&self, file: CsvFile) -> Result<()> {
        self.require_login()?;
        self.upload.select_file(file)
    }

    /// Upload the selected file, then refresh the history list
    pub async fn submit_upload(&self) -> Result<UploadOutcome> {
        self.require_login()?;
        let outcome = self.upload.submit().await?;
        if !self.auth.is_logged_in() {
            tracing::info!("Logged out during upload of dataset {}", outcome.dataset_id);
            return Err(Error::Cancelled { operation: "Upload" });
        }
        if let Err(e) = self.history.refresh().await {
            tracing::warn!("History refresh after upload failed: {}", e.user_message());
        }
        Ok(outcome)
    }

    pub async fn refresh_history(&self) -> Result<Vec<DatasetRef>> {
        self.require_login()?;
        self.history.refresh().await
    }

    pub async fn load_from_history(&self, id: &DatasetId) -> Result<(Vec<EquipmentRow>, Summary)> {
        self.require_login()?;
        self.history.load_dataset(id).await
    }

    pub async fn download_report(&self, dir: &Path) -> Result<PathBuf> {
        self.require_login()?;
        self.report.download(dir).await
    }

    fn require_login(&self) -> Result<()> {
        if self.auth.is_logged_in() {
            Ok(())
        } else {
            Err(Error::validation(MSG_LOGIN_REQUIRED))
        }
    }

    /// Dashboard mount: fetch the history list
    async fn mount(&self) {
        if let Err(e) = self.history.refresh().await {
            tracing::warn!("Initial history load failed: {}", e.user_message());
        }
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("config", &self.config)
            .field("auth", &self.auth)
            .field("history", &self.history)
            .field("upload", &self.upload)
            .finish()
    }
}
