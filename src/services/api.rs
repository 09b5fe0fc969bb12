//! Equipment API
//!
//! The request/response operations the core depends on. The HTTP transport
//! implements this trait; tests substitute a scripted fake.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::domain::dataset::{DatasetDetail, DatasetId, DatasetRef, UploadReceipt};
use crate::domain::summary::Summary;
use crate::error::{Error, Result};

/// Username/password pair for login and registration
#[derive(Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both fields must be non-blank
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A CSV file picked for upload
#[derive(Debug, Clone, PartialEq)]
pub struct CsvFile {
    pub file_name: String,
    pub contents: Arc<Vec<u8>>,
}

impl CsvFile {
    pub fn new(file_name: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: Arc::new(contents),
        }
    }

    /// Read a file from disk, naming it after the last path component
    pub async fn read(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::validation(format!("Not a file: {}", path.display())))?;
        let contents = tokio::fs::read(path).await?;
        Ok(Self::new(file_name, contents))
    }

    pub fn has_csv_extension(&self) -> bool {
        self.file_name.to_ascii_lowercase().ends_with(".csv")
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// Remote operations used by the core
#[async_trait]
pub trait EquipmentApi: Send + Sync {
    /// Returns the response body; the caller decides whether it means success
    async fn login(&self, credentials: &Credentials) -> Result<Value>;

    async fn register(&self, credentials: &Credentials) -> Result<()>;

    async fn logout(&self) -> Result<()>;

    /// Most recent first, as the server orders them
    async fn list_datasets(&self) -> Result<Vec<DatasetRef>>;

    async fn get_dataset(&self, id: &DatasetId) -> Result<DatasetDetail>;

    async fn get_summary(&self, id: &DatasetId) -> Result<Summary>;

    async fn upload(&self, file: &CsvFile) -> Result<UploadReceipt>;

    /// PDF bytes
    async fn download_report(&self, id: &DatasetId) -> Result<Vec<u8>>;
}
