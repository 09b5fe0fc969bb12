//! HTTP Transport
//!
//! reqwest-backed implementation of [`EquipmentApi`]. Authenticates with the
//! token the login endpoint hands back (`Authorization: Token <key>`).

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use crate::constants::{
    PATH_DATASETS, PATH_LOGIN, PATH_LOGOUT, PATH_REGISTER, PATH_UPLOAD, UPLOAD_FIELD,
};
use crate::domain::config::ApiConfig;
use crate::domain::dataset::{DatasetDetail, DatasetId, DatasetRef, UploadReceipt};
use crate::domain::summary::Summary;
use crate::error::Result;

use super::api::{Credentials, CsvFile, EquipmentApi};
use super::payload::error_from_body;

/// HTTP client for the equipment API
pub struct HttpApi {
    client: Client,
    config: ApiConfig,
    token: RwLock<Option<String>>,
}

impl HttpApi {
    /// Create a new client from configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
            token: RwLock::new(None),
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Whether a login token is held
    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.token.read().as_deref() {
            Some(token) => req.header(reqwest::header::AUTHORIZATION, format!("Token {token}")),
            None => req,
        }
    }

    /// Send the request, turning non-2xx responses into transport errors
    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let response = self.authorize(req).send().await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.bytes().await.unwrap_or_default();
            tracing::debug!("API error ({}): {} bytes", status, body.len());
            Err(error_from_body(status, &body))
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.config.url(path);
        tracing::debug!("GET {}", url);
        let response = self.send(self.client.get(&url)).await?;
        Ok(response.json().await?)
    }
}

fn dataset_path(id: &DatasetId) -> String {
    format!("{PATH_DATASETS}{id}/")
}

fn summary_path(id: &DatasetId) -> String {
    format!("/api/summary/{id}/")
}

fn report_path(id: &DatasetId) -> String {
    format!("/api/pdf/{id}/")
}

#[async_trait]
impl EquipmentApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> Result<Value> {
        let req = self.client.post(self.config.url(PATH_LOGIN)).json(credentials);
        let response = self.send(req).await?;
        let body: Value = response.json().await?;

        if let Some(token) = body.get("token").and_then(Value::as_str) {
            *self.token.write() = Some(token.to_string());
        }
        Ok(body)
    }

    async fn register(&self, credentials: &Credentials) -> Result<()> {
        let req = self.client.post(self.config.url(PATH_REGISTER)).json(credentials);
        self.send(req).await?;
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        let req = self.client.post(self.config.url(PATH_LOGOUT));
        let result = self.send(req).await.map(|_| ());
        // Token is gone locally whatever the server said
        *self.token.write() = None;
        result
    }

    async fn list_datasets(&self) -> Result<Vec<DatasetRef>> {
        self.get_json(PATH_DATASETS).await
    }

    async fn get_dataset(&self, id: &DatasetId) -> Result<DatasetDetail> {
        self.get_json(&dataset_path(id)).await
    }

    async fn get_summary(&self, id: &DatasetId) -> Result<Summary> {
        self.get_json(&summary_path(id)).await
    }

    async fn upload(&self, file: &CsvFile) -> Result<UploadReceipt> {
        let part = reqwest::multipart::Part::bytes(file.contents.as_ref().clone())
            .file_name(file.file_name.clone())
            .mime_str("text/csv")?;
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

        tracing::debug!("POST {} ({} bytes)", PATH_UPLOAD, file.len());
        let req = self.client.post(self.config.url(PATH_UPLOAD)).multipart(form);
        let response = self.send(req).await?;
        Ok(response.json().await?)
    }

    async fn download_report(&self, id: &DatasetId) -> Result<Vec<u8>> {
        let url = self.config.url(&report_path(id));
        tracing::debug!("GET {}", url);
        let response = self.send(self.client.get(&url)).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

impl std::fmt::Debug for HttpApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApi")
            .field("config", &self.config)
            .field("authenticated", &self.has_token())
            .finish()
    }
}
