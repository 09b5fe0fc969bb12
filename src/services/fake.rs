//! Scripted in-memory API used by the unit tests

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Notify;

use crate::domain::dataset::{DatasetDetail, DatasetId, DatasetRef, UploadReceipt};
use crate::domain::equipment::RawRow;
use crate::domain::summary::{Summary, TypeStat, TypeStats};
use crate::error::{Error, Result};

use super::api::{Credentials, CsvFile, EquipmentApi};

#[derive(Default)]
pub struct FakeApi {
    datasets: Mutex<HashMap<String, (Vec<RawRow>, Summary)>>,
    dataset_errors: Mutex<HashMap<String, String>>,
    summary_errors: Mutex<HashMap<String, String>>,
    summary_gates: Mutex<HashMap<String, Arc<Notify>>>,
    history: Mutex<Vec<DatasetRef>>,
    history_error: Mutex<Option<String>>,
    history_gate: Mutex<Option<Arc<Notify>>>,
    upload_script: Mutex<Option<Result<String, Value>>>,
    upload_gate: Mutex<Option<Arc<Notify>>>,
    users: Mutex<HashMap<String, String>>,
    login_body: Mutex<Option<Value>>,
    logout_error: Mutex<Option<String>>,
    report: Mutex<Option<Vec<u8>>>,
    pub upload_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pump_rows() -> Vec<RawRow> {
        let rows = json!([
            {"Equipment Name": "P-1", "Type": "Pump", "Flowrate": 120, "Pressure": 6, "Temperature": 25},
            {"equipment_name": "V-1", "type": "Valve", "flowrate": 60, "pressure": 3, "temperature": 10}
        ]);
        serde_json::from_value(rows).expect("rows")
    }

    pub fn pump_summary() -> Summary {
        let mut stats = TypeStats::new();
        stats.insert(
            "Pump".to_string(),
            TypeStat {
                count: 2,
                avg_temperature: 25.0,
                avg_pressure: 6.0,
            },
        );
        stats.insert(
            "Valve".to_string(),
            TypeStat {
                count: 1,
                avg_temperature: 10.0,
                avg_pressure: 3.0,
            },
        );
        Summary {
            total_count: 3,
            avg_flowrate: 10.0,
            avg_pressure: 5.0,
            avg_temperature: 20.0,
            type_stats: Some(stats),
            type_distribution: None,
        }
    }

    pub fn dataset_ref(id: &str, file_name: &str) -> DatasetRef {
        DatasetRef {
            id: DatasetId::from(id),
            file_name: file_name.to_string(),
            uploaded_at: Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).single().expect("date"),
        }
    }

    pub fn put_dataset(&self, id: &str, rows: Vec<RawRow>, summary: Summary) {
        self.datasets.lock().insert(id.to_string(), (rows, summary));
    }

    pub fn fail_dataset(&self, id: &str, message: &str) {
        self.dataset_errors.lock().insert(id.to_string(), message.to_string());
    }

    pub fn fail_summary(&self, id: &str, message: &str) {
        self.summary_errors.lock().insert(id.to_string(), message.to_string());
    }

    /// Hold the summary request for `id` until the returned gate is notified
    pub fn gate_summary(&self, id: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.summary_gates.lock().insert(id.to_string(), gate.clone());
        gate
    }

    /// Hold the next uploads until the returned gate is notified
    pub fn gate_upload(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.upload_gate.lock() = Some(gate.clone());
        gate
    }

    /// Hold the next history request until the returned gate is notified
    ///
    /// The held request answers with the history as it was when it arrived.
    pub fn gate_history(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.history_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn set_history(&self, history: Vec<DatasetRef>) {
        *self.history.lock() = history;
        *self.history_error.lock() = None;
    }

    pub fn fail_history(&self, message: &str) {
        *self.history_error.lock() = Some(message.to_string());
    }

    /// Next upload succeeds with `id`
    pub fn accept_upload(&self, id: &str) {
        *self.upload_script.lock() = Some(Ok(id.to_string()));
    }

    /// Next upload fails with a 400 and `body`
    pub fn reject_upload(&self, body: Value) {
        *self.upload_script.lock() = Some(Err(body));
    }

    pub fn add_user(&self, username: &str, password: &str) {
        self.users.lock().insert(username.to_string(), password.to_string());
    }

    pub fn set_login_body(&self, body: Value) {
        *self.login_body.lock() = Some(body);
    }

    pub fn fail_logout(&self, message: &str) {
        *self.logout_error.lock() = Some(message.to_string());
    }

    pub fn set_report(&self, bytes: Vec<u8>) {
        *self.report.lock() = Some(bytes);
    }

    fn bad_request(body: &Value) -> Error {
        crate::services::payload::error_from_body(400, body.to_string().as_bytes())
    }
}

fn not_found() -> Error {
    Error::transport(Some(404), "Dataset not found")
}

#[async_trait]
impl EquipmentApi for FakeApi {
    async fn login(&self, credentials: &Credentials) -> Result<Value> {
        let known = self.users.lock().get(&credentials.username).cloned();
        match known {
            Some(password) if password == credentials.password => Ok(self
                .login_body
                .lock()
                .clone()
                .unwrap_or_else(|| json!({"username": credentials.username, "token": "t0k3n"}))),
            _ => Err(Error::transport(Some(401), "Invalid credentials")),
        }
    }

    async fn register(&self, credentials: &Credentials) -> Result<()> {
        let mut users = self.users.lock();
        if users.contains_key(&credentials.username) {
            return Err(Self::bad_request(&json!({"error": "Username already exists"})));
        }
        users.insert(credentials.username.clone(), credentials.password.clone());
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        match self.logout_error.lock().clone() {
            Some(message) => Err(Error::transport(None, message)),
            None => Ok(()),
        }
    }

    async fn list_datasets(&self) -> Result<Vec<DatasetRef>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let response = match self.history_error.lock().clone() {
            Some(message) => Err(Error::transport(Some(500), message)),
            None => Ok(self.history.lock().clone()),
        };
        let gate = self.history_gate.lock().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        response
    }

    async fn get_dataset(&self, id: &DatasetId) -> Result<DatasetDetail> {
        if let Some(message) = self.dataset_errors.lock().get(id.as_str()).cloned() {
            return Err(Error::transport(Some(500), message));
        }
        let rows = self.datasets.lock().get(id.as_str()).map(|(rows, _)| rows.clone());
        rows.map(|raw_data| DatasetDetail { raw_data }).ok_or_else(not_found)
    }

    async fn get_summary(&self, id: &DatasetId) -> Result<Summary> {
        let gate = self.summary_gates.lock().get(id.as_str()).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(message) = self.summary_errors.lock().get(id.as_str()).cloned() {
            return Err(Error::transport(Some(404), message));
        }
        let summary = self.datasets.lock().get(id.as_str()).map(|(_, s)| s.clone());
        summary.ok_or_else(not_found)
    }

    async fn upload(&self, _file: &CsvFile) -> Result<UploadReceipt> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.upload_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let script = self.upload_script.lock().clone();
        match script {
            Some(Ok(id)) => Ok(UploadReceipt {
                dataset_id: DatasetId::from(id),
                summary: None,
            }),
            Some(Err(body)) => Err(Self::bad_request(&body)),
            None => Err(Error::transport(None, "Network Error")),
        }
    }

    async fn download_report(&self, id: &DatasetId) -> Result<Vec<u8>> {
        if !self.datasets.lock().contains_key(id.as_str()) {
            return Err(not_found());
        }
        self.report
            .lock()
            .clone()
            .ok_or_else(|| Error::transport(Some(500), "PDF generation failed"))
    }
}
