//! AppEvent - Application Event Enum
//!
//! Events sent from the core to the render layer.

use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::domain::dataset::DatasetId;
use crate::state::upload_state::UploadPhase;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// Application events for core -> render layer communication
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Log message
    Log {
        level: LogLevel,
        message: String,
        timestamp: DateTime<Local>,
    },

    /// The dataset session was replaced or cleared
    SessionChanged {
        dataset_id: Option<DatasetId>,
        rows: usize,
    },

    /// The history list was replaced
    HistoryUpdated { count: usize },

    /// The upload workflow moved to a new phase
    UploadPhaseChanged { phase: UploadPhase },

    /// Logged in or out
    AuthChanged { logged_in: bool },
}

impl AppEvent {
    /// Create a log event with current timestamp
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            message: message.into(),
            timestamp: Local::now(),
        }
    }

    /// Create an info log event
    pub fn info(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Info, message)
    }

    /// Create a warning log event
    pub fn warn(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Warn, message)
    }

    /// Create an error log event
    pub fn error(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Error, message)
    }
}

/// Sending half shared by every component
///
/// Sends never block: when the render layer falls behind, events are dropped.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: Sender<AppEvent>,
}

impl EventBus {
    /// Create a bus and the receiver the render layer drains
    pub fn new() -> (Self, Receiver<AppEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY);
        (Self { tx }, rx)
    }

    /// A bus nobody listens to
    pub fn detached() -> Self {
        Self::new().0
    }

    pub fn emit(&self, event: AppEvent) {
        match self.tx.try_send(event) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(_)) => tracing::debug!("Event channel full, dropping event"),
        }
    }
}
