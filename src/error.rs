//! Error types for Chemviz
//!
//! Centralized error handling using snafu for ergonomic error definitions.

use snafu::Snafu;

use crate::domain::dataset::DatasetId;

/// Which half of a dual fetch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPart {
    Rows,
    Summary,
}

impl FetchPart {
    pub fn label(&self) -> &'static str {
        match self {
            FetchPart::Rows => "dataset rows",
            FetchPart::Summary => "summary",
        }
    }
}

/// Main error type for the application
#[derive(Debug, Snafu)]
pub enum Error {
    /// Local input rejected before anything reaches the network
    #[snafu(display("{message}"))]
    Validation { message: String },

    /// Network or HTTP failure, with the message already extracted from the payload
    #[snafu(display("{message}"))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// One half of a rows + summary fetch failed
    #[snafu(display("{}", source.user_message()))]
    PartialFailure {
        part: FetchPart,
        source: Box<Error>,
    },

    /// A newer load started (or the session was cleared) before this one finished
    #[snafu(display("Load of dataset {dataset_id} superseded by a newer load"))]
    Superseded { dataset_id: DatasetId },

    /// Overtaken by a newer request or by logout; the result was dropped
    #[snafu(display("{operation} cancelled"))]
    Cancelled { operation: &'static str },

    /// Invalid input or configuration
    #[snafu(display("Invalid: {message}"))]
    Invalid { message: String },

    /// IO error (file operations)
    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },

    /// JSON serialization/deserialization error
    #[snafu(display("JSON error: {source}"))]
    Json { source: serde_json::Error },

    /// TOML deserialization error
    #[snafu(display("TOML parse error: {source}"))]
    TomlDe { source: toml::de::Error },

    /// TOML serialization error
    #[snafu(display("TOML serialize error: {source}"))]
    TomlSe { source: toml::ser::Error },
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Transport {
            status,
            message: message.into(),
        }
    }

    /// Message suitable for a component's error area
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation { message } | Error::Transport { message, .. } => message.clone(),
            Error::PartialFailure { source, .. } => source.user_message(),
            other => other.to_string(),
        }
    }

    /// Like [`Error::user_message`], but falls back to `fallback` when there is nothing to show
    pub fn user_message_or(&self, fallback: &str) -> String {
        let message = self.user_message();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Error::Superseded { .. })
    }

    /// Dropped because something newer replaced it
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled { .. } | Error::Superseded { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { source }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Error::Json { source }
    }
}

impl From<toml::de::Error> for Error {
    fn from(source: toml::de::Error) -> Self {
        Error::TomlDe { source }
    }
}

impl From<toml::ser::Error> for Error {
    fn from(source: toml::ser::Error) -> Self {
        Error::TomlSe { source }
    }
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        Error::Transport {
            status: source.status().map(|s| s.as_u16()),
            message: source.to_string(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_failure_shows_inner_message() {
        let err = Error::PartialFailure {
            part: FetchPart::Summary,
            source: Box::new(Error::transport(Some(404), "Summary not found")),
        };
        assert_eq!(err.user_message(), "Summary not found");
    }

    #[test]
    fn test_user_message_fallback() {
        let err = Error::transport(None, "  ");
        assert_eq!(err.user_message_or("Upload failed"), "Upload failed");

        let err = Error::validation("Please select a CSV file");
        assert_eq!(err.user_message_or("Upload failed"), "Please select a CSV file");
    }
    #[test]
    fn test_cancelled_covers_superseded() {
        let err = Error::Cancelled { operation: "Upload" };
        assert_eq!(err.user_message(), "Upload cancelled");
        assert!(err.is_cancelled());
        assert!(!err.is_superseded());
        assert!(Error::Superseded { dataset_id: "4".into() }.is_cancelled());
    }
}
