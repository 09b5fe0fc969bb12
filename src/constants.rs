//! Constants
//!
//! Centralized API paths, defaults, and display constants.

/// Default API server (the backend's development address)
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Default request timeout applied by the HTTP transport
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// API paths
pub const PATH_LOGIN: &str = "/api/auth/login/";
pub const PATH_REGISTER: &str = "/api/auth/register/";
pub const PATH_LOGOUT: &str = "/api/auth/logout/";
pub const PATH_DATASETS: &str = "/api/datasets/";
pub const PATH_UPLOAD: &str = "/api/upload/";

/// Multipart field carrying the CSV upload
pub const UPLOAD_FIELD: &str = "file";

/// Placeholder for a cell with no value under either key spelling
pub const CELL_PLACEHOLDER: &str = "-";

/// Chart colours, assigned by label index
pub const CHART_COLORS: [&str; 8] = [
    "#00d9ff", "#e94560", "#0f3460", "#533483", "#16a085", "#f39c12", "#9b59b6", "#1abc9c",
];

/// Fallback messages per component
pub const MSG_UPLOAD_FAILED: &str = "Upload failed";
pub const MSG_HISTORY_FAILED: &str = "Failed to load history";
pub const MSG_DATASET_FAILED: &str = "Failed to load dataset";
pub const MSG_LOGIN_FAILED: &str = "Login failed";
pub const MSG_REGISTER_FAILED: &str = "Registration failed";
pub const MSG_PDF_FAILED: &str = "Failed to download PDF";
pub const MSG_NO_FILE: &str = "Please select a CSV file";
pub const MSG_NOT_CSV: &str = "File must be a CSV";
pub const MSG_UPLOAD_BUSY: &str = "An upload is already in progress";
pub const MSG_CREDENTIALS_REQUIRED: &str = "Username and password are required";
pub const MSG_NO_DATASET: &str = "No dataset loaded";

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Log file prefix for the rolling file appender
pub const LOG_FILE_PREFIX: &str = "chemviz.log";

/// Event channel capacity between core and render layer
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Returned when an action needs a logged-in user
pub const MSG_LOGIN_REQUIRED: &str = "Please log in first";
