//! State - Client State Containers
//!
//! Each module owns one piece of client state behind its own lock. The
//! dataset session is shared; every other container only reads it or
//! replaces it through its load-ticket API.

pub mod auth_state;
pub mod history_state;
pub mod log_state;
pub mod report_state;
pub mod session_state;
pub mod upload_state;
