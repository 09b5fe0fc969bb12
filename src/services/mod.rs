//! Service Layer
//!
//! Abstraction over the remote equipment API.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │                  State Layer                        │
//! │  (AuthGate, UploadWorkflow, HistoryCache, Report)   │
//! └────────────────────────────────────────────────────┘
//!                           │
//!                           ▼ dyn EquipmentApi
//! ┌────────────────────────────────────────────────────┐
//! │   HttpApi (reqwest)  │  payload (error messages)    │
//! │   fetch (rows + summary dual fetch)                 │
//! └────────────────────────────────────────────────────┘
//! ```

mod api;
mod fetch;
mod http;
mod payload;

#[cfg(test)]
pub(crate) mod fake;

pub use api::*;
pub use fetch::*;
pub use http::*;
pub use payload::*;
