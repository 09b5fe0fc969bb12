//! Chemviz Client Library
//!
//! Client core for the Chemical Equipment Parameter Visualizer: summary to
//! chart derivation, the dataset session, upload history, the upload
//! workflow and the auth gate, on top of an HTTP API.

pub mod app;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod error;
pub mod eventing;
pub mod helpers;
pub mod logging;
pub mod services;
pub mod state;
pub mod utils;
