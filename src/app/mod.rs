//! Application Layer
//!
//! Wires the API handle, state containers and event bus together.

pub mod application;
