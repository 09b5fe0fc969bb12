//! Domain - Pure Data Structures and Wire Types
//!
//! These types don't depend on the transport or any state container.

pub mod chart;
pub mod config;
pub mod dataset;
pub mod equipment;
pub mod summary;
pub mod table;
