//! Eventing - Core to Render Layer Events

pub mod app_event;
