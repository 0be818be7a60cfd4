//! Concrete adapter implementations for ports.

pub mod csv_event_adapter;
pub mod csv_intent_writer;
pub mod file_config_adapter;
