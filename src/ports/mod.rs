//! Port traits for the external collaborators: configuration, market event
//! feed and order executor.

pub mod config_port;
pub mod event_port;
pub mod intent_port;
