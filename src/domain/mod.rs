//! Core domain types and logic.

pub mod allocation;
pub mod config_validation;
pub mod engine;
pub mod error;
pub mod event;
pub mod intent;
pub mod portfolio;
pub mod schedule;
pub mod session;
pub mod thresholds;
