//! rebalancer — rule-based allocation, DCA, dividend reinvestment and option
//! signal engine.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], the command-line host in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
