//! Target allocation: the instruments the engine manages and their weights.
//!
//! Allocations are parsed from a comma-separated `TICKER:weight` list. Order is
//! preserved and drives the order in which allocation intents are emitted.

use crate::domain::error::AllocationError;
use std::collections::HashSet;

/// Tolerance applied to the total-weight check.
pub const WEIGHT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub ticker: String,
    /// Fraction of total portfolio equity, 0..=1.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetAllocation {
    instruments: Vec<Instrument>,
}

impl TargetAllocation {
    /// Build an allocation from already-split instruments, enforcing the same
    /// invariants as [`parse_allocation`].
    pub fn new(instruments: Vec<Instrument>) -> Result<Self, AllocationError> {
        if instruments.is_empty() {
            return Err(AllocationError::Empty);
        }

        let mut seen = HashSet::new();
        let mut total = 0.0;
        for inst in &instruments {
            if !inst.weight.is_finite() || !(0.0..=1.0).contains(&inst.weight) {
                return Err(AllocationError::InvalidWeight {
                    ticker: inst.ticker.clone(),
                    value: inst.weight.to_string(),
                });
            }
            if !seen.insert(inst.ticker.clone()) {
                return Err(AllocationError::DuplicateTicker(inst.ticker.clone()));
            }
            total += inst.weight;
        }

        if total > 1.0 + WEIGHT_EPSILON {
            return Err(AllocationError::OverAllocated { total });
        }

        Ok(Self { instruments })
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.instruments.iter().map(|i| i.ticker.as_str())
    }

    pub fn weight_of(&self, ticker: &str) -> Option<f64> {
        self.instruments
            .iter()
            .find(|i| i.ticker == ticker)
            .map(|i| i.weight)
    }

    pub fn total_weight(&self) -> f64 {
        self.instruments.iter().map(|i| i.weight).sum()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

/// Parse `AAPL:0.20, MSFT:0.20` into a [`TargetAllocation`]. Tickers are
/// upper-cased.
pub fn parse_allocation(input: &str) -> Result<TargetAllocation, AllocationError> {
    if input.trim().is_empty() {
        return Err(AllocationError::Empty);
    }

    let mut instruments = Vec::new();
    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(AllocationError::EmptyToken);
        }

        let (ticker, weight) = trimmed
            .split_once(':')
            .ok_or_else(|| AllocationError::Malformed(trimmed.to_string()))?;
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(AllocationError::Malformed(trimmed.to_string()));
        }

        let weight_str = weight.trim();
        let weight: f64 = weight_str
            .parse()
            .map_err(|_| AllocationError::InvalidWeight {
                ticker: ticker.clone(),
                value: weight_str.to_string(),
            })?;

        instruments.push(Instrument { ticker, weight });
    }

    TargetAllocation::new(instruments)
}
