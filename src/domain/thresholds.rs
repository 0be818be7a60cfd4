//! Trigger thresholds for DCA buys and option signals.

use crate::domain::error::RebalancerError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerThresholds {
    /// Fractional drop below the reference price that triggers a DCA buy.
    pub dca_threshold: f64,
    /// Fractional rise above the reference price that raises a covered-call signal.
    pub call_threshold: f64,
    /// Fractional drop below the reference price that raises a protective-put signal.
    pub put_threshold: f64,
    /// Fraction of current holdings bought on a DCA trigger.
    pub dca_fraction: f64,
}

impl Default for TriggerThresholds {
    fn default() -> Self {
        TriggerThresholds {
            dca_threshold: 0.05,
            call_threshold: 0.10,
            put_threshold: 0.10,
            dca_fraction: 0.10,
        }
    }
}

impl TriggerThresholds {
    pub fn validate(&self) -> Result<(), RebalancerError> {
        for (key, value) in [
            ("dca_threshold", self.dca_threshold),
            ("call_threshold", self.call_threshold),
            ("put_threshold", self.put_threshold),
        ] {
            if !value.is_finite() || !(0.0..1.0).contains(&value) {
                return Err(RebalancerError::ConfigInvalid {
                    section: "thresholds".to_string(),
                    key: key.to_string(),
                    reason: format!("{key} must be in [0, 1)"),
                });
            }
        }

        if !self.dca_fraction.is_finite() || self.dca_fraction <= 0.0 || self.dca_fraction > 1.0 {
            return Err(RebalancerError::ConfigInvalid {
                section: "thresholds".to_string(),
                key: "dca_fraction".to_string(),
                reason: "dca_fraction must be in (0, 1]".to_string(),
            });
        }
        Ok(())
    }

    pub fn dca_trigger(&self, reference: f64) -> f64 {
        reference * (1.0 - self.dca_threshold)
    }

    pub fn call_trigger(&self, reference: f64) -> f64 {
        reference * (1.0 + self.call_threshold)
    }

    pub fn put_trigger(&self, reference: f64) -> f64 {
        reference * (1.0 - self.put_threshold)
    }
}
