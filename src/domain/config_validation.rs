//! Configuration validation.
//!
//! Validates every config field before the engine is built.

use crate::domain::allocation::parse_allocation;
use crate::domain::error::RebalancerError;
use crate::domain::schedule::DEFAULT_WARMUP_DAYS;
use crate::domain::thresholds::TriggerThresholds;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), RebalancerError> {
    validate_allocation(config)?;
    validate_thresholds(config)?;
    validate_warmup_days(config)?;
    Ok(())
}

fn validate_allocation(config: &dyn ConfigPort) -> Result<(), RebalancerError> {
    let targets = match config.get_string("allocation", "targets") {
        Some(s) if !s.trim().is_empty() => s,
        _ => {
            return Err(RebalancerError::ConfigMissing {
                section: "allocation".to_string(),
                key: "targets".to_string(),
            });
        }
    };

    parse_allocation(&targets).map_err(|e| RebalancerError::ConfigInvalid {
        section: "allocation".to_string(),
        key: "targets".to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), RebalancerError> {
    let defaults = TriggerThresholds::default();
    let thresholds = TriggerThresholds {
        dca_threshold: numeric(config, "thresholds", "dca_threshold", defaults.dca_threshold)?,
        call_threshold: numeric(config, "thresholds", "call_threshold", defaults.call_threshold)?,
        put_threshold: numeric(config, "thresholds", "put_threshold", defaults.put_threshold)?,
        dca_fraction: numeric(config, "thresholds", "dca_fraction", defaults.dca_fraction)?,
    };
    thresholds.validate()
}

fn validate_warmup_days(config: &dyn ConfigPort) -> Result<(), RebalancerError> {
    let Some(raw) = config.get_string("schedule", "warmup_days") else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if v >= 0 => Ok(()),
        _ => Err(RebalancerError::ConfigInvalid {
            section: "schedule".to_string(),
            key: "warmup_days".to_string(),
            reason: format!(
                "warmup_days must be a non-negative integer (default {DEFAULT_WARMUP_DAYS})"
            ),
        }),
    }
}

/// A present-but-unparseable value is an error rather than a silent default.
fn numeric(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, RebalancerError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| RebalancerError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("{key} must be a number"),
            }),
    }
}
