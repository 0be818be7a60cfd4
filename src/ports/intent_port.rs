//! Order executor port trait.

use chrono::NaiveDate;

use crate::domain::error::RebalancerError;
use crate::domain::intent::TradeIntent;

/// Receives trade intents. Execution, fills and accounting happen behind it.
pub trait IntentSink {
    fn submit(&mut self, date: NaiveDate, intent: &TradeIntent) -> Result<(), RebalancerError>;

    /// Called once after the last intent.
    fn flush(&mut self) -> Result<(), RebalancerError> {
        Ok(())
    }
}

/// Collects intents in memory.
impl IntentSink for Vec<(NaiveDate, TradeIntent)> {
    fn submit(&mut self, date: NaiveDate, intent: &TradeIntent) -> Result<(), RebalancerError> {
        self.push((date, intent.clone()));
        Ok(())
    }
}
