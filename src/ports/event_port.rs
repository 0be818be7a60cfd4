//! Market event feed port trait.

use crate::domain::error::RebalancerError;
use crate::domain::event::MarketEvent;

/// Source of per-instrument market events, as delivered by a data feed.
pub trait EventSource {
    /// All events, sorted by date. Order within a date is preserved.
    fn load_events(&self) -> Result<Vec<MarketEvent>, RebalancerError>;
}
