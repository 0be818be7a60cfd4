//! Market events delivered by the data feed, one per instrument per date.

use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct MarketEvent {
    pub date: NaiveDate,
    pub ticker: String,
    /// Closing price; `None` when the feed has no data for the instrument.
    pub close: Option<f64>,
    /// Dividend distribution per share paid on this date.
    pub dividend: Option<f64>,
    /// Quantity held according to the portfolio store.
    pub quantity: i64,
    pub average_price: f64,
    /// Portfolio cash on this date, if reported.
    pub cash: Option<f64>,
}

/// Group events by date in ascending order, keeping file order within
/// each date.
pub fn group_by_date(events: Vec<MarketEvent>) -> Vec<(NaiveDate, Vec<MarketEvent>)> {
    let mut grouped: BTreeMap<NaiveDate, Vec<MarketEvent>> = BTreeMap::new();
    for ev in events {
        grouped.entry(ev.date).or_default().push(ev);
    }
    grouped.into_iter().collect()
}
