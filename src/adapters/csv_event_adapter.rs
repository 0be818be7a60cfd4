//! CSV event log adapter.
//!
//! Columns: `date,ticker,close,dividend,quantity,average_price,cash`.
//! `close`, `dividend` and `cash` may be left empty.

use crate::domain::error::RebalancerError;
use crate::domain::event::MarketEvent;
use crate::ports::event_port::EventSource;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvEventAdapter {
    path: PathBuf,
}

impl CsvEventAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl EventSource for CsvEventAdapter {
    fn load_events(&self) -> Result<Vec<MarketEvent>, RebalancerError> {
        let content = fs::read_to_string(&self.path).map_err(|e| RebalancerError::EventData {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        parse_events(&content)
    }
}

/// Parse an event log held in memory. Events come back sorted by date; rows
/// sharing a date keep their file order.
pub fn parse_events(content: &str) -> Result<Vec<MarketEvent>, RebalancerError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut events = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| RebalancerError::EventData {
            reason: format!("CSV parse error: {}", e),
        })?;

        let date_str = required(&record, 0, "date", line)?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            RebalancerError::EventData {
                reason: format!("line {line}: invalid date format: {e}"),
            }
        })?;

        let ticker = required(&record, 1, "ticker", line)?.to_uppercase();

        events.push(MarketEvent {
            date,
            ticker,
            close: optional(&record, 2, "close", line)?,
            dividend: optional(&record, 3, "dividend", line)?,
            quantity: optional(&record, 4, "quantity", line)?.unwrap_or(0),
            average_price: optional(&record, 5, "average_price", line)?.unwrap_or(0.0),
            cash: optional(&record, 6, "cash", line)?,
        });
    }

    events.sort_by_key(|e| e.date);
    Ok(events)
}

fn required<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    column: &str,
    line: usize,
) -> Result<&'r str, RebalancerError> {
    match record.get(index).map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RebalancerError::EventData {
            reason: format!("line {line}: missing {column} column"),
        }),
    }
}

fn optional<T: FromStr>(
    record: &csv::StringRecord,
    index: usize,
    column: &str,
    line: usize,
) -> Result<Option<T>, RebalancerError>
where
    T::Err: std::fmt::Display,
{
    match record.get(index).map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|e| RebalancerError::EventData {
                reason: format!("line {line}: invalid {column} value {v:?}: {e}"),
            }),
    }
}
