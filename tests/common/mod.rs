#![allow(dead_code)]

use chrono::NaiveDate;
use rebalancer::domain::allocation::{TargetAllocation, parse_allocation};
use rebalancer::domain::engine::RuleEngine;
use rebalancer::domain::event::MarketEvent;
use rebalancer::domain::portfolio::MarketView;
use rebalancer::domain::thresholds::TriggerThresholds;
use std::io::Write;

pub const SAMPLE_INI: &str = r#"
[allocation]
targets = AAPL:0.20,MSFT:0.20,XOM:0.15,GOLD:0.15,NEE:0.10

[thresholds]
dca_threshold = 0.05
call_threshold = 0.10
put_threshold = 0.10
dca_fraction = 0.10

[schedule]
warmup_days = 0
"#;

pub const EVENT_HEADER: &str = "date,ticker,close,dividend,quantity,average_price,cash\n";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn sample_allocation() -> TargetAllocation {
    parse_allocation("AAPL:0.20,MSFT:0.20,XOM:0.15,GOLD:0.15,NEE:0.10").unwrap()
}

pub fn default_engine() -> RuleEngine {
    RuleEngine::new(TriggerThresholds::default())
}

/// An engine whose only reference price is `ticker` at `price`.
pub fn engine_bought_at(ticker: &str, price: f64) -> RuleEngine {
    let mut engine = default_engine();
    let targets = parse_allocation(&format!("{ticker}:0.20")).unwrap();
    engine
        .initial_allocate(&targets, &MarketView::default().with_price(ticker, price))
        .unwrap();
    engine
}

pub fn event(date: NaiveDate, ticker: &str, close: Option<f64>, quantity: i64) -> MarketEvent {
    MarketEvent {
        date,
        ticker: ticker.to_string(),
        close,
        dividend: None,
        quantity,
        average_price: 0.0,
        cash: None,
    }
}

pub fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
