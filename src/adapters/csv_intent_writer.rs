//! CSV intent writer: hands trade intents to a downstream order executor as
//! rows of `date,ticker,action,weight,quantity,signal,reason`.

use crate::domain::error::RebalancerError;
use crate::domain::intent::{TradeAction, TradeIntent};
use crate::ports::intent_port::IntentSink;
use chrono::NaiveDate;
use std::io::Write;

pub const INTENT_HEADER: [&str; 7] = [
    "date", "ticker", "action", "weight", "quantity", "signal", "reason",
];

pub struct CsvIntentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvIntentWriter<W> {
    pub fn new(inner: W) -> Result<Self, RebalancerError> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(INTENT_HEADER).map_err(csv_error)?;
        Ok(Self { writer })
    }

    pub fn into_inner(self) -> Result<W, RebalancerError> {
        self.writer
            .into_inner()
            .map_err(|e| RebalancerError::Io(e.into_error()))
    }
}

impl<W: Write> IntentSink for CsvIntentWriter<W> {
    fn submit(&mut self, date: NaiveDate, intent: &TradeIntent) -> Result<(), RebalancerError> {
        let date = date.format("%Y-%m-%d").to_string();
        let row: [String; 7] = match &intent.action {
            TradeAction::SetHoldings { weight, reason } => [
                date,
                intent.ticker.clone(),
                "set_holdings".into(),
                format!("{weight:.4}"),
                String::new(),
                String::new(),
                reason.to_string(),
            ],
            TradeAction::MarketBuy { quantity, reason } => [
                date,
                intent.ticker.clone(),
                "market_buy".into(),
                String::new(),
                quantity.to_string(),
                String::new(),
                reason.to_string(),
            ],
            TradeAction::SignalOnly(kind) => [
                date,
                intent.ticker.clone(),
                "signal".into(),
                String::new(),
                String::new(),
                kind.to_string(),
                String::new(),
            ],
        };
        self.writer.write_record(&row).map_err(csv_error)
    }

    fn flush(&mut self) -> Result<(), RebalancerError> {
        self.writer.flush()?;
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> RebalancerError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => RebalancerError::Io(io),
        other => RebalancerError::EventData {
            reason: format!("CSV write error: {other:?}"),
        },
    }
}
