//! Event-driven session: feeds dated market events through the schedule and
//! the rule engine, forwarding intents to an executor.
//!
//! Per trading date the hooks run in host order: initial allocation (after the
//! open), month-start rebalance, dividends, closing-price rules, then the
//! portfolio summary before the close.

use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::allocation::TargetAllocation;
use super::engine::RuleEngine;
use super::error::RebalancerError;
use super::event::{MarketEvent, group_by_date};
use super::intent::TradeIntent;
use super::portfolio::{Holding, MarketView, PortfolioSnapshot, PortfolioSummary};
use super::schedule::Schedule;
use crate::ports::intent_port::IntentSink;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub days: usize,
    pub orders: usize,
    pub signals: usize,
}

#[derive(Debug)]
pub struct Session {
    targets: TargetAllocation,
    engine: RuleEngine,
    schedule: Schedule,
    portfolio: PortfolioSnapshot,
    /// Most recent close seen for each managed instrument.
    last_prices: HashMap<String, f64>,
    report: SessionReport,
}

impl Session {
    pub fn new(targets: TargetAllocation, engine: RuleEngine, schedule: Schedule) -> Self {
        Session {
            targets,
            engine,
            schedule,
            portfolio: PortfolioSnapshot::default(),
            last_prices: HashMap::new(),
            report: SessionReport::default(),
        }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn portfolio(&self) -> &PortfolioSnapshot {
        &self.portfolio
    }

    pub fn report(&self) -> &SessionReport {
        &self.report
    }

    pub fn last_price(&self, ticker: &str) -> Option<f64> {
        self.last_prices.get(ticker).copied()
    }

    /// Process every event, grouped by date, then flush the sink.
    pub fn run(
        mut self,
        events: Vec<MarketEvent>,
        sink: &mut dyn IntentSink,
    ) -> Result<SessionReport, RebalancerError> {
        for (date, day_events) in group_by_date(events) {
            self.process_day(date, &day_events, sink)?;
        }
        sink.flush()?;
        Ok(self.report)
    }

    /// Process all events for a single trading date and return that date's
    /// portfolio summary.
    pub fn process_day(
        &mut self,
        date: NaiveDate,
        events: &[MarketEvent],
        sink: &mut dyn IntentSink,
    ) -> Result<PortfolioSummary, RebalancerError> {
        let plan = self
            .schedule
            .advance(date)
            .ok_or_else(|| RebalancerError::EventData {
                reason: format!("event date {date} is earlier than a date already processed"),
            })?;
        self.report.days += 1;

        let prices = self.absorb(events);
        let market = MarketView {
            warming_up: plan.warming_up,
            prices,
        };

        let intents = self.engine.initial_allocate(&self.targets, &market)?;
        emit(&mut self.report, date, &intents, sink)?;

        if plan.month_start {
            let intents = self.engine.rebalance(&self.targets, &market)?;
            emit(&mut self.report, date, &intents, sink)?;
        }

        if !plan.warming_up {
            self.apply_dividends(date, events, sink)?;
            self.apply_prices(date, events, sink)?;
        }

        let summary = self
            .portfolio
            .summary(self.targets.tickers(), &self.last_prices);
        info!(%date, "{}", summary);
        for line in &summary.lines {
            info!(%date, "   {}", line);
        }
        Ok(summary)
    }

    /// Refresh the portfolio snapshot from the store's view and collect
    /// today's closing prices of managed instruments. Last known prices are
    /// updated as a side effect.
    fn absorb(&mut self, events: &[MarketEvent]) -> HashMap<String, f64> {
        let mut prices = HashMap::new();
        for ev in events {
            if let Some(cash) = ev.cash {
                self.portfolio.cash = cash;
            }
            if self.targets.weight_of(&ev.ticker).is_none() {
                debug!(ticker = %ev.ticker, "ignoring event for unmanaged instrument");
                continue;
            }
            self.portfolio.set_holding(
                &ev.ticker,
                Holding {
                    quantity: ev.quantity,
                    average_price: ev.average_price,
                },
            );
            if let Some(close) = ev.close {
                prices.insert(ev.ticker.clone(), close);
                self.last_prices.insert(ev.ticker.clone(), close);
            }
        }
        prices
    }

    fn apply_dividends(
        &mut self,
        date: NaiveDate,
        events: &[MarketEvent],
        sink: &mut dyn IntentSink,
    ) -> Result<(), RebalancerError> {
        for ev in events.iter().filter(|e| self.targets.weight_of(&e.ticker).is_some()) {
            let Some(distribution) = ev.dividend else {
                continue;
            };
            let Some(price) = ev.close.or_else(|| self.last_prices.get(&ev.ticker).copied()) else {
                warn!(%date, ticker = %ev.ticker, "dividend before any known price; not reinvested");
                continue;
            };
            let intents = self
                .engine
                .on_dividend(&ev.ticker, distribution, ev.quantity, price)?;
            emit(&mut self.report, date, &intents, sink)?;
        }
        Ok(())
    }

    fn apply_prices(
        &mut self,
        date: NaiveDate,
        events: &[MarketEvent],
        sink: &mut dyn IntentSink,
    ) -> Result<(), RebalancerError> {
        for ev in events.iter().filter(|e| self.targets.weight_of(&e.ticker).is_some()) {
            let Some(price) = ev.close else {
                continue;
            };
            let intents = self.engine.on_price_update(&ev.ticker, price, ev.quantity)?;
            emit(&mut self.report, date, &intents, sink)?;
        }
        Ok(())
    }
}

fn emit(
    report: &mut SessionReport,
    date: NaiveDate,
    intents: &[TradeIntent],
    sink: &mut dyn IntentSink,
) -> Result<(), RebalancerError> {
    for intent in intents {
        if intent.is_order() {
            report.orders += 1;
        } else {
            report.signals += 1;
        }
        sink.submit(date, intent)?;
    }
    Ok(())
}
