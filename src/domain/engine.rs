//! Rule engine: initial allocation, monthly rebalance, DCA buys, dividend
//! reinvestment and option signals.
//!
//! All thresholds are evaluated against a single per-instrument reference
//! price: the price at which the engine last bought. A DCA buy or a dividend
//! reinvestment re-anchors the reference, so subsequent call/put signals are
//! measured from the new, lower price.

use std::collections::HashMap;

use tracing::{debug, info};

use super::allocation::TargetAllocation;
use super::error::RebalancerError;
use super::intent::{AllocationReason, BuyReason, SignalKind, TradeIntent};
use super::portfolio::MarketView;
use super::thresholds::TriggerThresholds;

#[derive(Debug, Clone)]
pub struct RuleEngine {
    thresholds: TriggerThresholds,
    reference_prices: HashMap<String, f64>,
    initial_allocation_done: bool,
}

impl RuleEngine {
    pub fn new(thresholds: TriggerThresholds) -> Self {
        RuleEngine {
            thresholds,
            reference_prices: HashMap::new(),
            initial_allocation_done: false,
        }
    }

    pub fn thresholds(&self) -> &TriggerThresholds {
        &self.thresholds
    }

    pub fn reference_price(&self, ticker: &str) -> Option<f64> {
        self.reference_prices.get(ticker).copied()
    }

    pub fn initial_allocation_done(&self) -> bool {
        self.initial_allocation_done
    }

    /// One-shot allocation to target weights.
    ///
    /// Returns nothing once it has run, or while the feed is warming up.
    /// Instruments without data are skipped and left without a reference
    /// price; the pass still counts as done.
    pub fn initial_allocate(
        &mut self,
        targets: &TargetAllocation,
        market: &MarketView,
    ) -> Result<Vec<TradeIntent>, RebalancerError> {
        if self.initial_allocation_done || market.warming_up {
            return Ok(Vec::new());
        }

        info!("performing initial allocations");
        let intents = self.allocate(targets, market, AllocationReason::Initial)?;
        self.initial_allocation_done = true;
        Ok(intents)
    }

    /// Set every instrument with data back to its target weight and reset its
    /// reference price. Not idempotent: each call re-issues the full set.
    pub fn rebalance(
        &mut self,
        targets: &TargetAllocation,
        market: &MarketView,
    ) -> Result<Vec<TradeIntent>, RebalancerError> {
        if market.warming_up {
            return Ok(Vec::new());
        }

        info!("rebalancing to target allocations");
        self.allocate(targets, market, AllocationReason::Rebalance)
    }

    fn allocate(
        &mut self,
        targets: &TargetAllocation,
        market: &MarketView,
        reason: AllocationReason,
    ) -> Result<Vec<TradeIntent>, RebalancerError> {
        for inst in targets.instruments() {
            if let Some(price) = market.price(&inst.ticker) {
                validate_price(&inst.ticker, price)?;
            }
        }

        let mut intents = Vec::with_capacity(targets.len());
        for inst in targets.instruments() {
            let Some(price) = market.price(&inst.ticker) else {
                info!(ticker = %inst.ticker, "skipping: no data available");
                continue;
            };

            intents.push(TradeIntent::set_holdings(&inst.ticker, inst.weight, reason));
            self.reference_prices.insert(inst.ticker.clone(), price);
            info!(
                ticker = %inst.ticker,
                %reason,
                "target weight {:.0}% at ${:.2}",
                inst.weight * 100.0,
                price
            );
        }
        Ok(intents)
    }

    /// Evaluate DCA, covered-call and protective-put rules for one closing
    /// price. All three are checked against the reference price as it stood
    /// before this call and may fire together; emission order is DCA, call,
    /// put.
    pub fn on_price_update(
        &mut self,
        ticker: &str,
        price: f64,
        quantity: i64,
    ) -> Result<Vec<TradeIntent>, RebalancerError> {
        validate_price(ticker, price)?;
        if quantity < 0 {
            return Err(RebalancerError::invalid_input(ticker, "quantity", quantity as f64));
        }

        let Some(reference) = self.reference_price(ticker) else {
            debug!(ticker, "no reference price; ignoring price update");
            return Ok(Vec::new());
        };

        let t = self.thresholds;
        let mut intents = Vec::new();

        if price < t.dca_trigger(reference) {
            let shares = ((quantity as f64 * t.dca_fraction).floor() as i64).max(1);
            intents.push(TradeIntent::market_buy(ticker, shares, BuyReason::Dca));
            self.reference_prices.insert(ticker.to_string(), price);
            info!(
                ticker,
                "DCA: bought additional {} shares at ${:.2} (price dropped {:.0}% below last buy)",
                shares,
                price,
                t.dca_threshold * 100.0
            );
        }

        if price > t.call_trigger(reference) {
            intents.push(TradeIntent::signal(ticker, SignalKind::CoveredCall));
            info!(
                ticker,
                "SIGNAL: consider selling covered call at ${:.2} (+{:.0}% from last buy)",
                price,
                t.call_threshold * 100.0
            );
        }

        if price < t.put_trigger(reference) {
            intents.push(TradeIntent::signal(ticker, SignalKind::ProtectivePut));
            info!(
                ticker,
                "SIGNAL: consider buying protective put at ${:.2} (-{:.0}% from last buy)",
                price,
                t.put_threshold * 100.0
            );
        }

        Ok(intents)
    }

    /// Reinvest a dividend into whole shares. Leftover fractional cash is
    /// dropped, not carried to the next distribution.
    pub fn on_dividend(
        &mut self,
        ticker: &str,
        distribution_per_share: f64,
        shares_held: i64,
        price: f64,
    ) -> Result<Vec<TradeIntent>, RebalancerError> {
        validate_price(ticker, price)?;
        if !distribution_per_share.is_finite() || distribution_per_share < 0.0 {
            return Err(RebalancerError::invalid_input(
                ticker,
                "distribution",
                distribution_per_share,
            ));
        }
        if shares_held < 0 {
            return Err(RebalancerError::invalid_input(
                ticker,
                "shares_held",
                shares_held as f64,
            ));
        }

        if !self.reference_prices.contains_key(ticker) {
            debug!(ticker, "no reference price; ignoring dividend");
            return Ok(Vec::new());
        }

        let dividend_cash = distribution_per_share * shares_held as f64;
        if dividend_cash <= 0.0 {
            return Ok(Vec::new());
        }

        let whole_shares = (dividend_cash / price).floor();
        if !dividend_cash.is_finite() || whole_shares >= i64::MAX as f64 {
            return Err(RebalancerError::invalid_input(
                ticker,
                "distribution",
                distribution_per_share,
            ));
        }
        let shares = whole_shares as i64;
        if shares <= 0 {
            debug!(ticker, "dividend ${:.2} buys no whole shares", dividend_cash);
            return Ok(Vec::new());
        }

        self.reference_prices.insert(ticker.to_string(), price);
        info!(
            ticker,
            "DRIP: reinvested dividend ${:.2} into {} shares at ${:.2}",
            dividend_cash,
            shares,
            price
        );
        Ok(vec![TradeIntent::market_buy(ticker, shares, BuyReason::Drip)])
    }
}

fn validate_price(ticker: &str, price: f64) -> Result<(), RebalancerError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(RebalancerError::invalid_input(ticker, "price", price));
    }
    Ok(())
}
