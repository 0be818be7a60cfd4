//! Read-only views of the external portfolio store and market data feed.

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Holding {
    pub quantity: i64,
    pub average_price: f64,
}

impl Holding {
    pub fn is_invested(&self) -> bool {
        self.quantity != 0
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }
}

/// Snapshot of the portfolio store. The engine never mutates it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortfolioSnapshot {
    pub cash: f64,
    pub holdings: HashMap<String, Holding>,
}

impl PortfolioSnapshot {
    pub fn new(cash: f64) -> Self {
        PortfolioSnapshot {
            cash,
            holdings: HashMap::new(),
        }
    }

    pub fn set_holding(&mut self, ticker: &str, holding: Holding) {
        self.holdings.insert(ticker.to_string(), holding);
    }

    pub fn holding(&self, ticker: &str) -> Option<&Holding> {
        self.holdings.get(ticker)
    }

    /// Cash plus holdings marked at `prices`. Holdings never priced are marked
    /// at their average cost.
    pub fn total_value(&self, prices: &HashMap<String, f64>) -> f64 {
        let positions: f64 = self
            .holdings
            .iter()
            .map(|(ticker, h)| {
                let price = prices.get(ticker).copied().unwrap_or(h.average_price);
                h.market_value(price)
            })
            .sum();
        self.cash + positions
    }

    /// Summary of invested holdings, in the order of `tickers`.
    pub fn summary<'a>(
        &self,
        tickers: impl IntoIterator<Item = &'a str>,
        prices: &HashMap<String, f64>,
    ) -> PortfolioSummary {
        let lines = tickers
            .into_iter()
            .filter_map(|ticker| {
                let h = self.holdings.get(ticker).filter(|h| h.is_invested())?;
                Some(HoldingLine {
                    ticker: ticker.to_string(),
                    quantity: h.quantity,
                    average_price: h.average_price,
                    current_price: prices.get(ticker).copied(),
                })
            })
            .collect();

        PortfolioSummary {
            total_value: self.total_value(prices),
            cash: self.cash,
            lines,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoldingLine {
    pub ticker: String,
    pub quantity: i64,
    pub average_price: f64,
    pub current_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub cash: f64,
    pub lines: Vec<HoldingLine>,
}

impl fmt::Display for HoldingLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} shares, Avg Price: ${:.2}",
            self.ticker, self.quantity, self.average_price
        )?;
        match self.current_price {
            Some(p) => write!(f, ", Current: ${:.2}", p),
            None => write!(f, ", Current: n/a"),
        }
    }
}

impl fmt::Display for PortfolioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Portfolio Value: ${:.2}, Cash: ${:.2}",
            self.total_value, self.cash
        )
    }
}

/// Current prices as reported by the market data feed for one event.
///
/// An instrument absent from `prices` has no data for this event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarketView {
    pub warming_up: bool,
    pub prices: HashMap<String, f64>,
}

impl MarketView {
    pub fn warming_up(prices: HashMap<String, f64>) -> Self {
        MarketView {
            warming_up: true,
            prices,
        }
    }

    pub fn with_price(mut self, ticker: &str, price: f64) -> Self {
        self.prices.insert(ticker.to_string(), price);
        self
    }

    pub fn price(&self, ticker: &str) -> Option<f64> {
        self.prices.get(ticker).copied()
    }
}
