//! Trade intents: the engine's output, consumed by an order executor.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocationReason {
    Initial,
    Rebalance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuyReason {
    /// Price fell past the DCA threshold.
    Dca,
    /// Dividend reinvestment.
    Drip,
}

/// Advisory option-strategy signals. No option order is ever placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    CoveredCall,
    ProtectivePut,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TradeAction {
    /// Set holdings of the instrument to `weight` of total portfolio value.
    SetHoldings {
        weight: f64,
        reason: AllocationReason,
    },
    MarketBuy { quantity: i64, reason: BuyReason },
    SignalOnly(SignalKind),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeIntent {
    pub ticker: String,
    pub action: TradeAction,
}

impl TradeIntent {
    pub fn set_holdings(ticker: &str, weight: f64, reason: AllocationReason) -> Self {
        TradeIntent {
            ticker: ticker.to_string(),
            action: TradeAction::SetHoldings { weight, reason },
        }
    }

    pub fn market_buy(ticker: &str, quantity: i64, reason: BuyReason) -> Self {
        TradeIntent {
            ticker: ticker.to_string(),
            action: TradeAction::MarketBuy { quantity, reason },
        }
    }

    pub fn signal(ticker: &str, kind: SignalKind) -> Self {
        TradeIntent {
            ticker: ticker.to_string(),
            action: TradeAction::SignalOnly(kind),
        }
    }

    /// True for intents that place an order.
    pub fn is_order(&self) -> bool {
        !matches!(self.action, TradeAction::SignalOnly(_))
    }
}

impl fmt::Display for AllocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationReason::Initial => write!(f, "initial"),
            AllocationReason::Rebalance => write!(f, "rebalance"),
        }
    }
}

impl fmt::Display for BuyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuyReason::Dca => write!(f, "dca"),
            BuyReason::Drip => write!(f, "drip"),
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::CoveredCall => write!(f, "covered_call"),
            SignalKind::ProtectivePut => write!(f, "protective_put"),
        }
    }
}

impl fmt::Display for TradeIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            TradeAction::SetHoldings { weight, reason } => {
                write!(f, "SET_HOLDINGS {} {:.0}% ({})", self.ticker, weight * 100.0, reason)
            }
            TradeAction::MarketBuy { quantity, reason } => {
                write!(f, "BUY {} x{} ({})", self.ticker, quantity, reason)
            }
            TradeAction::SignalOnly(kind) => write!(f, "SIGNAL {} {}", self.ticker, kind),
        }
    }
}
