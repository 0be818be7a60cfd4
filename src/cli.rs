//! CLI definition and dispatch.
//!
//! The CLI is a thin host around the engine: it loads an INI config, replays a
//! CSV event log through the schedule and engine, and writes intents as CSV.

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::csv_event_adapter::CsvEventAdapter;
use crate::adapters::csv_intent_writer::CsvIntentWriter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::allocation::{Instrument, TargetAllocation, parse_allocation};
use crate::domain::config_validation::validate_config;
use crate::domain::engine::RuleEngine;
use crate::domain::error::RebalancerError;
use crate::domain::intent::TradeIntent;
use crate::domain::portfolio::MarketView;
use crate::domain::schedule::{DEFAULT_WARMUP_DAYS, Schedule};
use crate::domain::session::{Session, SessionReport};
use crate::domain::thresholds::TriggerThresholds;
use crate::ports::config_port::ConfigPort;
use crate::ports::event_port::EventSource;

#[derive(Parser, Debug)]
#[command(
    name = "rebalancer",
    about = "Target-weight rebalancing with DCA, dividend reinvestment and option signals"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Replay a CSV event log and emit trade intents
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        events: PathBuf,
        /// Intent CSV destination (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Evaluate the price rules for one instrument against a reference price
    Check {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: String,
        #[arg(long)]
        reference: f64,
        #[arg(long)]
        price: f64,
        #[arg(long, default_value_t = 0)]
        quantity: i64,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Validate { config } => run_validate(&config),
        Command::Run {
            config,
            events,
            output,
        } => run_session(&config, &events, output.as_ref()).map(|_| ()),
        Command::Check {
            config,
            ticker,
            reference,
            price,
            quantity,
        } => run_check(&config, &ticker, reference, price, quantity).map(|intents| {
            for intent in &intents {
                println!("{intent}");
            }
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, RebalancerError> {
    FileConfigAdapter::from_file(path).map_err(|e| RebalancerError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Load and validate a config file in one step.
pub fn load_validated_config(path: &PathBuf) -> Result<FileConfigAdapter, RebalancerError> {
    info!("loading config from {}", path.display());
    let adapter = load_config(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

pub fn build_allocation(adapter: &dyn ConfigPort) -> Result<TargetAllocation, RebalancerError> {
    let targets = adapter.get_string("allocation", "targets").ok_or_else(|| {
        RebalancerError::ConfigMissing {
            section: "allocation".into(),
            key: "targets".into(),
        }
    })?;
    parse_allocation(&targets).map_err(|e| RebalancerError::ConfigInvalid {
        section: "allocation".into(),
        key: "targets".into(),
        reason: e.to_string(),
    })
}

pub fn build_thresholds(adapter: &dyn ConfigPort) -> TriggerThresholds {
    let defaults = TriggerThresholds::default();
    TriggerThresholds {
        dca_threshold: adapter.get_double("thresholds", "dca_threshold", defaults.dca_threshold),
        call_threshold: adapter.get_double("thresholds", "call_threshold", defaults.call_threshold),
        put_threshold: adapter.get_double("thresholds", "put_threshold", defaults.put_threshold),
        dca_fraction: adapter.get_double("thresholds", "dca_fraction", defaults.dca_fraction),
    }
}

pub fn build_warmup_days(adapter: &dyn ConfigPort) -> usize {
    adapter
        .get_int("schedule", "warmup_days", DEFAULT_WARMUP_DAYS as i64)
        .max(0) as usize
}

pub fn build_session(adapter: &dyn ConfigPort) -> Result<Session, RebalancerError> {
    let targets = build_allocation(adapter)?;
    let thresholds = build_thresholds(adapter);
    thresholds.validate()?;
    Ok(Session::new(
        targets,
        RuleEngine::new(thresholds),
        Schedule::new(build_warmup_days(adapter)),
    ))
}

fn run_validate(config_path: &PathBuf) -> Result<(), RebalancerError> {
    let adapter = load_validated_config(config_path)?;
    let targets = build_allocation(&adapter)?;
    let t = build_thresholds(&adapter);

    println!("Allocation:");
    for Instrument { ticker, weight } in targets.instruments() {
        println!("  {:<8} {:>6.2}%", ticker, weight * 100.0);
    }
    println!("  {:<8} {:>6.2}%", "cash", (1.0 - targets.total_weight()) * 100.0);
    println!("Thresholds:");
    println!("  dca_threshold:  {:.2}%", t.dca_threshold * 100.0);
    println!("  call_threshold: {:.2}%", t.call_threshold * 100.0);
    println!("  put_threshold:  {:.2}%", t.put_threshold * 100.0);
    println!("  dca_fraction:   {:.2}%", t.dca_fraction * 100.0);
    println!("Warm-up: {} trading days", build_warmup_days(&adapter));
    println!("\nConfiguration is valid.");
    Ok(())
}

pub fn run_session(
    config_path: &PathBuf,
    events_path: &PathBuf,
    output_path: Option<&PathBuf>,
) -> Result<SessionReport, RebalancerError> {
    let adapter = load_validated_config(config_path)?;
    let session = build_session(&adapter)?;

    info!("loading events from {}", events_path.display());
    let events = CsvEventAdapter::new(events_path.clone()).load_events()?;
    info!("replaying {} events", events.len());

    let out: Box<dyn Write> = match output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    let mut sink = CsvIntentWriter::new(out)?;
    let report = session.run(events, &mut sink)?;

    info!(
        "processed {} trading days: {} orders, {} signals",
        report.days, report.orders, report.signals
    );
    if let Some(path) = output_path {
        info!("intents written to {}", path.display());
    }
    Ok(report)
}

/// Evaluate the price rules as if `ticker` had last been bought at
/// `reference`.
pub fn run_check(
    config_path: &PathBuf,
    ticker: &str,
    reference: f64,
    price: f64,
    quantity: i64,
) -> Result<Vec<TradeIntent>, RebalancerError> {
    let adapter = load_validated_config(config_path)?;
    let targets = build_allocation(&adapter)?;
    let ticker = ticker.trim().to_uppercase();
    let weight = targets
        .weight_of(&ticker)
        .ok_or_else(|| RebalancerError::ConfigInvalid {
            section: "allocation".into(),
            key: "targets".into(),
            reason: format!("{ticker} is not in the allocation"),
        })?;

    let single = TargetAllocation::new(vec![Instrument {
        ticker: ticker.clone(),
        weight,
    }])
    .map_err(|e| RebalancerError::ConfigInvalid {
        section: "allocation".into(),
        key: "targets".into(),
        reason: e.to_string(),
    })?;

    let mut engine = RuleEngine::new(build_thresholds(&adapter));
    engine.initial_allocate(&single, &MarketView::default().with_price(&ticker, reference))?;
    engine.on_price_update(&ticker, price, quantity)
}
