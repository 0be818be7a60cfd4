//! CLI integration tests.
//!
//! Tests cover:
//! - Config building (build_allocation, build_thresholds, build_warmup_days)
//! - One-shot rule checks against a reference price
//! - Full replay of a CSV event log into a CSV intent file
//! - Session scheduling: warm-up, month-start rebalance, dividends

mod common;

use chrono::NaiveDate;
use common::*;
use rebalancer::adapters::file_config_adapter::FileConfigAdapter;
use rebalancer::cli;
use rebalancer::domain::error::RebalancerError;
use rebalancer::domain::intent::{AllocationReason, BuyReason, SignalKind, TradeIntent};
use rebalancer::domain::session::Session;
use std::fs;
use std::path::PathBuf;

mod config_loading {
    use super::*;

    #[test]
    fn builds_allocation_in_config_order() {
        let adapter = FileConfigAdapter::from_string(SAMPLE_INI).unwrap();
        let alloc = cli::build_allocation(&adapter).unwrap();
        let tickers: Vec<_> = alloc.tickers().collect();
        assert_eq!(tickers, vec!["AAPL", "MSFT", "XOM", "GOLD", "NEE"]);
    }

    #[test]
    fn missing_allocation_is_config_missing() {
        let adapter = FileConfigAdapter::from_string("[thresholds]\ndca_threshold = 0.05\n").unwrap();
        let err = cli::build_allocation(&adapter).unwrap_err();
        assert!(matches!(err, RebalancerError::ConfigMissing { key, .. } if key == "targets"));
    }

    #[test]
    fn thresholds_fall_back_to_defaults() {
        let adapter = FileConfigAdapter::from_string("[thresholds]\nput_threshold = 0.2\n").unwrap();
        let t = cli::build_thresholds(&adapter);
        assert!((t.dca_threshold - 0.05).abs() < f64::EPSILON);
        assert!((t.put_threshold - 0.2).abs() < f64::EPSILON);
        assert_eq!(cli::build_warmup_days(&adapter), 5);
    }

    #[test]
    fn load_validated_config_reports_bad_values() {
        let file = write_temp("[allocation]\ntargets = AAPL:0.8,MSFT:0.8\n");
        let err = cli::load_validated_config(&file.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, RebalancerError::ConfigInvalid { key, .. } if key == "targets"));
    }

    #[test]
    fn load_config_missing_file_is_parse_error() {
        let err = cli::load_config(&PathBuf::from("/nonexistent/rebalancer.ini")).unwrap_err();
        assert!(matches!(err, RebalancerError::ConfigParse { .. }));
    }
}

mod check_command {
    use super::*;

    #[test]
    fn dca_and_put_from_reference() {
        let config = write_temp(SAMPLE_INI);
        let intents =
            cli::run_check(&config.path().to_path_buf(), "aapl", 100.0, 85.0, 100).unwrap();
        assert_eq!(
            intents,
            vec![
                TradeIntent::market_buy("AAPL", 10, BuyReason::Dca),
                TradeIntent::signal("AAPL", SignalKind::ProtectivePut),
            ]
        );
    }

    #[test]
    fn unknown_ticker_is_rejected() {
        let config = write_temp(SAMPLE_INI);
        let err = cli::run_check(&config.path().to_path_buf(), "TSLA", 100.0, 85.0, 100)
            .unwrap_err();
        assert!(matches!(err, RebalancerError::ConfigInvalid { reason, .. } if reason.contains("TSLA")));
    }

    #[test]
    fn bad_reference_is_invalid_input() {
        let config = write_temp(SAMPLE_INI);
        let err = cli::run_check(&config.path().to_path_buf(), "AAPL", 0.0, 85.0, 100)
            .unwrap_err();
        assert!(matches!(err, RebalancerError::InvalidInput { .. }));
    }
}

mod replay {
    use super::*;

    #[test]
    fn replays_event_log_to_intent_csv() {
        let config = write_temp(SAMPLE_INI);
        let events = write_temp(&format!(
            "{EVENT_HEADER}\
2020-01-30,AAPL,100.00,,0,0,100000\n\
2020-01-30,XOM,50.00,,0,0,\n\
2020-01-31,AAPL,94.00,,200,100.00,\n\
2020-01-31,XOM,50.00,1.00,300,50.00,\n\
2020-02-03,AAPL,112.00,,220,99.45,\n"
        ));
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("intents.csv");

        let report = cli::run_session(
            &config.path().to_path_buf(),
            &events.path().to_path_buf(),
            Some(&output),
        )
        .unwrap();
        assert_eq!(report.days, 3);

        let written = fs::read_to_string(&output).unwrap();
        let lines: Vec<_> = written.lines().collect();
        assert_eq!(
            lines,
            vec![
                "date,ticker,action,weight,quantity,signal,reason",
                "2020-01-30,AAPL,set_holdings,0.2000,,,initial",
                "2020-01-30,XOM,set_holdings,0.1500,,,initial",
                "2020-01-31,XOM,market_buy,,6,,drip",
                "2020-01-31,AAPL,market_buy,,20,,dca",
                "2020-02-03,AAPL,set_holdings,0.2000,,,rebalance",
            ]
        );
        // The replay starts mid-month, so the first rebalance waits for Feb 3.
        // XOM has no data that day, and the rebalance re-anchors AAPL at 112
        // before the price rules run, so no covered-call signal fires.
        assert_eq!(report.orders, 5);
        assert_eq!(report.signals, 0);
    }

    #[test]
    fn dividend_row_without_close_is_reinvested_at_last_price() {
        let config = write_temp(SAMPLE_INI);
        let events = write_temp(&format!(
            "{EVENT_HEADER}\
2020-01-02,XOM,50.00,,0,0,100000\n\
2020-01-03,XOM,,5.00,100,50.00,\n"
        ));
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("intents.csv");

        let report = cli::run_session(
            &config.path().to_path_buf(),
            &events.path().to_path_buf(),
            Some(&output),
        )
        .unwrap();
        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written.lines().last(), Some("2020-01-03,XOM,market_buy,,10,,drip"));
        // initial and rebalance on Jan 2, then the DRIP buy
        assert_eq!(report.orders, 3);
    }

    #[test]
    fn bad_event_file_fails_with_event_data() {
        let config = write_temp(SAMPLE_INI);
        let events = write_temp(&format!("{EVENT_HEADER}not-a-date,AAPL,1,,0,0,\n"));
        let dir = tempfile::tempdir().unwrap();
        let err = cli::run_session(
            &config.path().to_path_buf(),
            &events.path().to_path_buf(),
            Some(&dir.path().join("out.csv")),
        )
        .unwrap_err();
        assert!(matches!(err, RebalancerError::EventData { .. }));
    }
}

mod scheduling {
    use super::*;

    fn session_with_warmup(days: usize) -> Session {
        let ini = SAMPLE_INI.replace("warmup_days = 0", &format!("warmup_days = {days}"));
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        cli::build_session(&adapter).unwrap()
    }

    #[test]
    fn allocation_waits_for_warm_up_then_runs_once() {
        let session = session_with_warmup(2);
        let mut sink: Vec<(NaiveDate, TradeIntent)> = Vec::new();
        let events = vec![
            event(date(2020, 1, 2), "AAPL", Some(300.0), 0),
            event(date(2020, 1, 3), "AAPL", Some(297.0), 0),
            event(date(2020, 1, 6), "AAPL", Some(299.0), 0),
            event(date(2020, 1, 7), "AAPL", Some(298.0), 60),
        ];
        session.run(events, &mut sink).unwrap();

        // Jan 2 is the month start but still warming up, so no rebalance fires.
        assert_eq!(
            sink,
            vec![(
                date(2020, 1, 6),
                TradeIntent::set_holdings("AAPL", 0.20, AllocationReason::Initial)
            )]
        );
    }

    #[test]
    fn price_events_are_ignored_during_warm_up() {
        let session = session_with_warmup(3);
        let mut sink: Vec<(NaiveDate, TradeIntent)> = Vec::new();
        let events = vec![
            event(date(2020, 3, 2), "AAPL", Some(300.0), 100),
            event(date(2020, 3, 3), "AAPL", Some(200.0), 100),
        ];
        session.run(events, &mut sink).unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn put_signal_follows_crash_after_allocation() {
        let session = session_with_warmup(0);
        let mut sink: Vec<(NaiveDate, TradeIntent)> = Vec::new();
        let events = vec![
            event(date(2020, 2, 20), "MSFT", Some(180.0), 0),
            event(date(2020, 2, 21), "MSFT", Some(178.0), 110),
            event(date(2020, 2, 24), "MSFT", Some(160.0), 110),
        ];
        let report = session.run(events, &mut sink).unwrap();

        let last_day: Vec<_> = sink
            .iter()
            .filter(|(d, _)| *d == date(2020, 2, 24))
            .map(|(_, i)| i.clone())
            .collect();
        assert_eq!(
            last_day,
            vec![
                TradeIntent::market_buy("MSFT", 11, BuyReason::Dca),
                TradeIntent::signal("MSFT", SignalKind::ProtectivePut),
            ]
        );
        assert_eq!(report.signals, 1);
    }
}
