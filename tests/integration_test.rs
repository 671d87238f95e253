//! End-to-end scenarios across the decision engine, backtest runner and
//! paper broker.

mod common;

use common::*;
use pulsetrader::adapters::clock_adapter::InstantClock;
use pulsetrader::adapters::paper_broker_adapter::PaperBroker;
use pulsetrader::domain::backtest::{run_backtest, BacktestConfig};
use pulsetrader::domain::engine::{CycleOutcome, TradeEngine};
use pulsetrader::domain::indicator::{compute_snapshot, IndicatorSnapshot};
use pulsetrader::domain::metrics::Metrics;
use pulsetrader::domain::order::build_order;
use pulsetrader::domain::position::Side;
use pulsetrader::domain::quote::Quote;
use pulsetrader::domain::signal::{classify, Signal};
use pulsetrader::ports::market_port::OrderResult;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

mod signal_to_order {
    use super::*;

    #[test]
    fn buy_snapshot_becomes_bracketed_buy_order() {
        let config = test_strategy();
        let snapshot = IndicatorSnapshot {
            rsi: 25.0,
            macd_line: 1.2,
            macd_signal: 0.8,
            boll_upper: 104.0,
            boll_middle: 101.5,
            boll_lower: 99.0,
        };
        let quote = Quote {
            ask: 98.5,
            bid: 98.0,
        };

        let signal = classify(&snapshot, &quote, &config);
        assert_eq!(signal, Signal::Buy);

        let spec = build_order(signal, "VIX", quote.ask, &config).unwrap();
        assert_eq!(spec.side, Side::Buy);
        assert!((spec.price - quote.ask).abs() < f64::EPSILON);
        assert!((spec.stop_loss - (quote.ask - 10.0)).abs() < 1e-9);
        assert!((spec.take_profit - (quote.ask + 20.0)).abs() < 1e-9);
    }

    #[test]
    fn sell_snapshot_builds_at_the_bid() {
        let config = test_strategy();
        let snapshot = IndicatorSnapshot {
            rsi: 78.0,
            macd_line: -0.4,
            macd_signal: 0.1,
            boll_upper: 104.0,
            boll_middle: 101.5,
            boll_lower: 99.0,
        };
        let quote = Quote {
            ask: 104.5,
            bid: 104.2,
        };

        let signal = classify(&snapshot, &quote, &config);
        assert_eq!(signal, Signal::Sell);

        let spec = build_order(signal, "VIX", quote.bid, &config).unwrap();
        assert_eq!(spec.side, Side::Sell);
        assert!((spec.stop_loss - (quote.bid + 10.0)).abs() < 1e-9);
        assert!((spec.take_profit - (quote.bid - 20.0)).abs() < 1e-9);
    }
}

mod engine_scenarios {
    use super::*;

    fn buy_market() -> (MockMarket, Quote) {
        let config = test_strategy();
        let bars = make_bars(&oversold_bounce_closes());
        let snapshot = compute_snapshot(&bars, &config).unwrap();
        let quote = Quote {
            ask: snapshot.boll_lower - 0.5,
            bid: snapshot.boll_lower - 1.0,
        };
        let market = MockMarket::new()
            .with_quote(quote)
            .with_bars(bars)
            .with_submit_result(OrderResult::filled(quote.ask));
        (market, quote)
    }

    #[test]
    fn buy_signal_enters_once_then_suppresses() {
        let (mut market, quote) = buy_market();
        let mut engine = TradeEngine::new("VIX", test_strategy());

        let outcome = engine.run_cycle(&mut market).unwrap();
        assert_eq!(
            outcome,
            CycleOutcome::Entered {
                side: Side::Buy,
                fill_price: quote.ask
            }
        );

        // Broker still reports the position open: no second order.
        market.broker_position = engine.gate().open_position().cloned();
        let outcome = engine.run_cycle(&mut market).unwrap();
        assert_eq!(outcome, CycleOutcome::Suppressed(Signal::Buy));
        assert_eq!(market.submitted.len(), 1);
    }

    #[test]
    fn bar_fetch_failure_skips_without_submitting() {
        let (seed, quote) = buy_market();
        let mut market = MockMarket::new()
            .with_quote(quote)
            .with_submit_result(seed.submit_result);
        // bars left unscripted: fetch fails

        let mut engine = TradeEngine::new("VIX", test_strategy());
        let outcome = engine.run_cycle(&mut market).unwrap();

        assert_eq!(outcome, CycleOutcome::DataUnavailable);
        assert!(market.submitted.is_empty());
    }

    #[test]
    fn rejected_order_keeps_gate_open_for_retry() {
        let (mut market, _) = buy_market();
        market.submit_result = OrderResult::rejected(10019);

        let mut engine = TradeEngine::new("VIX", test_strategy());
        let outcome = engine.run_cycle(&mut market).unwrap();

        assert_eq!(outcome, CycleOutcome::Rejected { code: 10019 });
        assert!(engine.gate().can_enter());

        // Broker accepts on the retry cycle.
        market.submit_result = OrderResult::filled(100.0);
        let outcome = engine.run_cycle(&mut market).unwrap();
        assert!(matches!(outcome, CycleOutcome::Entered { .. }));
    }

    #[test]
    fn broker_side_closure_reopens_the_gate() {
        let (mut market, _) = buy_market();
        let mut engine = TradeEngine::new("VIX", test_strategy());

        engine.run_cycle(&mut market).unwrap();
        assert!(!engine.gate().can_enter());

        // Broker no longer reports the position (bracket exit hit).
        market.broker_position = None;
        engine.run_cycle(&mut market).unwrap();
        assert_eq!(market.submitted.len(), 2);
    }
}

mod paper_replay {
    use super::*;

    #[test]
    fn full_loop_replays_to_end_of_data() {
        let bars = make_bars(&oversold_dip_closes());
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut broker = PaperBroker::new(bars, 0.0, shutdown.clone());

        let mut engine = TradeEngine::new("VIX", test_strategy());
        engine.run(&mut broker, &InstantClock, &shutdown).unwrap();

        assert!(shutdown.load(std::sync::atomic::Ordering::SeqCst));
        // The dip bar fires a BUY; the fill is still open at end of data.
        assert!(broker.position().is_some());
        assert_eq!(broker.position().unwrap().side, Side::Buy);
    }

    #[test]
    fn paper_loop_stop_out_is_reconciled() {
        // Dip entry, then a slump through the 1-increment stop: the broker
        // closes the position and the engine notices at its next cycle.
        let mut closes = oversold_dip_closes();
        let last = *closes.last().unwrap();
        closes.extend([last - 3.0, last - 4.0]);
        let bars = make_bars(&closes);

        let strategy = pulsetrader::domain::strategy::StrategyConfig {
            stop_loss_distance: 1.0,
            take_profit_distance: 1000.0,
            ..test_strategy()
        };

        let shutdown = Arc::new(AtomicBool::new(false));
        let mut broker = PaperBroker::new(bars, 0.0, shutdown.clone());
        let mut engine = TradeEngine::new("VIX", strategy);
        engine.run(&mut broker, &InstantClock, &shutdown).unwrap();

        assert!(shutdown.load(std::sync::atomic::Ordering::SeqCst));
    }
}

mod backtest_pipeline {
    use super::*;

    #[test]
    fn backtest_enters_where_the_classifier_first_fires() {
        // The backtest is the same classifier fed prefix windows with
        // close-derived quotes; its first entry must land exactly on the
        // first bar whose prefix classifies as non-HOLD.
        let strategy = pulsetrader::domain::strategy::StrategyConfig {
            stop_loss_distance: 500.0,
            take_profit_distance: 1000.0,
            ..test_strategy()
        };
        let bars = make_bars(&oversold_dip_closes());

        let first_signal_bar = (34..=bars.len())
            .find(|&end| {
                let window = &bars[..end];
                let snapshot = compute_snapshot(window, &strategy).unwrap();
                let close = window.last().unwrap().close;
                let quote = Quote {
                    ask: close,
                    bid: close,
                };
                classify(&snapshot, &quote, &strategy) != Signal::Hold
            })
            .map(|end| bars[end - 1].timestamp)
            .expect("fixture must fire a signal");

        let result =
            run_backtest(&bars, "VIX", &strategy, &BacktestConfig::default()).unwrap();
        assert_eq!(result.closed_trades[0].opened_at, first_signal_bar);
    }

    #[test]
    fn dip_fixture_produces_a_long_trade() {
        let strategy = pulsetrader::domain::strategy::StrategyConfig {
            stop_loss_distance: 500.0,
            take_profit_distance: 1000.0,
            ..test_strategy()
        };
        let bars = make_bars(&oversold_dip_closes());

        let result =
            run_backtest(&bars, "VIX", &strategy, &BacktestConfig::default()).unwrap();

        assert_eq!(result.closed_trades.len(), 1);
        assert_eq!(result.closed_trades[0].side, Side::Buy);

        let metrics = Metrics::compute(&result);
        assert_eq!(metrics.total_trades, 1);
    }

    #[test]
    fn flat_series_produces_no_trades_and_flat_equity() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + ((i % 4) as f64 - 1.5) * 0.1)
            .collect();
        let bars = make_bars(&closes);

        let result =
            run_backtest(&bars, "VIX", &test_strategy(), &BacktestConfig::default()).unwrap();

        assert!(result.closed_trades.is_empty());
        let metrics = Metrics::compute(&result);
        assert_eq!(metrics.total_return, 0.0);
        assert_eq!(metrics.max_drawdown, 0.0);
    }
}
