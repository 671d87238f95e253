//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::adapters::clock_adapter::InstantClock;
use crate::adapters::csv_bar_adapter::CsvBarAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::paper_broker_adapter::PaperBroker;
use crate::domain::backtest::{run_backtest, BacktestConfig};
use crate::domain::engine::TradeEngine;
use crate::domain::error::TraderError;
use crate::domain::indicator::required_window;
use crate::domain::metrics::Metrics;
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "pulsetrader", about = "Indicator-driven bracket-order trading client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the decision loop against a recorded bar series (paper broker)
    Trade {
        #[arg(short, long)]
        config: PathBuf,
        /// CSV bar file replayed as the market feed
        #[arg(short, long)]
        data: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Replay historical bars through the strategy and report performance
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Load and validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Trade {
            config,
            data,
            symbol,
        } => run_trade(&config, &data, symbol.as_deref()),
        Command::Backtest {
            config,
            data,
            symbol,
        } => run_backtest_command(&config, &data, symbol.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn resolve_symbol(
    symbol_override: Option<&str>,
    adapter: &dyn ConfigPort,
) -> Result<String, TraderError> {
    if let Some(symbol) = symbol_override {
        return Ok(symbol.to_string());
    }
    match adapter.get_string("trading", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(TraderError::ConfigMissing {
            section: "trading".into(),
            key: "symbol".into(),
        }),
    }
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> BacktestConfig {
    let defaults = BacktestConfig::default();
    BacktestConfig {
        initial_capital: adapter.get_double(
            "backtest",
            "initial_capital",
            defaults.initial_capital,
        ),
        commission_pct: adapter.get_double("backtest", "commission_pct", defaults.commission_pct),
        spread: adapter.get_double("backtest", "spread", defaults.spread),
    }
}

fn load_strategy(config_path: &PathBuf) -> Result<(FileConfigAdapter, StrategyConfig), ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;

    let strategy = StrategyConfig::from_config(&adapter).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;

    Ok((adapter, strategy))
}

fn run_trade(config_path: &PathBuf, data_path: &PathBuf, symbol_override: Option<&str>) -> ExitCode {
    let (adapter, strategy) = match load_strategy(config_path) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let symbol = match resolve_symbol(symbol_override, &adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let bars = match CsvBarAdapter::new(data_path).load_bars() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Replaying {} bars for {}", bars.len(), symbol);

    let spread = adapter.get_double("backtest", "spread", 0.0);
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut broker = PaperBroker::new(bars, spread, shutdown.clone());

    let mut engine = TradeEngine::new(symbol, strategy);
    match engine.run(&mut broker, &InstantClock, &shutdown) {
        Ok(()) => {
            eprintln!("Decision loop finished (end of data)");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_backtest_command(
    config_path: &PathBuf,
    data_path: &PathBuf,
    symbol_override: Option<&str>,
) -> ExitCode {
    let (adapter, strategy) = match load_strategy(config_path) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let symbol = match resolve_symbol(symbol_override, &adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let bars = match CsvBarAdapter::new(data_path).load_bars() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let bt_config = build_backtest_config(&adapter);
    eprintln!(
        "Running backtest: {} bars for {}, {} capital",
        bars.len(),
        symbol,
        bt_config.initial_capital
    );

    let result = match run_backtest(&bars, &symbol, &strategy, &bt_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let metrics = Metrics::compute(&result);

    eprintln!("\n=== Backtest Results ===");
    eprintln!("Final Equity:     {:.2}", result.final_equity);
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!("Total Trades:     {}", metrics.total_trades);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", metrics.profit_factor);
    eprintln!("Avg Win:          {:.2}", metrics.avg_win);
    eprintln!("Avg Loss:         {:.2}", metrics.avg_loss);
    eprintln!("Largest Win:      {:.2}", metrics.largest_win);
    eprintln!("Largest Loss:     {:.2}", metrics.largest_loss);

    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let (adapter, strategy) = match load_strategy(config_path) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let symbol = adapter
        .get_string("trading", "symbol")
        .unwrap_or_else(|| "(not set)".to_string());

    eprintln!("Config validated successfully\n");
    eprintln!("Resolved strategy:");
    eprintln!("  symbol:               {}", symbol);
    eprintln!(
        "  rsi:                  period {}, oversold {}, overbought {}",
        strategy.rsi_period, strategy.rsi_oversold, strategy.rsi_overbought
    );
    eprintln!(
        "  macd:                 {}/{}/{}",
        strategy.macd_fast, strategy.macd_slow, strategy.macd_signal
    );
    eprintln!(
        "  bollinger:            period {}, deviation {}",
        strategy.bollinger_period, strategy.bollinger_deviation
    );
    eprintln!(
        "  bracket:              stop {} / target {} increments ({} each)",
        strategy.stop_loss_distance, strategy.take_profit_distance, strategy.price_increment
    );
    eprintln!(
        "  sizing:               lot {}, slippage {}",
        strategy.lot_size, strategy.slippage_tolerance
    );
    eprintln!(
        "  cadence:              poll {}s, backoff {}s",
        strategy.poll_interval_secs, strategy.retry_backoff_secs
    );
    eprintln!("  indicator window:     {} bars", required_window(&strategy));

    ExitCode::SUCCESS
}
