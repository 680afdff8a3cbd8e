use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use stochbot::StochbotError;
use stochbot::auth::timestamp_ms;
use stochbot::bot::{CycleOutcome, run_cycle};
use stochbot::config::{fetch_config, log_file};
use stochbot::credentials::{CredentialSource, populate_env_from_keychain};
use stochbot::execution::LoggingSink;
use stochbot::http::ReqwestTransport;
use stochbot::market_data::{MarketDataFetcher, TradeHistoryQuery};
use tracing::{Level, info, warn};

#[derive(Parser)]
#[command(version, about = "Stochastic RSI signal bot for WOO X")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one signal cycle (default).
    Run,
    /// Print executed trades for a symbol.
    Trades {
        #[arg(long, default_value = "PERP_POWR_USDT")]
        symbol: String,
        /// How far back to look.
        #[arg(long, default_value_t = 180)]
        days: u32,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 25)]
        size: u32,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), StochbotError> {
    let cli = Cli::parse();

    init_tracing(log_file().as_deref())?;
    match populate_env_from_keychain() {
        CredentialSource::Missing => warn!("no WOOX API credentials in environment or keychain"),
        source => info!(%source, "WOOX API credentials resolved"),
    }
    let app_config = fetch_config()?;

    let fetcher = MarketDataFetcher::new(
        ReqwestTransport::new()?,
        app_config.woox.base_url,
        app_config.woox.credentials,
        app_config.bot.retry,
    );

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let sink = LoggingSink::stdout();
            match run_cycle(&fetcher, &sink, &app_config.bot).await {
                CycleOutcome::Skipped(e) => info!("cycle skipped: {e}"),
                CycleOutcome::ExecutionFailed { error, .. } => return Err(error),
                CycleOutcome::NoEntry | CycleOutcome::Entered(_) => {}
            }
        }
        Command::Trades {
            symbol,
            days,
            page,
            size,
        } => {
            let query = TradeHistoryQuery {
                page,
                size,
                ..TradeHistoryQuery::last_days(symbol, days, timestamp_ms())
            };
            let history = fetcher.fetch_trade_history(&query).await?;
            let mut volume = Decimal::ZERO;
            for trade in &history.rows {
                volume += trade.notional();
                println!(
                    "{} {} {} {} @ {} fee {} {}",
                    trade.executed_timestamp,
                    trade.symbol,
                    trade.side,
                    trade.executed_quantity,
                    trade.executed_price,
                    trade.fee,
                    trade.fee_asset.as_deref().unwrap_or("")
                );
            }
            match &history.meta {
                Some(meta) => println!(
                    "page {} ({} per page), {} trades total, page notional {volume}",
                    meta.current_page, meta.records_per_page, meta.total
                ),
                None => println!("{} trades, notional {volume}", history.rows.len()),
            }
        }
    }

    Ok(())
}

/// Installs the fmt subscriber, appending to `log_file` or writing to stdout.
fn init_tracing(log_file: Option<&str>) -> Result<(), StochbotError> {
    let builder = tracing_subscriber::fmt().with_max_level(Level::INFO);
    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.init(),
    }
    Ok(())
}
