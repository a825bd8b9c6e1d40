use std::sync::Arc;

use anyhow::{bail, Context, Result};

use solbotx::bot::{BotController, BotStatus};
use solbotx::config::Config;
use solbotx::execution::PaperExecutor;
use solbotx::gecko::GeckoTerminalClient;

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        config
            .logging
            .level
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    });
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Set SOLBOTX_CONFIG or create config/default.toml");
            std::process::exit(1);
        }
    };
    init_tracing(&config);

    let settings = config.bot.settings.clone();
    if !settings.is_test_mode {
        bail!("live trading needs a wallet identity; set is_test_mode = true");
    }

    tracing::info!(
        pair = %settings.pair,
        strategy = %settings.strategy_type,
        network = %config.market_data.network,
        interval_minutes = settings.run_interval_minutes,
        "Starting solbotx"
    );

    let market = Arc::new(GeckoTerminalClient::new(&config.market_data));
    let controller = BotController::new(
        market.clone(),
        market,
        Arc::new(PaperExecutor),
        settings.clone(),
        config.engine_options(),
    )
    .context("invalid bot settings")?;

    if let Err(e) = controller.start().await {
        tracing::error!(error = %e, "Bot failed to start");
        return Err(e).context("bot failed to start");
    }

    let mut status_every = tokio::time::interval(settings.run_interval());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received");
                controller.stop();
                break;
            }
            _ = status_every.tick() => {
                let state = controller.snapshot();
                let perf = state.performance();
                tracing::info!(
                    status = %state.status,
                    condition = %state.market_condition,
                    open_positions = perf.open_positions,
                    trades = state.trade_history.len(),
                    current_run = state.current_run,
                    realized_pnl = perf.overall.realized_pnl,
                    error = state.error_message.as_deref().unwrap_or(""),
                    "Bot status"
                );
                if state.status != BotStatus::Running {
                    break;
                }
            }
        }
    }

    // A tick already in flight finishes before the runtime goes away.
    controller.wait_idle().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
