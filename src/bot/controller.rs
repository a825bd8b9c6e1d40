use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::analysis::{AnalysisResult, MarketClassifier, MarketCondition};
use crate::error::BotError;
use crate::execution::{from_raw_amount, to_raw_amount, SwapExecutor, SwapOutcome, SwapRequest};
use crate::lifecycle::ExitOrchestrator;
use crate::market_data::{fetch_live_price, CandleSource, PoolResolver};
use crate::model::action::TradeAction;
use crate::model::candle::{Candle, Timeframe};
use crate::model::position::Position;
use crate::model::trade::Trade;
use crate::strategy::{EntryDecision, RejectReason, StrategyRules};

use super::settings::{BotSettings, EngineOptions};
use super::state::{BotState, BotStatus};

/// Result of one poll tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Another tick held the processing lock.
    Skipped,
    NotRunning(BotStatus),
    /// Prerequisites were missing; the bot was stopped.
    Halted,
    PriceUnavailable,
    ExitsProcessed {
        closed: usize,
        failed: usize,
    },
    EntryDataUnavailable,
    NoEntry(RejectReason),
    EntryOpened {
        position_id: String,
    },
    EntryFailed {
        error: String,
    },
    Panicked,
}

struct Fill {
    price: f64,
    signature: String,
}

struct Inner {
    candles: Arc<dyn CandleSource>,
    pools: Arc<dyn PoolResolver>,
    executor: Arc<dyn SwapExecutor>,
    options: EngineOptions,
    state: Mutex<BotState>,
    /// Held for the whole analysis phase and for every tick.
    processing: tokio::sync::Mutex<()>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

/// Drives one bot through `Stopped -> Analyzing -> Running` and runs the
/// poll loop. Cloning yields another handle to the same bot.
#[derive(Clone)]
pub struct BotController {
    inner: Arc<Inner>,
}

impl BotController {
    pub fn new(
        candles: Arc<dyn CandleSource>,
        pools: Arc<dyn PoolResolver>,
        executor: Arc<dyn SwapExecutor>,
        settings: BotSettings,
        options: EngineOptions,
    ) -> Result<Self, BotError> {
        settings.validate()?;
        let state = BotState::new(settings, options.trade_history_limit);
        Ok(Self {
            inner: Arc::new(Inner {
                candles,
                pools,
                executor,
                options,
                state: Mutex::new(state),
                processing: tokio::sync::Mutex::new(()),
                timer: Mutex::new(None),
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, BotState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn timer(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> BotState {
        self.state().clone()
    }

    pub fn status(&self) -> BotStatus {
        self.state().status
    }

    pub fn options(&self) -> &EngineOptions {
        &self.inner.options
    }

    /// Whether the poll timer is still scheduled.
    pub fn has_pending_timer(&self) -> bool {
        self.timer().as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn update_settings(&self, settings: BotSettings) -> Result<(), BotError> {
        let mut state = self.state();
        if state.status != BotStatus::Stopped {
            return Err(BotError::InvalidCommand {
                command: "update settings",
                status: state.status.to_string(),
            });
        }
        settings.validate()?;
        state.working_amount = settings.amount;
        state.settings = settings;
        Ok(())
    }

    /// Resolve the pool, classify the market and, if actionable, enter
    /// `Running` and schedule the poll loop. Returns the status the bot
    /// settled in.
    pub async fn start(&self) -> Result<BotStatus, BotError> {
        let (epoch, pair) = {
            let mut state = self.state();
            if !matches!(state.status, BotStatus::Stopped | BotStatus::Error) {
                return Err(BotError::InvalidCommand {
                    command: "start",
                    status: state.status.to_string(),
                });
            }
            if !self.inner.executor.is_ready() {
                state.error_message = Some(BotError::NoExecutionIdentity.to_string());
                return Err(BotError::NoExecutionIdentity);
            }
            state.status = BotStatus::Analyzing;
            state.analysis = None;
            state.pool = None;
            state.error_message = None;
            state.market_condition = MarketCondition::Unclear;
            state.current_run = 0;
            state.working_amount = state.settings.amount;
            state.epoch += 1;
            (state.epoch, state.settings.pair.clone())
        };
        tracing::info!(pair = %pair, "Bot starting, analyzing market");

        let guard = self.inner.processing.lock().await;

        let Some(pool) = self.inner.pools.resolve_pool(&pair).await else {
            return self.fail_analysis(epoch, BotError::PoolNotFound(pair));
        };
        let classifier =
            MarketClassifier::new(self.inner.candles.clone(), self.inner.options.classifier);
        let analysis = classifier.classify(&pool).await;

        let period = {
            let mut state = self.state();
            if state.epoch != epoch || state.status != BotStatus::Analyzing {
                tracing::info!(status = %state.status, "Bot left analysis before it finished");
                return Ok(state.status);
            }
            state.last_analysis_at = Some(Utc::now());
            state.market_condition = analysis.condition;
            if !analysis.condition.is_actionable() {
                let err = BotError::MarketUnclear;
                tracing::warn!(pool = %pool, "Market condition unclear, bot halted");
                state.status = BotStatus::Error;
                state.error_message = Some(err.to_string());
                return Err(err);
            }
            state.analysis = Some(analysis);
            state.pool = Some(pool.clone());
            state.status = BotStatus::Running;
            state.settings.run_interval()
        };
        drop(guard);

        tracing::info!(
            pool = %pool,
            condition = %analysis.condition,
            interval_secs = period.as_secs(),
            "Bot running"
        );
        let handle = tokio::spawn(self.clone().poll_loop(epoch, period));
        if let Some(previous) = self.timer().replace(handle) {
            previous.abort();
        }
        self.spawn_tick();
        Ok(BotStatus::Running)
    }

    fn fail_analysis(&self, epoch: u64, err: BotError) -> Result<BotStatus, BotError> {
        let mut state = self.state();
        if state.epoch != epoch || state.status != BotStatus::Analyzing {
            return Ok(state.status);
        }
        tracing::warn!(error = %err, "Analysis failed, bot halted");
        state.status = BotStatus::Error;
        state.error_message = Some(err.to_string());
        Err(err)
    }

    /// Always honored. A tick already in flight runs to completion but
    /// nothing further is scheduled.
    pub fn stop(&self) {
        let previous = self.status();
        self.halt(None);
        tracing::info!(previous = %previous, "Bot stopped");
    }

    fn halt(&self, error: Option<String>) {
        Self::mark_stopped(&mut self.state(), error);
        self.cancel_timer();
    }

    /// Like [`halt`](Self::halt), but only while `epoch` is still the
    /// current run. Work left over from an earlier run never stops a new one.
    fn halt_if_current(&self, epoch: u64, error: Option<String>) -> bool {
        {
            let mut state = self.state();
            if state.epoch != epoch {
                return false;
            }
            Self::mark_stopped(&mut state, error);
        }
        self.cancel_timer();
        true
    }

    fn mark_stopped(state: &mut BotState, error: Option<String>) {
        state.status = BotStatus::Stopped;
        state.epoch += 1;
        if error.is_some() {
            state.error_message = error;
        }
    }

    fn cancel_timer(&self) {
        if let Some(handle) = self.timer().take() {
            handle.abort();
        }
    }

    /// Resolves once no tick or analysis holds the processing lock.
    pub async fn wait_idle(&self) {
        let _guard = self.inner.processing.lock().await;
    }

    fn is_current(&self, epoch: u64) -> bool {
        let state = self.state();
        state.epoch == epoch && state.status == BotStatus::Running
    }

    /// Ticks run as their own tasks so stop() never cancels one midway and
    /// a slow tick makes the next one skip.
    fn spawn_tick(&self) {
        let controller = self.clone();
        tokio::spawn(async move {
            let outcome = controller.tick().await;
            tracing::debug!(?outcome, "Tick finished");
        });
    }

    /// Schedules every tick after the first, which `start` spawns itself.
    async fn poll_loop(self, epoch: u64, period: Duration) {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if !self.is_current(epoch) {
                break;
            }
            self.spawn_tick();
        }
    }

    /// One poll tick. Dropped with [`TickOutcome::Skipped`] when another
    /// tick or the analysis phase holds the processing lock.
    pub async fn tick(&self) -> TickOutcome {
        let Ok(_guard) = self.inner.processing.try_lock() else {
            tracing::debug!("Processing in progress, skipping tick");
            return TickOutcome::Skipped;
        };
        match AssertUnwindSafe(self.run_tick()).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!("Tick panicked");
                self.state().error_message = Some("Internal error during tick".to_string());
                TickOutcome::Panicked
            }
        }
    }

    async fn run_tick(&self) -> TickOutcome {
        let (epoch, status, pool, analysis, settings, has_positions) = {
            let state = self.state();
            (
                state.epoch,
                state.status,
                state.pool.clone(),
                state.analysis,
                state.settings.clone(),
                !state.positions.is_empty(),
            )
        };
        if status != BotStatus::Running {
            return TickOutcome::NotRunning(status);
        }
        let (Some(pool), Some(analysis)) = (pool, analysis) else {
            tracing::error!("Bot running without pool or analysis, stopping");
            let err = BotError::Internal("bot is running without a pool or market analysis".into());
            self.halt_if_current(epoch, Some(err.to_string()));
            return TickOutcome::Halted;
        };

        if has_positions {
            self.check_exits(epoch, &pool, &analysis, &settings).await
        } else {
            self.try_entry(epoch, &pool, &analysis, &settings).await
        }
    }

    async fn fetch_recent(&self, pool: &str) -> Option<Vec<Candle>> {
        self.inner
            .candles
            .fetch_candles(
                pool,
                Timeframe::Minute,
                15,
                self.inner.options.entry_candle_count,
                None,
            )
            .await
    }

    /// Trades and position changes are always recorded. Run accounting and
    /// the error message only apply while `epoch` is still current.
    async fn check_exits(
        &self,
        epoch: u64,
        pool: &str,
        analysis: &AnalysisResult,
        settings: &BotSettings,
    ) -> TickOutcome {
        let Some(price) = fetch_live_price(self.inner.candles.as_ref(), pool).await else {
            tracing::warn!(pool, "Live price unavailable, skipping exit checks");
            return TickOutcome::PriceUnavailable;
        };
        let orchestrator = ExitOrchestrator::new(settings.stop_loss, settings.take_profit);
        let rules = StrategyRules::from_kind(settings.strategy_type);
        let positions = self.state().positions.to_vec();
        let mut recent: Option<Option<Vec<Candle>>> = None;
        let (mut closed, mut failed) = (0, 0);

        for position in positions {
            let decision = match orchestrator.protective_exit(&position, price) {
                Some(decision) => Some(decision),
                None => {
                    if recent.is_none() {
                        recent = Some(self.fetch_recent(pool).await);
                    }
                    recent
                        .as_ref()
                        .and_then(|r| r.as_deref())
                        .and_then(|candles| {
                            orchestrator.strategy_exit(&rules, &position, analysis, candles)
                        })
                }
            };
            let Some(decision) = decision else {
                continue;
            };

            tracing::info!(
                position_id = %position.id,
                reason_code = decision.trigger.reason_code(),
                "{}",
                decision.message
            );
            let action = position.closing_action();
            let prefix = decision.trigger.trade_id_prefix();
            match self
                .execute(settings, action, position.amount, price, &decision.label)
                .await
            {
                Ok(fill) => {
                    let pnl = position.pnl_at(price);
                    let trade = Trade::filled(
                        prefix,
                        &position.pair,
                        action,
                        position.amount,
                        price,
                        &decision.label,
                        fill.signature,
                    )
                    .with_pnl(pnl);
                    let mut state = self.state();
                    state.positions.on_position_closed(&position.id);
                    state.trade_history.push(trade);
                    if state.epoch == epoch {
                        state.current_run += 1;
                        if settings.compound_capital {
                            state.working_amount *= position.return_multiple(price);
                        }
                    }
                    closed += 1;
                    tracing::info!(
                        position_id = %position.id,
                        pnl,
                        current_run = state.current_run,
                        "Position closed"
                    );
                }
                Err(error) => {
                    tracing::error!(
                        position_id = %position.id,
                        reason_code = decision.trigger.reason_code(),
                        error = %error,
                        "Exit trade failed, position stays open"
                    );
                    let trade = Trade::failed(
                        prefix,
                        &position.pair,
                        action,
                        position.amount,
                        &decision.label,
                        error.clone(),
                    );
                    let mut state = self.state();
                    state.trade_history.push(trade);
                    if state.epoch == epoch {
                        state.error_message = Some(format!(
                            "{} failed for {}: {}",
                            decision.label, position.pair, error
                        ));
                    }
                    failed += 1;
                }
            }
        }

        if closed > 0 {
            self.stop_if_runs_completed(epoch);
        }
        TickOutcome::ExitsProcessed { closed, failed }
    }

    fn stop_if_runs_completed(&self, epoch: u64) {
        {
            let mut state = self.state();
            let (current_run, max_runs) = (state.current_run, state.settings.max_runs);
            if state.epoch != epoch || current_run < max_runs {
                return;
            }
            tracing::info!(current_run, max_runs, "All runs completed, stopping bot");
            Self::mark_stopped(&mut state, None);
        }
        self.cancel_timer();
    }

    async fn try_entry(
        &self,
        epoch: u64,
        pool: &str,
        analysis: &AnalysisResult,
        settings: &BotSettings,
    ) -> TickOutcome {
        let Some(recent) = self.fetch_recent(pool).await else {
            tracing::warn!(pool, "Recent candles unavailable, skipping entry check");
            return TickOutcome::EntryDataUnavailable;
        };
        let rules = StrategyRules::from_kind(settings.strategy_type);
        if let EntryDecision::Reject(reason) = rules.evaluate_entry(analysis, &recent) {
            tracing::info!(
                strategy = %rules.kind(),
                reason_code = reason.as_str(),
                "Entry conditions not met"
            );
            return TickOutcome::NoEntry(reason);
        }

        let live = fetch_live_price(self.inner.candles.as_ref(), pool).await;
        let Some(reference_price) = live
            .or_else(|| recent.last().map(|c| c.close))
            .filter(|p| p.is_finite() && *p > 0.0)
        else {
            tracing::warn!(pool, "No usable price for entry");
            return TickOutcome::EntryDataUnavailable;
        };

        let amount = self.state().working_amount;
        let label = rules.kind().label();
        tracing::info!(
            strategy = label,
            action = %settings.action,
            amount,
            reference_price,
            test_mode = settings.is_test_mode,
            "Entry conditions met, dispatching trade"
        );

        match self
            .execute(settings, settings.action, amount, reference_price, label)
            .await
        {
            Ok(fill) => {
                let position = Position::new(&settings.pair, fill.price, amount, settings.action);
                let trade = Trade::filled(
                    "entry",
                    &settings.pair,
                    settings.action,
                    amount,
                    fill.price,
                    label,
                    fill.signature,
                );
                let mut state = self.state();
                let position_id = state.positions.on_entry_filled(position);
                state.trade_history.push(trade);
                tracing::info!(position_id = %position_id, price = fill.price, "Position opened");
                TickOutcome::EntryOpened { position_id }
            }
            Err(error) => {
                tracing::error!(error = %error, "Entry trade failed");
                let trade = Trade::failed(
                    "entry",
                    &settings.pair,
                    settings.action,
                    amount,
                    label,
                    error.clone(),
                );
                let mut state = self.state();
                state.trade_history.push(trade);
                if state.epoch == epoch {
                    state.error_message = Some(format!("Entry trade failed: {}", error));
                }
                TickOutcome::EntryFailed { error }
            }
        }
    }

    /// Simulated fills happen at the reference price. Real swaps go through
    /// the executor; a panic there is reported as a failure.
    async fn execute(
        &self,
        settings: &BotSettings,
        action: TradeAction,
        amount: f64,
        reference_price: f64,
        label: &str,
    ) -> Result<Fill, String> {
        if settings.is_test_mode {
            return Ok(Fill {
                price: reference_price,
                signature: format!("simulated_{}", uuid::Uuid::new_v4().simple()),
            });
        }

        let request = self.swap_request(action, amount, reference_price, label)?;
        let outcome = AssertUnwindSafe(self.inner.executor.execute_swap(request))
            .catch_unwind()
            .await
            .map_err(|_| "swap executor panicked".to_string())?;
        match outcome {
            SwapOutcome::Filled {
                signature,
                input_amount,
                output_amount,
            } => {
                let price = self
                    .fill_price(action, input_amount, output_amount)
                    .unwrap_or(reference_price);
                Ok(Fill { price, signature })
            }
            SwapOutcome::Failed { error } => Err(error),
        }
    }

    /// Buys spend quote worth `amount` base at the reference price; sells
    /// spend `amount` base.
    fn swap_request(
        &self,
        action: TradeAction,
        amount: f64,
        reference_price: f64,
        label: &str,
    ) -> Result<SwapRequest, String> {
        let assets = &self.inner.options.assets;
        let (input, output, raw) = match action {
            TradeAction::Buy => (
                &assets.quote,
                &assets.base,
                to_raw_amount(amount * reference_price, assets.quote.decimals),
            ),
            TradeAction::Sell => (
                &assets.base,
                &assets.quote,
                to_raw_amount(amount, assets.base.decimals),
            ),
        };
        let raw = raw.ok_or_else(|| format!("trade amount {} is too small to swap", amount))?;
        Ok(SwapRequest {
            input_mint: input.mint.clone(),
            output_mint: output.mint.clone(),
            amount_raw: raw.to_string(),
            slippage_pct: self.inner.options.slippage_pct,
            label: label.to_string(),
        })
    }

    /// Quote units per base unit of a filled swap.
    fn fill_price(&self, action: TradeAction, input_amount: u64, output_amount: u64) -> Option<f64> {
        let assets = &self.inner.options.assets;
        let (base_raw, quote_raw) = match action {
            TradeAction::Buy => (output_amount, input_amount),
            TradeAction::Sell => (input_amount, output_amount),
        };
        let base = from_raw_amount(base_raw, assets.base.decimals);
        let quote = from_raw_amount(quote_raw, assets.quote.decimals);
        let price = quote / base;
        (base > 0.0 && price.is_finite() && price > 0.0).then_some(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::PaperExecutor;
    use async_trait::async_trait;

    struct NoMarket;

    #[async_trait]
    impl CandleSource for NoMarket {
        async fn fetch_candles(
            &self,
            _pool: &str,
            _timeframe: Timeframe,
            _aggregate: u32,
            _limit: u32,
            _before_timestamp: Option<i64>,
        ) -> Option<Vec<Candle>> {
            None
        }
    }

    #[async_trait]
    impl PoolResolver for NoMarket {
        async fn resolve_pool(&self, _pair: &str) -> Option<String> {
            None
        }
    }

    fn controller() -> BotController {
        let market = Arc::new(NoMarket);
        BotController::new(
            market.clone(),
            market,
            Arc::new(PaperExecutor),
            BotSettings::default(),
            EngineOptions::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn running_without_pool_halts() {
        let ctl = controller();
        ctl.state().status = BotStatus::Running;

        assert_eq!(ctl.tick().await, TickOutcome::Halted);
        let state = ctl.snapshot();
        assert_eq!(state.status, BotStatus::Stopped);
        assert!(state.error_message.unwrap().starts_with("internal error"));
    }

    #[tokio::test]
    async fn stop_bumps_epoch_so_stale_work_is_ignored() {
        let ctl = controller();
        let before = ctl.state().epoch;
        ctl.stop();
        assert_eq!(ctl.state().epoch, before + 1);
        assert!(!ctl.is_current(before));
    }

    #[test]
    fn fill_price_is_quote_per_base() {
        let ctl = controller();
        let price = ctl.fill_price(TradeAction::Buy, 10_000_000, 100_000_000);
        assert!((price.unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(ctl.fill_price(TradeAction::Sell, 0, 5_000_000), None);
    }

    #[test]
    fn tiny_amounts_cannot_be_swapped() {
        let ctl = controller();
        let err = ctl
            .swap_request(TradeAction::Sell, 1e-12, 100.0, "Stop Loss")
            .unwrap_err();
        assert!(err.contains("too small"));
    }
}
