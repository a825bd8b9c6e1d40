use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::analysis::classifier::{MIN_DAILY_CANDLES, MIN_INTRADAY_CANDLES};
use crate::analysis::ClassifierConfig;
use crate::bot::settings::{
    BotSettings, EngineOptions, DEFAULT_ENTRY_CANDLE_COUNT, DEFAULT_SLIPPAGE_PCT,
};
use crate::model::trade::DEFAULT_TRADE_HISTORY_LIMIT;

pub const CONFIG_PATH_ENV: &str = "SOLBOTX_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub market_data: MarketDataConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub analysis: ClassifierConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    pub base_url: String,
    pub network: String,
    pub requests_per_minute: u32,
    pub pool_cache_ttl_secs: u64,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.geckoterminal.com/api/v2".to_string(),
            network: "solana".to_string(),
            requests_per_minute: 30,
            pool_cache_ttl_secs: 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    #[serde(flatten)]
    pub settings: BotSettings,
    #[serde(default = "default_slippage")]
    pub slippage_pct: f64,
    #[serde(default = "default_entry_candles")]
    pub entry_candle_count: u32,
    #[serde(default = "default_history_limit")]
    pub trade_history_limit: usize,
}

fn default_slippage() -> f64 {
    DEFAULT_SLIPPAGE_PCT
}

fn default_entry_candles() -> u32 {
    DEFAULT_ENTRY_CANDLE_COUNT
}

fn default_history_limit() -> usize {
    DEFAULT_TRADE_HISTORY_LIMIT
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            settings: BotSettings::default(),
            slippage_pct: DEFAULT_SLIPPAGE_PCT,
            entry_candle_count: DEFAULT_ENTRY_CANDLE_COUNT,
            trade_history_limit: DEFAULT_TRADE_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssetConfig {
    pub symbol: String,
    pub mint: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssetsConfig {
    pub base: AssetConfig,
    pub quote: AssetConfig,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            base: AssetConfig {
                symbol: "SOL".to_string(),
                mint: SOL_MINT.to_string(),
                decimals: 9,
            },
            quote: AssetConfig {
                symbol: "USDC".to_string(),
                mint: USDC_MINT.to_string(),
                decimals: 6,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Path from `SOLBOTX_CONFIG`, or `config/default.toml`.
    pub fn path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load_from(&Self::path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("invalid config in {}", config_path.display()))
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.bot.settings.validate().context("[bot] is invalid")?;
        if !(self.bot.slippage_pct.is_finite() && self.bot.slippage_pct >= 0.0) {
            anyhow::bail!("[bot] slippage_pct must be >= 0");
        }
        if let Some((base, quote)) = self.bot.settings.base_quote() {
            if !base.eq_ignore_ascii_case(&self.assets.base.symbol)
                || !quote.eq_ignore_ascii_case(&self.assets.quote.symbol)
            {
                anyhow::bail!(
                    "[bot] pair {} does not match [assets] {}/{}",
                    self.bot.settings.pair,
                    self.assets.base.symbol,
                    self.assets.quote.symbol
                );
            }
        }
        if (self.analysis.daily_candle_count as usize) < MIN_DAILY_CANDLES {
            anyhow::bail!(
                "[analysis] daily_candle_count must be >= {}",
                MIN_DAILY_CANDLES
            );
        }
        if (self.analysis.hourly_candle_count as usize) < MIN_INTRADAY_CANDLES
            || (self.analysis.fifteen_minute_candle_count as usize) < MIN_INTRADAY_CANDLES
        {
            anyhow::bail!(
                "[analysis] hourly and fifteen-minute candle counts must be >= {}",
                MIN_INTRADAY_CANDLES
            );
        }
        if self.market_data.requests_per_minute == 0 {
            anyhow::bail!("[market_data] requests_per_minute must be > 0");
        }
        Ok(())
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            slippage_pct: self.bot.slippage_pct,
            entry_candle_count: self.bot.entry_candle_count,
            trade_history_limit: self.bot.trade_history_limit,
            classifier: self.analysis,
            assets: self.assets.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::action::TradeAction;
    use crate::strategy::StrategyKind;

    #[test]
    fn parse_default_toml() {
        let toml_str = r#"
[market_data]
base_url = "https://api.geckoterminal.com/api/v2"
network = "solana"
requests_per_minute = 30
pool_cache_ttl_secs = 3600

[bot]
strategy_type = "SmartRangeScout"
amount = 0.25
pair = "SOL/USDC"
stop_loss = { enabled = true, percentage = 3.0 }
take_profit = { enabled = false, percentage = 6.0 }
max_runs = 3
run_interval_minutes = 15
compound_capital = true
is_test_mode = true
action = "sell"
slippage_pct = 1.0

[analysis]
daily_candle_count = 30

[logging]
level = "debug"
"#;
        let config = Config::from_toml_str(toml_str).unwrap();
        let s = &config.bot.settings;
        assert_eq!(s.strategy_type, StrategyKind::SmartRangeScout);
        assert!((s.amount - 0.25).abs() < f64::EPSILON);
        assert!(!s.take_profit.enabled);
        assert_eq!(s.max_runs, 3);
        assert_eq!(s.action, TradeAction::Sell);
        assert!((config.bot.slippage_pct - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.bot.entry_candle_count, DEFAULT_ENTRY_CANDLE_COUNT);
        assert_eq!(config.analysis.daily_candle_count, 30);
        assert_eq!(config.analysis.hourly_candle_count, 168);
        assert_eq!(config.assets.base.mint, SOL_MINT);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.bot.settings, BotSettings::default());
        assert_eq!(config.market_data.requests_per_minute, 30);
        assert_eq!(config.engine_options(), EngineOptions::default());
    }

    #[test]
    fn rejects_invalid_bot_section() {
        assert!(Config::from_toml_str("[bot]\nmax_runs = 0\n").is_err());
        assert!(Config::from_toml_str("[bot]\npair = \"SOLUSDC\"\n").is_err());
        assert!(Config::from_toml_str("[bot]\npair = \"BONK/USDC\"\n").is_err());
    }
}
