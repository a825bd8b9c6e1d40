use std::path::Path;

use solbotx::bot::{BotSettings, EngineOptions};
use solbotx::config::{Config, SOL_MINT, USDC_MINT};
use solbotx::strategy::StrategyKind;

#[test]
fn shipped_default_config_matches_builtin_defaults() {
    let config = Config::load_from(Path::new("config/default.toml")).unwrap();
    assert_eq!(config.bot.settings, BotSettings::default());
    assert_eq!(config.engine_options(), EngineOptions::default());
    assert_eq!(config.market_data.network, "solana");
    assert_eq!(config.market_data.pool_cache_ttl_secs, 3600);
    assert_eq!(config.logging.level, "info");
    assert!(!config.logging.json);
}

#[test]
fn missing_file_reports_path() {
    let err = Config::load_from(Path::new("config/does-not-exist.toml")).unwrap_err();
    assert!(format!("{err:#}").contains("does-not-exist.toml"));
}

#[test]
fn load_from_reads_overrides() {
    let path = std::env::temp_dir().join(format!("solbotx-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(
        &path,
        r#"
[bot]
strategy_type = "SmartRange Scout"
run_interval_minutes = 1
is_test_mode = false

[logging]
level = "warn"
json = true
"#,
    )
    .unwrap();

    let config = Config::load_from(&path);
    std::fs::remove_file(&path).ok();
    let config = config.unwrap();

    assert_eq!(config.bot.settings.strategy_type, StrategyKind::SmartRangeScout);
    assert_eq!(config.bot.settings.run_interval_minutes, 1);
    assert!(!config.bot.settings.is_test_mode);
    assert!(config.logging.json);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn custom_assets_allow_other_pairs() {
    let toml_str = r#"
[bot]
pair = "JUP/USDC"

[assets.base]
symbol = "JUP"
mint = "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN"
decimals = 6

[assets.quote]
symbol = "USDC"
mint = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"
decimals = 6
"#;
    let config = Config::from_toml_str(toml_str).unwrap();
    let options = config.engine_options();
    assert_eq!(options.assets.base.symbol, "JUP");
    assert_eq!(options.assets.base.decimals, 6);
    assert_eq!(options.assets.quote.mint, USDC_MINT);
    assert_ne!(options.assets.base.mint, SOL_MINT);
}

#[test]
fn rejects_inconsistent_sections() {
    assert!(Config::from_toml_str("[bot]\nslippage_pct = -1.0\n").is_err());
    assert!(Config::from_toml_str("[bot]\namount = 0.0\n").is_err());
    assert!(Config::from_toml_str("[bot]\nrun_interval_minutes = 0\n").is_err());
    assert!(Config::from_toml_str("[market_data]\nrequests_per_minute = 0\n").is_err());
    assert!(Config::from_toml_str("[bot]\nstrategy_type = \"Grid\"\n").is_err());
    assert!(Config::from_toml_str("[bot]\nrun_interval_minutes = 100000\n").is_err());
}

#[test]
fn analysis_counts_cannot_weaken_the_data_guard() {
    assert!(Config::from_toml_str("[analysis]\ndaily_candle_count = 1\n").is_err());
    assert!(Config::from_toml_str("[analysis]\ndaily_candle_count = 13\n").is_err());
    assert!(Config::from_toml_str("[analysis]\nhourly_candle_count = 1\n").is_err());
    assert!(Config::from_toml_str("[analysis]\nfifteen_minute_candle_count = 0\n").is_err());

    let config = Config::from_toml_str("[analysis]\ndaily_candle_count = 30\n").unwrap();
    assert_eq!(config.analysis.daily_candle_count, 30);
}
