use solbotx::analysis::{AnalysisResult, MarketCondition};
use solbotx::lifecycle::{
    check_stop_loss, check_take_profit, potential_loss, potential_profit, ExitOrchestrator,
    ExitTrigger, PositionBook, ProtectionConfig, DEFAULT_STOP_LOSS, DEFAULT_TAKE_PROFIT,
};
use solbotx::model::action::TradeAction;
use solbotx::model::position::Position;
use solbotx::strategy::{StrategyKind, StrategyRules};

fn position(action: TradeAction) -> Position {
    Position::new("SOL/USDC", 100.0, 1.0, action)
}

const PCT: ProtectionConfig = ProtectionConfig {
    enabled: true,
    percentage: 2.5,
};

#[test]
fn stop_loss_thresholds_follow_direction() {
    let long = position(TradeAction::Buy);
    assert!(check_stop_loss(&long, 97.5, &PCT));
    assert!(!check_stop_loss(&long, 97.51, &PCT));

    let short = position(TradeAction::Sell);
    assert!(check_stop_loss(&short, 102.5, &PCT));
    assert!(!check_stop_loss(&short, 102.49, &PCT));
}

#[test]
fn take_profit_mirrors_stop_loss() {
    let long = position(TradeAction::Buy);
    assert!(check_take_profit(&long, 102.5, &PCT));
    assert!(!check_take_profit(&long, 102.49, &PCT));

    let short = position(TradeAction::Sell);
    assert!(check_take_profit(&short, 97.5, &PCT));
    assert!(!check_take_profit(&short, 97.51, &PCT));
}

#[test]
fn disabled_checks_never_fire() {
    let off = ProtectionConfig {
        enabled: false,
        percentage: 2.5,
    };
    let long = position(TradeAction::Buy);
    assert!(!check_stop_loss(&long, 1.0, &off));
    assert!(!check_take_profit(&long, 1_000.0, &off));
    assert!(!check_stop_loss(&long, 0.0, &PCT));
}

#[test]
fn potential_amounts_at_default_thresholds() {
    let long = Position::new("SOL/USDC", 200.0, 0.5, TradeAction::Buy);
    assert!((potential_loss(&long, &DEFAULT_STOP_LOSS) - 2.5).abs() < 1e-9);
    assert!((potential_profit(&long, &DEFAULT_TAKE_PROFIT) - 5.0).abs() < 1e-9);
}

#[test]
/// With both thresholds at zero the entry price satisfies both checks;
/// take-profit wins.
fn take_profit_is_checked_before_stop_loss() {
    let both = ProtectionConfig {
        enabled: true,
        percentage: 0.0,
    };
    let orchestrator = ExitOrchestrator::new(both, both);
    let long = position(TradeAction::Buy);
    assert!(check_stop_loss(&long, 100.0, &both));

    let decision = orchestrator.protective_exit(&long, 100.0).unwrap();
    assert_eq!(decision.trigger, ExitTrigger::TakeProfit);
    assert_eq!(decision.label, "Take Profit");
    assert!(decision.message.starts_with("Take profit triggered for SOL/USDC"));
}

#[test]
fn orchestrator_reports_stop_loss_and_strategy_exits() {
    let orchestrator = ExitOrchestrator::new(DEFAULT_STOP_LOSS, DEFAULT_TAKE_PROFIT);
    let long = position(TradeAction::Buy);

    let sl = orchestrator.protective_exit(&long, 97.0).unwrap();
    assert_eq!(sl.trigger, ExitTrigger::StopLoss);
    assert_eq!(sl.trigger.reason_code(), "exit.stop_loss");
    assert_eq!(
        sl.message,
        "Stop loss triggered for SOL/USDC: Price dropped to 97.0000 (2.5% from entry 100.0000)"
    );
    assert!(orchestrator.protective_exit(&long, 100.0).is_none());

    let rules = StrategyRules::from_kind(StrategyKind::TrendTracker);
    let ranging = AnalysisResult {
        condition: MarketCondition::Ranging,
        indicators: None,
    };
    let exit = orchestrator
        .strategy_exit(&rules, &long, &ranging, &[])
        .unwrap();
    assert_eq!(exit.trigger, ExitTrigger::StrategyExit);
    assert_eq!(exit.label, "TrendTracker Exit");
}

#[test]
fn position_book_keeps_creation_order() {
    let mut book = PositionBook::default();
    let a = book.on_entry_filled(position(TradeAction::Buy));
    let b = book.on_entry_filled(position(TradeAction::Sell));
    let ids: Vec<&str> = book.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec![a.as_str(), b.as_str()]);

    let closed = book.on_position_closed(&a).unwrap();
    assert_eq!(closed.id, a);
    assert!(!book.contains(&a));
    assert!(book.on_position_closed(&a).is_none());
    assert_eq!(book.len(), 1);
    assert!((book.open_exposure() - 100.0).abs() < 1e-9);
}
