pub mod engine;
pub mod exit_orchestrator;
pub mod protection;

pub use engine::PositionBook;
pub use exit_orchestrator::{ExitDecision, ExitOrchestrator, ExitTrigger};
pub use protection::{
    check_stop_loss, check_take_profit, format_stop_loss_message, format_take_profit_message,
    potential_loss, potential_profit, ProtectionConfig, DEFAULT_STOP_LOSS, DEFAULT_TAKE_PROFIT,
};
