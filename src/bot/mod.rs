pub mod controller;
pub mod settings;
pub mod state;

pub use controller::{BotController, TickOutcome};
pub use settings::{BotSettings, EngineOptions};
pub use state::{BotState, BotStatus};
