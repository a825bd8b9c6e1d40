pub mod rate_budget;
pub mod rest;
pub mod types;

pub use rate_budget::{RateBudget, RateBudgetSnapshot};
pub use rest::GeckoTerminalClient;
