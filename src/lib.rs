pub mod analysis;
pub mod bot;
pub mod config;
pub mod error;
pub mod execution;
pub mod gecko;
pub mod indicator;
pub mod lifecycle;
pub mod market_data;
pub mod model;
pub mod performance;
pub mod strategy;
