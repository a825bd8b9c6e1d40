use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot {command} while bot is {status}")]
    InvalidCommand {
        command: &'static str,
        status: String,
    },

    #[error("no execution identity available")]
    NoExecutionIdentity,

    #[error("could not find pool for {0}")]
    PoolNotFound(String),

    #[error("market condition is unclear, bot will not run")]
    MarketUnclear,

    #[error("internal error: {0}")]
    Internal(String),
}
