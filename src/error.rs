//! Error type for the few fallible edges of the crate: loading configuration
//! and encoding / decoding network messages.  The simulation itself never
//! fails; lookup misses and degenerate math are absorbed where they happen.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config: {field} = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Convenience alias: a `Result` using `GameError` as the error type.
pub type GameResult<T> = Result<T, GameError>;
