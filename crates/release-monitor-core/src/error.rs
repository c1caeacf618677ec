//! Error type shared by the stores, the persistence adapter and the catalog client

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted JSON under `key` could not be read back into its typed form
    #[error("malformed data under storage key '{key}': {source}")]
    Storage {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("request to catalog API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog API error: {status} - {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse catalog response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("game {game_id} not found for platform {platform_id}")]
    GameNotFound { game_id: i64, platform_id: i64 },

    #[error("platform {0} is not tracked")]
    PlatformNotFound(i64),

    #[error("no platform selected")]
    NoPlatformSelected,

    #[error("invalid configuration: {0}")]
    Config(String),
}
