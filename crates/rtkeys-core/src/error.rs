#![forbid(unsafe_code)]

//! Error types.
//!
//! Only construction can fail. Ingestion and queries are total functions over
//! the recorder state.

use thiserror::Error;

/// Result alias for configuration loading and recorder construction.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A recorder configuration that cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The ring buffer must hold at least one event.
    #[error("buffer_size must be > 0")]
    ZeroCapacity,

    /// Config file could not be read.
    #[cfg(feature = "config-file")]
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML config could not be parsed.
    #[cfg(feature = "config-file")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON config could not be parsed.
    #[cfg(feature = "config-file")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_message() {
        assert_eq!(ConfigError::ZeroCapacity.to_string(), "buffer_size must be > 0");
    }
}
