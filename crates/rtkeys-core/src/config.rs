#![forbid(unsafe_code)]

//! Recorder construction parameters.
//!
//! [`RecorderConfig`] can be built in code, read from `RTKEYS_*` environment
//! variables, or (with the `config-file` feature) loaded from TOML or JSON:
//!
//! ```toml
//! buffer_size = 2000
//! wait_for_start = true
//! log = false
//! ```
//!
//! Missing fields keep their defaults.

#[cfg(feature = "config-file")]
use std::path::Path;

#[cfg(feature = "config-file")]
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default ring buffer capacity.
pub const DEFAULT_BUFFER_SIZE: usize = 10_000;

/// Settings applied when a [`KeyRecorder`](crate::recorder::KeyRecorder) is built.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct RecorderConfig {
    /// Number of key events kept before the oldest are overwritten.
    /// Default: 10 000.
    pub buffer_size: usize,

    /// Start in the stopped state; recording begins on `start()`.
    /// Default: false.
    pub wait_for_start: bool,

    /// Emit a trace event for every ingested key and query.
    /// Default: false.
    pub log: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            wait_for_start: false,
            log: false,
        }
    }
}

impl RecorderConfig {
    /// Set the ring buffer capacity.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Defer recording until `start()` is called.
    #[must_use]
    pub fn wait_for_start(mut self, wait: bool) -> Self {
        self.wait_for_start = wait;
        self
    }

    /// Toggle per-event trace logging.
    #[must_use]
    pub fn with_log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    /// Load config from environment variables.
    ///
    /// Reads:
    /// - `RTKEYS_BUFFER_SIZE`: ring buffer capacity
    /// - `RTKEYS_WAIT_FOR_START`: "1" or "true" to start stopped
    /// - `RTKEYS_LOG`: "1" or "true" to enable per-event logging
    ///
    /// Unparsable values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("RTKEYS_BUFFER_SIZE")
            && let Ok(size) = val.trim().parse::<usize>()
        {
            config.buffer_size = size;
        }

        if let Some(val) = lookup("RTKEYS_WAIT_FOR_START") {
            config.wait_for_start = parse_flag(&val);
        }

        if let Some(val) = lookup("RTKEYS_LOG") {
            config.log = parse_flag(&val);
        }

        config
    }

    /// Check the config can back a recorder.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    /// Load from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config-file")]
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

fn parse_flag(val: &str) -> bool {
    let val = val.trim();
    val == "1" || val.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = RecorderConfig::default();
        assert_eq!(config.buffer_size, 10_000);
        assert!(!config.wait_for_start);
        assert!(!config.log);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builders_chain() {
        let config = RecorderConfig::default()
            .with_buffer_size(8)
            .wait_for_start(true)
            .with_log(true);
        assert_eq!(config.buffer_size, 8);
        assert!(config.wait_for_start);
        assert!(config.log);
    }

    #[test]
    fn zero_capacity_rejected() {
        let err = RecorderConfig::default()
            .with_buffer_size(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroCapacity));
    }

    #[test]
    fn env_values_applied() {
        let config = RecorderConfig::from_lookup(lookup_from(&[
            ("RTKEYS_BUFFER_SIZE", " 250 "),
            ("RTKEYS_WAIT_FOR_START", "TRUE"),
            ("RTKEYS_LOG", "1"),
        ]));
        assert_eq!(config.buffer_size, 250);
        assert!(config.wait_for_start);
        assert!(config.log);
    }

    #[test]
    fn env_garbage_ignored() {
        let config = RecorderConfig::from_lookup(lookup_from(&[
            ("RTKEYS_BUFFER_SIZE", "lots"),
            ("RTKEYS_WAIT_FOR_START", "yes please"),
        ]));
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
        assert!(!config.wait_for_start);
    }

    #[cfg(feature = "config-file")]
    mod file {
        use super::super::*;
        use std::io::Write;

        #[test]
        fn toml_partial_keeps_defaults() {
            let config = RecorderConfig::from_toml_str("wait_for_start = true\n").unwrap();
            assert!(config.wait_for_start);
            assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
        }

        #[test]
        fn toml_zero_capacity_rejected() {
            let err = RecorderConfig::from_toml_str("buffer_size = 0\n").unwrap_err();
            assert!(matches!(err, ConfigError::ZeroCapacity));
        }

        #[test]
        fn toml_syntax_error() {
            let err = RecorderConfig::from_toml_str("buffer_size = [").unwrap_err();
            assert!(matches!(err, ConfigError::Toml(_)));
        }

        #[test]
        fn json_roundtrip_fields() {
            let config =
                RecorderConfig::from_json_str(r#"{"buffer_size": 64, "log": true}"#).unwrap();
            assert_eq!(config.buffer_size, 64);
            assert!(config.log);
            assert!(!config.wait_for_start);
        }

        #[test]
        fn toml_file_loads() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "buffer_size = 32").unwrap();
            let config = RecorderConfig::from_toml_file(file.path()).unwrap();
            assert_eq!(config.buffer_size, 32);
        }

        #[test]
        fn missing_file_is_io_error() {
            let dir = tempfile::tempdir().unwrap();
            let err = RecorderConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
            assert!(matches!(err, ConfigError::Io(_)));
        }
    }
}
