#![forbid(unsafe_code)]

//! Subscriber bootstrap for hosts without their own `tracing` setup.
//!
//! The crate itself only emits `tracing` events. Hosts that already install a
//! subscriber need nothing from this module.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "rtkeys_core=info";

/// Install a fmt subscriber. `RUST_LOG` takes precedence over `default_filter`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_existing_subscriber() {
        let _ = init(DEFAULT_FILTER);
        assert!(!init(DEFAULT_FILTER));
    }
}
