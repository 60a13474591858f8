#![forbid(unsafe_code)]

//! Core: keyboard event recording for reaction-time experiments.
//!
//! # Role in rtkeys
//! `rtkeys-core` sits between a host input layer (browser `KeyboardEvent`s,
//! a native window, a replay file) and experiment code that asks, once per
//! frame, "which keys were pressed, when, and for how long".
//!
//! # Primary responsibilities
//! - **KeyRecorder**: bounded key-event history, key-up/key-down pairing,
//!   `get_keys` / `get_events` / `clear_events` queries.
//! - **Key names**: physical codes translated to a canonical vocabulary.
//! - **Clocks**: monotonic timestamps and a resettable stopwatch for
//!   reaction times.
//! - **Input seam**: listener/source traits so the recorder can be driven by
//!   any host, or directly in tests.
//!
//! # Quick start
//!
//! ```
//! use rtkeys_core::prelude::*;
//!
//! let hub = InputHub::shared();
//! let keyboard = KeyRecorder::new(RecorderConfig::default())
//!     .unwrap()
//!     .attach(&hub);
//!
//! hub.borrow_mut().dispatch(&RawKeyEvent::down("KeyJ"));
//! hub.borrow_mut().dispatch(&RawKeyEvent::up("KeyJ"));
//!
//! let presses = keyboard.borrow_mut().get_keys(&KeyQuery::new().keys(["j", "f"]));
//! assert_eq!(presses.len(), 1);
//! assert!(presses[0].duration.is_some());
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod key_map;
pub mod recorder;
pub mod ring;
pub mod source;

#[cfg(feature = "dom-input")]
pub mod dom_input;

#[cfg(feature = "subscriber")]
pub mod logging;

/// Common imports for experiment code.
pub mod prelude {
    pub use crate::clock::{Clock, ManualTimeSource, MonotonicClock, TimeSource};
    pub use crate::config::RecorderConfig;
    pub use crate::error::ConfigError;
    pub use crate::event::{KeyEvent, KeyPress, KeyStatus, RawKeyEvent, RecorderStatus};
    pub use crate::key_map::{DomKeyMap, KeyNameResolver, UNKNOWN_KEY_NAME};
    pub use crate::recorder::{KeyQuery, KeyRecorder};
    pub use crate::source::{Attached, InputHub, KeyListener, KeySource, ListenerId};
}
