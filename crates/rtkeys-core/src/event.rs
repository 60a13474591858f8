#![forbid(unsafe_code)]

//! Keyboard record types.
//!
//! [`KeyEvent`] is the buffer-resident record written by the recorder on every
//! accepted key transition. [`KeyPress`] is the reconstructed down→up interval
//! handed back to callers by queries; it is a plain copy and can be kept
//! around after the buffer moves on.
//!
//! # Design Notes
//!
//! - Timestamps are seconds on the recorder's monotonic time source.
//! - `code` is the physical key identifier reported by the host (a W3C
//!   `KeyboardEvent.code` in browsers); `name` is its canonical translation.
//! - Status values are closed enums so matches stay exhaustive.

/// Direction of a key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyStatus {
    /// Key went down.
    KeyDown,
    /// Key came up.
    KeyUp,
}

/// Whether the recorder is buffering incoming transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecorderStatus {
    /// Incoming transitions are discarded.
    #[default]
    Stopped,
    /// Incoming transitions are buffered.
    Started,
}

/// A key transition stored in the recorder's ring buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    /// Physical key identifier as reported by the input layer.
    pub code: String,
    /// Canonical key name resolved from `code`.
    pub name: String,
    /// Transition direction.
    pub status: KeyStatus,
    /// Arrival time in seconds on the monotonic time source.
    pub timestamp: f64,
    /// Slot of the matching key-down, set on `KeyUp` events whose press was found.
    pub paired_index: Option<usize>,
    /// Ingestion sequence number, strictly increasing per recorder.
    pub(crate) seq: u64,
}

impl KeyEvent {
    /// Whether this is a key-down record.
    #[inline]
    #[must_use]
    pub fn is_down(&self) -> bool {
        self.status == KeyStatus::KeyDown
    }

    /// Whether this is a key-up record.
    #[inline]
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.status == KeyStatus::KeyUp
    }

    /// Ingestion sequence number. Later events always compare greater.
    #[inline]
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.seq
    }
}

/// A reconstructed key press returned by [`KeyRecorder::get_keys`](crate::recorder::KeyRecorder::get_keys).
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPress {
    /// Physical key identifier of the originating key-down.
    pub code: String,
    /// Canonical key name of the originating key-down.
    pub name: String,
    /// Key-down time in seconds on the monotonic time source.
    pub t_down: f64,
    /// Reaction time: `t_down` minus the client clock's last reset time.
    pub rt: f64,
    /// Seconds between key-down and key-up, `None` while the key is still held.
    pub duration: Option<f64>,
}

impl KeyPress {
    /// Whether the key had been released when this press was reported.
    #[inline]
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.duration.is_some()
    }

    /// Whether any press in `presses` has a canonical name listed in `names`.
    ///
    /// ```
    /// use rtkeys_core::event::KeyPress;
    ///
    /// let press = KeyPress {
    ///     code: "KeyF".into(),
    ///     name: "f".into(),
    ///     t_down: 1.0,
    ///     rt: 0.4,
    ///     duration: Some(0.1),
    /// };
    /// assert!(KeyPress::includes(&[press.clone()], &["j", "f"]));
    /// assert!(!KeyPress::includes(&[press], &["space"]));
    /// ```
    #[must_use]
    pub fn includes<S: AsRef<str>>(presses: &[KeyPress], names: &[S]) -> bool {
        presses
            .iter()
            .any(|press| names.iter().any(|n| n.as_ref() == press.name))
    }
}

/// A raw key notification delivered by the host input layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawKeyEvent {
    /// A key went down (including auto-repeat notifications).
    Down {
        /// Physical key identifier.
        code: String,
    },
    /// A key came up.
    Up {
        /// Physical key identifier.
        code: String,
    },
}

impl RawKeyEvent {
    /// Build a key-down notification.
    #[must_use]
    pub fn down(code: impl Into<String>) -> Self {
        Self::Down { code: code.into() }
    }

    /// Build a key-up notification.
    #[must_use]
    pub fn up(code: impl Into<String>) -> Self {
        Self::Up { code: code.into() }
    }

    /// Physical key identifier carried by the notification.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Down { code } | Self::Up { code } => code,
        }
    }

    /// Transition direction carried by the notification.
    #[must_use]
    pub const fn status(&self) -> KeyStatus {
        match self {
            Self::Down { .. } => KeyStatus::KeyDown,
            Self::Up { .. } => KeyStatus::KeyUp,
        }
    }
}
