#![forbid(unsafe_code)]

//! Time sources and the client stopwatch.
//!
//! All recorder timestamps are `f64` seconds read from a [`TimeSource`].
//! [`MonotonicClock`] is the production source; it is built on
//! `web_time::Instant` so the same code runs natively and on
//! `wasm32-unknown-unknown` inside a browser. [`ManualTimeSource`] gives tests
//! and simulations full control over time.
//!
//! [`Clock`] is the experiment-side stopwatch. Its last reset time lives in
//! the time source's reference frame, which is what makes
//! `rt = t_down - clock.last_reset_time()` meaningful.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::OnceLock;

use web_time::Instant;

/// A monotonic source of seconds.
pub trait TimeSource {
    /// Current reading in seconds. Never decreases.
    fn now(&self) -> f64;
}

/// Monotonic clock anchored at its creation instant.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

static GLOBAL_CLOCK: OnceLock<MonotonicClock> = OnceLock::new();

impl MonotonicClock {
    /// Create a clock whose zero is "now".
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// The process-wide clock, created on first use.
    pub fn global() -> &'static MonotonicClock {
        GLOBAL_CLOCK.get_or_init(MonotonicClock::new)
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Process-wide monotonic time, usable wherever a `Rc<dyn TimeSource>` is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalTime;

impl TimeSource for GlobalTime {
    fn now(&self) -> f64 {
        MonotonicClock::global().now()
    }
}

/// Hand-driven time source.
///
/// ```
/// use rtkeys_core::clock::{ManualTimeSource, TimeSource};
///
/// let time = ManualTimeSource::new(1.0);
/// time.advance(0.25);
/// assert_eq!(time.now(), 1.25);
/// ```
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    now: Cell<f64>,
}

impl ManualTimeSource {
    /// Start at `start` seconds.
    #[must_use]
    pub fn new(start: f64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Jump to `t`. Earlier values are ignored to keep the source monotonic.
    pub fn set(&self, t: f64) {
        if t > self.now.get() {
            self.now.set(t);
        }
    }

    /// Move forward by `dt` seconds. Negative steps are ignored.
    pub fn advance(&self, dt: f64) {
        if dt > 0.0 {
            self.now.set(self.now.get() + dt);
        }
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Rc<T> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// Resettable stopwatch shared between the experiment and the recorder.
///
/// The recorder only ever reads [`last_reset_time`](Clock::last_reset_time).
pub struct Clock {
    source: Rc<dyn TimeSource>,
    last_reset: Cell<f64>,
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("last_reset", &self.last_reset.get())
            .finish()
    }
}

impl Clock {
    /// Stopwatch on the process-wide monotonic clock, reset "now".
    #[must_use]
    pub fn new() -> Self {
        Self::with_source(Rc::new(GlobalTime))
    }

    /// Stopwatch on an arbitrary time source, reset "now".
    #[must_use]
    pub fn with_source(source: Rc<dyn TimeSource>) -> Self {
        let last_reset = Cell::new(source.now());
        Self { source, last_reset }
    }

    /// Restart at zero.
    pub fn reset(&self) {
        self.reset_to(0.0);
    }

    /// Restart so that [`time`](Clock::time) reads `value` right now.
    pub fn reset_to(&self, value: f64) {
        self.last_reset.set(self.source.now() - value);
    }

    /// Seconds elapsed since the last reset.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.source.now() - self.last_reset.get()
    }

    /// Time-source reading at the last reset.
    #[must_use]
    pub fn last_reset_time(&self) -> f64 {
        self.last_reset.get()
    }

    /// The time source this stopwatch reads.
    #[must_use]
    pub fn source(&self) -> &Rc<dyn TimeSource> {
        &self.source
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_never_decreases() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(a >= 0.0);
        assert!(b >= a);
    }

    #[test]
    fn global_clock_is_shared() {
        let a = MonotonicClock::global() as *const MonotonicClock;
        let b = MonotonicClock::global() as *const MonotonicClock;
        assert_eq!(a, b);
        assert!(GlobalTime.now() >= 0.0);
    }

    #[test]
    fn manual_source_is_monotonic() {
        let time = ManualTimeSource::new(5.0);
        time.set(3.0);
        assert_eq!(time.now(), 5.0);
        time.advance(-1.0);
        assert_eq!(time.now(), 5.0);
        time.set(6.5);
        assert_eq!(time.now(), 6.5);
    }

    #[test]
    fn stopwatch_tracks_resets() {
        let time = Rc::new(ManualTimeSource::new(10.0));
        let clock = Clock::with_source(time.clone());
        assert_eq!(clock.last_reset_time(), 10.0);

        time.advance(2.0);
        assert_eq!(clock.time(), 2.0);

        clock.reset();
        assert_eq!(clock.last_reset_time(), 12.0);
        assert_eq!(clock.time(), 0.0);
    }

    #[test]
    fn reset_to_offsets_reading() {
        let time = Rc::new(ManualTimeSource::new(4.0));
        let clock = Clock::with_source(time.clone());
        clock.reset_to(1.5);
        assert_eq!(clock.time(), 1.5);
        assert_eq!(clock.last_reset_time(), 2.5);
    }

    #[test]
    fn rc_forwards_time_source() {
        let time = Rc::new(ManualTimeSource::new(3.0));
        assert_eq!(TimeSource::now(&time), 3.0);
    }
}
