#![forbid(unsafe_code)]

//! Keyboard event recorder.
//!
//! [`KeyRecorder`] captures raw key transitions into a fixed-capacity ring
//! buffer, pairs every key-up with the key-down that started it, and answers
//! "which keys were pressed since I last asked" queries.
//!
//! # State Machine
//!
//! Two states, [`Started`](RecorderStatus::Started) and
//! [`Stopped`](RecorderStatus::Stopped). Transitions are immediate. While
//! stopped, raw transitions are dropped without touching the buffer.
//!
//! # Invariants
//!
//! 1. At most `buffer_size` events are held; the oldest are overwritten first.
//! 2. The unmatched index holds at most one key-down slot per code, and every
//!    slot it names holds a live `KeyDown` for that code.
//! 3. A consecutive key-down for the key that went down last is ignored until
//!    any key-up arrives (auto-repeat suppression).
//! 4. A key-up's `paired_index` is only trusted while the slot still holds the
//!    original key-down (same code, older sequence number).
//! 5. Queries never fail; an empty buffer yields an empty result.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use rtkeys_core::clock::{Clock, ManualTimeSource};
//! use rtkeys_core::config::RecorderConfig;
//! use rtkeys_core::recorder::{KeyQuery, KeyRecorder};
//!
//! let time = Rc::new(ManualTimeSource::new(10.0));
//! let clock = Rc::new(Clock::with_source(time.clone()));
//! let mut keyboard = KeyRecorder::with_clock(RecorderConfig::default(), clock).unwrap();
//!
//! time.advance(0.5);
//! keyboard.on_key_down("KeyF");
//! time.advance(0.125);
//! keyboard.on_key_up("KeyF");
//!
//! let presses = keyboard.get_keys(&KeyQuery::default());
//! assert_eq!(presses.len(), 1);
//! assert_eq!(presses[0].name, "f");
//! assert_eq!(presses[0].rt, 0.5);
//! assert_eq!(presses[0].duration, Some(0.125));
//! ```

use std::rc::Rc;

use ahash::AHashMap;

use crate::clock::{Clock, TimeSource};
use crate::config::RecorderConfig;
use crate::error::Result;
use crate::event::{KeyEvent, KeyPress, KeyStatus, RawKeyEvent, RecorderStatus};
use crate::key_map::{DomKeyMap, KeyNameResolver};
use crate::ring::EventRing;

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Options for [`KeyRecorder::get_keys`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyQuery {
    /// Canonical names to report. Empty means every key.
    pub key_list: Vec<String>,
    /// Only report keys that have been released. Default: true.
    pub wait_release: bool,
    /// Remove reported entries from the buffer. Default: true.
    pub clear: bool,
}

impl Default for KeyQuery {
    fn default() -> Self {
        Self {
            key_list: Vec::new(),
            wait_release: true,
            clear: true,
        }
    }
}

impl KeyQuery {
    /// All keys, released only, clearing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the query to the given canonical names.
    #[must_use]
    pub fn keys<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_list = names.into_iter().map(Into::into).collect();
        self
    }

    /// Also report held keys when `false`.
    #[must_use]
    pub fn wait_release(mut self, wait: bool) -> Self {
        self.wait_release = wait;
        self
    }

    /// Remove reported entries when `true`.
    #[must_use]
    pub fn clear(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    /// Whether `name` passes the key filter.
    #[must_use]
    pub fn accepts(&self, name: &str) -> bool {
        self.key_list.is_empty() || self.key_list.iter().any(|k| k == name)
    }
}

// ---------------------------------------------------------------------------
// KeyRecorder
// ---------------------------------------------------------------------------

/// Buffers key transitions and reconstructs key presses on demand.
pub struct KeyRecorder {
    config: RecorderConfig,
    status: RecorderStatus,
    buffer: EventRing<KeyEvent>,
    /// code -> slot of its most recent unmatched key-down.
    unmatched: AHashMap<String, usize>,
    /// Code of the last accepted key-down, cleared by any key-up.
    previous_keydown: Option<String>,
    next_seq: u64,
    clock: Rc<Clock>,
    time: Rc<dyn TimeSource>,
    resolver: Box<dyn KeyNameResolver>,
}

impl std::fmt::Debug for KeyRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRecorder")
            .field("status", &self.status)
            .field("len", &self.buffer.len())
            .field("live", &self.buffer.live_len())
            .field("capacity", &self.buffer.capacity())
            .field("held", &self.unmatched.len())
            .finish()
    }
}

impl KeyRecorder {
    /// Recorder with its own stopwatch on the process-wide monotonic clock.
    pub fn new(config: RecorderConfig) -> Result<Self> {
        Self::with_clock(config, Rc::new(Clock::new()))
    }

    /// Recorder computing reaction times against `clock`.
    ///
    /// Event timestamps are read from the clock's time source so that
    /// `t_down` and `clock.last_reset_time()` share a reference frame.
    pub fn with_clock(config: RecorderConfig, clock: Rc<Clock>) -> Result<Self> {
        Self::with_parts(config, clock, DomKeyMap)
    }

    /// Recorder with an explicit key-name resolver.
    pub fn with_parts(
        config: RecorderConfig,
        clock: Rc<Clock>,
        resolver: impl KeyNameResolver + 'static,
    ) -> Result<Self> {
        config.validate()?;

        let status = if config.wait_for_start {
            RecorderStatus::Stopped
        } else {
            RecorderStatus::Started
        };
        let time = Rc::clone(clock.source());

        tracing::debug!(
            buffer_size = config.buffer_size,
            ?status,
            "key recorder created"
        );

        Ok(Self {
            buffer: EventRing::new(config.buffer_size),
            unmatched: AHashMap::new(),
            previous_keydown: None,
            next_seq: 0,
            status,
            clock,
            time,
            resolver: Box::new(resolver),
            config,
        })
    }

    // -- State --------------------------------------------------------------

    /// Begin buffering transitions.
    pub fn start(&mut self) {
        if self.status != RecorderStatus::Started {
            tracing::debug!("key recorder started");
        }
        self.status = RecorderStatus::Started;
    }

    /// Stop buffering transitions. Buffered history is kept.
    pub fn stop(&mut self) {
        if self.status != RecorderStatus::Stopped {
            tracing::debug!("key recorder stopped");
        }
        self.status = RecorderStatus::Stopped;
    }

    /// Current recording state.
    #[inline]
    #[must_use]
    pub fn status(&self) -> RecorderStatus {
        self.status
    }

    /// Construction parameters.
    #[must_use]
    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Stopwatch used for reaction times.
    #[must_use]
    pub fn clock(&self) -> &Rc<Clock> {
        &self.clock
    }

    /// Buffered slots (live or consumed), at most [`capacity`](Self::capacity).
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing has been buffered since creation or the last clear.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Ring buffer capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Codes currently down with no key-up seen, in key-down order.
    #[must_use]
    pub fn held_keys(&self) -> Vec<&str> {
        let mut held: Vec<(u64, &str)> = self
            .unmatched
            .values()
            .filter_map(|&slot| self.buffer.get(slot))
            .map(|event| (event.seq, event.code.as_str()))
            .collect();
        held.sort_unstable();
        held.into_iter().map(|(_, code)| code).collect()
    }

    // -- Ingestion ----------------------------------------------------------

    /// Feed a raw notification from the input layer.
    pub fn handle(&mut self, event: &RawKeyEvent) {
        match event {
            RawKeyEvent::Down { code } => self.on_key_down(code),
            RawKeyEvent::Up { code } => self.on_key_up(code),
        }
    }

    /// Record a key-down for `code`.
    pub fn on_key_down(&mut self, code: &str) {
        if self.status != RecorderStatus::Started {
            if self.config.log {
                tracing::trace!(code, "keydown ignored: recorder stopped");
            }
            return;
        }

        if self.previous_keydown.as_deref() == Some(code) {
            if self.config.log {
                tracing::trace!(code, "keydown ignored: repeat");
            }
            return;
        }
        self.previous_keydown = Some(code.to_owned());

        let event = self.make_event(code, KeyStatus::KeyDown, None);
        if self.config.log {
            tracing::trace!(code, name = %event.name, t = event.timestamp, "keydown");
        }
        let slot = self.write(event);
        self.unmatched.insert(code.to_owned(), slot);
    }

    /// Record a key-up for `code`, pairing it with its key-down if still buffered.
    pub fn on_key_up(&mut self, code: &str) {
        if self.status != RecorderStatus::Started {
            if self.config.log {
                tracing::trace!(code, "keyup ignored: recorder stopped");
            }
            return;
        }

        self.previous_keydown = None;

        // A key-down sitting in the slot about to be written is lost anyway.
        let next = self.buffer.next_slot();
        let paired = self.unmatched.remove(code).filter(|&slot| slot != next);

        let event = self.make_event(code, KeyStatus::KeyUp, paired);
        if self.config.log {
            tracing::trace!(
                code,
                name = %event.name,
                t = event.timestamp,
                paired = ?paired,
                "keyup"
            );
        }
        self.write(event);
    }

    fn make_event(&mut self, code: &str, status: KeyStatus, paired: Option<usize>) -> KeyEvent {
        let seq = self.next_seq;
        self.next_seq += 1;
        KeyEvent {
            code: code.to_owned(),
            name: self.resolver.resolve(code).into_owned(),
            status,
            timestamp: self.time.now(),
            paired_index: paired,
            seq,
        }
    }

    /// Append to the ring, dropping unmatched-index entries for evicted key-downs.
    fn write(&mut self, event: KeyEvent) -> usize {
        let (slot, evicted) = self.buffer.push(event);
        if let Some(old) = evicted
            && old.is_down()
            && self.unmatched.get(&old.code) == Some(&slot)
        {
            self.unmatched.remove(&old.code);
        }
        slot
    }

    // -- Queries ------------------------------------------------------------

    /// Every buffered event, oldest first.
    #[must_use]
    pub fn get_events(&self) -> Vec<KeyEvent> {
        self.buffer.iter().map(|(_, event)| event.clone()).collect()
    }

    /// The key-down a key-up refers to, if it is still in place.
    fn paired_keydown(&self, up: &KeyEvent) -> Option<&KeyEvent> {
        let down = self.buffer.get(up.paired_index?)?;
        (down.is_down() && down.code == up.code && down.seq < up.seq).then_some(down)
    }

    /// Reconstruct key presses from the buffer.
    ///
    /// Released presses come first, in key-up order. With
    /// `wait_release == false`, presses of keys still held follow, in
    /// key-down order, with `duration == None`.
    ///
    /// With `clear`, reported entries are removed. `clear` with an empty key
    /// list empties the whole buffer, including entries the scan did not
    /// report.
    pub fn get_keys(&mut self, query: &KeyQuery) -> Vec<KeyPress> {
        if self.buffer.is_empty() {
            return Vec::new();
        }

        let reset = self.clock.last_reset_time();
        let mut presses = Vec::new();
        let mut consumed: Vec<usize> = Vec::new();

        for (slot, up) in self.buffer.iter() {
            if !up.is_up() || !query.accepts(&up.name) {
                continue;
            }
            if let Some(down) = self.paired_keydown(up) {
                presses.push(KeyPress {
                    code: down.code.clone(),
                    name: down.name.clone(),
                    t_down: down.timestamp,
                    rt: down.timestamp - reset,
                    duration: Some(up.timestamp - down.timestamp),
                });
                if query.clear
                    && let Some(down_slot) = up.paired_index
                {
                    consumed.push(down_slot);
                }
            }
            if query.clear {
                consumed.push(slot);
            }
        }

        if !query.wait_release {
            let mut held: Vec<(u64, usize)> = self
                .unmatched
                .iter()
                .filter_map(|(code, &slot)| {
                    self.buffer
                        .get(slot)
                        .filter(|down| down.is_down() && down.code == *code)
                        .map(|down| (down.seq, slot))
                })
                .collect();
            held.sort_unstable();

            let mut released_codes = Vec::new();
            for (_, slot) in held {
                let Some(down) = self.buffer.get(slot) else {
                    continue;
                };
                if !query.accepts(&down.name) {
                    continue;
                }
                presses.push(KeyPress {
                    code: down.code.clone(),
                    name: down.name.clone(),
                    t_down: down.timestamp,
                    rt: down.timestamp - reset,
                    duration: None,
                });
                if query.clear {
                    released_codes.push(down.code.clone());
                    consumed.push(slot);
                }
            }
            for code in released_codes {
                self.unmatched.remove(&code);
            }
        }

        if self.config.log {
            tracing::trace!(
                found = presses.len(),
                keys = ?query.key_list,
                wait_release = query.wait_release,
                clear = query.clear,
                "get_keys"
            );
        }

        if query.clear {
            if query.key_list.is_empty() {
                self.clear_events();
            } else {
                for slot in consumed {
                    self.buffer.take(slot);
                }
            }
        }

        presses
    }

    /// Discard all buffered history.
    pub fn clear_events(&mut self) {
        self.buffer.clear();
        self.unmatched.clear();
        self.previous_keydown = None;
        if self.config.log {
            tracing::trace!("key events cleared");
        }
    }
}
