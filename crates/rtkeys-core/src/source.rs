#![forbid(unsafe_code)]

//! Input subscription seam.
//!
//! The recorder never reaches for a global input object. Hosts expose a
//! [`KeySource`], the recorder registers itself as a [`KeyListener`] through
//! [`KeyRecorder::attach`], and the returned [`Attached`] handle unregisters
//! on drop.
//!
//! [`InputHub`] is the in-process source: the host pushes [`RawKeyEvent`]s into
//! [`dispatch`](InputHub::dispatch) and every live listener receives them.
//! Listeners are held weakly, so a dropped recorder is pruned on the next
//! dispatch.
//!
//! # Failure Modes
//!
//! - A listener that is already mutably borrowed when an event arrives (a
//!   query in progress higher up the stack) does not receive it; a warning is
//!   logged instead of panicking.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use crate::event::RawKeyEvent;
use crate::recorder::KeyRecorder;

/// Receiver of raw key transitions.
pub trait KeyListener {
    /// A key went down.
    fn on_key_down(&mut self, code: &str);
    /// A key came up.
    fn on_key_up(&mut self, code: &str);
}

impl KeyListener for KeyRecorder {
    fn on_key_down(&mut self, code: &str) {
        KeyRecorder::on_key_down(self, code);
    }

    fn on_key_up(&mut self, code: &str) {
        KeyRecorder::on_key_up(self, code);
    }
}

/// Handle identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Something listeners can subscribe to for key transitions.
pub trait KeySource {
    /// Register `listener`; it receives every transition until unsubscribed.
    fn subscribe(&mut self, listener: Weak<RefCell<dyn KeyListener>>) -> ListenerId;

    /// Remove a subscription. Returns `false` if `id` was not registered.
    fn unsubscribe(&mut self, id: ListenerId) -> bool;
}

/// In-process fan-out [`KeySource`].
#[derive(Default)]
pub struct InputHub {
    listeners: Vec<(ListenerId, Weak<RefCell<dyn KeyListener>>)>,
    next_id: u64,
}

impl std::fmt::Debug for InputHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputHub")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl InputHub {
    /// Empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty hub wrapped for sharing with [`KeyRecorder::attach`].
    #[must_use]
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Number of registered listeners, live or not yet pruned.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver `event` to every live listener in subscription order.
    ///
    /// Returns the number of listeners that received it.
    pub fn dispatch(&mut self, event: &RawKeyEvent) -> usize {
        self.listeners.retain(|(_, weak)| weak.strong_count() > 0);

        let mut delivered = 0;
        for (id, weak) in &self.listeners {
            let Some(listener) = weak.upgrade() else {
                continue;
            };
            let Ok(mut listener) = listener.try_borrow_mut() else {
                tracing::warn!(?id, code = event.code(), "listener busy, key event dropped");
                continue;
            };
            match event {
                RawKeyEvent::Down { code } => listener.on_key_down(code),
                RawKeyEvent::Up { code } => listener.on_key_up(code),
            }
            delivered += 1;
        }
        delivered
    }
}

impl KeySource for InputHub {
    fn subscribe(&mut self, listener: Weak<RefCell<dyn KeyListener>>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        tracing::debug!(?id, "key listener subscribed");
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        let removed = self.listeners.len() != before;
        if removed {
            tracing::debug!(?id, "key listener unsubscribed");
        }
        removed
    }
}

/// A recorder registered with a [`KeySource`]; unsubscribes on drop.
pub struct Attached<S: KeySource> {
    recorder: Rc<RefCell<KeyRecorder>>,
    source: Rc<RefCell<S>>,
    id: ListenerId,
}

impl<S: KeySource> std::fmt::Debug for Attached<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attached").field("id", &self.id).finish()
    }
}

impl<S: KeySource> Attached<S> {
    /// Subscription handle.
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Shared access to the recorder.
    pub fn borrow(&self) -> Ref<'_, KeyRecorder> {
        self.recorder.borrow()
    }

    /// Exclusive access to the recorder, for queries and state changes.
    pub fn borrow_mut(&self) -> RefMut<'_, KeyRecorder> {
        self.recorder.borrow_mut()
    }

    /// The underlying shared recorder.
    #[must_use]
    pub fn recorder(&self) -> &Rc<RefCell<KeyRecorder>> {
        &self.recorder
    }
}

impl<S: KeySource> Drop for Attached<S> {
    fn drop(&mut self) {
        match self.source.try_borrow_mut() {
            Ok(mut source) => {
                source.unsubscribe(self.id);
            }
            Err(_) => {
                // Weak listener is pruned by the source once the recorder is gone.
                tracing::warn!(id = ?self.id, "key source busy during detach");
            }
        }
    }
}

impl KeyRecorder {
    /// Register this recorder with `source`.
    ///
    /// The recorder receives transitions until the returned handle is dropped.
    pub fn attach<S: KeySource>(self, source: &Rc<RefCell<S>>) -> Attached<S> {
        let recorder = Rc::new(RefCell::new(self));
        let listener: Rc<RefCell<dyn KeyListener>> = recorder.clone();
        let id = source.borrow_mut().subscribe(Rc::downgrade(&listener));
        Attached {
            recorder,
            source: Rc::clone(source),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecorderConfig;
    use crate::recorder::KeyQuery;

    #[derive(Default)]
    struct Tape(Vec<String>);

    impl KeyListener for Tape {
        fn on_key_down(&mut self, code: &str) {
            self.0.push(format!("+{code}"));
        }
        fn on_key_up(&mut self, code: &str) {
            self.0.push(format!("-{code}"));
        }
    }

    fn tape() -> (Rc<RefCell<Tape>>, Weak<RefCell<dyn KeyListener>>) {
        let tape = Rc::new(RefCell::new(Tape::default()));
        let listener: Rc<RefCell<dyn KeyListener>> = tape.clone();
        let weak = Rc::downgrade(&listener);
        (tape, weak)
    }

    #[test]
    fn dispatch_reaches_all_listeners_in_order() {
        let mut hub = InputHub::new();
        let (a, wa) = tape();
        let (b, wb) = tape();
        hub.subscribe(wa);
        hub.subscribe(wb);

        assert_eq!(hub.dispatch(&RawKeyEvent::down("KeyA")), 2);
        assert_eq!(hub.dispatch(&RawKeyEvent::up("KeyA")), 2);
        assert_eq!(a.borrow().0, vec!["+KeyA", "-KeyA"]);
        assert_eq!(b.borrow().0, vec!["+KeyA", "-KeyA"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut hub = InputHub::new();
        let (a, wa) = tape();
        let id = hub.subscribe(wa);
        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));
        assert_eq!(hub.dispatch(&RawKeyEvent::down("KeyA")), 0);
        assert!(a.borrow().0.is_empty());
    }

    #[test]
    fn dropped_listeners_are_pruned() {
        let mut hub = InputHub::new();
        let (a, wa) = tape();
        hub.subscribe(wa);
        drop(a);
        assert_eq!(hub.listener_count(), 1);
        assert_eq!(hub.dispatch(&RawKeyEvent::down("KeyA")), 0);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn busy_listener_is_skipped() {
        let mut hub = InputHub::new();
        let (a, wa) = tape();
        hub.subscribe(wa);
        let guard = a.borrow_mut();
        assert_eq!(hub.dispatch(&RawKeyEvent::down("KeyA")), 0);
        drop(guard);
        assert!(a.borrow().0.is_empty());
    }

    #[test]
    fn attached_recorder_receives_and_detaches() {
        let hub = InputHub::shared();
        let attached = KeyRecorder::new(RecorderConfig::default())
            .unwrap()
            .attach(&hub);
        assert_eq!(hub.borrow().listener_count(), 1);

        hub.borrow_mut().dispatch(&RawKeyEvent::down("KeyS"));
        hub.borrow_mut().dispatch(&RawKeyEvent::up("KeyS"));
        let presses = attached.borrow_mut().get_keys(&KeyQuery::new());
        assert_eq!(presses.len(), 1);
        assert_eq!(presses[0].name, "s");

        drop(attached);
        assert_eq!(hub.borrow().listener_count(), 0);
    }

    #[test]
    fn attached_ids_are_distinct() {
        let hub = InputHub::shared();
        let a = KeyRecorder::new(RecorderConfig::default()).unwrap().attach(&hub);
        let b = KeyRecorder::new(RecorderConfig::default()).unwrap().attach(&hub);
        assert_ne!(a.id(), b.id());
        drop(a);
        assert_eq!(hub.borrow().listener_count(), 1);
        assert_eq!(hub.borrow_mut().dispatch(&RawKeyEvent::down("KeyA")), 1);
        assert_eq!(b.borrow().get_events().len(), 1);
    }
}
