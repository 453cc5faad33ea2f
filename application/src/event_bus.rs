//! Topic-keyed event fan-out, scoped per consultation.
//!
//! Grounded on `infrastructure/src/scripting/event_bus.rs`'s topic/listener
//! registry shape in the teacher (there keyed by `LuaRegistryKey`), ported
//! to plain `Box<dyn Fn(&Event) + Send + Sync>` listeners since scripting is
//! out of scope here. Dispatch is synchronous and in emit order; a default
//! no-op error listener is always installed so an `error` event with zero
//! user listeners never aborts the process.

use std::sync::Mutex;

use conclave_domain::event::Event;

type Listener = Box<dyn Fn(&Event) + Send + Sync>;

/// A scoped fan-out instance. Construct one per consultation to avoid
/// cross-talk when multiple consultations run concurrently in the same
/// process.
pub struct EventBus {
    listeners: Mutex<Vec<Listener>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let bus = Self {
            listeners: Mutex::new(Vec::new()),
        };
        bus.subscribe(|_event| {});
        bus
    }

    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.listeners.lock().unwrap().push(Box::new(listener));
    }

    /// Dispatch to every listener, strictly in subscription order. Emit is
    /// synchronous: listeners must not block, but the bus does not enforce
    /// that beyond documenting it.
    pub fn emit(&self, event: Event) {
        let listeners = self.listeners.lock().unwrap();
        for listener in listeners.iter() {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn dispatches_in_subscription_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let a = order.clone();
        bus.subscribe(move |_| a.lock().unwrap().push(1));
        let b = order.clone();
        bus.subscribe(move |_| b.lock().unwrap().push(2));

        bus.emit(Event::RoundStart { round: 1 });
        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn error_event_with_no_user_listeners_does_not_panic() {
        let bus = EventBus::new();
        bus.emit(Event::Error {
            message: "boom".into(),
            context: "test".into(),
        });
    }

    #[test]
    fn multiple_listeners_all_observe_every_emit() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let c = count.clone();
            bus.subscribe(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }
        bus.emit(Event::RoundStart { round: 2 });
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
