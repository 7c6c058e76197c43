//! In-process signal bus.

use std::sync::{Arc, Mutex, mpsc};

use crate::bus::{EventBus, EventListener, Subscription};

#[derive(Debug, PartialEq, Eq)]
pub enum InMemoryBusError {
    /// Publish failed due to internal lock poisoning.
    Poisoned,
}

/// In-memory pub/sub bus.
///
/// - No IO / no async
/// - Subscribers get their copy first, then listeners run in registration order
/// - Dead subscribers are pruned on publish
pub struct InMemoryEventBus<M> {
    listeners: Mutex<Vec<Arc<dyn EventListener<M>>>>,
    subscribers: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> core::fmt::Debug for InMemoryEventBus<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let listeners = self.listeners.lock().map(|l| l.len()).unwrap_or(0);
        let subscribers = self.subscribers.lock().map(|s| s.len()).unwrap_or(0);
        f.debug_struct("InMemoryEventBus")
            .field("listeners", &listeners)
            .field("subscribers", &subscribers)
            .finish()
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        {
            let mut subs = self.subscribers.lock().map_err(|_| InMemoryBusError::Poisoned)?;
            subs.retain(|tx| tx.send(message.clone()).is_ok());
        }

        // Snapshot so no lock is held while listeners run; a listener may
        // publish follow-up messages on this same bus.
        let listeners: Vec<_> = self
            .listeners
            .lock()
            .map_err(|_| InMemoryBusError::Poisoned)?
            .clone();
        for listener in &listeners {
            listener.on_event(&message);
        }

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // A poisoned lock still yields a subscription; it just stays silent.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }

    fn listen(&self, listener: Arc<dyn EventListener<M>>) -> Result<(), Self::Error> {
        self.listeners
            .lock()
            .map_err(|_| InMemoryBusError::Poisoned)?
            .push(listener);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(AtomicUsize);

    impl EventListener<u32> for Counter {
        fn on_event(&self, message: &u32) {
            self.0.fetch_add(*message as usize, Ordering::SeqCst);
        }
    }

    #[test]
    fn listeners_run_before_publish_returns() {
        let bus = InMemoryEventBus::<u32>::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        bus.listen(counter.clone()).unwrap();

        bus.publish(3).unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn subscribers_only_see_later_messages() {
        let bus = InMemoryEventBus::<u32>::new();
        bus.publish(1).unwrap();

        let sub = bus.subscribe();
        bus.publish(2).unwrap();
        bus.publish(5).unwrap();

        assert_eq!(sub.drain(), vec![2, 5]);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus = InMemoryEventBus::<u32>::new();
        drop(bus.subscribe());
        bus.publish(1).unwrap();
        assert!(format!("{bus:?}").contains("subscribers: 0"));
    }
}
