//! Minimal publish/subscribe primitive
//!
//! A `Subject` fans a published value out to every live subscriber. Each
//! subscription is a `std::sync::mpsc` channel; when the receiving side is
//! dropped the subscription is pruned on the next publish.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

type Listener<T> = Box<dyn Fn(&T) -> bool + Send>;

/// A multi-subscriber change broadcaster
pub struct Subject<T> {
    listeners: Mutex<Vec<Listener<T>>>,
}

impl<T> Subject<T>
where
    T: Clone + Send + 'static,
{
    /// Create a subject with no subscribers
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe to every value published from now on
    pub fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = mpsc::channel();
        self.forward(tx, |value: &T| value.clone());
        rx
    }

    /// Forward published values, mapped, into an existing channel
    ///
    /// Used to merge several subjects into one receiver.
    pub fn forward<U, F>(&self, tx: Sender<U>, map: F)
    where
        U: Send + 'static,
        F: Fn(&T) -> U + Send + 'static,
    {
        self.observe(move |value| tx.send(map(value)).is_ok());
    }

    /// Register a raw listener. It stays registered while it returns `true`.
    pub fn observe<F>(&self, listener: F)
    where
        F: Fn(&T) -> bool + Send + 'static,
    {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(Box::new(listener));
        }
    }

    /// Publish a value to all live subscribers
    pub fn publish(&self, value: T) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|listener| listener(&value));
        }
    }

    /// Number of live subscriptions (as of the last publish)
    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }
}

impl<T> Default for Subject<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_all_subscribers() {
        let subject = Subject::new();
        let a = subject.subscribe();
        let b = subject.subscribe();

        subject.publish(7u32);

        assert_eq!(a.try_recv().unwrap(), 7);
        assert_eq!(b.try_recv().unwrap(), 7);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let subject = Subject::new();
        let keep = subject.subscribe();
        let dropped = subject.subscribe();
        assert_eq!(subject.subscriber_count(), 2);

        drop(dropped);
        subject.publish("x".to_string());

        assert_eq!(subject.subscriber_count(), 1);
        assert_eq!(keep.try_recv().unwrap(), "x");
    }

    #[test]
    fn test_observe_unsubscribes_on_false() {
        let subject = Subject::new();
        let (tx, rx) = mpsc::channel();
        subject.observe(move |n: &u32| {
            let _ = tx.send(*n);
            *n < 2
        });

        subject.publish(1);
        subject.publish(2);
        subject.publish(3);

        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(subject.subscriber_count(), 0);
    }

    #[test]
    fn test_forward_maps_into_shared_channel() {
        let numbers: Subject<u32> = Subject::new();
        let words: Subject<String> = Subject::new();
        let (tx, rx) = mpsc::channel();

        numbers.forward(tx.clone(), |n| format!("n{}", n));
        words.forward(tx, |w| format!("w{}", w));

        numbers.publish(1);
        words.publish("a".into());

        assert_eq!(rx.try_recv().unwrap(), "n1");
        assert_eq!(rx.try_recv().unwrap(), "wa");
    }
}
