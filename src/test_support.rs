use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use parking_lot::Mutex;

use crate::{publisher::Sequence, Completion, IntoPublisher, Subscriber, Subscription};

pub fn init_logging() {
    dotenv::dotenv().ok();
    let _ = pretty_env_logger::try_init();
}

#[derive(Debug, PartialEq)]
pub enum Event<T, E> {
    Value(T),
    Completion(Completion<E>),
}

/// Subscriber that records everything it receives; clones share the log.
pub struct Recorder<T, E> {
    events: Arc<Mutex<Vec<Event<T, E>>>>,
    subscription: Arc<Mutex<Option<Subscription>>>,
}

impl<T, E> Clone for Recorder<T, E> {
    fn clone(&self) -> Self {
        Recorder {
            events: self.events.clone(),
            subscription: self.subscription.clone(),
        }
    }
}

impl<T, E> Recorder<T, E> {
    pub fn new() -> Self {
        Recorder {
            events: Arc::new(Mutex::new(vec![])),
            subscription: Arc::new(Mutex::new(None)),
        }
    }

    pub fn take(&self) -> Vec<Event<T, E>> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn subscription(&self) -> Option<Subscription> {
        self.subscription.lock().clone()
    }
}

impl<T, E> Subscriber for Recorder<T, E> {
    type Input = T;
    type Failure = E;

    fn receive_subscription(&mut self, subscription: Subscription) {
        *self.subscription.lock() = Some(subscription);
    }

    fn receive(&mut self, input: T) {
        self.events.lock().push(Event::Value(input));
    }

    fn receive_completion(&mut self, completion: Completion<E>) {
        self.events.lock().push(Event::Completion(completion));
    }
}

/// Infinite `0, 1, 2, ...` source counting how many elements were pulled.
pub fn counting(
    pulled: &Arc<AtomicUsize>,
) -> Sequence<impl Iterator<Item = usize> + Clone + Send + Sync + 'static> {
    let pulled = pulled.clone();

    (0..)
        .inspect(move |_| {
            pulled.fetch_add(1, Ordering::SeqCst);
        })
        .into_publisher()
}
