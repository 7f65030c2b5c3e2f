use std::marker::PhantomData;

use crate::{Completion, Subscriber, Subscription};

/// Closure-driven terminal subscriber behind [`sink`](crate::PublisherExt::sink).
///
/// Owns its own subscription handle; cancelling that handle cancels the
/// upstream and silences both callbacks.
pub struct SinkSubscriber<T, E, C, V>
where
    C: FnMut(Completion<E>),
    V: FnMut(T),
{
    handle: Subscription,
    receive_completion: C,
    receive_value: V,
    finished: bool,
    _marker: PhantomData<fn(T, E)>,
}

impl<T, E, C, V> SinkSubscriber<T, E, C, V>
where
    C: FnMut(Completion<E>),
    V: FnMut(T),
{
    pub fn new(receive_completion: C, receive_value: V) -> Self {
        SinkSubscriber {
            handle: Subscription::new(),
            receive_completion,
            receive_value,
            finished: false,
            _marker: PhantomData,
        }
    }

    pub fn handle(&self) -> Subscription {
        self.handle.clone()
    }

    fn is_open(&self) -> bool {
        !self.finished && !self.handle.is_cancelled()
    }
}

impl<T, E, C, V> Subscriber for SinkSubscriber<T, E, C, V>
where
    C: FnMut(Completion<E>),
    V: FnMut(T),
{
    type Input = T;
    type Failure = E;

    fn receive_subscription(&mut self, subscription: Subscription) {
        self.handle.on_cancel(move || subscription.cancel());
    }

    fn receive(&mut self, input: T) {
        if self.is_open() {
            (self.receive_value)(input);
        }
    }

    fn receive_completion(&mut self, completion: Completion<E>) {
        if self.is_open() {
            self.finished = true;
            (self.receive_completion)(completion);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    };

    use super::*;
    use crate::{IntoPublisher, Just, Never, Publisher, PublisherExt};

    #[test]
    fn test_pre_cancelled_sink_receives_nothing() {
        let received = Arc::new(AtomicBool::new(false));
        let flag = received.clone();

        let subscriber = SinkSubscriber::new(
            |_: Completion<Never>| {},
            move |_: i32| flag.store(true, Ordering::SeqCst),
        );
        subscriber.handle().cancel();

        let upstream = Just(2).receive(subscriber);

        assert!(upstream.is_cancelled());
        assert!(!received.load(Ordering::SeqCst));
    }

    #[test]
    fn test_sink_receives_values_then_completion() {
        let seen = Arc::new(parking_lot::Mutex::new(vec![]));
        let values = seen.clone();
        let completions = seen.clone();

        let _ = vec![1, 2]
            .into_publisher()
            .sink(
                move |completion: Completion<Never>| {
                    assert!(completion.is_finished());
                    completions.lock().push(0);
                },
                move |value| values.lock().push(value),
            );

        assert_eq!(*seen.lock(), vec![1, 2, 0]);
    }

    #[test]
    fn test_never_failing_sink_only_needs_values() {
        let seen = Arc::new(parking_lot::Mutex::new(vec![]));
        let values = seen.clone();

        let _ = Just("Hello").sink_value(move |value| values.lock().push(value));

        assert_eq!(*seen.lock(), vec!["Hello"]);
    }

    #[test]
    fn test_cancel_from_inside_value_callback() {
        let received = Arc::new(AtomicUsize::new(0));
        let counter = received.clone();

        let handle = Arc::new(parking_lot::Mutex::new(None::<Subscription>));
        let slot = handle.clone();

        let subscriber = SinkSubscriber::new(
            |_: Completion<Never>| panic!("completion after cancel"),
            move |_: usize| {
                counter.fetch_add(1, Ordering::SeqCst);
                if let Some(subscription) = slot.lock().as_ref() {
                    subscription.cancel();
                }
            },
        );
        *handle.lock() = Some(subscriber.handle());

        let upstream = (0..).into_publisher().receive(subscriber);

        assert!(upstream.is_cancelled());
        assert_eq!(received.load(Ordering::SeqCst), 1);
    }
}
