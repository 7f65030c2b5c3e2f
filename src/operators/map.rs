use std::{error::Error, marker::PhantomData, sync::Arc};

use crate::{AnyError, Completion, Publisher, Subscriber, Subscription};

#[derive(Clone)]
pub struct Map<P, F> {
    upstream: P,
    transform: Arc<F>,
}

impl<P, F> Map<P, F> {
    pub fn new(upstream: P, transform: F) -> Self {
        Map {
            upstream,
            transform: Arc::new(transform),
        }
    }
}

impl<P, F, U> Publisher for Map<P, F>
where
    P: Publisher,
    F: Fn(P::Output) -> U + Send + Sync + 'static,
    U: Send + 'static,
{
    type Output = U;
    type Failure = P::Failure;

    fn receive<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<Input = U, Failure = P::Failure> + Send + 'static,
    {
        self.upstream.receive(MapSubscriber {
            downstream: subscriber,
            transform: self.transform.clone(),
            _marker: PhantomData,
        })
    }
}

struct MapSubscriber<S, F, T> {
    downstream: S,
    transform: Arc<F>,
    _marker: PhantomData<fn(T)>,
}

impl<S, F, T> Subscriber for MapSubscriber<S, F, T>
where
    S: Subscriber,
    F: Fn(T) -> S::Input,
{
    type Input = T;
    type Failure = S::Failure;

    fn receive_subscription(&mut self, subscription: Subscription) {
        self.downstream.receive_subscription(subscription);
    }

    fn receive(&mut self, input: T) {
        self.downstream.receive((self.transform)(input));
    }

    fn receive_completion(&mut self, completion: Completion<S::Failure>) {
        self.downstream.receive_completion(completion);
    }
}

/// Map with a fallible transform. The first `Err` ends the stream.
///
/// Failures of both the transform and the upstream are boxed into
/// [`AnyError`]; use `map_error` to narrow them back.
#[derive(Clone)]
pub struct TryMap<P, F> {
    upstream: P,
    transform: Arc<F>,
}

impl<P, F> TryMap<P, F> {
    pub fn new(upstream: P, transform: F) -> Self {
        TryMap {
            upstream,
            transform: Arc::new(transform),
        }
    }
}

impl<P, F, U, E> Publisher for TryMap<P, F>
where
    P: Publisher,
    P::Failure: Sync,
    F: Fn(P::Output) -> Result<U, E> + Send + Sync + 'static,
    U: Send + 'static,
    E: Error + Send + Sync + 'static,
{
    type Output = U;
    type Failure = AnyError;

    fn receive<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<Input = U, Failure = AnyError> + Send + 'static,
    {
        self.upstream.receive(TryMapSubscriber {
            downstream: subscriber,
            transform: self.transform.clone(),
            upstream: None,
            handle: Subscription::new(),
            done: false,
            _marker: PhantomData,
        })
    }
}

struct TryMapSubscriber<S, F, T, E, E2> {
    downstream: S,
    transform: Arc<F>,
    upstream: Option<Subscription>,
    handle: Subscription,
    done: bool,
    _marker: PhantomData<fn(T, E, E2)>,
}

impl<S, F, T, U, E, E2> Subscriber for TryMapSubscriber<S, F, T, E, E2>
where
    S: Subscriber<Input = U, Failure = AnyError>,
    F: Fn(T) -> Result<U, E2>,
    E: Error + Send + Sync + 'static,
    E2: Error + Send + Sync + 'static,
{
    type Input = T;
    type Failure = E;

    fn receive_subscription(&mut self, subscription: Subscription) {
        self.handle = Subscription::linked_to(&subscription);
        self.upstream = Some(subscription);
        self.downstream.receive_subscription(self.handle.clone());
    }

    fn receive(&mut self, input: T) {
        if self.done || self.handle.is_cancelled() {
            return;
        }

        match (self.transform)(input) {
            Ok(value) => self.downstream.receive(value),
            Err(error) => {
                log::debug!("try_map failed: {}", error);

                self.done = true;
                if let Some(upstream) = &self.upstream {
                    upstream.cancel();
                }

                self.downstream
                    .receive_completion(Completion::Failed(AnyError::new(error)));
            }
        }
    }

    fn receive_completion(&mut self, completion: Completion<E>) {
        if self.done || self.handle.is_cancelled() {
            return;
        }
        self.done = true;

        self.downstream
            .receive_completion(completion.map_failure(AnyError::new));
    }
}

/// Rewrites only the failure; values and normal completion pass through.
#[derive(Clone)]
pub struct MapError<P, F> {
    upstream: P,
    transform: Arc<F>,
}

impl<P, F> MapError<P, F> {
    pub fn new(upstream: P, transform: F) -> Self {
        MapError {
            upstream,
            transform: Arc::new(transform),
        }
    }
}

impl<P, F, E> Publisher for MapError<P, F>
where
    P: Publisher,
    F: Fn(P::Failure) -> E + Send + Sync + 'static,
    E: Error + Send + 'static,
{
    type Output = P::Output;
    type Failure = E;

    fn receive<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<Input = P::Output, Failure = E> + Send + 'static,
    {
        self.upstream.receive(MapErrorSubscriber {
            downstream: subscriber,
            transform: self.transform.clone(),
            _marker: PhantomData,
        })
    }
}

struct MapErrorSubscriber<S, F, E> {
    downstream: S,
    transform: Arc<F>,
    _marker: PhantomData<fn(E)>,
}

impl<S, F, E> Subscriber for MapErrorSubscriber<S, F, E>
where
    S: Subscriber,
    F: Fn(E) -> S::Failure,
{
    type Input = S::Input;
    type Failure = E;

    fn receive_subscription(&mut self, subscription: Subscription) {
        self.downstream.receive_subscription(subscription);
    }

    fn receive(&mut self, input: S::Input) {
        self.downstream.receive(input);
    }

    fn receive_completion(&mut self, completion: Completion<E>) {
        let transform = &self.transform;
        self.downstream
            .receive_completion(completion.map_failure(|error| transform(error)));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use thiserror::Error;

    use super::*;
    use crate::{
        test_support::{counting, Event, Recorder},
        IntoPublisher, Just, Never, PublisherExt,
    };

    #[derive(Error, Debug, Clone, PartialEq)]
    enum NameError {
        #[error("{0} is too short")]
        TooShort(String),
        #[error("unknown")]
        Unknown,
    }

    #[test]
    fn test_map() {
        let recorder = Recorder::new();
        vec![1, 2, 3]
            .into_publisher()
            .map(|value| value * 2)
            .receive(recorder.clone());

        assert_eq!(
            recorder.take(),
            vec![
                Event::Value(2),
                Event::Value(4),
                Event::Value(6),
                Event::Completion(Completion::<Never>::Finished)
            ]
        );
    }

    #[test]
    fn test_try_map_stops_at_first_failure() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let recorder = Recorder::new();

        vec!["Marin", "Shai", "Florent"]
            .into_publisher()
            .map(move |name| {
                counter.fetch_add(1, Ordering::SeqCst);
                name
            })
            .try_map(|name: &str| {
                if name.len() < 5 {
                    return Err(NameError::TooShort(name.to_string()));
                }
                Ok(name.len())
            })
            .receive(recorder.clone());

        let mut events = recorder.take().into_iter();
        assert!(matches!(events.next(), Some(Event::Value(5))));
        match events.next() {
            Some(Event::Completion(Completion::Failed(error))) => {
                assert_eq!(
                    error.downcast::<NameError>().ok(),
                    Some(NameError::TooShort("Shai".into()))
                );
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(events.next().is_none());
        assert_eq!(pulled.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_try_map_cancels_infinite_upstream() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let recorder = Recorder::new();

        let upstream = counting(&pulled)
            .try_map(|value| match value {
                3 => Err(NameError::Unknown),
                value => Ok(value),
            })
            .receive(recorder.clone());

        assert_eq!(recorder.take().len(), 4);
        assert_eq!(pulled.load(Ordering::SeqCst), 4);
        assert!(upstream.is_cancelled());
    }

    #[test]
    fn test_set_failure_type_try_map_map_error() {
        let recorder = Recorder::new();

        Just("Hello")
            .set_failure_type::<NameError>()
            .try_map(|value: &str| -> Result<&str, NameError> {
                Err(NameError::TooShort(value.to_string()))
            })
            .map_error(|error| {
                error
                    .downcast::<NameError>()
                    .unwrap_or(NameError::Unknown)
            })
            .receive(recorder.clone());

        assert_eq!(
            recorder.take(),
            vec![Event::Completion(Completion::Failed(NameError::TooShort(
                "Hello".into()
            )))]
        );
    }

    #[test]
    fn test_map_error_leaves_values_alone() {
        let recorder = Recorder::new();

        Just(1)
            .set_failure_type::<NameError>()
            .map_error(|_| NameError::Unknown)
            .receive(recorder.clone());

        assert_eq!(
            recorder.take(),
            vec![Event::Value(1), Event::Completion(Completion::Finished)]
        );
    }
}
