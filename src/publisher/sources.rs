use std::{error::Error, marker::PhantomData};

use super::Publisher;
use crate::{Completion, Never, Subscriber, Subscription};

/// Emits one value, then finishes.
#[derive(Clone, Debug)]
pub struct Just<T>(pub T);

impl<T> Publisher for Just<T>
where
    T: Clone + Send + 'static,
{
    type Output = T;
    type Failure = Never;

    fn receive<S>(&self, mut subscriber: S) -> Subscription
    where
        S: Subscriber<Input = T, Failure = Never> + Send + 'static,
    {
        let subscription = Subscription::new();
        subscriber.receive_subscription(subscription.clone());

        if !subscription.is_cancelled() {
            subscriber.receive(self.0.clone());
        }

        if !subscription.is_cancelled() {
            subscriber.receive_completion(Completion::Finished);
        }

        subscription
    }
}

/// Fails immediately with the given error.
#[derive(Clone, Debug)]
pub struct Fail<T, E> {
    error: E,
    _marker: PhantomData<fn() -> T>,
}

impl<T, E> Fail<T, E> {
    pub fn new(error: E) -> Self {
        Fail {
            error,
            _marker: PhantomData,
        }
    }
}

impl<T, E> Publisher for Fail<T, E>
where
    T: Send + 'static,
    E: Error + Clone + Send + 'static,
{
    type Output = T;
    type Failure = E;

    fn receive<S>(&self, mut subscriber: S) -> Subscription
    where
        S: Subscriber<Input = T, Failure = E> + Send + 'static,
    {
        let subscription = Subscription::new();
        subscriber.receive_subscription(subscription.clone());

        if !subscription.is_cancelled() {
            subscriber.receive_completion(Completion::Failed(self.error.clone()));
        }

        subscription
    }
}

/// Finishes immediately without a value.
#[derive(Clone, Debug)]
pub struct Empty<T, E> {
    _marker: PhantomData<fn() -> (T, E)>,
}

impl<T, E> Empty<T, E> {
    pub fn new() -> Self {
        Empty {
            _marker: PhantomData,
        }
    }
}

impl<T, E> Default for Empty<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Publisher for Empty<T, E>
where
    T: Send + 'static,
    E: Error + Send + 'static,
{
    type Output = T;
    type Failure = E;

    fn receive<S>(&self, mut subscriber: S) -> Subscription
    where
        S: Subscriber<Input = T, Failure = E> + Send + 'static,
    {
        let subscription = Subscription::new();
        subscriber.receive_subscription(subscription.clone());

        if !subscription.is_cancelled() {
            subscriber.receive_completion(Completion::Finished);
        }

        subscription
    }
}
