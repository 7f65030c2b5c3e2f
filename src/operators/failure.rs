use std::{error::Error, marker::PhantomData, panic::Location};

use crate::{Completion, Never, Publisher, Subscriber, Subscription};

/// Re-types a never-failing publisher to fail with `E`. No runtime effect.
pub struct SetFailureType<P, E> {
    upstream: P,
    _marker: PhantomData<fn() -> E>,
}

impl<P, E> SetFailureType<P, E> {
    pub fn new(upstream: P) -> Self {
        SetFailureType {
            upstream,
            _marker: PhantomData,
        }
    }
}

impl<P, E> Publisher for SetFailureType<P, E>
where
    P: Publisher<Failure = Never>,
    E: Error + Send + 'static,
{
    type Output = P::Output;
    type Failure = E;

    fn receive<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<Input = P::Output, Failure = E> + Send + 'static,
    {
        self.upstream.receive(Retype {
            downstream: subscriber,
        })
    }
}

struct Retype<S> {
    downstream: S,
}

impl<S: Subscriber> Subscriber for Retype<S> {
    type Input = S::Input;
    type Failure = Never;

    fn receive_subscription(&mut self, subscription: Subscription) {
        self.downstream.receive_subscription(subscription);
    }

    fn receive(&mut self, input: S::Input) {
        self.downstream.receive(input);
    }

    fn receive_completion(&mut self, completion: Completion<Never>) {
        match completion {
            Completion::Finished => self.downstream.receive_completion(Completion::Finished),
            Completion::Failed(never) => match never {},
        }
    }
}

/// Turns any upstream failure into a panic.
///
/// For pipelines the programmer knows cannot fail; a failure here is a bug,
/// not an error to handle.
pub struct AssertNoFailure<P> {
    upstream: P,
    prefix: String,
    location: &'static Location<'static>,
}

impl<P> AssertNoFailure<P> {
    pub fn new(
        upstream: P,
        prefix: impl Into<String>,
        location: &'static Location<'static>,
    ) -> Self {
        let prefix = prefix.into();

        AssertNoFailure {
            upstream,
            prefix: if prefix.is_empty() {
                prefix
            } else {
                format!("{prefix}: ")
            },
            location,
        }
    }
}

impl<P: Publisher> Publisher for AssertNoFailure<P> {
    type Output = P::Output;
    type Failure = Never;

    fn receive<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<Input = P::Output, Failure = Never> + Send + 'static,
    {
        self.upstream.receive(AssertNoFailureSubscriber {
            downstream: subscriber,
            prefix: self.prefix.clone(),
            location: self.location,
            _marker: PhantomData,
        })
    }
}

struct AssertNoFailureSubscriber<S, E> {
    downstream: S,
    prefix: String,
    location: &'static Location<'static>,
    _marker: PhantomData<fn(E)>,
}

impl<S, E> Subscriber for AssertNoFailureSubscriber<S, E>
where
    S: Subscriber<Failure = Never>,
    E: Error,
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
        match completion {
            Completion::Finished => self.downstream.receive_completion(Completion::Finished),
            Completion::Failed(error) => {
                log::error!(
                    "{}unexpected failure {:?} asserted at {}",
                    self.prefix,
                    error,
                    self.location
                );

                panic!(
                    "{}unexpected failure {:?} asserted at {}",
                    self.prefix, error, self.location
                );
            }
        }
    }
}

/// Replaces a failure with a fallback value followed by normal completion.
pub struct ReplaceError<P: Publisher> {
    upstream: P,
    fallback: P::Output,
}

impl<P: Publisher> ReplaceError<P> {
    pub fn new(upstream: P, fallback: P::Output) -> Self {
        ReplaceError { upstream, fallback }
    }
}

impl<P> Publisher for ReplaceError<P>
where
    P: Publisher,
    P::Output: Clone,
{
    type Output = P::Output;
    type Failure = Never;

    fn receive<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<Input = P::Output, Failure = Never> + Send + 'static,
    {
        self.upstream.receive(ReplaceErrorSubscriber {
            downstream: subscriber,
            fallback: self.fallback.clone(),
            _marker: PhantomData,
        })
    }
}

struct ReplaceErrorSubscriber<S: Subscriber, E> {
    downstream: S,
    fallback: S::Input,
    _marker: PhantomData<fn(E)>,
}

impl<S, E> Subscriber for ReplaceErrorSubscriber<S, E>
where
    S: Subscriber<Failure = Never>,
    S::Input: Clone,
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
        if let Completion::Failed(_) = completion {
            self.downstream.receive(self.fallback.clone());
        }

        self.downstream.receive_completion(Completion::Finished);
    }
}
