use crate::Subscription;

mod assign;
mod sink;
pub use assign::*;
pub use sink::*;

/// How a stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion<E> {
    Finished,
    Failed(E),
}

impl<E> Completion<E> {
    pub fn is_finished(&self) -> bool {
        matches!(self, Completion::Finished)
    }

    pub fn map_failure<F, E2>(self, f: F) -> Completion<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Completion::Finished => Completion::Finished,
            Completion::Failed(error) => Completion::Failed(f(error)),
        }
    }
}

/// A subscriber receives values from a Publisher.
///
/// The subscription always arrives first, then any number of values, then at
/// most one completion. Nothing is delivered after the completion.
pub trait Subscriber {
    type Input;
    type Failure;

    fn receive_subscription(&mut self, subscription: Subscription);

    fn receive(&mut self, input: Self::Input);

    fn receive_completion(&mut self, completion: Completion<Self::Failure>);
}

impl<S> Subscriber for Box<S>
where
    S: Subscriber + ?Sized,
{
    type Input = S::Input;
    type Failure = S::Failure;

    fn receive_subscription(&mut self, subscription: Subscription) {
        (**self).receive_subscription(subscription)
    }

    fn receive(&mut self, input: Self::Input) {
        (**self).receive(input)
    }

    fn receive_completion(&mut self, completion: Completion<Self::Failure>) {
        (**self).receive_completion(completion)
    }
}

/// Type-erased subscriber, as stored by multicasting publishers.
pub type BoxSubscriber<T, E> = Box<dyn Subscriber<Input = T, Failure = E> + Send>;
