use std::{error::Error, sync::Arc};

use super::Publisher;
use crate::{subscriber::BoxSubscriber, Subscriber, Subscription};

type ReceiveFn<T, E> = dyn Fn(BoxSubscriber<T, E>) -> Subscription + Send + Sync;

/// Type-erased publisher.
///
/// Lets functions return one publisher type from several differently built
/// pipelines, e.g. a `Fail` on bad input and a real request otherwise.
pub struct AnyPublisher<T, E> {
    receive: Arc<ReceiveFn<T, E>>,
}

impl<T: 'static, E: 'static> AnyPublisher<T, E> {
    pub fn new<P>(publisher: P) -> Self
    where
        P: Publisher<Output = T, Failure = E> + Send + Sync + 'static,
    {
        AnyPublisher {
            receive: Arc::new(move |subscriber: BoxSubscriber<T, E>| {
                publisher.receive(subscriber)
            }),
        }
    }

    /// Build a publisher straight from its subscribe function.
    pub fn from_fn<F>(receive: F) -> Self
    where
        F: Fn(BoxSubscriber<T, E>) -> Subscription + Send + Sync + 'static,
    {
        AnyPublisher {
            receive: Arc::new(receive),
        }
    }
}

impl<T, E> Clone for AnyPublisher<T, E> {
    fn clone(&self) -> Self {
        AnyPublisher {
            receive: self.receive.clone(),
        }
    }
}

impl<T, E> Publisher for AnyPublisher<T, E>
where
    T: Send + 'static,
    E: Error + Send + 'static,
{
    type Output = T;
    type Failure = E;

    fn receive<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<Input = T, Failure = E> + Send + 'static,
    {
        (self.receive)(Box::new(subscriber))
    }
}
