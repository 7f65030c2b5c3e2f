use thiserror::Error;

use std::{sync::Arc, task::Poll};

use futures::Sink;
use parking_lot::Mutex;

use super::Publisher;
use crate::{subscriber::BoxSubscriber, Completion, Never, Subscriber, Subscription};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishedValueError {
    #[error("PublishedValue closed")]
    Closed,
}

type Observer<Output> = Arc<Mutex<BoxSubscriber<Output, Never>>>;

/// A mutable cell that notifies its subscribers on every write.
///
/// New subscribers receive the current value first. Clones share the cell;
/// when the last clone is dropped, live subscribers receive `Finished`.
///
/// Writes from several threads reach each subscriber one at a time and in
/// write order. Subscriber callbacks may read the cell or subscribe to it,
/// but must not `set` or `finish` it.
#[derive(Clone)]
pub struct PublishedValue<Output>
where
    Output: Clone + Send + 'static,
{
    inner: Arc<PublishedValueImpl<Output>>,
}

impl<Output> PublishedValue<Output>
where
    Output: Clone + Send + 'static,
{
    pub fn new(init_value: Output) -> Self {
        PublishedValue {
            inner: Arc::new(PublishedValueImpl::new(init_value)),
        }
    }

    pub fn set(&self, new_value: Output) -> Result<(), PublishedValueError> {
        self.inner.write(new_value)
    }

    pub fn get(&self) -> Output {
        self.inner.state.lock().value.clone()
    }

    /// Complete every subscriber; later writes fail with `Closed`.
    pub fn finish(&self) {
        self.inner.close();
    }

    pub fn subscriber_count(&self) -> usize {
        let mut state = self.inner.state.lock();
        state.prune();
        state.observers.len()
    }
}

impl<Output> Sink<Output> for PublishedValue<Output>
where
    Output: Clone + Send + 'static,
{
    type Error = PublishedValueError;

    fn start_send(self: std::pin::Pin<&mut Self>, item: Output) -> Result<(), Self::Error> {
        self.inner.write(item)?;

        Ok(())
    }

    fn poll_close(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), Self::Error>> {
        self.inner.close();

        Poll::Ready(Ok(()))
    }

    fn poll_flush(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_ready(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), Self::Error>> {
        if self.inner.state.lock().closed {
            return Poll::Ready(Err(PublishedValueError::Closed));
        }

        Poll::Ready(Ok(()))
    }
}

impl<O> Publisher for PublishedValue<O>
where
    O: Clone + Send + 'static,
{
    type Output = O;

    type Failure = Never;

    fn receive<S>(&self, mut subscriber: S) -> Subscription
    where
        S: Subscriber<Input = O, Failure = Never> + Send + 'static,
    {
        let subscription = Subscription::new();
        subscriber.receive_subscription(subscription.clone());

        let boxed: BoxSubscriber<O, Never> = Box::new(subscriber);
        let observer: Observer<O> = Arc::new(Mutex::new(boxed));

        // Held until the current value is out, so a concurrent write
        // cannot overtake it.
        let mut guard = observer.lock();

        let current = {
            let mut state = self.inner.state.lock();

            if state.closed {
                None
            } else {
                state.observers.push((subscription.clone(), observer.clone()));
                Some(state.value.clone())
            }
        };

        match current {
            Some(value) if !subscription.is_cancelled() => guard.receive(value),
            Some(_) => {}
            None => guard.receive_completion(Completion::Finished),
        }

        subscription
    }
}

struct PublishedValueImpl<Output>
where
    Output: Clone + Send + 'static,
{
    state: Mutex<State<Output>>,
    // Serializes writers so every subscriber sees writes in the same order.
    delivery: Mutex<()>,
}

struct State<Output> {
    value: Output,
    observers: Vec<(Subscription, Observer<Output>)>,
    closed: bool,
}

impl<Output> State<Output> {
    fn prune(&mut self) {
        self.observers
            .retain(|(subscription, _)| !subscription.is_cancelled());
    }
}

impl<Output> PublishedValueImpl<Output>
where
    Output: Clone + Send + 'static,
{
    fn new(init: Output) -> Self {
        PublishedValueImpl {
            state: Mutex::new(State {
                value: init,
                observers: vec![],
                closed: false,
            }),
            delivery: Mutex::new(()),
        }
    }

    fn write(&self, value: Output) -> Result<(), PublishedValueError> {
        let _delivery = self.delivery.lock();

        let observers = {
            let mut state = self.state.lock();

            if state.closed {
                return Err(PublishedValueError::Closed);
            }

            state.value = value.clone();
            state.prune();
            state.observers.clone()
        };

        log::debug!("publish to {} subscribers", observers.len());

        for (subscription, observer) in observers {
            if !subscription.is_cancelled() {
                observer.lock().receive(value.clone());
            }
        }

        Ok(())
    }

    fn close(&self) {
        let _delivery = self.delivery.lock();

        let observers = {
            let mut state = self.state.lock();

            if state.closed {
                return;
            }

            state.closed = true;
            std::mem::take(&mut state.observers)
        };

        complete(observers);
    }
}

fn complete<Output>(observers: Vec<(Subscription, Observer<Output>)>) {
    for (subscription, observer) in observers {
        if !subscription.is_cancelled() {
            observer.lock().receive_completion(Completion::Finished);
        }
    }
}

impl<Output> Drop for PublishedValueImpl<Output>
where
    Output: Clone + Send + 'static,
{
    fn drop(&mut self) {
        let state = self.state.get_mut();

        if !state.closed {
            state.closed = true;
            complete(std::mem::take(&mut state.observers));
        }
    }
}
