use crate::{Completion, Publisher, Subscriber, Subscription};

/// What a [`Reducer`] wants done after seeing one upstream value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<O> {
    /// Keep consuming, emit nothing yet.
    Continue,
    /// Emit a value downstream and keep consuming.
    Emit(O),
    /// The answer is known: cancel upstream, emit the value if any, finish.
    Stop(Option<O>),
}

/// Per-subscription state of an aggregating operator.
///
/// The publisher keeps a template and clones it for every subscriber, so
/// concurrent subscriptions never share an accumulator.
pub trait Reducer<T>: Clone + Send + 'static {
    type Output: Send + 'static;

    /// True when the operator is done before seeing any value, e.g. `prefix(0)`.
    fn is_exhausted(&self) -> bool {
        false
    }

    fn reduce(&mut self, value: T) -> Step<Self::Output>;

    /// Called once on normal upstream completion.
    fn finish(&mut self) -> Option<Self::Output>;
}

/// Publisher returned by every aggregating operator.
#[derive(Clone)]
pub struct Aggregate<P, R> {
    upstream: P,
    reducer: R,
}

impl<P, R> Aggregate<P, R> {
    pub fn new(upstream: P, reducer: R) -> Self {
        Aggregate { upstream, reducer }
    }
}

impl<P, R> Publisher for Aggregate<P, R>
where
    P: Publisher,
    R: Reducer<P::Output>,
{
    type Output = R::Output;
    type Failure = P::Failure;

    fn receive<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<Input = Self::Output, Failure = Self::Failure> + Send + 'static,
    {
        self.upstream.receive(AggregateSubscriber {
            downstream: subscriber,
            reducer: self.reducer.clone(),
            upstream: None,
            handle: Subscription::new(),
            done: false,
            _marker: std::marker::PhantomData,
        })
    }
}

struct AggregateSubscriber<S, R, T> {
    downstream: S,
    reducer: R,
    upstream: Option<Subscription>,
    handle: Subscription,
    done: bool,
    _marker: std::marker::PhantomData<fn(T)>,
}

impl<S, R, T> AggregateSubscriber<S, R, T>
where
    S: Subscriber<Input = R::Output>,
    R: Reducer<T>,
{
    fn emit(&mut self, value: R::Output) {
        if !self.handle.is_cancelled() {
            self.downstream.receive(value);
        }
    }

    fn complete(&mut self, completion: Completion<S::Failure>) {
        if !self.handle.is_cancelled() {
            self.downstream.receive_completion(completion);
        }
    }

    fn stop(&mut self, value: Option<R::Output>) {
        self.done = true;

        if let Some(upstream) = &self.upstream {
            upstream.cancel();
        }

        if let Some(value) = value {
            self.emit(value);
        }

        self.complete(Completion::Finished);
    }
}

impl<S, R, T> Subscriber for AggregateSubscriber<S, R, T>
where
    S: Subscriber<Input = R::Output>,
    R: Reducer<T>,
{
    type Input = T;
    type Failure = S::Failure;

    fn receive_subscription(&mut self, subscription: Subscription) {
        self.handle = Subscription::linked_to(&subscription);
        self.upstream = Some(subscription);
        self.downstream.receive_subscription(self.handle.clone());

        if self.reducer.is_exhausted() {
            self.stop(None);
        }
    }

    fn receive(&mut self, input: T) {
        if self.done {
            return;
        }

        match self.reducer.reduce(input) {
            Step::Continue => {}
            Step::Emit(value) => self.emit(value),
            Step::Stop(value) => self.stop(value),
        }
    }

    fn receive_completion(&mut self, completion: Completion<S::Failure>) {
        if self.done {
            return;
        }
        self.done = true;

        if completion.is_finished() {
            if let Some(value) = self.reducer.finish() {
                self.emit(value);
            }
        }

        self.complete(completion);
    }
}
