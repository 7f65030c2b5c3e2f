use std::{cmp::Ordering, error::Error, ops::RangeBounds, sync::Arc};

use parking_lot::Mutex;

use crate::{
    operators::*,
    subscriber::{Assign, AssignOn, SinkSubscriber},
    Cancellable, Completion, Never, Subscriber, Subscription,
};

mod any;
mod sequence;
mod sources;
mod value;
mod values;
pub use any::*;
pub use sequence::*;
pub use sources::*;
pub use value::*;
pub use values::*;

/// A publisher delivers elements to one or more Subscriber instances.
///
/// call receive to attach a new subscriber; every call is independent of the
/// others and gets its own operator state.
pub trait Publisher {
    type Output: Send + 'static;
    type Failure: Error + Send + 'static;

    /// Attach `subscriber` and start delivering.
    ///
    /// Synchronous sources deliver everything before returning.
    fn receive<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<Input = Self::Output, Failure = Self::Failure> + Send + 'static;
}

/// Operators and terminal consumers available on every [`Publisher`].
pub trait PublisherExt: Publisher + Sized {
    fn map<F, U>(self, transform: F) -> Map<Self, F>
    where
        F: Fn(Self::Output) -> U + Send + Sync + 'static,
        U: Send + 'static,
    {
        Map::new(self, transform)
    }

    /// Map with a transform that may fail; the first failure ends the stream.
    fn try_map<F, U, E>(self, transform: F) -> TryMap<Self, F>
    where
        F: Fn(Self::Output) -> Result<U, E> + Send + Sync + 'static,
        U: Send + 'static,
        E: Error + Send + Sync + 'static,
        Self::Failure: Sync,
    {
        TryMap::new(self, transform)
    }

    fn map_error<F, E>(self, transform: F) -> MapError<Self, F>
    where
        F: Fn(Self::Failure) -> E + Send + Sync + 'static,
        E: Error + Send + 'static,
    {
        MapError::new(self, transform)
    }

    fn filter<F>(self, predicate: F) -> Aggregate<Self, Filter<F>>
    where
        F: Fn(&Self::Output) -> bool + Send + Sync + 'static,
    {
        Aggregate::new(self, Filter::new(predicate))
    }

    fn prefix(self, max: usize) -> Aggregate<Self, Prefix> {
        Aggregate::new(self, Prefix::new(max))
    }

    fn min(self) -> Aggregate<Self, MinBy<Self::Output, Comparator<Self::Output>>>
    where
        Self::Output: Ord + Clone,
    {
        self.min_by(<Self::Output as Ord>::cmp as Comparator<Self::Output>)
    }

    fn min_by<F>(self, compare: F) -> Aggregate<Self, MinBy<Self::Output, F>>
    where
        Self::Output: Clone,
        F: Fn(&Self::Output, &Self::Output) -> Ordering + Send + Sync + 'static,
    {
        Aggregate::new(self, MinBy::new(compare))
    }

    fn max(self) -> Aggregate<Self, MaxBy<Self::Output, Comparator<Self::Output>>>
    where
        Self::Output: Ord + Clone,
    {
        self.max_by(<Self::Output as Ord>::cmp as Comparator<Self::Output>)
    }

    fn max_by<F>(self, compare: F) -> Aggregate<Self, MaxBy<Self::Output, F>>
    where
        Self::Output: Clone,
        F: Fn(&Self::Output, &Self::Output) -> Ordering + Send + Sync + 'static,
    {
        Aggregate::new(self, MaxBy::new(compare))
    }

    /// First value, then cancel upstream.
    fn first(self) -> Aggregate<Self, FirstWhere<Predicate<Self::Output>>> {
        self.first_where(any_value as Predicate<Self::Output>)
    }

    fn first_where<F>(self, predicate: F) -> Aggregate<Self, FirstWhere<F>>
    where
        F: Fn(&Self::Output) -> bool + Send + Sync + 'static,
    {
        Aggregate::new(self, FirstWhere::new(predicate))
    }

    fn last(self) -> Aggregate<Self, Last<Self::Output>>
    where
        Self::Output: Clone,
    {
        Aggregate::new(self, Last::new())
    }

    /// Only the value at zero-based `index`.
    fn output_at(self, index: usize) -> Aggregate<Self, OutputIn> {
        Aggregate::new(self, OutputIn::at(index))
    }

    /// Every value whose zero-based index is in `range`, delivered one by one.
    fn output_in<R>(self, range: R) -> Aggregate<Self, OutputIn>
    where
        R: RangeBounds<usize>,
    {
        Aggregate::new(self, OutputIn::new(range))
    }

    fn count(self) -> Aggregate<Self, Count> {
        Aggregate::new(self, Count::default())
    }

    /// `true` as soon as `value` shows up, `false` if upstream ends without it.
    fn contains(self, value: Self::Output) -> Aggregate<Self, Contains<Self::Output>>
    where
        Self::Output: PartialEq + Clone,
    {
        Aggregate::new(self, Contains::new(value))
    }

    fn contains_where<F>(self, predicate: F) -> Aggregate<Self, ContainsWhere<F>>
    where
        F: Fn(&Self::Output) -> bool + Send + Sync + 'static,
    {
        Aggregate::new(self, ContainsWhere::new(predicate))
    }

    fn all_satisfy<F>(self, predicate: F) -> Aggregate<Self, AllSatisfy<F>>
    where
        F: Fn(&Self::Output) -> bool + Send + Sync + 'static,
    {
        Aggregate::new(self, AllSatisfy::new(predicate))
    }

    fn reduce<A, F>(self, initial: A, f: F) -> Aggregate<Self, Fold<A, F>>
    where
        A: Clone + Send + 'static,
        F: Fn(A, Self::Output) -> A + Send + Sync + 'static,
    {
        Aggregate::new(self, Fold::new(initial, f))
    }

    fn set_failure_type<E>(self) -> SetFailureType<Self, E>
    where
        Self: Publisher<Failure = Never>,
        E: Error + Send + 'static,
    {
        SetFailureType::new(self)
    }

    /// Panic if the upstream ever fails.
    #[track_caller]
    fn assert_no_failure(self) -> AssertNoFailure<Self> {
        AssertNoFailure::new(self, "", std::panic::Location::caller())
    }

    /// [`assert_no_failure`](PublisherExt::assert_no_failure) with `prefix`
    /// at the start of the panic message.
    #[track_caller]
    fn assert_no_failure_with(self, prefix: &str) -> AssertNoFailure<Self> {
        AssertNoFailure::new(self, prefix, std::panic::Location::caller())
    }

    fn replace_error(self, fallback: Self::Output) -> ReplaceError<Self>
    where
        Self::Output: Clone,
    {
        ReplaceError::new(self, fallback)
    }

    fn handle_events(self, events: Events<Self::Output, Self::Failure>) -> HandleEvents<Self> {
        HandleEvents::new(self, events)
    }

    /// Log every event through the `log` facade at info level.
    fn print(self, prefix: &str) -> HandleEvents<Self>
    where
        Self::Output: std::fmt::Debug,
    {
        self.handle_events(Events::logging(prefix))
    }

    fn erase(self) -> AnyPublisher<Self::Output, Self::Failure>
    where
        Self: Send + Sync + 'static,
    {
        AnyPublisher::new(self)
    }

    fn sink<C, V>(self, receive_completion: C, receive_value: V) -> Cancellable
    where
        C: FnMut(Completion<Self::Failure>) + Send + 'static,
        V: FnMut(Self::Output) + Send + 'static,
    {
        let subscriber = SinkSubscriber::new(receive_completion, receive_value);
        let handle = subscriber.handle();

        self.receive(subscriber);

        Cancellable::new(handle)
    }

    fn sink_value<V>(self, receive_value: V) -> Cancellable
    where
        Self: Publisher<Failure = Never>,
        V: FnMut(Self::Output) + Send + 'static,
    {
        self.sink(
            |completion: Completion<Never>| match completion {
                Completion::Finished => {}
                Completion::Failed(never) => match never {},
            },
            receive_value,
        )
    }

    fn assign(self, target: &PublishedValue<Self::Output>) -> Cancellable
    where
        Self: Publisher<Failure = Never>,
        Self::Output: Clone,
    {
        let handle = Subscription::new();
        let upstream = self.receive(Assign::new(target));

        handle.on_cancel(move || upstream.cancel());

        Cancellable::new(handle)
    }

    /// Write every value into `object` through `setter`.
    ///
    /// `object` is held weakly, so storing the returned [`Cancellable`] inside
    /// the object does not keep it alive.
    fn assign_on<O, F>(self, object: &Arc<Mutex<O>>, setter: F) -> Cancellable
    where
        Self: Publisher<Failure = Never>,
        O: Send + 'static,
        F: FnMut(&mut O, Self::Output) + Send + 'static,
    {
        let handle = Subscription::new();
        let upstream = self.receive(AssignOn::new(object, setter));

        handle.on_cancel(move || upstream.cancel());

        Cancellable::new(handle)
    }

    /// Bridge into a `futures::Stream` of `Result<Output, Failure>`.
    fn values(&self) -> Values<Self::Output, Self::Failure> {
        Values::new(self)
    }
}

impl<P: Publisher> PublisherExt for P {}
