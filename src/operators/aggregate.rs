use std::{
    cmp::Ordering,
    ops::{Bound, RangeBounds},
    sync::Arc,
};

use super::{Reducer, Step};

/// Comparator used by `min()`/`max()` on `Ord` values.
pub type Comparator<T> = fn(&T, &T) -> Ordering;

/// Predicate used by `first()`.
pub type Predicate<T> = fn(&T) -> bool;

pub(crate) fn any_value<T>(_: &T) -> bool {
    true
}

/// Running minimum under a comparator. Ties keep the earliest value.
pub struct MinBy<T, F> {
    compare: Arc<F>,
    current: Option<T>,
}

impl<T, F> MinBy<T, F> {
    pub fn new(compare: F) -> Self {
        MinBy {
            compare: Arc::new(compare),
            current: None,
        }
    }
}

impl<T: Clone, F> Clone for MinBy<T, F> {
    fn clone(&self) -> Self {
        MinBy {
            compare: self.compare.clone(),
            current: self.current.clone(),
        }
    }
}

impl<T, F> Reducer<T> for MinBy<T, F>
where
    T: Clone + Send + 'static,
    F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
{
    type Output = T;

    fn reduce(&mut self, value: T) -> Step<T> {
        let replace = match &self.current {
            Some(current) => (self.compare)(&value, current) == Ordering::Less,
            None => true,
        };

        if replace {
            self.current = Some(value);
        }

        Step::Continue
    }

    fn finish(&mut self) -> Option<T> {
        self.current.take()
    }
}

/// Running maximum under a comparator. Ties keep the earliest value.
pub struct MaxBy<T, F> {
    compare: Arc<F>,
    current: Option<T>,
}

impl<T, F> MaxBy<T, F> {
    pub fn new(compare: F) -> Self {
        MaxBy {
            compare: Arc::new(compare),
            current: None,
        }
    }
}

impl<T: Clone, F> Clone for MaxBy<T, F> {
    fn clone(&self) -> Self {
        MaxBy {
            compare: self.compare.clone(),
            current: self.current.clone(),
        }
    }
}

impl<T, F> Reducer<T> for MaxBy<T, F>
where
    T: Clone + Send + 'static,
    F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
{
    type Output = T;

    fn reduce(&mut self, value: T) -> Step<T> {
        let replace = match &self.current {
            Some(current) => (self.compare)(&value, current) == Ordering::Greater,
            None => true,
        };

        if replace {
            self.current = Some(value);
        }

        Step::Continue
    }

    fn finish(&mut self) -> Option<T> {
        self.current.take()
    }
}

/// First value satisfying a predicate; `first()` uses an always-true one.
pub struct FirstWhere<F> {
    predicate: Arc<F>,
}

impl<F> FirstWhere<F> {
    pub fn new(predicate: F) -> Self {
        FirstWhere {
            predicate: Arc::new(predicate),
        }
    }
}

impl<F> Clone for FirstWhere<F> {
    fn clone(&self) -> Self {
        FirstWhere {
            predicate: self.predicate.clone(),
        }
    }
}

impl<T, F> Reducer<T> for FirstWhere<F>
where
    T: Send + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    type Output = T;

    fn reduce(&mut self, value: T) -> Step<T> {
        if (self.predicate)(&value) {
            Step::Stop(Some(value))
        } else {
            Step::Continue
        }
    }

    fn finish(&mut self) -> Option<T> {
        None
    }
}

#[derive(Clone)]
pub struct Last<T> {
    current: Option<T>,
}

impl<T> Last<T> {
    pub fn new() -> Self {
        Last { current: None }
    }
}

impl<T> Default for Last<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Reducer<T> for Last<T>
where
    T: Clone + Send + 'static,
{
    type Output = T;

    fn reduce(&mut self, value: T) -> Step<T> {
        self.current = Some(value);
        Step::Continue
    }

    fn finish(&mut self) -> Option<T> {
        self.current.take()
    }
}

/// Values whose zero-based position falls inside a range.
///
/// Cancels upstream as soon as the last position of a bounded range was
/// delivered.
#[derive(Clone, Debug)]
pub struct OutputIn {
    start: usize,
    // Inclusive, so `..=usize::MAX` needs no sentinel.
    last: Option<usize>,
    empty: bool,
    index: usize,
}

impl OutputIn {
    pub fn new<R>(range: R) -> Self
    where
        R: RangeBounds<usize>,
    {
        let start = match range.start_bound() {
            Bound::Included(&start) => Some(start),
            Bound::Excluded(&start) => start.checked_add(1),
            Bound::Unbounded => Some(0),
        };

        let last = match range.end_bound() {
            Bound::Included(&end) => Some(Some(end)),
            Bound::Excluded(&end) => end.checked_sub(1).map(Some),
            Bound::Unbounded => Some(None),
        };

        match (start, last) {
            (Some(start), Some(last)) => OutputIn {
                start,
                last,
                empty: matches!(last, Some(last) if start > last),
                index: 0,
            },
            _ => OutputIn {
                start: 0,
                last: None,
                empty: true,
                index: 0,
            },
        }
    }

    pub fn at(index: usize) -> Self {
        Self::new(index..=index)
    }
}

impl<T> Reducer<T> for OutputIn
where
    T: Send + 'static,
{
    type Output = T;

    fn is_exhausted(&self) -> bool {
        self.empty
    }

    fn reduce(&mut self, value: T) -> Step<T> {
        let index = self.index;
        self.index = self.index.saturating_add(1);

        if index < self.start {
            return Step::Continue;
        }

        match self.last {
            Some(last) if index >= last => Step::Stop(Some(value)),
            _ => Step::Emit(value),
        }
    }

    fn finish(&mut self) -> Option<T> {
        None
    }
}

/// At most `max` values, then finish and cancel upstream.
#[derive(Clone, Debug)]
pub struct Prefix {
    max: usize,
    taken: usize,
}

impl Prefix {
    pub fn new(max: usize) -> Self {
        Prefix { max, taken: 0 }
    }
}

impl<T> Reducer<T> for Prefix
where
    T: Send + 'static,
{
    type Output = T;

    fn is_exhausted(&self) -> bool {
        self.max == 0
    }

    fn reduce(&mut self, value: T) -> Step<T> {
        self.taken += 1;

        if self.taken >= self.max {
            Step::Stop(Some(value))
        } else {
            Step::Emit(value)
        }
    }

    fn finish(&mut self) -> Option<T> {
        None
    }
}

pub struct Filter<F> {
    predicate: Arc<F>,
}

impl<F> Filter<F> {
    pub fn new(predicate: F) -> Self {
        Filter {
            predicate: Arc::new(predicate),
        }
    }
}

impl<F> Clone for Filter<F> {
    fn clone(&self) -> Self {
        Filter {
            predicate: self.predicate.clone(),
        }
    }
}

impl<T, F> Reducer<T> for Filter<F>
where
    T: Send + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    type Output = T;

    fn reduce(&mut self, value: T) -> Step<T> {
        if (self.predicate)(&value) {
            Step::Emit(value)
        } else {
            Step::Continue
        }
    }

    fn finish(&mut self) -> Option<T> {
        None
    }
}

#[derive(Clone, Debug, Default)]
pub struct Count {
    seen: usize,
}

impl<T> Reducer<T> for Count
where
    T: Send + 'static,
{
    type Output = usize;

    fn reduce(&mut self, _value: T) -> Step<usize> {
        self.seen += 1;
        Step::Continue
    }

    fn finish(&mut self) -> Option<usize> {
        Some(self.seen)
    }
}

#[derive(Clone, Debug)]
pub struct Contains<T> {
    value: T,
}

impl<T> Contains<T> {
    pub fn new(value: T) -> Self {
        Contains { value }
    }
}

impl<T> Reducer<T> for Contains<T>
where
    T: PartialEq + Clone + Send + 'static,
{
    type Output = bool;

    fn reduce(&mut self, value: T) -> Step<bool> {
        if value == self.value {
            Step::Stop(Some(true))
        } else {
            Step::Continue
        }
    }

    fn finish(&mut self) -> Option<bool> {
        Some(false)
    }
}

/// Emits `true` on the first match, `false` when upstream ends without one.
pub struct ContainsWhere<F> {
    predicate: Arc<F>,
}

impl<F> ContainsWhere<F> {
    pub fn new(predicate: F) -> Self {
        ContainsWhere {
            predicate: Arc::new(predicate),
        }
    }
}

impl<F> Clone for ContainsWhere<F> {
    fn clone(&self) -> Self {
        ContainsWhere {
            predicate: self.predicate.clone(),
        }
    }
}

impl<T, F> Reducer<T> for ContainsWhere<F>
where
    T: Send + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    type Output = bool;

    fn reduce(&mut self, value: T) -> Step<bool> {
        if (self.predicate)(&value) {
            Step::Stop(Some(true))
        } else {
            Step::Continue
        }
    }

    fn finish(&mut self) -> Option<bool> {
        Some(false)
    }
}

/// Emits `false` on the first violation, `true` when upstream ends without one.
pub struct AllSatisfy<F> {
    predicate: Arc<F>,
}

impl<F> AllSatisfy<F> {
    pub fn new(predicate: F) -> Self {
        AllSatisfy {
            predicate: Arc::new(predicate),
        }
    }
}

impl<F> Clone for AllSatisfy<F> {
    fn clone(&self) -> Self {
        AllSatisfy {
            predicate: self.predicate.clone(),
        }
    }
}

impl<T, F> Reducer<T> for AllSatisfy<F>
where
    T: Send + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    type Output = bool;

    fn reduce(&mut self, value: T) -> Step<bool> {
        if (self.predicate)(&value) {
            Step::Continue
        } else {
            Step::Stop(Some(false))
        }
    }

    fn finish(&mut self) -> Option<bool> {
        Some(true)
    }
}

/// Left fold emitting the final accumulator, or the initial one if empty.
pub struct Fold<A, F> {
    accumulator: Option<A>,
    f: Arc<F>,
}

impl<A, F> Fold<A, F> {
    pub fn new(initial: A, f: F) -> Self {
        Fold {
            accumulator: Some(initial),
            f: Arc::new(f),
        }
    }
}

impl<A: Clone, F> Clone for Fold<A, F> {
    fn clone(&self) -> Self {
        Fold {
            accumulator: self.accumulator.clone(),
            f: self.f.clone(),
        }
    }
}

impl<T, A, F> Reducer<T> for Fold<A, F>
where
    T: Send + 'static,
    A: Clone + Send + 'static,
    F: Fn(A, T) -> A + Send + Sync + 'static,
{
    type Output = A;

    fn reduce(&mut self, value: T) -> Step<A> {
        if let Some(accumulator) = self.accumulator.take() {
            self.accumulator = Some((self.f)(accumulator, value));
        }

        Step::Continue
    }

    fn finish(&mut self) -> Option<A> {
        self.accumulator.take()
    }
}
