use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::{publisher::PublishedValue, Completion, Never, Subscriber, Subscription};

/// Writes every received value into a [`PublishedValue`].
pub struct Assign<T>
where
    T: Clone + Send + 'static,
{
    target: PublishedValue<T>,
    upstream: Option<Subscription>,
}

impl<T> Assign<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(target: &PublishedValue<T>) -> Self {
        Assign {
            target: target.clone(),
            upstream: None,
        }
    }
}

impl<T> Subscriber for Assign<T>
where
    T: Clone + Send + 'static,
{
    type Input = T;
    type Failure = Never;

    fn receive_subscription(&mut self, subscription: Subscription) {
        self.upstream = Some(subscription);
    }

    fn receive(&mut self, input: T) {
        if self.target.set(input).is_err() {
            log::debug!("assign target finished, cancelling upstream");

            if let Some(upstream) = &self.upstream {
                upstream.cancel();
            }
        }
    }

    fn receive_completion(&mut self, completion: Completion<Never>) {
        match completion {
            Completion::Finished => {}
            Completion::Failed(never) => match never {},
        }
    }
}

/// Writes every received value into a field of a shared object.
///
/// The object is held weakly: once it is dropped the upstream is cancelled.
pub struct AssignOn<O, T, F>
where
    F: FnMut(&mut O, T),
{
    object: Weak<Mutex<O>>,
    setter: F,
    upstream: Option<Subscription>,
    _marker: std::marker::PhantomData<fn(T)>,
}

impl<O, T, F> AssignOn<O, T, F>
where
    F: FnMut(&mut O, T),
{
    pub fn new(object: &Arc<Mutex<O>>, setter: F) -> Self {
        AssignOn {
            object: Arc::downgrade(object),
            setter,
            upstream: None,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<O, T, F> Subscriber for AssignOn<O, T, F>
where
    F: FnMut(&mut O, T),
{
    type Input = T;
    type Failure = Never;

    fn receive_subscription(&mut self, subscription: Subscription) {
        self.upstream = Some(subscription);
    }

    fn receive(&mut self, input: T) {
        match self.object.upgrade() {
            Some(object) => {
                let mut guard = object.lock();
                (self.setter)(&mut *guard, input);
            }
            None => {
                if let Some(upstream) = &self.upstream {
                    upstream.cancel();
                }
            }
        }
    }

    fn receive_completion(&mut self, completion: Completion<Never>) {
        match completion {
            Completion::Finished => {}
            Completion::Failed(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        test_support::{counting, Event, Recorder},
        IntoPublisher, Just, Publisher, PublisherExt,
    };

    #[derive(Debug, Default)]
    struct Person {
        name: String,
    }

    #[test]
    fn test_assign_into_published_value() {
        let latest = PublishedValue::new(0);
        let recorder = Recorder::new();
        latest.receive(recorder.clone());

        let _cancellable = vec![1, 2, 3, 4].into_publisher().prefix(3).assign(&latest);

        assert_eq!(latest.get(), 3);
        assert_eq!(
            recorder.take(),
            vec![
                Event::Value(0),
                Event::Value(1),
                Event::Value(2),
                Event::Value(3)
            ]
        );
    }

    #[test]
    fn test_assign_into_finished_value_cancels_upstream() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let latest = PublishedValue::new(0);
        latest.finish();

        let _cancellable = counting(&pulled).assign(&latest);

        assert_eq!(pulled.load(Ordering::SeqCst), 1);
        assert_eq!(latest.get(), 0);
    }

    #[test]
    fn test_assign_on_writes_the_field() {
        let person = Arc::new(Mutex::new(Person::default()));

        let _cancellable =
            Just("Marin".to_string()).assign_on(&person, |person, name| person.name = name);

        assert_eq!(person.lock().name, "Marin");
    }

    #[test]
    fn test_assign_on_dropped_object_cancels_upstream() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let person = Arc::new(Mutex::new(Person::default()));
        let weak = AssignOn::new(&person, |person: &mut Person, index: usize| {
            person.name = index.to_string()
        });
        drop(person);

        let upstream = counting(&pulled).receive(weak);

        assert!(upstream.is_cancelled());
        assert_eq!(pulled.load(Ordering::SeqCst), 1);
    }
}
