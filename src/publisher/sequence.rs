use super::Publisher;
use crate::{Completion, Never, Subscriber, Subscription};

/// Publishes the elements of an iterable, one at a time, then finishes.
///
/// The iterable is cloned per subscription. Cancellation is checked before
/// every pull, so unbounded iterators are fine as long as something
/// downstream stops them.
#[derive(Clone, Debug)]
pub struct Sequence<I> {
    values: I,
}

impl<I> Sequence<I> {
    pub fn new(values: I) -> Self {
        Sequence { values }
    }
}

impl<I> Publisher for Sequence<I>
where
    I: IntoIterator + Clone,
    I::Item: Send + 'static,
{
    type Output = I::Item;
    type Failure = Never;

    fn receive<S>(&self, mut subscriber: S) -> Subscription
    where
        S: Subscriber<Input = I::Item, Failure = Never> + Send + 'static,
    {
        let subscription = Subscription::new();
        subscriber.receive_subscription(subscription.clone());

        let mut values = self.values.clone().into_iter();

        while !subscription.is_cancelled() {
            match values.next() {
                Some(value) => subscriber.receive(value),
                None => {
                    subscriber.receive_completion(Completion::Finished);
                    break;
                }
            }
        }

        subscription
    }
}

/// `into_publisher()` for anything iterable, e.g. `vec![1, 2].into_publisher()`.
pub trait IntoPublisher: IntoIterator + Clone + Sized {
    fn into_publisher(self) -> Sequence<Self> {
        Sequence::new(self)
    }
}

impl<I> IntoPublisher for I where I: IntoIterator + Clone {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Event, Recorder};

    #[test]
    fn test_values_arrive_in_order_then_finish() {
        let recorder = Recorder::new();

        ["A", "B", "C"].into_publisher().receive(recorder.clone());

        assert_eq!(
            recorder.take(),
            vec![
                Event::Value("A"),
                Event::Value("B"),
                Event::Value("C"),
                Event::Completion(Completion::<Never>::Finished)
            ]
        );
    }

    #[test]
    fn test_cancel_from_subscriber_stops_infinite_source() {
        struct TakeTwo {
            subscription: Option<Subscription>,
            seen: Vec<u32>,
        }

        impl Subscriber for TakeTwo {
            type Input = u32;
            type Failure = Never;

            fn receive_subscription(&mut self, subscription: Subscription) {
                self.subscription = Some(subscription);
            }

            fn receive(&mut self, input: u32) {
                self.seen.push(input);
                if self.seen.len() == 2 {
                    if let Some(subscription) = &self.subscription {
                        subscription.cancel();
                    }
                }
            }

            fn receive_completion(&mut self, _completion: Completion<Never>) {
                panic!("cancelled stream must not complete");
            }
        }

        let subscription = (0..).into_publisher().receive(TakeTwo {
            subscription: None,
            seen: vec![],
        });

        assert!(subscription.is_cancelled());
    }
}
