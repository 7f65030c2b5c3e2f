use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::{
    channel::mpsc::{self, UnboundedReceiver, UnboundedSender},
    Stream,
};

use super::Publisher;
use crate::{Completion, Subscriber, Subscription};

/// Async view of a publisher, created by [`values`](crate::PublisherExt::values).
///
/// Yields `Ok` per value, a final `Err` if the publisher failed, then ends.
/// Dropping the stream cancels the subscription.
pub struct Values<T, E> {
    receiver: UnboundedReceiver<Result<T, E>>,
    subscription: Subscription,
}

impl<T, E> Values<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn new<P>(publisher: &P) -> Self
    where
        P: Publisher<Output = T, Failure = E>,
    {
        let (sender, receiver) = mpsc::unbounded();

        let subscription = publisher.receive(ChannelSubscriber {
            sender,
            upstream: None,
        });

        Values {
            receiver,
            subscription,
        }
    }
}

impl<T, E> Stream for Values<T, E> {
    type Item = Result<T, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

impl<T, E> Drop for Values<T, E> {
    fn drop(&mut self) {
        self.subscription.cancel();
    }
}

struct ChannelSubscriber<T, E> {
    sender: UnboundedSender<Result<T, E>>,
    upstream: Option<Subscription>,
}

impl<T, E> Subscriber for ChannelSubscriber<T, E> {
    type Input = T;
    type Failure = E;

    fn receive_subscription(&mut self, subscription: Subscription) {
        self.upstream = Some(subscription);
    }

    fn receive(&mut self, input: T) {
        if self.sender.unbounded_send(Ok(input)).is_err() {
            if let Some(upstream) = &self.upstream {
                upstream.cancel();
            }
        }
    }

    fn receive_completion(&mut self, completion: Completion<E>) {
        if let Completion::Failed(error) = completion {
            let _ = self.sender.unbounded_send(Err(error));
        }

        self.sender.close_channel();
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::{Fail, IntoPublisher, PublishedValue, PublisherExt};

    #[derive(thiserror::Error, Debug, Clone, PartialEq)]
    enum MyError {
        #[error("oh no")]
        OhNo,
    }

    #[async_std::test]
    async fn test_values_of_a_sequence() -> Result<(), anyhow::Error> {
        let values = vec![3, 1, 2].into_publisher().values();

        let collected = values.collect::<Vec<_>>().await;

        assert_eq!(collected, vec![Ok(3), Ok(1), Ok(2)]);

        Ok(())
    }

    #[async_std::test]
    async fn test_failure_is_the_last_item() -> Result<(), anyhow::Error> {
        let mut values = Fail::<i32, _>::new(MyError::OhNo).values();

        assert_eq!(values.next().await, Some(Err(MyError::OhNo)));
        assert_eq!(values.next().await, None);

        Ok(())
    }

    #[test]
    fn test_dropping_the_stream_cancels() {
        let score = PublishedValue::new(0_u8);

        let values = score.values();
        assert_eq!(score.subscriber_count(), 1);

        drop(values);
        assert_eq!(score.subscriber_count(), 0);
    }
}
