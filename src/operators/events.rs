use std::{
    fmt::Debug,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::{Completion, Publisher, Subscriber, Subscription};

/// Side-effect hooks for [`handle_events`](crate::PublisherExt::handle_events).
///
/// Every hook is optional; unset ones cost nothing.
pub struct Events<T, E> {
    receive_subscription: Option<Arc<dyn Fn(&Subscription) + Send + Sync>>,
    receive_output: Option<Arc<dyn Fn(&T) + Send + Sync>>,
    receive_completion: Option<Arc<dyn Fn(&Completion<E>) + Send + Sync>>,
    receive_cancel: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl<T, E> Events<T, E> {
    pub fn new() -> Self {
        Events {
            receive_subscription: None,
            receive_output: None,
            receive_completion: None,
            receive_cancel: None,
        }
    }

    pub fn on_subscription<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Subscription) + Send + Sync + 'static,
    {
        self.receive_subscription = Some(Arc::new(hook));
        self
    }

    pub fn on_output<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.receive_output = Some(Arc::new(hook));
        self
    }

    pub fn on_completion<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Completion<E>) + Send + Sync + 'static,
    {
        self.receive_completion = Some(Arc::new(hook));
        self
    }

    /// Runs when the subscription is cancelled from downstream.
    pub fn on_cancel<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.receive_cancel = Some(Arc::new(hook));
        self
    }

    /// Hooks that log every event at info level, like Combine's `print`.
    pub fn logging(prefix: &str) -> Self
    where
        T: Debug,
        E: Debug,
    {
        let label = if prefix.is_empty() {
            String::new()
        } else {
            format!("{prefix}: ")
        };

        let on_subscription = label.clone();
        let on_output = label.clone();
        let on_completion = label.clone();
        let on_cancel = label;

        Events::new()
            .on_subscription(move |subscription| {
                log::info!("{on_subscription}receive subscription: ({})", subscription.id())
            })
            .on_output(move |value| log::info!("{on_output}receive value: ({value:?})"))
            .on_completion(move |completion| match completion {
                Completion::Finished => log::info!("{on_completion}receive finished"),
                Completion::Failed(error) => {
                    log::info!("{on_completion}receive error: ({error:?})")
                }
            })
            .on_cancel(move || log::info!("{on_cancel}receive cancel"))
    }
}

impl<T, E> Default for Events<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for Events<T, E> {
    fn clone(&self) -> Self {
        Events {
            receive_subscription: self.receive_subscription.clone(),
            receive_output: self.receive_output.clone(),
            receive_completion: self.receive_completion.clone(),
            receive_cancel: self.receive_cancel.clone(),
        }
    }
}

pub struct HandleEvents<P: Publisher> {
    upstream: P,
    events: Events<P::Output, P::Failure>,
}

impl<P: Publisher> HandleEvents<P> {
    pub fn new(upstream: P, events: Events<P::Output, P::Failure>) -> Self {
        HandleEvents { upstream, events }
    }
}

impl<P: Publisher> Publisher for HandleEvents<P> {
    type Output = P::Output;
    type Failure = P::Failure;

    fn receive<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<Input = P::Output, Failure = P::Failure> + Send + 'static,
    {
        self.upstream.receive(HandleEventsSubscriber {
            downstream: subscriber,
            events: self.events.clone(),
            terminated: Arc::new(AtomicBool::new(false)),
        })
    }
}

struct HandleEventsSubscriber<S: Subscriber> {
    downstream: S,
    events: Events<S::Input, S::Failure>,
    // Set on completion; a cancel after that is not reported.
    terminated: Arc<AtomicBool>,
}

impl<S: Subscriber> Subscriber for HandleEventsSubscriber<S> {
    type Input = S::Input;
    type Failure = S::Failure;

    fn receive_subscription(&mut self, subscription: Subscription) {
        if let Some(hook) = &self.events.receive_subscription {
            hook(&subscription);
        }

        if let Some(hook) = &self.events.receive_cancel {
            let hook = hook.clone();
            let terminated = self.terminated.clone();

            subscription.on_cancel(move || {
                if !terminated.load(Ordering::SeqCst) {
                    hook()
                }
            });
        }

        self.downstream.receive_subscription(subscription);
    }

    fn receive(&mut self, input: S::Input) {
        if let Some(hook) = &self.events.receive_output {
            hook(&input);
        }

        self.downstream.receive(input);
    }

    fn receive_completion(&mut self, completion: Completion<S::Failure>) {
        self.terminated.store(true, Ordering::SeqCst);

        if let Some(hook) = &self.events.receive_completion {
            hook(&completion);
        }

        self.downstream.receive_completion(completion);
    }
}
