use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use parking_lot::Mutex;

type CancelHook = Box<dyn FnOnce() + Send>;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to an active connection between a publisher and a subscriber.
///
/// Clones share state. Cancelling is idempotent, may happen from inside a
/// delivery callback or from another thread, and guarantees the source stops
/// before its next value. A cancel racing with an in-flight delivery on another
/// thread may let that one value through.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<SubscriptionImpl>,
}

struct SubscriptionImpl {
    id: u64,
    cancelled: AtomicBool,
    hooks: Mutex<Vec<CancelHook>>,
}

impl Subscription {
    pub fn new() -> Self {
        Subscription {
            inner: Arc::new(SubscriptionImpl {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                cancelled: AtomicBool::new(false),
                hooks: Mutex::new(vec![]),
            }),
        }
    }

    /// Create a downstream subscription whose cancellation also cancels `upstream`.
    ///
    /// Cancelling `upstream` alone leaves the returned handle untouched, which
    /// lets an operator stop its source and still deliver its own result.
    pub fn linked_to(upstream: &Subscription) -> Self {
        let downstream = Subscription::new();
        let upstream = upstream.clone();

        downstream.on_cancel(move || upstream.cancel());

        downstream
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        // Flag first, then drain under the lock, so `on_cancel` never misses.
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }

        log::trace!("subscription {} cancelled", self.inner.id);

        let hooks = std::mem::take(&mut *self.inner.hooks.lock());

        for hook in hooks {
            hook();
        }
    }

    /// Run `hook` once when this subscription is cancelled, or right away if
    /// it already is.
    pub fn on_cancel<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut hooks = self.inner.hooks.lock();

        if self.is_cancelled() {
            drop(hooks);
            hook();
            return;
        }

        hooks.push(Box::new(hook));
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.inner.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Owning guard returned by terminal consumers; cancels on drop.
#[must_use = "dropping a Cancellable cancels its subscription"]
#[derive(Debug)]
pub struct Cancellable {
    subscription: Subscription,
}

impl Cancellable {
    pub fn new(subscription: Subscription) -> Self {
        Cancellable { subscription }
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    pub fn cancel(&self) {
        self.subscription.cancel();
    }

    /// Keep the subscription alive for as long as `collection` holds it.
    pub fn store<C>(self, collection: &mut C)
    where
        C: Extend<Cancellable>,
    {
        collection.extend(Some(self));
    }
}

impl Drop for Cancellable {
    fn drop(&mut self) {
        self.subscription.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn test_cancel_is_idempotent() {
        let subscription = Subscription::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        subscription.on_cancel(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        subscription.cancel();
        subscription.clone().cancel();

        assert!(subscription.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hook_on_cancelled_subscription_runs_immediately() {
        let subscription = Subscription::new();
        subscription.cancel();

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        subscription.on_cancel(move || flag.store(true, Ordering::SeqCst));

        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_linked_cancel_propagates_upstream_only() {
        let upstream = Subscription::new();
        let downstream = Subscription::linked_to(&upstream);

        upstream.cancel();
        assert!(!downstream.is_cancelled());

        let upstream = Subscription::new();
        let downstream = Subscription::linked_to(&upstream);

        downstream.cancel();
        assert!(upstream.is_cancelled());
    }

    #[test]
    fn test_cancel_from_inside_hook() {
        let first = Subscription::new();
        let second = Subscription::new();

        let inner = first.clone();
        let other = second.clone();
        first.on_cancel(move || {
            inner.cancel();
            other.cancel();
        });

        first.cancel();

        assert!(second.is_cancelled());
    }

    #[test]
    fn test_cancellable_cancels_on_drop_unless_stored() {
        let dropped = Subscription::new();
        drop(Cancellable::new(dropped.clone()));
        assert!(dropped.is_cancelled());

        let kept = Subscription::new();
        let mut bag = Vec::new();
        Cancellable::new(kept.clone()).store(&mut bag);
        assert!(!kept.is_cancelled());

        bag.clear();
        assert!(kept.is_cancelled());
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let subscription = Subscription::new();
        let remote = subscription.clone();

        std::thread::spawn(move || remote.cancel()).join().unwrap();

        assert!(subscription.is_cancelled());
    }
}
