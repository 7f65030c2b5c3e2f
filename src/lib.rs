//! Typed, push-based reactive streams in the style of Apple's Combine.
//!
//! A [`Publisher`] describes a lazy sequence of values ending in either
//! success or a typed failure. Operators from [`PublisherExt`] wrap a
//! publisher into a new one, and a terminal consumer such as
//! [`sink`](PublisherExt::sink) drives the pipeline.
//!
//! ```
//! use std::sync::Arc;
//!
//! use combine_streams::prelude::*;
//! use parking_lot::Mutex;
//!
//! let smallest = Arc::new(Mutex::new(None));
//! let slot = smallest.clone();
//!
//! let _ = vec![1, -50, 246, 0]
//!     .into_publisher()
//!     .min()
//!     .sink_value(move |value| *slot.lock() = Some(value));
//!
//! assert_eq!(*smallest.lock(), Some(-50));
//! ```
//!
//! Delivery is synchronous: nothing in this crate schedules work, so a sequence
//! publisher runs to completion (or cancellation) inside `receive`.

mod error;
pub mod operators;
pub mod publisher;
pub mod subscriber;
mod subscription;

#[cfg(test)]
mod test_support;

pub use error::{AnyError, Never};
pub use publisher::*;
pub use subscriber::{Completion, Subscriber};
pub use subscription::{Cancellable, Subscription};

pub mod prelude {
    pub use crate::operators::Events;
    pub use crate::publisher::{
        AnyPublisher, Empty, Fail, IntoPublisher, Just, PublishedValue, Publisher, PublisherExt,
    };
    pub use crate::{AnyError, Cancellable, Completion, Never, Subscriber, Subscription};
}
