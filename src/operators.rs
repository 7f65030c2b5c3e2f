//! Publisher-to-publisher transforms.
//!
//! Operators are normally built through [`PublisherExt`](crate::PublisherExt);
//! the types here are what those methods return.

mod aggregate;
mod events;
mod failure;
mod map;
mod reducer;

pub use aggregate::*;
pub use events::*;
pub use failure::*;
pub use map::*;
pub use reducer::*;
