//! strand: allocator-parameterized lazy cursors and iterator combinators.
//!
//! An [`Iter`] is a single cursor over a sequence. Leaves ([`range`],
//! [`repeat`], [`slice`]) produce one; combinators ([`transform`],
//! [`filter`], [`copy`], [`take`], [`skip`], [`zip`], [`enumerate`],
//! [`chain`]) wrap one or more and own them from then on. Every layer's
//! state is placed through the [`Allocator`] the chain was built with, so a
//! [`TrackingAllocator`](alloc_track::TrackingAllocator) or
//! [`FaultyAllocator`](alloc_track::FaultyAllocator) can observe or break
//! any pipeline.
//!
//! ```
//! use strand::{GLOBAL, range};
//!
//! let evens_doubled = range(0, 5, 1, &GLOBAL)
//!     .filter(|v| v % 2 == 0)
//!     .and_then(|it| it.transform(|v| v * 2))
//!     .expect("pipeline should build");
//! assert_eq!(evens_doubled.collect_cloned(), Ok(vec![0, 4, 8]));
//! ```
pub mod alloc;
pub mod alloc_track;
pub mod collect;
pub mod config;
pub mod error;
pub mod iterator;

pub use alloc::{AllocBox, AllocError, Allocator, GLOBAL, Global, copy_element};
pub use collect::FromIter;
pub use error::{Error, Rejected, Result};
pub use iterator::{
    Built, ChainParts, Cursor, Indexed, Iter, IteratorKind, Pair, chain, copy, copy_with,
    enumerate, enumerate_owned, filter, range, repeat, skip, slice, slice_rev, take, transform,
    try_range, zip, zip_owned,
};
