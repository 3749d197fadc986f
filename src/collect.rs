//! Bulk construction of containers from iterators.
//!
//! A container that can be filled from an [`Iter`] implements [`FromIter`].
//! The `Vec` implementations here are the reference collaborators: each
//! element is owned through an [`AllocBox`], either placed by the caller's
//! allocator or, for the output of [`copy`](crate::iterator::copy), taken
//! over as it is.

use crate::alloc::{AllocBox, Allocator, copy_element};
use crate::error::{Error, Result};
use crate::iterator::Iter;

/// Build `Self` from every remaining element of an iterator.
pub trait FromIter<'a, T>: Sized {
    /// Consume and destroy `iter`.
    ///
    /// With `should_copy` each element is copied through `alloc`; otherwise
    /// elements are moved out of the iterator, which must produce owned
    /// values ([`Iter::take_current`]). An element that cannot be produced
    /// fails the build, and everything built so far is released.
    fn from_iterator(
        iter: Iter<'a, T>,
        alloc: &'a dyn Allocator,
        should_copy: bool,
    ) -> Result<Self>;
}

impl<'a, T: Clone + 'a> FromIter<'a, T> for Vec<AllocBox<'a, T>> {
    fn from_iterator(
        mut iter: Iter<'a, T>,
        alloc: &'a dyn Allocator,
        should_copy: bool,
    ) -> Result<Self> {
        if !should_copy {
            let items = iter.collect_owned(alloc)?;
            tracing::trace!(len = items.len(), should_copy, "collected from iterator");
            return Ok(items);
        }
        if !iter.is_valid() {
            return Err(Error::InvalidIterator);
        }
        let mut items = Vec::new();
        while iter.has_next() {
            items.push(copy_element(iter.try_get()?, alloc)?);
            iter.next()?;
        }
        tracing::trace!(len = items.len(), should_copy, "collected from iterator");
        Ok(items)
    }
}

/// Copies from [`copy`](crate::iterator::copy) already belong to the caller,
/// so they are moved in as they are, whatever `should_copy` says. They stay
/// in the allocator that made them; `alloc` is not used.
impl<'a, T: 'a> FromIter<'a, AllocBox<'a, T>> for Vec<AllocBox<'a, T>> {
    fn from_iterator(
        iter: Iter<'a, AllocBox<'a, T>>,
        _alloc: &'a dyn Allocator,
        should_copy: bool,
    ) -> Result<Self> {
        let items = iter.collect_copies()?;
        tracing::trace!(len = items.len(), should_copy, "took ownership of copies");
        Ok(items)
    }
}
