//! Iterator lifecycle management: placement, invalid iterators, destroy.

use std::fmt;
use std::ptr::NonNull;

use crate::alloc::{AllocBox, Allocator};
use crate::error::{Error, Rejected, Result};

use super::types::*;

/// Outcome of a constructor: the new iterator, or the untouched base(s) `B`.
pub type Built<'a, T, B = Iter<'a, T>> = std::result::Result<Iter<'a, T>, Rejected<B>>;

/// An iterator value.
///
/// Holds its cursor in memory from `alloc`, or nothing at all when invalid.
/// Every method is defined on an invalid iterator: `get` yields `None`,
/// `has_next`/`has_prev` are false and movement fails with
/// [`Error::InvalidIterator`].
pub struct Iter<'a, T> {
    state: Option<AllocBox<'a, dyn Cursor<T> + 'a>>,
    alloc: &'a dyn Allocator,
}

impl<'a, T: 'a> Iter<'a, T> {
    /// An iterator with no state.
    pub fn invalid(alloc: &'a dyn Allocator) -> Self {
        Self { state: None, alloc }
    }

    /// Place `cursor` through `alloc`.
    ///
    /// On allocation failure the cursor, and with it everything it owns, is
    /// handed back in the rejection.
    pub fn from_cursor<C>(cursor: C, alloc: &'a dyn Allocator) -> Built<'a, T, C>
    where
        C: Cursor<T> + 'a,
    {
        let kind = cursor.kind();
        let boxed = match AllocBox::try_new_in(cursor, alloc) {
            Ok(boxed) => boxed,
            Err((cursor, err)) => {
                tracing::debug!(%kind, %err, "iterator allocation failed");
                return Err(Rejected::new(err.into(), cursor));
            }
        };
        let (ptr, layout, alloc) = boxed.into_raw_parts();
        let ptr: NonNull<dyn Cursor<T> + 'a> = ptr;
        // SAFETY: same allocation and layout; only the pointer gained a vtable.
        let state = unsafe { AllocBox::from_raw_parts(ptr, layout, alloc) };
        tracing::trace!(%kind, size = layout.size(), "iterator created");
        Ok(Self {
            state: Some(state),
            alloc,
        })
    }

    /// Collapse a rejected construction into an invalid iterator, dropping
    /// whatever was handed back.
    pub fn or_invalid<B>(built: Built<'a, T, B>, alloc: &'a dyn Allocator) -> Self {
        built.unwrap_or_else(|rejected| {
            tracing::debug!(error = %rejected.error, "construction replaced by invalid iterator");
            Self::invalid(alloc)
        })
    }

    /// Own state present and every wrapped base valid.
    pub fn is_valid(&self) -> bool {
        self.state.as_ref().is_some_and(|state| state.is_valid())
    }

    /// Kind of the outermost cursor, `None` when invalid.
    pub fn kind(&self) -> Option<IteratorKind> {
        self.state.as_ref().map(|state| state.kind())
    }

    /// Allocator this iterator was built with; combinators built on top of
    /// it use the same one.
    pub fn allocator(&self) -> &'a dyn Allocator {
        self.alloc
    }

    pub fn get(&mut self) -> Option<&T> {
        self.state.as_deref_mut()?.get()
    }

    /// Current element, or why there is none: [`Error::Exhausted`] at the
    /// end, [`Error::InvalidIterator`] without state, or the failure that
    /// kept the element from being produced.
    pub fn try_get(&mut self) -> Result<&T> {
        self.cursor()?.try_get()
    }

    pub fn has_next(&mut self) -> bool {
        self.state.as_deref_mut().is_some_and(|state| state.has_next())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<()> {
        self.cursor()?.next()
    }

    pub fn has_prev(&mut self) -> bool {
        self.state.as_deref_mut().is_some_and(|state| state.has_prev())
    }

    pub fn prev(&mut self) -> Result<()> {
        self.cursor()?.prev()
    }

    /// No-op when the cursor does not track a start position.
    pub fn reset(&mut self) {
        if let Some(state) = self.state.as_deref_mut() {
            state.reset();
        }
    }

    pub fn take_current(&mut self) -> Result<T> {
        self.cursor()?.take_current()
    }

    /// Tear down this iterator and every base it owns.
    pub fn destroy(self) {
        drop(self);
    }

    fn cursor(&mut self) -> Result<&mut (dyn Cursor<T> + 'a)> {
        self.state.as_deref_mut().ok_or(Error::InvalidIterator)
    }
}

impl<T> Drop for Iter<'_, T> {
    fn drop(&mut self) {
        // The state drops after this: owned bases first, then this layer's memory.
        if let Some(state) = &self.state {
            tracing::trace!(kind = %state.kind(), "iterator destroyed");
        }
    }
}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("kind", &self.state.as_ref().map(|state| state.kind()))
            .field("valid", &self.state.as_ref().is_some_and(|state| state.is_valid()))
            .finish()
    }
}

impl<B> Rejected<B> {
    /// Split into an invalid iterator and the handed-back base(s).
    pub fn into_invalid<'a, T: 'a>(self, alloc: &'a dyn Allocator) -> (Iter<'a, T>, B) {
        (Iter::invalid(alloc), self.base)
    }
}

/// Reject a construction because a base is invalid.
pub(crate) fn reject_invalid<B>(kind: IteratorKind, base: B) -> Rejected<B> {
    tracing::debug!(%kind, "rejected invalid base iterator");
    Rejected::new(Error::InvalidIterator, base)
}
