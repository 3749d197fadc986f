//! Copy combinator: deep copies of the base's elements, owned by the caller.

use crate::alloc::{AllocBox, Allocator, copy_element};
use crate::error::{Error, Result};

use super::lifecycle::{Built, Iter, reject_invalid};
use super::types::*;

// =============================================================================
// CopyCursor - caller-owned copies made through the allocator
// =============================================================================

struct CopyCursor<'a, T, F> {
    base: Iter<'a, T>,
    copier: F,
    alloc: &'a dyn Allocator,
    /// Copy of the current element until the caller takes it.
    cached: Option<AllocBox<'a, T>>,
}

impl<'a, T: 'a, F> CopyCursor<'a, T, F>
where
    F: FnMut(&T, &'a dyn Allocator) -> Result<AllocBox<'a, T>>,
{
    fn fill(&mut self) -> Result<()> {
        if self.cached.is_none() {
            let item = self.base.get().ok_or(Error::Exhausted)?;
            let copy = (self.copier)(item, self.alloc)?;
            self.cached = Some(copy);
        }
        Ok(())
    }
}

impl<'a, T: 'a, F> Cursor<AllocBox<'a, T>> for CopyCursor<'a, T, F>
where
    F: FnMut(&T, &'a dyn Allocator) -> Result<AllocBox<'a, T>>,
{
    fn kind(&self) -> IteratorKind {
        IteratorKind::Copy
    }

    fn get(&mut self) -> Option<&AllocBox<'a, T>> {
        self.try_get().ok()
    }

    fn try_get(&mut self) -> Result<&AllocBox<'a, T>> {
        if let Err(err) = self.fill() {
            if !err.is_exhausted() {
                tracing::debug!(%err, "element copy failed");
            }
            return Err(err);
        }
        self.cached.as_ref().ok_or(Error::Exhausted)
    }

    fn has_next(&mut self) -> bool {
        self.base.has_next()
    }

    fn next(&mut self) -> Result<()> {
        self.base.next()?;
        // An untaken copy is released here.
        self.cached = None;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.base.is_valid()
    }

    fn take_current(&mut self) -> Result<AllocBox<'a, T>> {
        self.fill()?;
        self.cached.take().ok_or(Error::Exhausted)
    }
}

/// Copy each element of `base` with `copier`, placing copies through the
/// base's allocator.
///
/// Copies belong to the caller once taken with [`Iter::take_current`]. A copy
/// that is only looked at with `get` is released when the iterator moves on.
/// When `copier` fails, `get` yields `None` while `try_get` and
/// `take_current` report the error; the iterator stays on the element and
/// the copy is retried on the next access.
pub fn copy_with<'a, T, F>(
    base: Iter<'a, T>,
    copier: F,
) -> Built<'a, AllocBox<'a, T>, Iter<'a, T>>
where
    T: 'a,
    F: FnMut(&T, &'a dyn Allocator) -> Result<AllocBox<'a, T>> + 'a,
{
    if !base.is_valid() {
        return Err(reject_invalid(IteratorKind::Copy, base));
    }
    let alloc = base.allocator();
    let cursor = CopyCursor {
        base,
        copier,
        alloc,
        cached: None,
    };
    Iter::from_cursor(cursor, alloc).map_err(|rejected| rejected.map_base(|c| c.base))
}

/// [`copy_with`] using `Clone`.
pub fn copy<'a, T: Clone + 'a>(base: Iter<'a, T>) -> Built<'a, AllocBox<'a, T>, Iter<'a, T>> {
    copy_with(base, |item, alloc| Ok(copy_element(item, alloc)?))
}

impl<'a, T: 'a> Iter<'a, T> {
    /// See [`copy`](super::copy).
    pub fn copy(self) -> Built<'a, AllocBox<'a, T>, Iter<'a, T>>
    where
        T: Clone,
    {
        copy(self)
    }

    /// See [`copy_with`](super::copy_with).
    pub fn copy_with<F>(self, copier: F) -> Built<'a, AllocBox<'a, T>, Iter<'a, T>>
    where
        F: FnMut(&T, &'a dyn Allocator) -> Result<AllocBox<'a, T>> + 'a,
    {
        copy_with(self, copier)
    }
}
