//! Draining helpers shared by callers and bulk constructors.
//!
//! Each helper consumes the iterator and destroys it when done, whether or
//! not the drain succeeded.

use crate::alloc::{AllocBox, Allocator};
use crate::error::{Error, Result};

use super::lifecycle::Iter;

impl<'a, T: 'a> Iter<'a, T> {
    /// Call `f` on every remaining element.
    ///
    /// Stops at the first element that cannot be produced (a copy that could
    /// not be made) and returns its error.
    pub fn for_each(mut self, mut f: impl FnMut(&T)) -> Result<()> {
        if !self.is_valid() {
            return Err(Error::InvalidIterator);
        }
        while self.has_next() {
            f(self.try_get()?);
            self.next()?;
        }
        Ok(())
    }

    /// Number of remaining positions.
    pub fn count(mut self) -> Result<usize> {
        if !self.is_valid() {
            return Err(Error::InvalidIterator);
        }
        let mut n = 0;
        while self.has_next() {
            self.next()?;
            n += 1;
        }
        Ok(n)
    }

    /// Move every remaining element into its own box placed through `alloc`.
    ///
    /// The iterator must hand out owned elements ([`Iter::take_current`]);
    /// no `Clone` is needed. On error the boxes made so far are released.
    pub fn collect_owned(mut self, alloc: &'a dyn Allocator) -> Result<Vec<AllocBox<'a, T>>> {
        if !self.is_valid() {
            return Err(Error::InvalidIterator);
        }
        let mut out = Vec::new();
        while self.has_next() {
            let value = self.take_current()?;
            out.push(AllocBox::try_new_in(value, alloc).map_err(|(_, err)| err)?);
            self.next()?;
        }
        Ok(out)
    }

    /// Clone every remaining element into a `Vec`.
    pub fn collect_cloned(self) -> Result<Vec<T>>
    where
        T: Clone,
    {
        let mut out = Vec::new();
        self.for_each(|item| out.push(item.clone()))?;
        Ok(out)
    }
}

impl<'a, T: 'a> Iter<'a, AllocBox<'a, T>> {
    /// Take ownership of every remaining copy.
    ///
    /// On error the copies taken so far are released before returning.
    pub fn collect_copies(mut self) -> Result<Vec<AllocBox<'a, T>>> {
        if !self.is_valid() {
            return Err(Error::InvalidIterator);
        }
        let mut out = Vec::new();
        while self.has_next() {
            out.push(self.take_current()?);
            self.next()?;
        }
        Ok(out)
    }
}
