//! Iterator combinators: zip, enumerate, chain.

use smallvec::SmallVec;

use crate::alloc::Allocator;
use crate::error::{Error, Result};

use super::lifecycle::{Built, Iter, reject_invalid};
use super::types::*;

// =============================================================================
// Fetch - how a record combinator obtains its base's current element
// =============================================================================

/// Produces an owned copy of a base's current element for a cached record.
type Fetch<'a, T> = fn(&mut Iter<'a, T>) -> Result<T>;

/// Clone the element the base lends; the base keeps its own.
fn fetch_cloned<'a, T: Clone + 'a>(base: &mut Iter<'a, T>) -> Result<T> {
    base.try_get().cloned()
}

/// Move the element out of the base ([`Iter::take_current`]).
fn fetch_owned<'a, T: 'a>(base: &mut Iter<'a, T>) -> Result<T> {
    base.take_current()
}

// =============================================================================
// ZipCursor - pairs from two bases in lockstep
// =============================================================================

struct ZipCursor<'a, A, B> {
    first: Iter<'a, A>,
    second: Iter<'a, B>,
    fetch_first: Fetch<'a, A>,
    fetch_second: Fetch<'a, B>,
    /// Reused pair record; rebuilt after each move.
    cached: Option<Pair<A, B>>,
}

impl<'a, A: 'a, B: 'a> Cursor<Pair<A, B>> for ZipCursor<'a, A, B> {
    fn kind(&self) -> IteratorKind {
        IteratorKind::Zip
    }

    fn get(&mut self) -> Option<&Pair<A, B>> {
        self.try_get().ok()
    }

    fn try_get(&mut self) -> Result<&Pair<A, B>> {
        if self.cached.is_none() {
            let first = (self.fetch_first)(&mut self.first)?;
            let second = (self.fetch_second)(&mut self.second)?;
            self.cached = Some(Pair { first, second });
        }
        self.cached.as_ref().ok_or(Error::Exhausted)
    }

    fn has_next(&mut self) -> bool {
        self.first.has_next() && self.second.has_next()
    }

    fn next(&mut self) -> Result<()> {
        if !self.has_next() {
            return Err(Error::Exhausted);
        }
        self.cached = None;
        self.first.next()?;
        self.second.next()
    }

    fn is_valid(&self) -> bool {
        self.first.is_valid() && self.second.is_valid()
    }

    fn take_current(&mut self) -> Result<Pair<A, B>> {
        self.try_get()?;
        self.cached.take().ok_or(Error::Exhausted)
    }
}

#[allow(clippy::type_complexity)]
fn zip_with<'a, A: 'a, B: 'a>(
    first: Iter<'a, A>,
    second: Iter<'a, B>,
    fetch_first: Fetch<'a, A>,
    fetch_second: Fetch<'a, B>,
) -> Built<'a, Pair<A, B>, (Iter<'a, A>, Iter<'a, B>)> {
    if !first.is_valid() || !second.is_valid() {
        return Err(reject_invalid(IteratorKind::Zip, (first, second)));
    }
    let alloc = first.allocator();
    let cursor = ZipCursor {
        first,
        second,
        fetch_first,
        fetch_second,
        cached: None,
    };
    Iter::from_cursor(cursor, alloc)
        .map_err(|rejected| rejected.map_base(|c| (c.first, c.second)))
}

/// Pair up the elements of `first` and `second` positionally.
///
/// Stops as soon as either base runs out. Both bases are handed back if
/// either is invalid or allocation fails. Elements are cloned into the pair,
/// and the bases keep theirs.
#[allow(clippy::type_complexity)]
pub fn zip<'a, A, B>(
    first: Iter<'a, A>,
    second: Iter<'a, B>,
) -> Built<'a, Pair<A, B>, (Iter<'a, A>, Iter<'a, B>)>
where
    A: Clone + 'a,
    B: Clone + 'a,
{
    zip_with(first, second, fetch_cloned, fetch_cloned)
}

/// [`zip`] that moves each element out of its base instead of cloning it.
///
/// Both bases must hand out owned elements ([`Iter::take_current`]), as
/// `copy`, `transform` and `range` do. Copies from a `copy` base become part
/// of the pair and are released with it.
#[allow(clippy::type_complexity)]
pub fn zip_owned<'a, A: 'a, B: 'a>(
    first: Iter<'a, A>,
    second: Iter<'a, B>,
) -> Built<'a, Pair<A, B>, (Iter<'a, A>, Iter<'a, B>)> {
    zip_with(first, second, fetch_owned, fetch_owned)
}

// =============================================================================
// EnumerateCursor - elements with a running index
// =============================================================================

struct EnumerateCursor<'a, T> {
    base: Iter<'a, T>,
    fetch: Fetch<'a, T>,
    index: usize,
    /// Reused indexed record; rebuilt after each move.
    cached: Option<Indexed<T>>,
}

impl<'a, T: 'a> Cursor<Indexed<T>> for EnumerateCursor<'a, T> {
    fn kind(&self) -> IteratorKind {
        IteratorKind::Enumerate
    }

    fn get(&mut self) -> Option<&Indexed<T>> {
        self.try_get().ok()
    }

    fn try_get(&mut self) -> Result<&Indexed<T>> {
        if self.cached.is_none() {
            let value = (self.fetch)(&mut self.base)?;
            self.cached = Some(Indexed {
                index: self.index,
                value,
            });
        }
        self.cached.as_ref().ok_or(Error::Exhausted)
    }

    fn has_next(&mut self) -> bool {
        self.base.has_next()
    }

    fn next(&mut self) -> Result<()> {
        self.base.next()?;
        self.index += 1;
        self.cached = None;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.base.is_valid()
    }

    fn take_current(&mut self) -> Result<Indexed<T>> {
        self.try_get()?;
        self.cached.take().ok_or(Error::Exhausted)
    }
}

fn enumerate_with<'a, T: 'a>(
    base: Iter<'a, T>,
    start: usize,
    fetch: Fetch<'a, T>,
) -> Built<'a, Indexed<T>, Iter<'a, T>> {
    if !base.is_valid() {
        return Err(reject_invalid(IteratorKind::Enumerate, base));
    }
    let alloc = base.allocator();
    let cursor = EnumerateCursor {
        base,
        fetch,
        index: start,
        cached: None,
    };
    Iter::from_cursor(cursor, alloc).map_err(|rejected| rejected.map_base(|c| c.base))
}

/// Attach a running index, starting at `start`, to each element of `base`.
pub fn enumerate<'a, T: Clone + 'a>(
    base: Iter<'a, T>,
    start: usize,
) -> Built<'a, Indexed<T>, Iter<'a, T>> {
    enumerate_with(base, start, fetch_cloned)
}

/// [`enumerate`] that moves each element out of `base` instead of cloning it.
pub fn enumerate_owned<'a, T: 'a>(
    base: Iter<'a, T>,
    start: usize,
) -> Built<'a, Indexed<T>, Iter<'a, T>> {
    enumerate_with(base, start, fetch_owned)
}

// =============================================================================
// ChainCursor - members one after another
// =============================================================================

/// Members of a [`chain`]; up to four stay inline.
pub type ChainParts<'a, T> = SmallVec<[Iter<'a, T>; 4]>;

struct ChainCursor<'a, T> {
    parts: ChainParts<'a, T>,
    current: usize,
}

impl<'a, T: 'a> ChainCursor<'a, T> {
    /// Move past exhausted members.
    fn settle(&mut self) {
        while self.current < self.parts.len() && !self.parts[self.current].has_next() {
            self.current += 1;
        }
    }
}

impl<'a, T: 'a> Cursor<T> for ChainCursor<'a, T> {
    fn kind(&self) -> IteratorKind {
        IteratorKind::Chain
    }

    fn get(&mut self) -> Option<&T> {
        self.settle();
        self.parts.get_mut(self.current)?.get()
    }

    fn try_get(&mut self) -> Result<&T> {
        self.settle();
        match self.parts.get_mut(self.current) {
            Some(part) => part.try_get(),
            None => Err(Error::Exhausted),
        }
    }

    fn has_next(&mut self) -> bool {
        self.settle();
        self.current < self.parts.len()
    }

    fn next(&mut self) -> Result<()> {
        self.settle();
        match self.parts.get_mut(self.current) {
            Some(part) => part.next(),
            None => Err(Error::Exhausted),
        }
    }

    fn is_valid(&self) -> bool {
        self.parts.iter().all(Iter::is_valid)
    }

    fn take_current(&mut self) -> Result<T> {
        self.settle();
        match self.parts.get_mut(self.current) {
            Some(part) => part.take_current(),
            None => Err(Error::Exhausted),
        }
    }
}

/// Concatenate `parts` in order.
///
/// An empty list gives a valid, empty iterator. Every member is handed back
/// if any of them is invalid or allocation fails.
pub fn chain<'a, T: 'a>(
    parts: impl IntoIterator<Item = Iter<'a, T>>,
    alloc: &'a dyn Allocator,
) -> Built<'a, T, ChainParts<'a, T>> {
    let parts: ChainParts<'a, T> = parts.into_iter().collect();
    if !parts.iter().all(Iter::is_valid) {
        return Err(reject_invalid(IteratorKind::Chain, parts));
    }
    tracing::trace!(members = parts.len(), "chain assembled");
    let cursor = ChainCursor { parts, current: 0 };
    Iter::from_cursor(cursor, alloc).map_err(|rejected| rejected.map_base(|c| c.parts))
}

// =============================================================================
// Chaining
// =============================================================================

impl<'a, T: 'a> Iter<'a, T> {
    /// See [`zip`](super::zip).
    #[allow(clippy::type_complexity)]
    pub fn zip<B: Clone + 'a>(
        self,
        other: Iter<'a, B>,
    ) -> Built<'a, Pair<T, B>, (Iter<'a, T>, Iter<'a, B>)>
    where
        T: Clone,
    {
        zip(self, other)
    }

    /// See [`zip_owned`](super::zip_owned).
    #[allow(clippy::type_complexity)]
    pub fn zip_owned<B: 'a>(
        self,
        other: Iter<'a, B>,
    ) -> Built<'a, Pair<T, B>, (Iter<'a, T>, Iter<'a, B>)> {
        zip_owned(self, other)
    }

    /// See [`enumerate`](super::enumerate).
    pub fn enumerate(self, start: usize) -> Built<'a, Indexed<T>, Iter<'a, T>>
    where
        T: Clone,
    {
        enumerate(self, start)
    }

    /// See [`enumerate_owned`](super::enumerate_owned).
    pub fn enumerate_owned(self, start: usize) -> Built<'a, Indexed<T>, Iter<'a, T>> {
        enumerate_owned(self, start)
    }

    /// Continue with `other` once this iterator runs out.
    pub fn chain(self, other: Iter<'a, T>) -> Built<'a, T, ChainParts<'a, T>> {
        let alloc = self.allocator();
        chain([self, other], alloc)
    }
}
