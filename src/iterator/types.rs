//! Cursor protocol and the record types combinators yield.

use crate::error::{Error, Result};

// Re-export IteratorKind so `use super::types::*` brings it into scope.
pub use super::IteratorKind;

/// One position over a sequence of `T`.
///
/// Positions run from the first element to the end (one past the last
/// element). A fresh cursor stands on its first element, or at the end when
/// the sequence is empty.
///
/// `get`, `has_next` and `next` are required. The backward and ownership
/// operations have defaults that report "unsupported", so every cursor
/// answers every call. Cursors implemented outside this crate report
/// [`IteratorKind::External`].
pub trait Cursor<T> {
    fn kind(&self) -> IteratorKind {
        IteratorKind::External
    }

    /// Current element, or `None` at the end. Repeated calls with no
    /// movement in between return the same element.
    fn get(&mut self) -> Option<&T>;

    /// [`get`](Cursor::get), reporting why no element is available.
    ///
    /// A cursor that stands on an element it cannot produce (a copy that
    /// failed to allocate) returns that failure here while `has_next` stays
    /// true. Combinators forward it rather than treating the position as
    /// empty.
    fn try_get(&mut self) -> Result<&T> {
        self.get().ok_or(Error::Exhausted)
    }

    /// True while the cursor stands on an element.
    fn has_next(&mut self) -> bool;

    /// Step past the current element. At the end this fails with
    /// [`Error::Exhausted`] and the position does not change.
    fn next(&mut self) -> Result<()>;

    /// True when a previous element exists. False exactly at the start.
    fn has_prev(&mut self) -> bool {
        false
    }

    /// Step back one element.
    fn prev(&mut self) -> Result<()> {
        Err(Error::Unsupported("prev"))
    }

    /// Return to the start position, when the cursor tracks one.
    fn reset(&mut self) {}

    /// False when this cursor or any base it wraps is invalid.
    fn is_valid(&self) -> bool {
        true
    }

    /// Move the current element out to the caller.
    ///
    /// Cursors that only lend their elements keep the default.
    fn take_current(&mut self) -> Result<T> {
        Err(Error::Unsupported("take_current"))
    }
}

/// Element of [`zip`](super::zip): the heads of both bases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pair<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> Pair<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn into_tuple(self) -> (A, B) {
        (self.first, self.second)
    }
}

/// Element of [`enumerate`](super::enumerate).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Indexed<T> {
    pub index: usize,
    pub value: T,
}
