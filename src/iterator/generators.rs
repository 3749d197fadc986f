//! Leaf iterators: range, repeat, slice.
//!
//! Leaves own no base iterator and are the only cursors that track a start
//! position, so they are the ones that support `reset`.

use crate::alloc::Allocator;
use crate::error::{Error, Result};

use super::lifecycle::Iter;
use super::types::*;

// =============================================================================
// RangeCursor - integer sequence start..end by step
// =============================================================================

/// Positions are element indices; the value at a position is recomputed from
/// `start` so stepping back and forth never drifts.
struct RangeCursor {
    start: i64,
    step: i64,
    len: u64,
    pos: u64,
    /// The one slot every `get` lends out.
    slot: i64,
}

impl RangeCursor {
    fn new(start: i64, end: i64, step: i64) -> Result<Self> {
        if step == 0 {
            return Err(Error::invalid_argument("step", "must be non-zero"));
        }
        let span = i128::from(end) - i128::from(start);
        if span != 0 && (span > 0) != (step > 0) {
            return Err(Error::invalid_argument(
                "range",
                format!("{end} is not reachable from {start} with step {step}"),
            ));
        }
        let stride = i128::from(step).abs();
        let len = (span.abs() + stride - 1) / stride;
        Ok(Self {
            start,
            step,
            len: len as u64,
            pos: 0,
            slot: start,
        })
    }

    fn value_at(&self, pos: u64) -> i64 {
        // In bounds for every pos < len: the value lies between start and end.
        (i128::from(self.start) + i128::from(self.step) * i128::from(pos)) as i64
    }
}

impl Cursor<i64> for RangeCursor {
    fn kind(&self) -> IteratorKind {
        IteratorKind::Range
    }

    fn get(&mut self) -> Option<&i64> {
        (self.pos < self.len).then_some(&self.slot)
    }

    fn has_next(&mut self) -> bool {
        self.pos < self.len
    }

    fn next(&mut self) -> Result<()> {
        if self.pos >= self.len {
            return Err(Error::Exhausted);
        }
        self.pos += 1;
        if self.pos < self.len {
            self.slot = self.value_at(self.pos);
        }
        Ok(())
    }

    fn has_prev(&mut self) -> bool {
        self.pos > 0
    }

    fn prev(&mut self) -> Result<()> {
        if self.pos == 0 {
            return Err(Error::Exhausted);
        }
        self.pos -= 1;
        self.slot = self.value_at(self.pos);
        Ok(())
    }

    fn reset(&mut self) {
        self.pos = 0;
        self.slot = self.start;
    }

    fn take_current(&mut self) -> Result<i64> {
        self.get().copied().ok_or(Error::Exhausted)
    }
}

/// Integers from `start` (inclusive) to `end` (exclusive) by `step`.
///
/// Returns an invalid iterator when `step` is zero, when `end` cannot be
/// reached from `start` in the direction of `step`, or when allocation fails.
pub fn range<'a>(start: i64, end: i64, step: i64, alloc: &'a dyn Allocator) -> Iter<'a, i64> {
    try_range(start, end, step, alloc).unwrap_or_else(|err| {
        tracing::debug!(start, end, step, %err, "range rejected");
        Iter::invalid(alloc)
    })
}

/// [`range`], reporting why construction failed.
pub fn try_range<'a>(
    start: i64,
    end: i64,
    step: i64,
    alloc: &'a dyn Allocator,
) -> Result<Iter<'a, i64>> {
    let cursor = RangeCursor::new(start, end, step)?;
    Iter::from_cursor(cursor, alloc).map_err(|rejected| rejected.error)
}

// =============================================================================
// RepeatCursor - one borrowed value, count times
// =============================================================================

struct RepeatCursor<'v, T> {
    value: &'v T,
    count: usize,
    consumed: usize,
}

impl<T> Cursor<T> for RepeatCursor<'_, T> {
    fn kind(&self) -> IteratorKind {
        IteratorKind::Repeat
    }

    fn get(&mut self) -> Option<&T> {
        (self.consumed < self.count).then_some(self.value)
    }

    fn has_next(&mut self) -> bool {
        self.consumed < self.count
    }

    fn next(&mut self) -> Result<()> {
        if self.consumed >= self.count {
            return Err(Error::Exhausted);
        }
        self.consumed += 1;
        Ok(())
    }

    fn reset(&mut self) {
        self.consumed = 0;
    }
}

/// Lend `value` `count` times. The value stays owned by the caller.
///
/// `count == 0` gives a valid, empty iterator.
pub fn repeat<'a, T: 'a>(value: &'a T, count: usize, alloc: &'a dyn Allocator) -> Iter<'a, T> {
    let cursor = RepeatCursor {
        value,
        count,
        consumed: 0,
    };
    Iter::or_invalid(Iter::from_cursor(cursor, alloc), alloc)
}

// =============================================================================
// SliceCursor - borrowed elements of a slice, either direction
// =============================================================================

struct SliceCursor<'s, T> {
    items: &'s [T],
    pos: usize,
    reversed: bool,
}

impl<T> SliceCursor<'_, T> {
    fn index(&self) -> Option<usize> {
        if self.pos >= self.items.len() {
            return None;
        }
        Some(if self.reversed {
            self.items.len() - 1 - self.pos
        } else {
            self.pos
        })
    }
}

impl<T> Cursor<T> for SliceCursor<'_, T> {
    fn kind(&self) -> IteratorKind {
        if self.reversed {
            IteratorKind::SliceRev
        } else {
            IteratorKind::Slice
        }
    }

    fn get(&mut self) -> Option<&T> {
        let index = self.index()?;
        self.items.get(index)
    }

    fn has_next(&mut self) -> bool {
        self.pos < self.items.len()
    }

    fn next(&mut self) -> Result<()> {
        if self.pos >= self.items.len() {
            return Err(Error::Exhausted);
        }
        self.pos += 1;
        Ok(())
    }

    fn has_prev(&mut self) -> bool {
        self.pos > 0
    }

    fn prev(&mut self) -> Result<()> {
        if self.pos == 0 {
            return Err(Error::Exhausted);
        }
        self.pos -= 1;
        Ok(())
    }

    fn reset(&mut self) {
        self.pos = 0;
    }
}

/// Lend the elements of `items` front to back.
pub fn slice<'a, T: 'a>(items: &'a [T], alloc: &'a dyn Allocator) -> Iter<'a, T> {
    slice_cursor(items, false, alloc)
}

/// Lend the elements of `items` back to front.
pub fn slice_rev<'a, T: 'a>(items: &'a [T], alloc: &'a dyn Allocator) -> Iter<'a, T> {
    slice_cursor(items, true, alloc)
}

fn slice_cursor<'a, T: 'a>(
    items: &'a [T],
    reversed: bool,
    alloc: &'a dyn Allocator,
) -> Iter<'a, T> {
    let cursor = SliceCursor {
        items,
        pos: 0,
        reversed,
    };
    Iter::or_invalid(Iter::from_cursor(cursor, alloc), alloc)
}
