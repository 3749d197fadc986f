//! Single-base combinators: transform, filter, take, skip.
//!
//! Each constructor takes ownership of its base on success. An invalid base,
//! or a failed allocation, hands the base back untouched in the rejection.

use crate::error::{Error, Result};

use super::lifecycle::{Built, Iter, reject_invalid};
use super::types::*;

// =============================================================================
// TransformCursor - lazily mapped elements
// =============================================================================

struct TransformCursor<'a, T, U, F> {
    base: Iter<'a, T>,
    f: F,
    /// Mapped current element; dropped when the cursor moves on.
    cached: Option<U>,
}

impl<'a, T: 'a, U, F> Cursor<U> for TransformCursor<'a, T, U, F>
where
    F: FnMut(&T) -> U,
{
    fn kind(&self) -> IteratorKind {
        IteratorKind::Transform
    }

    fn get(&mut self) -> Option<&U> {
        self.try_get().ok()
    }

    fn try_get(&mut self) -> Result<&U> {
        if self.cached.is_none() {
            let mapped = (self.f)(self.base.try_get()?);
            self.cached = Some(mapped);
        }
        self.cached.as_ref().ok_or(Error::Exhausted)
    }

    fn has_next(&mut self) -> bool {
        self.base.has_next()
    }

    fn next(&mut self) -> Result<()> {
        self.base.next()?;
        self.cached = None;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.base.is_valid()
    }

    fn take_current(&mut self) -> Result<U> {
        if let Some(mapped) = self.cached.take() {
            return Ok(mapped);
        }
        let item = self.base.try_get()?;
        Ok((self.f)(item))
    }
}

/// Map every element of `base` through `f`, lazily.
///
/// The mapped value is computed once per element and cached until the
/// iterator moves on, so `f` may be expensive or allocate.
pub fn transform<'a, T, U, F>(base: Iter<'a, T>, f: F) -> Built<'a, U, Iter<'a, T>>
where
    T: 'a,
    U: 'a,
    F: FnMut(&T) -> U + 'a,
{
    if !base.is_valid() {
        return Err(reject_invalid(IteratorKind::Transform, base));
    }
    let alloc = base.allocator();
    let cursor = TransformCursor {
        base,
        f,
        cached: None,
    };
    Iter::from_cursor(cursor, alloc).map_err(|rejected| rejected.map_base(|c| c.base))
}

// =============================================================================
// FilterCursor - elements matching a predicate
// =============================================================================

struct FilterCursor<'a, T, P> {
    base: Iter<'a, T>,
    pred: P,
    /// The base stands on an element that matched.
    positioned: bool,
}

impl<'a, T: 'a, P> FilterCursor<'a, T, P>
where
    P: FnMut(&T) -> bool,
{
    /// Advance the base to the next match, if not already on one.
    ///
    /// `Ok(false)` at the end. A base element that cannot be produced stops
    /// the search on that element with its error; it is tested again on the
    /// next access.
    fn seek_match(&mut self) -> Result<bool> {
        if self.positioned {
            return Ok(true);
        }
        while self.base.has_next() {
            if (self.pred)(self.base.try_get()?) {
                self.positioned = true;
                return Ok(true);
            }
            self.base.next()?;
        }
        Ok(false)
    }
}

impl<'a, T: 'a, P> Cursor<T> for FilterCursor<'a, T, P>
where
    P: FnMut(&T) -> bool,
{
    fn kind(&self) -> IteratorKind {
        IteratorKind::Filter
    }

    fn get(&mut self) -> Option<&T> {
        self.try_get().ok()
    }

    fn try_get(&mut self) -> Result<&T> {
        if !self.seek_match()? {
            return Err(Error::Exhausted);
        }
        self.base.try_get()
    }

    fn has_next(&mut self) -> bool {
        // An unavailable element is still a position.
        !matches!(self.seek_match(), Ok(false))
    }

    fn next(&mut self) -> Result<()> {
        if let Ok(false) = self.seek_match() {
            return Err(Error::Exhausted);
        }
        // Stepping off an unavailable element passes over it untested.
        self.base.next()?;
        self.positioned = false;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.base.is_valid()
    }

    fn take_current(&mut self) -> Result<T> {
        if !self.seek_match()? {
            return Err(Error::Exhausted);
        }
        self.base.take_current()
    }
}

/// Keep the elements of `base` for which `pred` holds.
///
/// The predicate runs at most once per base element.
pub fn filter<'a, T, P>(base: Iter<'a, T>, pred: P) -> Built<'a, T>
where
    T: 'a,
    P: FnMut(&T) -> bool + 'a,
{
    if !base.is_valid() {
        return Err(reject_invalid(IteratorKind::Filter, base));
    }
    let alloc = base.allocator();
    let cursor = FilterCursor {
        base,
        pred,
        positioned: false,
    };
    Iter::from_cursor(cursor, alloc).map_err(|rejected| rejected.map_base(|c| c.base))
}

// =============================================================================
// TakeCursor - at most `limit` elements
// =============================================================================

struct TakeCursor<'a, T> {
    base: Iter<'a, T>,
    limit: usize,
    taken: usize,
}

impl<'a, T: 'a> Cursor<T> for TakeCursor<'a, T> {
    fn kind(&self) -> IteratorKind {
        IteratorKind::Take
    }

    fn get(&mut self) -> Option<&T> {
        self.try_get().ok()
    }

    fn try_get(&mut self) -> Result<&T> {
        if self.taken >= self.limit {
            return Err(Error::Exhausted);
        }
        self.base.try_get()
    }

    fn has_next(&mut self) -> bool {
        self.taken < self.limit && self.base.has_next()
    }

    fn next(&mut self) -> Result<()> {
        if self.taken >= self.limit {
            return Err(Error::Exhausted);
        }
        self.base.next()?;
        self.taken += 1;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.base.is_valid()
    }

    fn take_current(&mut self) -> Result<T> {
        if self.taken >= self.limit {
            return Err(Error::Exhausted);
        }
        self.base.take_current()
    }
}

/// The first `n` elements of `base`.
pub fn take<'a, T: 'a>(base: Iter<'a, T>, n: usize) -> Built<'a, T> {
    if !base.is_valid() {
        return Err(reject_invalid(IteratorKind::Take, base));
    }
    let alloc = base.allocator();
    let cursor = TakeCursor {
        base,
        limit: n,
        taken: 0,
    };
    Iter::from_cursor(cursor, alloc).map_err(|rejected| rejected.map_base(|c| c.base))
}

// =============================================================================
// SkipCursor - everything after the first `count` elements
// =============================================================================

struct SkipCursor<'a, T> {
    base: Iter<'a, T>,
    count: usize,
    skipped: bool,
}

impl<'a, T: 'a> SkipCursor<'a, T> {
    /// Discard the prefix on first access.
    fn skip_prefix(&mut self) {
        if self.skipped {
            return;
        }
        self.skipped = true;
        let mut discarded = 0;
        while discarded < self.count && self.base.next().is_ok() {
            discarded += 1;
        }
        tracing::trace!(requested = self.count, discarded, "skip prefix discarded");
    }
}

impl<'a, T: 'a> Cursor<T> for SkipCursor<'a, T> {
    fn kind(&self) -> IteratorKind {
        IteratorKind::Skip
    }

    fn get(&mut self) -> Option<&T> {
        self.skip_prefix();
        self.base.get()
    }

    fn try_get(&mut self) -> Result<&T> {
        self.skip_prefix();
        self.base.try_get()
    }

    fn has_next(&mut self) -> bool {
        self.skip_prefix();
        self.base.has_next()
    }

    fn next(&mut self) -> Result<()> {
        self.skip_prefix();
        self.base.next()
    }

    fn is_valid(&self) -> bool {
        self.base.is_valid()
    }

    fn take_current(&mut self) -> Result<T> {
        self.skip_prefix();
        self.base.take_current()
    }
}

/// Everything in `base` after its first `n` elements.
///
/// Nothing is discarded until the iterator is first used. Skipping past the
/// end leaves a valid, exhausted iterator.
pub fn skip<'a, T: 'a>(base: Iter<'a, T>, n: usize) -> Built<'a, T> {
    if !base.is_valid() {
        return Err(reject_invalid(IteratorKind::Skip, base));
    }
    let alloc = base.allocator();
    let cursor = SkipCursor {
        base,
        count: n,
        skipped: false,
    };
    Iter::from_cursor(cursor, alloc).map_err(|rejected| rejected.map_base(|c| c.base))
}

// =============================================================================
// Chaining
// =============================================================================

impl<'a, T: 'a> Iter<'a, T> {
    /// See [`transform`](super::transform).
    pub fn transform<U: 'a, F>(self, f: F) -> Built<'a, U, Iter<'a, T>>
    where
        F: FnMut(&T) -> U + 'a,
    {
        transform(self, f)
    }

    /// See [`filter`](super::filter).
    pub fn filter<P>(self, pred: P) -> Built<'a, T>
    where
        P: FnMut(&T) -> bool + 'a,
    {
        filter(self, pred)
    }

    /// See [`take`](super::take).
    pub fn take(self, n: usize) -> Built<'a, T> {
        take(self, n)
    }

    /// See [`skip`](super::skip).
    pub fn skip(self, n: usize) -> Built<'a, T> {
        skip(self, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::GLOBAL;
    use crate::alloc_track::{FaultyAllocator, TrackingAllocator};
    use crate::config::FaultPlan;
    use crate::iterator::{range, slice};
    use std::cell::Cell;

    fn drain<'a, T: Clone + 'a>(mut it: Iter<'a, T>) -> Vec<T> {
        let mut out = Vec::new();
        while it.has_next() {
            out.push(it.get().expect("element should be present").clone());
            it.next().expect("next should succeed");
        }
        out
    }

    #[test]
    fn transform_maps_lazily_and_caches() {
        let calls = Cell::new(0);
        let mut it = range(1, 4, 1, &GLOBAL)
            .transform(|v| {
                calls.set(calls.get() + 1);
                v * 10
            })
            .expect("transform should succeed");
        assert_eq!(calls.get(), 0);

        let first = it.get().map(|v| v as *const i64);
        let again = it.get().map(|v| v as *const i64);
        assert_eq!(first, again);
        assert_eq!(it.get(), Some(&10));
        assert_eq!(calls.get(), 1);

        it.next().expect("next should succeed");
        assert_eq!(it.take_current(), Ok(20));
        it.next().expect("next should succeed");
        assert_eq!(it.get(), Some(&30));
        assert_eq!(calls.get(), 3);
        assert!(!it.has_prev());
        assert_eq!(it.prev(), Err(Error::Unsupported("prev")));
    }

    #[test]
    fn transform_can_change_element_type() {
        let words = ["a", "bb", "ccc"];
        let it = slice(&words, &GLOBAL)
            .transform(|w| w.repeat(2))
            .expect("transform should succeed");
        assert_eq!(drain(it), vec!["aa", "bbbb", "cccccc"]);
    }

    #[test]
    fn filter_yields_matching_subsequence() {
        let it = range(0, 10, 1, &GLOBAL)
            .filter(|v| v % 3 == 0)
            .expect("filter should succeed");
        assert_eq!(drain(it), vec![0, 3, 6, 9]);
    }

    #[test]
    fn filter_evaluates_predicate_once_per_element() {
        let calls = Cell::new(0);
        let mut it = range(0, 6, 1, &GLOBAL)
            .filter(|_| {
                calls.set(calls.get() + 1);
                false
            })
            .expect("filter should succeed");
        assert!(!it.has_next());
        assert_eq!(it.get(), None);
        assert_eq!(it.next(), Err(Error::Exhausted));
        assert_eq!(calls.get(), 6);
    }

    #[test]
    fn filter_peek_never_skips_a_match() {
        let data = [1, 2, 4, 5, 6];
        let mut it = slice(&data, &GLOBAL)
            .filter(|v| v % 2 == 0)
            .expect("filter should succeed");
        assert!(it.has_next());
        assert!(it.has_next());
        assert_eq!(it.get(), Some(&2));
        it.next().expect("next should succeed");
        assert_eq!(it.get(), Some(&4));
        it.next().expect("next should succeed");
        it.next().expect("next should succeed");
        assert!(!it.has_next());
    }

    #[test]
    fn filter_stops_on_an_element_that_cannot_be_copied() {
        let tracker = TrackingAllocator::new();
        let faulty = FaultyAllocator::new(&tracker, FaultPlan::never());
        let data = [1u32, 2, 3, 4];
        let copies = slice(&data, &faulty).copy().expect("copy should succeed");
        let mut it = copies.filter(|v| **v % 2 == 0).expect("filter should succeed");

        faulty.set_plan(FaultPlan::never().fail_after(0));
        assert_eq!(it.get(), None);
        assert!(it.has_next());
        assert!(matches!(it.try_get(), Err(Error::Alloc(_))));
        assert!(matches!(it.take_current(), Err(Error::Alloc(_))));

        // Nothing was passed over while the copies failed.
        faulty.set_plan(FaultPlan::never());
        assert_eq!(it.get().map(|v| **v), Some(2));
        it.next().expect("next should succeed");
        assert_eq!(it.get().map(|v| **v), Some(4));
        it.destroy();
        assert!(tracker.is_balanced());
    }

    #[test]
    fn one_pass_combinators_ignore_reset() {
        let mut taken = range(0, 5, 1, &GLOBAL).take(3).expect("take should succeed");
        taken.next().expect("next should succeed");
        taken.reset();
        assert_eq!(taken.get(), Some(&1));
        assert_eq!(drain(taken), vec![1, 2]);

        let mut skipped = range(0, 5, 1, &GLOBAL).skip(1).expect("skip should succeed");
        skipped.next().expect("next should succeed");
        skipped.reset();
        assert_eq!(skipped.get(), Some(&2));

        let mut filtered = range(0, 6, 1, &GLOBAL)
            .filter(|v| v % 2 == 1)
            .expect("filter should succeed");
        filtered.next().expect("next should succeed");
        filtered.reset();
        assert_eq!(filtered.get(), Some(&3));
    }

    #[test]
    fn take_stops_at_limit() {
        let taken = drain(range(0, 100, 1, &GLOBAL).take(3).expect("take should succeed"));
        assert_eq!(taken, vec![0, 1, 2]);

        let short = drain(range(0, 2, 1, &GLOBAL).take(5).expect("take should succeed"));
        assert_eq!(short, vec![0, 1]);

        let mut none = range(0, 2, 1, &GLOBAL).take(0).expect("take should succeed");
        assert!(none.is_valid());
        assert!(!none.has_next());
        assert_eq!(none.next(), Err(Error::Exhausted));
    }

    #[test]
    fn skip_is_lazy_and_saturates() {
        let calls = Cell::new(0);
        let counted = range(0, 5, 1, &GLOBAL)
            .transform(|v| {
                calls.set(calls.get() + 1);
                *v
            })
            .expect("transform should succeed");
        let it = counted.skip(2).expect("skip should succeed");
        assert_eq!(calls.get(), 0);
        assert_eq!(drain(it), vec![2, 3, 4]);

        let mut past = range(0, 3, 1, &GLOBAL).skip(10).expect("skip should succeed");
        assert!(past.is_valid());
        assert!(!past.has_next());
        assert_eq!(past.get(), None);
    }

    #[test]
    fn pass_through_combinators_forward_take_current() {
        let mut it = range(0, 10, 1, &GLOBAL)
            .skip(2)
            .and_then(|it| it.filter(|v| v % 2 == 1))
            .and_then(|it| it.take(2))
            .expect("pipeline should build");
        assert_eq!(it.take_current(), Ok(3));
        it.next().expect("next should succeed");
        assert_eq!(it.take_current(), Ok(5));
        it.next().expect("next should succeed");
        assert_eq!(it.take_current(), Err(Error::Exhausted));
    }

    #[test]
    fn invalid_base_is_handed_back() {
        let base = range(0, 5, 0, &GLOBAL);
        let rejected = transform(base, |v| *v).expect_err("invalid base should be rejected");
        assert_eq!(rejected.error, Error::InvalidIterator);
        assert!(!rejected.base.is_valid());

        let rejected =
            filter(rejected.base, |_| true).expect_err("invalid base should be rejected");
        let rejected = take(rejected.base, 1).expect_err("invalid base should be rejected");
        let rejected = skip(rejected.base, 1).expect_err("invalid base should be rejected");
        assert_eq!(rejected.error, Error::InvalidIterator);
    }

    #[test]
    fn allocation_failure_hands_base_back_intact() {
        let tracker = TrackingAllocator::new();
        let faulty = FaultyAllocator::new(&tracker, FaultPlan::never());
        let mut base = range(0, 3, 1, &faulty);
        base.next().expect("next should succeed");

        faulty.set_plan(FaultPlan::never().fail_after(0));
        let rejected = base.transform(|v| v + 1).expect_err("allocation should fail");
        assert!(matches!(rejected.error, Error::Alloc(_)));

        let mut base = rejected.into_base();
        assert_eq!(base.get(), Some(&1));
        base.destroy();
        assert!(tracker.is_balanced());
    }

    #[test]
    fn destroy_cascades_through_every_layer() {
        let tracker = TrackingAllocator::new();
        let it = range(0, 50, 1, &tracker)
            .filter(|v| v % 2 == 0)
            .and_then(|it| it.skip(3))
            .and_then(|it| it.take(4))
            .expect("pipeline should build");
        let it = it
            .transform(|v| v.to_string())
            .expect("transform should succeed");
        assert_eq!(tracker.live(), 5);

        assert_eq!(drain(it), vec!["6", "8", "10", "12"]);
        assert!(tracker.is_balanced());
    }

    #[test]
    fn layers_use_the_base_allocator() {
        let tracker = TrackingAllocator::new();
        let it = range(0, 3, 1, &tracker).take(2).expect("take should succeed");
        assert_eq!(tracker.total_allocations(), 2);
        drop(it);
        assert!(tracker.is_balanced());
    }
}
