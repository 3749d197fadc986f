//! Allocation tracking for leak detection and fault injection.
//!
//! [`TrackingAllocator`] counts live allocations and remembers the layout of
//! each live pointer, so a test can assert that destroying an iterator chain
//! released every layer exactly once. [`FaultyAllocator`] fails allocations
//! on a [`FaultPlan`] so construction and copy failure paths can be driven
//! deterministically. Both wrap another allocator and compose:
//! `FaultyAllocator::new(&tracker, plan)`.
//!
//! Neither type is thread safe; iterators are single-cursor values.

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::ptr::NonNull;

use rustc_hash::FxHashMap;

use crate::alloc::{AllocError, Allocator, Global};
use crate::config::FaultPlan;
use crate::error::Result;

/// Allocator wrapper that records every live allocation.
#[derive(Debug, Default)]
pub struct TrackingAllocator<A: Allocator = Global> {
    inner: A,
    /// Live pointers (by address) and the layout they were allocated with.
    live: RefCell<FxHashMap<usize, Layout>>,
    live_bytes: Cell<usize>,
    total: Cell<usize>,
    failed: Cell<usize>,
    bad_frees: Cell<usize>,
}

impl TrackingAllocator<Global> {
    pub fn new() -> Self {
        Self::wrap(Global)
    }
}

impl<A: Allocator> TrackingAllocator<A> {
    pub fn wrap(inner: A) -> Self {
        Self {
            inner,
            live: RefCell::new(FxHashMap::default()),
            live_bytes: Cell::new(0),
            total: Cell::new(0),
            failed: Cell::new(0),
            bad_frees: Cell::new(0),
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Number of allocations not yet released.
    pub fn live(&self) -> usize {
        self.live.borrow().len()
    }

    /// Bytes held by live allocations.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.get()
    }

    /// Successful allocations over the tracker's lifetime.
    pub fn total_allocations(&self) -> usize {
        self.total.get()
    }

    /// Allocation requests the inner allocator refused.
    pub fn failed_allocations(&self) -> usize {
        self.failed.get()
    }

    /// Releases of pointers that were not live (double or foreign frees), or
    /// released with a different layout than they were allocated with.
    pub fn bad_frees(&self) -> usize {
        self.bad_frees.get()
    }

    /// Snapshot the current live count.
    pub fn snapshot(&self) -> usize {
        self.live()
    }

    /// Live allocations gained (positive) or lost (negative) since `snap`.
    pub fn delta(&self, snap: usize) -> isize {
        self.live() as isize - snap as isize
    }

    /// No live allocations and no bad frees.
    pub fn is_balanced(&self) -> bool {
        self.live() == 0 && self.bad_frees() == 0
    }

    /// Live allocations grouped by size, as `(size, count)` sorted by size.
    pub fn report(&self) -> Vec<(usize, usize)> {
        let mut by_size: FxHashMap<usize, usize> = FxHashMap::default();
        for layout in self.live.borrow().values() {
            *by_size.entry(layout.size()).or_default() += 1;
        }
        let mut result: Vec<(usize, usize)> = by_size.into_iter().collect();
        result.sort_unstable();
        result
    }
}

impl<A: Allocator> Allocator for TrackingAllocator<A> {
    fn allocate(&self, layout: Layout) -> std::result::Result<NonNull<u8>, AllocError> {
        match self.inner.allocate(layout) {
            Ok(ptr) => {
                self.live.borrow_mut().insert(ptr.as_ptr() as usize, layout);
                self.live_bytes.set(self.live_bytes.get() + layout.size());
                self.total.set(self.total.get() + 1);
                tracing::trace!(size = layout.size(), live = self.live(), "tracked alloc");
                Ok(ptr)
            }
            Err(err) => {
                self.failed.set(self.failed.get() + 1);
                Err(err)
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        let addr = ptr.as_ptr() as usize;
        let recorded = self.live.borrow_mut().remove(&addr);
        match recorded {
            Some(recorded) => {
                if recorded != layout {
                    tracing::warn!(
                        addr,
                        allocated = recorded.size(),
                        released = layout.size(),
                        "deallocation with mismatched layout"
                    );
                    self.bad_frees.set(self.bad_frees.get() + 1);
                }
                self.live_bytes.set(self.live_bytes.get() - recorded.size());
                // Release with the layout the memory was actually allocated with.
                unsafe { self.inner.deallocate(ptr, recorded) };
            }
            None => {
                // Not ours (or already freed): never forward to the inner allocator.
                tracing::warn!(addr, size = layout.size(), "deallocation of unknown pointer");
                self.bad_frees.set(self.bad_frees.get() + 1);
            }
        }
    }
}

/// Allocator wrapper that fails allocations according to a [`FaultPlan`].
#[derive(Debug)]
pub struct FaultyAllocator<A: Allocator = Global> {
    inner: A,
    plan: Cell<FaultPlan>,
    attempts: Cell<usize>,
    injected: Cell<usize>,
}

impl<A: Allocator> FaultyAllocator<A> {
    pub fn new(inner: A, plan: FaultPlan) -> Self {
        Self {
            inner,
            plan: Cell::new(plan),
            attempts: Cell::new(0),
            injected: Cell::new(0),
        }
    }

    /// Wrap `inner` with the plan from `STRAND_FAIL_AFTER` / `STRAND_FAIL_EVERY`.
    pub fn from_env(inner: A) -> Result<Self> {
        Ok(Self::new(inner, FaultPlan::from_env()?))
    }

    /// Replace the plan and restart attempt counting.
    pub fn set_plan(&self, plan: FaultPlan) {
        self.plan.set(plan);
        self.attempts.set(0);
    }

    pub fn plan(&self) -> FaultPlan {
        self.plan.get()
    }

    /// Allocation attempts since the plan was installed.
    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }

    /// Failures produced by the plan.
    pub fn injected_failures(&self) -> usize {
        self.injected.get()
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: Allocator> Allocator for FaultyAllocator<A> {
    fn allocate(&self, layout: Layout) -> std::result::Result<NonNull<u8>, AllocError> {
        let attempt = self.attempts.get();
        self.attempts.set(attempt + 1);
        if self.plan.get().should_fail(attempt) {
            self.injected.set(self.injected.get() + 1);
            tracing::debug!(attempt, size = layout.size(), "injected allocation failure");
            return Err(AllocError::for_layout(layout));
        }
        self.inner.allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { self.inner.deallocate(ptr, layout) }
    }
}
