//! Allocator contract threaded through every iterator.
//!
//! Iterator state and element copies are placed through a caller-supplied
//! [`Allocator`]. Swapping the allocator (see [`crate::alloc_track`]) lets
//! tests count outstanding allocations or inject failures without touching
//! the combinators.
//!
//! # Ownership Contract
//! - [`AllocBox`] is the only owner of memory obtained from an allocator. It
//!   remembers the allocator and the layout it was created with and returns
//!   the memory to that same allocator when dropped.
//! - Element copies ("copy-element") are made with [`copy_element`]. Dropping
//!   the returned box is the matching "free-element".
//! - Zero-sized values never reach the allocator.

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

use thiserror::Error;

/// Allocation failure reported by an [`Allocator`].
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("allocation of {size} bytes (align {align}) failed")]
pub struct AllocError {
    pub size: usize,
    pub align: usize,
}

impl AllocError {
    pub fn for_layout(layout: Layout) -> Self {
        Self {
            size: layout.size(),
            align: layout.align(),
        }
    }
}

/// Pluggable memory source for iterator state and element copies.
///
/// Implementations are used through `&dyn Allocator`, so the trait stays
/// object safe. `layout` always has a non-zero size.
pub trait Allocator {
    /// Acquire memory for `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Release memory previously returned by [`Allocator::allocate`].
    ///
    /// # Safety
    /// `ptr` must come from `allocate` on this allocator with the same
    /// `layout`, and must not have been released already.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { (**self).deallocate(ptr, layout) }
    }
}

/// The process-wide heap (`std::alloc`).
#[derive(Clone, Copy, Debug, Default)]
pub struct Global;

/// Shared instance, handy where a `&'static dyn Allocator` is needed.
pub static GLOBAL: Global = Global;

impl Allocator for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() != 0);
        // SAFETY: callers never pass zero-sized layouts.
        let raw = unsafe { std::alloc::alloc(layout) };
        NonNull::new(raw).ok_or_else(|| AllocError::for_layout(layout))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

/// Owning pointer to a value placed through an [`Allocator`].
///
/// Works for unsized targets (`AllocBox<dyn Cursor<T>>`) by remembering the
/// concrete layout the value was allocated with.
pub struct AllocBox<'a, T: ?Sized> {
    ptr: NonNull<T>,
    layout: Layout,
    alloc: &'a dyn Allocator,
    _owns: PhantomData<T>,
}

impl<'a, T> AllocBox<'a, T> {
    /// Move `value` into memory obtained from `alloc`.
    ///
    /// On failure the value is handed back untouched together with the error.
    pub fn try_new_in(value: T, alloc: &'a dyn Allocator) -> Result<Self, (T, AllocError)> {
        let layout = Layout::new::<T>();
        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            match alloc.allocate(layout) {
                Ok(raw) => raw.cast::<T>(),
                Err(err) => return Err((value, err)),
            }
        };
        // SAFETY: `ptr` is valid for writes of `T` (fresh allocation or ZST).
        unsafe { ptr.as_ptr().write(value) };
        Ok(Self {
            ptr,
            layout,
            alloc,
            _owns: PhantomData,
        })
    }

    /// Move the value out and release the memory.
    pub fn into_inner(self) -> T {
        let (ptr, layout, alloc) = self.into_raw_parts();
        // SAFETY: the value is initialized and ownership was released above.
        let value = unsafe { ptr::read(ptr.as_ptr()) };
        if layout.size() != 0 {
            // SAFETY: allocated by `alloc` with `layout` in `try_new_in`.
            unsafe { alloc.deallocate(ptr.cast::<u8>(), layout) };
        }
        value
    }
}

impl<'a, T: ?Sized> AllocBox<'a, T> {
    /// Allocator that owns this memory.
    pub fn allocator(&self) -> &'a dyn Allocator {
        self.alloc
    }

    /// Layout the value was allocated with.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Give up ownership without dropping or releasing anything.
    pub(crate) fn into_raw_parts(self) -> (NonNull<T>, Layout, &'a dyn Allocator) {
        let this = ManuallyDrop::new(self);
        (this.ptr, this.layout, this.alloc)
    }

    /// Rebuild a box from parts returned by [`AllocBox::into_raw_parts`].
    ///
    /// # Safety
    /// `ptr` must point to an initialized value placed by `alloc` with
    /// `layout`, and no other owner may exist.
    pub(crate) unsafe fn from_raw_parts(
        ptr: NonNull<T>,
        layout: Layout,
        alloc: &'a dyn Allocator,
    ) -> Self {
        Self {
            ptr,
            layout,
            alloc,
            _owns: PhantomData,
        }
    }
}

impl<T: ?Sized> Drop for AllocBox<'_, T> {
    fn drop(&mut self) {
        // SAFETY: we own an initialized value placed by `self.alloc`.
        unsafe {
            ptr::drop_in_place(self.ptr.as_ptr());
            if self.layout.size() != 0 {
                self.alloc.deallocate(self.ptr.cast::<u8>(), self.layout);
            }
        }
    }
}

impl<T: ?Sized> Deref for AllocBox<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: uniquely owned and initialized for the life of the box.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T: ?Sized> DerefMut for AllocBox<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: uniquely owned and initialized for the life of the box.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for AllocBox<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: ?Sized + PartialEq> PartialEq for AllocBox<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

/// Copy an element into fresh memory from `alloc` (the "copy-element" slot).
pub fn copy_element<'a, T: Clone>(
    value: &T,
    alloc: &'a dyn Allocator,
) -> Result<AllocBox<'a, T>, AllocError> {
    AllocBox::try_new_in(value.clone(), alloc).map_err(|(_, err)| err)
}
