//! Lazy cursors and their combinators.
//!
//! Every iterator is an [`Iter`] value: a [`Cursor`] trait object placed
//! through a caller-supplied [`Allocator`](crate::alloc::Allocator), or no
//! state at all for an invalid iterator. Combinators take their bases by
//! value and own them from then on; dropping (or [`Iter::destroy`]ing) the
//! outermost iterator tears the whole chain down, outermost layer first.
//!
//! # Iterator Kind Definitions
//!
//! All iterator kinds are defined in one place using the `for_all_iterator_kinds!` macro.
//! When adding a new iterator kind:
//! 1. Add it to `for_all_iterator_kinds!` with its name and whether it steps backward
//! 2. Add the cursor struct and its `Cursor` impl
//! 3. Return the new kind from the cursor's `Cursor::kind`

use std::fmt;

mod combine;
mod consumers;
mod copy;
mod generators;
mod lifecycle;
mod transform;
mod types;

pub use combine::{ChainParts, chain, enumerate, enumerate_owned, zip, zip_owned};
pub use copy::{copy, copy_with};
pub use generators::{range, repeat, slice, slice_rev, try_range};
pub use lifecycle::{Built, Iter};
pub use transform::{filter, skip, take, transform};
pub use types::{Cursor, Indexed, Pair};

// =============================================================================
// Central Iterator Kind Definitions
// =============================================================================
//
// Format for each kind:
//   $kind:ident = $discriminant:literal,
//   name: $name:literal,
//   reversible: $reversible:literal
//
// `reversible` is true when the kind implements `has_prev` / `prev`.

/// Invokes the callback macro for each iterator kind with its properties.
macro_rules! for_all_iterator_kinds {
    ($callback:ident) => {
        $callback! {
            // Leaves: no base iterator
            Range = 0, name: "range", reversible: true;
            Repeat = 1, name: "repeat", reversible: false;
            Slice = 2, name: "slice", reversible: true;
            SliceRev = 3, name: "slice_rev", reversible: true;
            // Single-base combinators
            Transform = 4, name: "transform", reversible: false;
            Filter = 5, name: "filter", reversible: false;
            Copy = 6, name: "copy", reversible: false;
            Take = 7, name: "take", reversible: false;
            Skip = 8, name: "skip", reversible: false;
            Enumerate = 9, name: "enumerate", reversible: false;
            // Multi-base combinators
            Zip = 10, name: "zip", reversible: false;
            Chain = 11, name: "chain", reversible: false;
            // Cursors defined outside this crate (containers)
            External = 12, name: "external", reversible: false;
        }
    };
}

/// Generate the IteratorKind enum from the central definitions.
macro_rules! generate_iterator_kind_enum {
    ($(
        $kind:ident = $discriminant:literal,
        name: $name:literal,
        reversible: $reversible:literal;
    )*) => {
        /// Which cursor an iterator runs
        #[repr(u8)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum IteratorKind {
            $($kind = $discriminant,)*
        }

        impl IteratorKind {
            pub const ALL: &'static [IteratorKind] = &[$(IteratorKind::$kind,)*];

            pub const fn name(self) -> &'static str {
                match self {
                    $(IteratorKind::$kind => $name,)*
                }
            }

            /// Whether cursors of this kind step backward.
            pub const fn is_reversible(self) -> bool {
                match self {
                    $(IteratorKind::$kind => $reversible,)*
                }
            }
        }
    };
}

for_all_iterator_kinds!(generate_iterator_kind_enum);

impl fmt::Display for IteratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
