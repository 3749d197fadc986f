//! Iterator errors.
//!
//! Three families, none of them fatal:
//! - construction parameter errors (`InvalidIterator`, `InvalidArgument`)
//! - exhaustion (`Exhausted`), the normal end of a traversal
//! - allocation failure (`Alloc`)

use std::fmt;

use thiserror::Error;

use crate::alloc::AllocError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No element in the requested direction.
    #[error("iterator exhausted")]
    Exhausted,

    /// Optional operation this iterator does not provide.
    #[error("operation `{0}` is not supported by this iterator")]
    Unsupported(&'static str),

    /// Operation on, or construction from, an invalid iterator.
    #[error("iterator is invalid")]
    InvalidIterator,

    /// Rejected numeric or configuration parameter.
    #[error("invalid {what}: {reason}")]
    InvalidArgument { what: &'static str, reason: String },

    #[error(transparent)]
    Alloc(#[from] AllocError),
}

impl Error {
    pub fn invalid_argument(what: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            what,
            reason: reason.into(),
        }
    }

    /// True for the normal end-of-traversal condition.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A construction that did not happen.
///
/// Carries the base iterator(s) back to the caller untouched: ownership only
/// moves into a combinator when construction succeeds.
pub struct Rejected<B> {
    pub error: Error,
    pub base: B,
}

impl<B> Rejected<B> {
    pub fn new(error: Error, base: B) -> Self {
        Self { error, base }
    }

    pub fn into_base(self) -> B {
        self.base
    }

    pub fn into_parts(self) -> (Error, B) {
        (self.error, self.base)
    }

    /// Keep the error, transform what is handed back.
    pub fn map_base<C>(self, f: impl FnOnce(B) -> C) -> Rejected<C> {
        Rejected {
            error: self.error,
            base: f(self.base),
        }
    }
}

impl<B> fmt::Debug for Rejected<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<B> fmt::Display for Rejected<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "construction rejected: {}", self.error)
    }
}

impl<B> std::error::Error for Rejected<B> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
