//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::sync::Once;

use strand::Iter;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Initialize tracing if STRAND_LOG is set (e.g. `STRAND_LOG=strand=trace`).
pub fn init_tracing() {
    TRACING.call_once(|| {
        if let Ok(filter) = EnvFilter::try_from_env("STRAND_LOG") {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_level(true)
                .with_test_writer()
                .try_init();
            tracing::debug!("tracing initialized");
        }
    });
}

/// Walk `it` to the end, cloning every element.
pub fn drain<'a, T: Clone + 'a>(mut it: Iter<'a, T>) -> Vec<T> {
    let mut out = Vec::new();
    while it.has_next() {
        out.push(it.get().expect("element should be present").clone());
        it.next().expect("next should succeed");
    }
    out
}

/// Counts how many times values built from it were dropped.
#[derive(Debug, Default)]
pub struct DropCounter {
    drops: Cell<usize>,
}

impl DropCounter {
    pub fn token(&self, id: u32) -> Token<'_> {
        Token { id, counter: self }
    }

    pub fn drops(&self) -> usize {
        self.drops.get()
    }
}

/// Value whose drop is recorded by its [`DropCounter`].
#[derive(Debug)]
pub struct Token<'c> {
    pub id: u32,
    counter: &'c DropCounter,
}

impl Clone for Token<'_> {
    fn clone(&self) -> Self {
        self.counter.token(self.id)
    }
}

impl Drop for Token<'_> {
    fn drop(&mut self) {
        self.counter.drops.set(self.counter.drops.get() + 1);
    }
}
