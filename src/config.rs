//! Fault-injection configuration.
//!
//! A [`FaultPlan`] decides which allocation attempts a
//! [`FaultyAllocator`](crate::alloc_track::FaultyAllocator) fails. Plans are
//! built in code or read from the environment:
//!
//! - `STRAND_FAIL_AFTER=n`: the first `n` allocations succeed, all later ones fail
//! - `STRAND_FAIL_EVERY=n`: every `n`th allocation fails (`n > 0`)

use crate::error::{Error, Result};

pub const FAIL_AFTER_ENV: &str = "STRAND_FAIL_AFTER";
pub const FAIL_EVERY_ENV: &str = "STRAND_FAIL_EVERY";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FaultPlan {
    fail_after: Option<usize>,
    fail_every: Option<usize>,
}

impl FaultPlan {
    /// A plan that never fails.
    pub const fn never() -> Self {
        Self {
            fail_after: None,
            fail_every: None,
        }
    }

    /// Let `n` allocations succeed, then fail every later one.
    pub const fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Fail every `n`th allocation. `0` disables the rule.
    pub const fn fail_every(mut self, n: usize) -> Self {
        self.fail_every = if n == 0 { None } else { Some(n) };
        self
    }

    /// Whether the zero-based allocation `attempt` should fail.
    pub fn should_fail(&self, attempt: usize) -> bool {
        let after = self.fail_after.is_some_and(|n| attempt >= n);
        let every = self.fail_every.is_some_and(|n| (attempt + 1) % n == 0);
        after || every
    }

    pub fn is_never(&self) -> bool {
        self.fail_after.is_none() && self.fail_every.is_none()
    }

    /// Read the plan from `STRAND_FAIL_AFTER` / `STRAND_FAIL_EVERY`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the plan through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut plan = Self::never();
        if let Some(raw) = lookup(FAIL_AFTER_ENV) {
            plan = plan.fail_after(parse_count(FAIL_AFTER_ENV, &raw)?);
        }
        if let Some(raw) = lookup(FAIL_EVERY_ENV) {
            let n = parse_count(FAIL_EVERY_ENV, &raw)?;
            if n == 0 {
                return Err(Error::invalid_argument(FAIL_EVERY_ENV, "must be greater than 0"));
            }
            plan = plan.fail_every(n);
        }
        tracing::debug!(?plan, "fault plan loaded");
        Ok(plan)
    }
}

fn parse_count(what: &'static str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|err| Error::invalid_argument(what, format!("'{raw}': {err}")))
}
