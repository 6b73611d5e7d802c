// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Run termination: wall-clock budget and cooperative stop.
//!
//! The budget is checked *between* iterations against a monotonic clock; a
//! timeout never aborts an in-flight iteration, it prevents the next one.
//! Cancellation works through the same checkpoint: when several search units
//! race in parallel, the winner trips a shared [`StopToken`] and the others
//! wind down at their next iteration boundary.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// Verdict of the per-iteration checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCommand {
    /// Keep searching.
    Continue,
    /// Stop now; the string names the cause.
    Terminate(String),
}

/// A wall-clock budget in microseconds, measured on a monotonic clock.
#[derive(Debug, Clone)]
pub struct TimeBudget {
    start: Instant,
    limit: Duration,
}

impl TimeBudget {
    /// Starts a budget of `limit`, beginning now.
    #[inline]
    pub fn new(limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    /// Starts a budget of `micros` microseconds, beginning now.
    #[inline]
    pub fn from_micros(micros: u64) -> Self {
        Self::new(Duration::from_micros(micros))
    }

    /// Time spent since the budget started.
    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Microseconds spent since the budget started.
    #[inline(always)]
    pub fn elapsed_micros(&self) -> u128 {
        self.start.elapsed().as_micros()
    }

    /// The configured limit.
    #[inline(always)]
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Returns `true` once the limit has been reached.
    #[inline(always)]
    pub fn exhausted(&self) -> bool {
        self.start.elapsed() >= self.limit
    }
}

/// Shared flag for cooperative cancellation across search units.
///
/// Cloning is cheap; every clone observes the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    flag: Arc<AtomicBool>,
}

impl StopToken {
    /// Creates an un-tripped token.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests every holder of this token to stop at its next checkpoint.
    #[inline]
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once a stop has been requested.
    #[inline(always)]
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// The per-iteration checkpoint a search unit consults: stop flag first,
/// then the budget.
#[derive(Debug, Clone)]
pub struct RunMonitor {
    budget: TimeBudget,
    stop: StopToken,
}

impl RunMonitor {
    /// Combines a budget with a stop token.
    #[inline]
    pub fn new(budget: TimeBudget, stop: StopToken) -> Self {
        Self { budget, stop }
    }

    /// The underlying budget.
    #[inline(always)]
    pub fn budget(&self) -> &TimeBudget {
        &self.budget
    }

    /// The underlying stop token.
    #[inline(always)]
    pub fn stop(&self) -> &StopToken {
        &self.stop
    }

    /// The checkpoint verdict for the next iteration.
    #[inline]
    pub fn search_command(&self) -> SearchCommand {
        if self.stop.is_requested() {
            return SearchCommand::Terminate("stop requested".to_string());
        }
        if self.budget.exhausted() {
            return SearchCommand::Terminate("time budget exhausted".to_string());
        }
        SearchCommand::Continue
    }
}
