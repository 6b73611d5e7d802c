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

//! The result of a solve call.
//!
//! Exhausting the budget is a normal outcome, not an error: `satisfied` is
//! simply `false` and `cost` carries the best satisfaction error reached.
//! For satisfied optimization runs, `cost` is the objective value of the
//! returned solution (sign-corrected for maximization objectives) and
//! `cost_before_postprocess` records the value the search itself reached
//! before the objective's post-processing hook ran.

use crate::stats::SearchStatistics;

/// Outcome of a solve call.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    /// `true` iff a zero-error assignment was found.
    pub satisfied: bool,

    /// Best objective cost (satisfied optimization runs) or best
    /// satisfaction error (everything else).
    pub cost: f64,

    /// Values of the best assignment found, by engine id.
    pub solution: Vec<i32>,

    /// The pre-post-processing cost, when post-processing ran.
    pub cost_before_postprocess: Option<f64>,

    /// Statistics of the winning unit.
    pub statistics: SearchStatistics,

    /// Statistics summed over all racing units; equals `statistics` for a
    /// sequential run.
    pub total_statistics: SearchStatistics,
}

impl SolveResult {
    /// Convenience accessor mirroring the boolean the solve call returns.
    #[inline(always)]
    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }
}

impl std::fmt::Display for SolveResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SolveResult(satisfied: {}, cost: {}, {} variables)",
            self.satisfied,
            self.cost,
            self.solution.len()
        )
    }
}
