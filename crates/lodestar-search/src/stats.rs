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

//! Statistics of a search run.
//!
//! A lightweight counter block updated from the hot loop through `on_*`
//! methods. When several units race, each keeps its own block; the driver
//! reports the winner's block and an aggregate over all units.

use std::time::Duration;

/// Aggregate metrics of one search unit (or of a whole race, when summed).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchStatistics {
    /// Iterations of the main loop.
    pub search_iterations: u64,

    /// Committed moves.
    pub local_moves: u64,

    /// Committed moves that did not change the total error.
    pub plateau_moves: u64,

    /// Iterations whose best candidate strictly worsened the error.
    pub local_minimum: u64,

    /// Plateau situations resolved by restarting rather than walking.
    pub plateau_local_minimum: u64,

    /// Partial resets performed.
    pub resets: u64,

    /// Full restarts performed (the initial start does not count).
    pub restarts: u64,

    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

impl SearchStatistics {
    /// Called at each iteration of the search loop.
    #[inline]
    pub fn on_iteration(&mut self) {
        self.search_iterations = self.search_iterations.saturating_add(1);
    }

    /// Called when a move is committed; `plateau` marks zero-delta moves.
    #[inline]
    pub fn on_local_move(&mut self, plateau: bool) {
        self.local_moves = self.local_moves.saturating_add(1);
        if plateau {
            self.plateau_moves = self.plateau_moves.saturating_add(1);
        }
    }

    /// Called when the best candidate strictly worsens the error.
    #[inline]
    pub fn on_local_minimum(&mut self) {
        self.local_minimum = self.local_minimum.saturating_add(1);
    }

    /// Called when a plateau is abandoned by restarting.
    #[inline]
    pub fn on_plateau_local_minimum(&mut self) {
        self.plateau_local_minimum = self.plateau_local_minimum.saturating_add(1);
    }

    /// Called on a partial reset.
    #[inline]
    pub fn on_reset(&mut self) {
        self.resets = self.resets.saturating_add(1);
    }

    /// Called on a full restart.
    #[inline]
    pub fn on_restart(&mut self) {
        self.restarts = self.restarts.saturating_add(1);
    }

    /// Sets the wall-clock time of the run.
    #[inline]
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    /// Adds another unit's counters into this block; `elapsed` keeps the
    /// maximum, matching a parallel race's wall-clock reading.
    pub fn absorb(&mut self, other: &SearchStatistics) {
        self.search_iterations = self.search_iterations.saturating_add(other.search_iterations);
        self.local_moves = self.local_moves.saturating_add(other.local_moves);
        self.plateau_moves = self.plateau_moves.saturating_add(other.plateau_moves);
        self.local_minimum = self.local_minimum.saturating_add(other.local_minimum);
        self.plateau_local_minimum = self
            .plateau_local_minimum
            .saturating_add(other.plateau_local_minimum);
        self.resets = self.resets.saturating_add(other.resets);
        self.restarts = self.restarts.saturating_add(other.restarts);
        self.elapsed = self.elapsed.max(other.elapsed);
    }
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Lodestar Search Statistics:")?;
        writeln!(f, "   Iterations:       {}", self.search_iterations)?;
        writeln!(
            f,
            "   Local moves:      {} (on plateau: {})",
            self.local_moves, self.plateau_moves
        )?;
        writeln!(
            f,
            "   Local minima:     {} (on plateau: {})",
            self.local_minimum, self.plateau_local_minimum
        )?;
        writeln!(f, "   Resets:           {}", self.resets)?;
        writeln!(f, "   Restarts:         {}", self.restarts)?;
        writeln!(f, "   Elapsed:          {:?}", self.elapsed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment() {
        let mut stats = SearchStatistics::default();
        stats.on_iteration();
        stats.on_iteration();
        stats.on_local_move(false);
        stats.on_local_move(true);
        stats.on_local_minimum();
        stats.on_reset();
        stats.on_restart();

        assert_eq!(stats.search_iterations, 2);
        assert_eq!(stats.local_moves, 2);
        assert_eq!(stats.plateau_moves, 1);
        assert_eq!(stats.local_minimum, 1);
        assert_eq!(stats.resets, 1);
        assert_eq!(stats.restarts, 1);
    }

    #[test]
    fn test_absorb_sums_counters_and_keeps_max_elapsed() {
        let mut total = SearchStatistics {
            search_iterations: 10,
            elapsed: Duration::from_millis(5),
            ..SearchStatistics::default()
        };
        let other = SearchStatistics {
            search_iterations: 7,
            local_moves: 3,
            elapsed: Duration::from_millis(9),
            ..SearchStatistics::default()
        };
        total.absorb(&other);
        assert_eq!(total.search_iterations, 17);
        assert_eq!(total.local_moves, 3);
        assert_eq!(total.elapsed, Duration::from_millis(9));
    }
}
