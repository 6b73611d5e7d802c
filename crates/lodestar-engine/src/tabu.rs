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

//! The weak tabu list.
//!
//! Each variable carries a freeze counter that decays by one per search
//! iteration and floors at zero. A nonzero counter means "recently touched,
//! avoid" — *weak* because the avoidance is advisory: when every variable is
//! frozen, the worst-variable pick falls back to the full table rather than
//! stalling.
//!
//! Two freeze durations exist: a short one for variables picked by a
//! successful, improving move, and a longer one for variables picked at a
//! local minimum, where revisiting too soon would just reproduce the minimum.

/// Decaying per-variable freeze counters.
#[derive(Debug, Clone)]
pub struct WeakTabuList {
    counters: Vec<u32>,
    tabu_time_selected: u32,
    tabu_time_local_min: u32,
    frozen: usize,
}

impl WeakTabuList {
    /// Creates an all-zero list for `len` variables.
    pub fn new(len: usize, tabu_time_selected: u32, tabu_time_local_min: u32) -> Self {
        Self {
            counters: vec![0; len],
            tabu_time_selected,
            tabu_time_local_min,
            frozen: 0,
        }
    }

    /// Decrements every nonzero counter by one.
    ///
    /// Returns `true` iff at least one variable is free (counter zero) after
    /// the decay, which is the precondition for tabu masking in the
    /// worst-variable pick.
    pub fn decay(&mut self) -> bool {
        let mut free = false;
        self.frozen = 0;
        for counter in &mut self.counters {
            if *counter > 0 {
                *counter -= 1;
            }
            if *counter == 0 {
                free = true;
            } else {
                self.frozen += 1;
            }
        }
        free
    }

    /// Returns `true` iff the variable is currently frozen.
    #[inline(always)]
    pub fn is_tabu(&self, variable: usize) -> bool {
        self.counters[variable] > 0
    }

    /// Current counter of a variable.
    #[inline(always)]
    pub fn counter(&self, variable: usize) -> u32 {
        self.counters[variable]
    }

    /// Number of currently frozen variables, as of the last decay or mark.
    #[inline(always)]
    pub fn frozen_count(&self) -> usize {
        self.frozen
    }

    /// Freezes a variable for the short, selected-move duration.
    #[inline]
    pub fn mark_selected(&mut self, variable: usize) {
        if self.counters[variable] == 0 && self.tabu_time_selected > 0 {
            self.frozen += 1;
        }
        self.counters[variable] = self.tabu_time_selected;
    }

    /// Freezes a variable for the long, local-minimum duration.
    #[inline]
    pub fn mark_local_min(&mut self, variable: usize) {
        if self.counters[variable] == 0 && self.tabu_time_local_min > 0 {
            self.frozen += 1;
        }
        self.counters[variable] = self.tabu_time_local_min;
    }

    /// Clears every counter, unfreezing all variables.
    pub fn clear(&mut self) {
        self.counters.fill(0);
        self.frozen = 0;
    }

    /// Number of variables tracked.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Whether the list tracks no variables.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
