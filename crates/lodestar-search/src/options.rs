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

//! Solver options.
//!
//! Most knobs default to `-1`, meaning "the engine chooses": the concrete
//! values are derived from the number of variables when a search unit is
//! set up, through [`Options::resolve`]. Explicit values always win over
//! the derived ones.

/// User-tunable parameters of a solve call.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Keep the variables' declared values as the starting configuration
    /// instead of sampling a random one. Honored for the first start only;
    /// later restarts always randomize.
    pub custom_starting_point: bool,

    /// Start from the assignment a previous run left in the variables.
    /// Like `custom_starting_point`, honored for the first start only.
    pub resume_search: bool,

    /// Race several independent search units in parallel.
    pub parallel_runs: bool,

    /// Number of units to race when `parallel_runs` is set. Defaults to the
    /// detected hardware concurrency, never less than one.
    pub number_threads: usize,

    /// Iterations a variable stays frozen after being picked at a local
    /// minimum. `-1`: engine chooses `max(1, n / 2)`.
    pub tabu_time_local_min: i32,

    /// Iterations a variable stays frozen after a selected, improving move.
    /// `-1`: engine chooses `max(1, tabu_time_local_min / 2)`.
    pub tabu_time_selected: i32,

    /// Number of frozen variables that triggers a partial reset.
    /// `-1`: engine chooses `tabu_time_local_min`.
    pub reset_threshold: i32,

    /// Number of partial resets after which the next escape is a full
    /// restart. `-1`: engine chooses the number of variables.
    pub restart_threshold: i32,

    /// How many variables a partial reset re-samples. Despite the name this
    /// is a count, not a percentage. `-1`: engine chooses
    /// `max(2, ceil(0.1 * n))`.
    pub percent_to_reset: i32,

    /// Monte-Carlo rounds used to pick a starting configuration.
    pub number_start_samplings: i32,

    /// Probability of restarting instead of walking when the best candidate
    /// move lands on a plateau. A tuned constant of the algorithm; change it
    /// only for experiments.
    pub plateau_restart_chance: f64,

    /// Whether the selected-move tabu marking requires a strict improvement
    /// of the best error, or applies after any committed move.
    pub tabu_selected_requires_improvement: bool,

    /// Seed for the engine's random stream; `None` seeds from entropy.
    /// Racing units derive their seed as `seed + unit_index`.
    pub seed: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            custom_starting_point: false,
            resume_search: false,
            parallel_runs: false,
            number_threads: detected_parallelism(),
            tabu_time_local_min: -1,
            tabu_time_selected: -1,
            reset_threshold: -1,
            restart_threshold: -1,
            percent_to_reset: -1,
            number_start_samplings: 10,
            plateau_restart_chance: 0.1,
            tabu_selected_requires_improvement: true,
            seed: None,
        }
    }
}

/// Hardware concurrency, floored at one.
fn detected_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .max(1)
}

impl Options {
    /// Replaces every `-1` sentinel with the engine-chosen value for a
    /// problem of `number_variables` variables.
    ///
    /// # Panics
    ///
    /// Panics if `plateau_restart_chance` is outside `[0, 1]`.
    pub fn resolve(&self, number_variables: usize) -> ResolvedOptions {
        assert!(
            (0.0..=1.0).contains(&self.plateau_restart_chance),
            "called `Options::resolve` with plateau_restart_chance {}, which is not within [0, 1]",
            self.plateau_restart_chance
        );
        let n = number_variables as i32;

        let tabu_time_local_min = if self.tabu_time_local_min >= 0 {
            self.tabu_time_local_min
        } else {
            (n / 2).max(1)
        };
        let tabu_time_selected = if self.tabu_time_selected >= 0 {
            self.tabu_time_selected
        } else {
            (tabu_time_local_min / 2).max(1)
        };
        let reset_threshold = if self.reset_threshold >= 0 {
            self.reset_threshold
        } else {
            tabu_time_local_min
        };
        let restart_threshold = if self.restart_threshold >= 0 {
            self.restart_threshold
        } else {
            n
        };
        let percent_to_reset = if self.percent_to_reset >= 0 {
            self.percent_to_reset
        } else {
            ((number_variables as f64 * 0.1).ceil() as i32).max(2)
        };

        ResolvedOptions {
            tabu_time_local_min: tabu_time_local_min as u32,
            tabu_time_selected: tabu_time_selected as u32,
            reset_threshold: reset_threshold.max(1) as u32,
            restart_threshold: restart_threshold.max(1) as u32,
            percent_to_reset: percent_to_reset.min(n.max(1)) as usize,
            number_start_samplings: self.number_start_samplings.max(1) as u32,
            plateau_restart_chance: self.plateau_restart_chance,
            tabu_selected_requires_improvement: self.tabu_selected_requires_improvement,
            custom_first_start: self.custom_starting_point || self.resume_search,
        }
    }
}

/// Options with every sentinel replaced by a concrete value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedOptions {
    pub tabu_time_local_min: u32,
    pub tabu_time_selected: u32,
    pub reset_threshold: u32,
    pub restart_threshold: u32,
    pub percent_to_reset: usize,
    pub number_start_samplings: u32,
    pub plateau_restart_chance: f64,
    pub tabu_selected_requires_improvement: bool,
    /// Whether the first start keeps the variables' current values.
    pub custom_first_start: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_sentinels() {
        let options = Options::default();
        assert_eq!(options.tabu_time_local_min, -1);
        assert_eq!(options.number_start_samplings, 10);
        assert!(options.number_threads >= 1);
        assert!(options.tabu_selected_requires_improvement);
    }

    #[test]
    fn test_resolve_derives_tabu_times() {
        let resolved = Options::default().resolve(10);
        assert_eq!(resolved.tabu_time_local_min, 5);
        assert_eq!(resolved.tabu_time_selected, 2);
        assert_eq!(resolved.reset_threshold, 5);
        assert_eq!(resolved.restart_threshold, 10);
        assert_eq!(resolved.percent_to_reset, 2);
    }

    #[test]
    fn test_resolve_floors_tiny_problems() {
        let resolved = Options::default().resolve(1);
        assert_eq!(resolved.tabu_time_local_min, 1);
        assert_eq!(resolved.tabu_time_selected, 1);
        assert_eq!(resolved.percent_to_reset, 1);
    }

    #[test]
    fn test_explicit_values_win() {
        let options = Options {
            tabu_time_local_min: 9,
            tabu_time_selected: 4,
            ..Options::default()
        };
        let resolved = options.resolve(100);
        assert_eq!(resolved.tabu_time_local_min, 9);
        assert_eq!(resolved.tabu_time_selected, 4);
    }

    #[test]
    #[should_panic(expected = "not within [0, 1]")]
    fn test_invalid_plateau_chance_panics() {
        let options = Options {
            plateau_restart_chance: 1.5,
            ..Options::default()
        };
        let _ = options.resolve(4);
    }
}
