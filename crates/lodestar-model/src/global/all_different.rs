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

//! Soft all-different.
//!
//! The error is the number of conflicting pairs: for every value taken by
//! `c` variables, `c * (c - 1) / 2` pairs are in conflict. This is the
//! classic soft-alldiff violation measure; it is zero exactly when all
//! watched variables take distinct values, and it decreases smoothly as
//! duplicates are broken up.

use crate::{constraint::Constraint, index::VariableId, variable::Variable};
use std::collections::HashMap;

/// Requires all watched variables to take pairwise distinct values.
pub struct AllDifferent {
    scope: Vec<VariableId>,
}

impl AllDifferent {
    /// Creates an all-different constraint over the given variables.
    pub fn new(scope: Vec<VariableId>) -> Self {
        Self { scope }
    }
}

/// Number of conflicting pairs among `count` variables sharing one value.
#[inline]
fn conflicting_pairs(count: u32) -> f64 {
    (count as f64) * ((count as f64) - 1.0) / 2.0
}

fn value_counts(assignment: &[Variable]) -> HashMap<i32, u32> {
    let mut counts = HashMap::with_capacity(assignment.len());
    for variable in assignment {
        *counts.entry(variable.value()).or_insert(0) += 1;
    }
    counts
}

impl Constraint for AllDifferent {
    fn variables(&self) -> &[VariableId] {
        &self.scope
    }

    fn error(&self, assignment: &[Variable]) -> f64 {
        value_counts(assignment)
            .values()
            .map(|&count| conflicting_pairs(count))
            .sum()
    }

    fn delta_error(&self, assignment: &[Variable], changes: &[(usize, i32)]) -> Option<f64> {
        let counts = value_counts(assignment);
        let mut updated = counts.clone();
        for &(position, value) in changes {
            *updated.entry(assignment[position].value()).or_insert(0) -= 1;
            *updated.entry(value).or_insert(0) += 1;
        }

        // Only classes whose count changed contribute to the delta.
        let mut delta = 0.0;
        for (&value, &after) in &updated {
            let before = counts.get(&value).copied().unwrap_or(0);
            if before != after {
                delta += conflicting_pairs(after) - conflicting_pairs(before);
            }
        }
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;

    fn assignment(values: &[i32]) -> Vec<Variable> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let mut v =
                    Variable::new(VariableId::new(i), format!("v{i}"), Domain::range(0, 10), 0);
                v.set_value(value).unwrap();
                v
            })
            .collect()
    }

    fn all_different(n: usize) -> AllDifferent {
        AllDifferent::new((0..n).map(VariableId::new).collect())
    }

    #[test]
    fn test_distinct_values_have_zero_error() {
        let c = all_different(3);
        assert_eq!(c.error(&assignment(&[1, 2, 3])), 0.0);
    }

    #[test]
    fn test_error_counts_conflicting_pairs() {
        let c = all_different(4);
        // Two pairs share a value: (0,1) on 5 and (2,3) on 7.
        assert_eq!(c.error(&assignment(&[5, 5, 7, 7])), 2.0);
        // A triple contributes three conflicting pairs.
        assert_eq!(c.error(&assignment(&[5, 5, 5, 7])), 3.0);
    }

    #[test]
    fn test_delta_matches_full_recomputation() {
        let c = all_different(4);
        let vars = assignment(&[5, 5, 5, 7]);
        let before = c.error(&vars);
        for position in 0..4 {
            for value in 0..10 {
                let delta = c.delta_error(&vars, &[(position, value)]).unwrap();
                let mut moved = assignment(&[5, 5, 5, 7]);
                moved[position].set_value(value).unwrap();
                let after = c.error(&moved);
                assert_eq!(
                    delta,
                    after - before,
                    "delta mismatch moving position {position} to {value}"
                );
            }
        }
    }

    #[test]
    fn test_delta_handles_swap_shaped_changes() {
        let c = all_different(3);
        let vars = assignment(&[1, 1, 2]);
        // Swapping equal-and-distinct values: positions 1 and 2 exchange.
        let delta = c.delta_error(&vars, &[(1, 2), (2, 1)]).unwrap();
        assert_eq!(delta, 0.0, "a swap never changes the value multiset");
    }
}
