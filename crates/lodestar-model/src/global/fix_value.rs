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

//! Pins one variable to a constant.

use crate::{constraint::Constraint, index::VariableId, variable::Variable};

/// Requires a single variable to equal `target`; error `|x - target|`.
pub struct FixValue {
    scope: [VariableId; 1],
    target: i32,
}

impl FixValue {
    /// Creates the constraint `variable == target`.
    pub fn new(variable: VariableId, target: i32) -> Self {
        Self {
            scope: [variable],
            target,
        }
    }
}

impl Constraint for FixValue {
    fn variables(&self) -> &[VariableId] {
        &self.scope
    }

    fn error(&self, assignment: &[Variable]) -> f64 {
        (assignment[0].value() - self.target).abs() as f64
    }

    fn delta_error(&self, assignment: &[Variable], changes: &[(usize, i32)]) -> Option<f64> {
        let mut value = assignment[0].value();
        for &(position, candidate) in changes {
            debug_assert_eq!(position, 0, "FixValue watches a single variable");
            value = candidate;
        }
        let before = (assignment[0].value() - self.target).abs() as f64;
        let after = (value - self.target).abs() as f64;
        Some(after - before)
    }
}
