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

//! Linear (in)equality constraints.
//!
//! Scores `Σ coefᵢ · xᵢ  op  rhs` with the one-sided or absolute violation
//! as the error, so partial progress towards the bound is rewarded.

use crate::{constraint::Constraint, index::VariableId, variable::Variable};

/// Comparison operator of a [`Linear`] constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinearOp {
    /// `lhs == rhs`; error `|lhs - rhs|`.
    Eq,
    /// `lhs <= rhs`; error `max(0, lhs - rhs)`.
    Leq,
    /// `lhs >= rhs`; error `max(0, rhs - lhs)`.
    Geq,
}

/// A weighted linear constraint over its watched variables.
pub struct Linear {
    scope: Vec<VariableId>,
    coefficients: Vec<f64>,
    op: LinearOp,
    rhs: f64,
}

impl Linear {
    /// Creates `Σ coefᵢ · xᵢ op rhs`.
    ///
    /// # Panics
    ///
    /// Panics if `scope` and `coefficients` differ in length.
    pub fn new(scope: Vec<VariableId>, coefficients: Vec<f64>, op: LinearOp, rhs: f64) -> Self {
        assert_eq!(
            scope.len(),
            coefficients.len(),
            "called `Linear::new` with {} variables but {} coefficients",
            scope.len(),
            coefficients.len()
        );
        Self {
            scope,
            coefficients,
            op,
            rhs,
        }
    }

    /// Unit-coefficient sum equality: `Σ xᵢ == rhs`.
    pub fn sum_equals(scope: Vec<VariableId>, rhs: f64) -> Self {
        let coefficients = vec![1.0; scope.len()];
        Self::new(scope, coefficients, LinearOp::Eq, rhs)
    }

    /// Weighted capacity: `Σ coefᵢ · xᵢ <= rhs`.
    pub fn at_most(scope: Vec<VariableId>, coefficients: Vec<f64>, rhs: f64) -> Self {
        Self::new(scope, coefficients, LinearOp::Leq, rhs)
    }

    /// Weighted covering: `Σ coefᵢ · xᵢ >= rhs`.
    pub fn at_least(scope: Vec<VariableId>, coefficients: Vec<f64>, rhs: f64) -> Self {
        Self::new(scope, coefficients, LinearOp::Geq, rhs)
    }

    fn lhs(&self, assignment: &[Variable]) -> f64 {
        assignment
            .iter()
            .zip(&self.coefficients)
            .map(|(variable, &coefficient)| coefficient * variable.value() as f64)
            .sum()
    }

    fn violation(&self, lhs: f64) -> f64 {
        match self.op {
            LinearOp::Eq => (lhs - self.rhs).abs(),
            LinearOp::Leq => (lhs - self.rhs).max(0.0),
            LinearOp::Geq => (self.rhs - lhs).max(0.0),
        }
    }
}

impl Constraint for Linear {
    fn variables(&self) -> &[VariableId] {
        &self.scope
    }

    fn error(&self, assignment: &[Variable]) -> f64 {
        self.violation(self.lhs(assignment))
    }

    fn delta_error(&self, assignment: &[Variable], changes: &[(usize, i32)]) -> Option<f64> {
        let before = self.lhs(assignment);
        let mut after = before;
        for &(position, value) in changes {
            after += self.coefficients[position] * (value - assignment[position].value()) as f64;
        }
        Some(self.violation(after) - self.violation(before))
    }
}
