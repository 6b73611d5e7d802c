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

//! Integer decision variables.
//!
//! A variable carries its original id, a display name, an immutable
//! [`Domain`], and the current assignment as a `(position, value)` pair. The
//! cached position is what makes permutation moves cheap: swapping two
//! variables exchanges both members of the pair atomically, so the value
//! multiset of the assignment is preserved by construction.
//!
//! Variables are constructed before a model is built, moved into it, mutated
//! only by the search, and read back afterwards.

use crate::{domain::Domain, error::SolverError, index::VariableId};
use rand::Rng;

/// A decision variable over a finite integer domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    original_id: VariableId,
    name: String,
    domain: Domain,
    /// Position of the current value within the domain.
    index: usize,
    /// Current value; always `domain.value_at(index)` in single-variable
    /// mode. In permutation mode the pair travels between variables and the
    /// value may come from a sibling's position.
    value: i32,
}

impl Variable {
    /// Creates a variable assigned to the domain value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds for `domain`.
    pub fn new(original_id: VariableId, name: impl Into<String>, domain: Domain, index: usize) -> Self {
        assert!(
            index < domain.len(),
            "called `Variable::new` with starting index {} but the domain only has {} values",
            index,
            domain.len()
        );
        let value = domain.value_at(index);
        Self {
            original_id,
            name: name.into(),
            domain,
            index,
            value,
        }
    }

    /// The id this variable was declared with.
    #[inline(always)]
    pub fn original_id(&self) -> VariableId {
        self.original_id
    }

    /// The display name given at declaration.
    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The variable's domain.
    #[inline(always)]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// The current value.
    #[inline(always)]
    pub fn value(&self) -> i32 {
        self.value
    }

    /// The cached domain position backing the current value.
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Assigns `value`, failing if it is not in the domain.
    ///
    /// This is the checked assignment path used for user-supplied values
    /// (custom starting points, post-process results) and for local moves.
    pub fn set_value(&mut self, value: i32) -> Result<(), SolverError> {
        match self.domain.position(value) {
            Some(position) => {
                self.index = position;
                self.value = value;
                Ok(())
            }
            None => Err(SolverError::Domain {
                id: self.original_id,
                name: self.name.clone(),
                value,
                min: self.domain.min(),
                max: self.domain.max(),
            }),
        }
    }

    /// Assigns `value` without a domain check.
    ///
    /// Mirror synchronization and permutation swaps go through this path:
    /// the engine guarantees the values it propagates, and in permutation
    /// mode a value legitimately originates from a sibling variable's
    /// domain position.
    #[inline(always)]
    pub fn assign_unchecked(&mut self, value: i32) {
        self.value = value;
    }

    /// Assigns a uniformly random domain value.
    #[inline]
    pub fn pick_random_value<R: Rng>(&mut self, rng: &mut R) {
        self.index = rng.gen_range(0..self.domain.len());
        self.value = self.domain.value_at(self.index);
    }

    /// Exchanges the `(index, value)` pairs of two variables in a slice.
    ///
    /// This is the only mutation permutation mode performs, so the multiset
    /// of assigned values is invariant over a permutation search.
    ///
    /// # Panics
    ///
    /// Panics if `a == b` or either index is out of bounds.
    pub fn swap_assignment(variables: &mut [Variable], a: usize, b: usize) {
        assert!(
            a != b,
            "called `Variable::swap_assignment` with identical positions {a}"
        );
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = variables.split_at_mut(high);
        let first = &mut head[low];
        let second = &mut tail[0];
        std::mem::swap(&mut first.index, &mut second.index);
        std::mem::swap(&mut first.value, &mut second.value);
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Variable(\"{}\", id: {}, value: {})",
            self.name, self.original_id, self.value
        )
    }
}
