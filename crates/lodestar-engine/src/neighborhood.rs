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

//! Neighborhood configuration: the move shape and exploration parameters.

/// The shape of a candidate move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveShape {
    /// Assign the chosen variable a (possibly identical) domain value.
    Local,
    /// Swap the chosen variable's value with another variable's, preserving
    /// the value multiset of the assignment.
    Permutation,
}

/// Move shape plus the exploration parameters of a search unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighborhood {
    shape: MoveShape,
    plateau_restart_chance: f64,
    start_samplings: u32,
}

impl Neighborhood {
    /// Creates a neighborhood configuration.
    ///
    /// # Panics
    ///
    /// Panics if `plateau_restart_chance` is outside `[0, 1]` or
    /// `start_samplings` is zero.
    pub fn new(shape: MoveShape, plateau_restart_chance: f64, start_samplings: u32) -> Self {
        assert!(
            (0.0..=1.0).contains(&plateau_restart_chance),
            "called `Neighborhood::new` with plateau_restart_chance {plateau_restart_chance}, which is not within [0, 1]"
        );
        assert!(
            start_samplings > 0,
            "called `Neighborhood::new` with zero start samplings"
        );
        Self {
            shape,
            plateau_restart_chance,
            start_samplings,
        }
    }

    /// The move shape.
    #[inline(always)]
    pub fn shape(&self) -> MoveShape {
        self.shape
    }

    /// `true` for permutation problems.
    #[inline(always)]
    pub fn is_permutation(&self) -> bool {
        self.shape == MoveShape::Permutation
    }

    /// Probability of restarting instead of walking a plateau.
    #[inline(always)]
    pub fn plateau_restart_chance(&self) -> f64 {
        self.plateau_restart_chance
    }

    /// Monte-Carlo rounds of the starting-configuration sampler.
    #[inline(always)]
    pub fn start_samplings(&self) -> u32 {
        self.start_samplings
    }
}
