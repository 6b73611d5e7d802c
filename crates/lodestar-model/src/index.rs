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

//! Strongly typed indices for variables and constraints.
//!
//! Two index spaces coexist in this workspace: the *original* ids users give
//! their variables when declaring a problem, and the *engine* ids (vector
//! positions) a model assigns at construction. Both are plain `usize` values
//! under the hood; wrapping them keeps the two spaces from being mixed with
//! constraint ids or with each other by accident.

/// Identifier of a decision variable, as supplied by the modeler.
///
/// Variables created through a [`crate::builder::ModelBuilder`] receive
/// consecutive ids in declaration order, so for builder-made models the
/// original id and the engine id coincide. The distinction still matters for
/// constraints, which always refer to variables by original id.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct VariableId(usize);

impl VariableId {
    /// Creates a new variable id.
    #[inline(always)]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the underlying `usize`.
    #[inline(always)]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for VariableId {
    #[inline(always)]
    fn from(id: usize) -> Self {
        Self(id)
    }
}

impl From<VariableId> for usize {
    #[inline(always)]
    fn from(id: VariableId) -> usize {
        id.0
    }
}

impl std::fmt::Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VariableId({})", self.0)
    }
}

/// Identifier of a constraint, assigned by the model as the position of the
/// constraint in its constraint vector.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ConstraintId(usize);

impl ConstraintId {
    /// Creates a new constraint id.
    #[inline(always)]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the underlying `usize`.
    #[inline(always)]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for ConstraintId {
    #[inline(always)]
    fn from(id: usize) -> Self {
        Self(id)
    }
}

impl From<ConstraintId> for usize {
    #[inline(always)]
    fn from(id: ConstraintId) -> usize {
        id.0
    }
}

impl std::fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConstraintId({})", self.0)
    }
}
