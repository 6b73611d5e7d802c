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

//! # Lodestar Solver
//!
//! The user-facing driver. Declare a problem through a
//! [`lodestar_model::builder::ModelBuilder`], hand it to a [`solver::Solver`],
//! and call `solve` with a wall-clock budget. The driver builds one model per
//! search unit, runs a single unit or races several in parallel, picks the
//! winner, applies objective post-processing, and reports a
//! [`lodestar_search::result::SolveResult`].
//!
//! The commonly needed types are re-exported at the crate root so typical
//! programs only import from here.

pub mod solver;

pub use solver::Solver;

pub use lodestar_model::{
    auxiliary::AuxiliaryData,
    builder::{ModelBuilder, ModelDraft},
    constraint::Constraint,
    domain::Domain,
    error::SolverError,
    global::{AllDifferent, FixValue, Linear, LinearOp},
    index::VariableId,
    objective::Objective,
    variable::Variable,
};
pub use lodestar_search::{options::Options, result::SolveResult, stats::SearchStatistics};
