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

//! # Lodestar Engine
//!
//! The adaptive local-search core: one [`unit::SearchUnit`] owns a model and
//! iteratively repairs it — pick the variable contributing most to the
//! aggregate error, score every candidate move by its predicted error delta,
//! commit the best one, and absorb local minima and plateaus with a weak
//! tabu list, partial resets, and full restarts.
//!
//! The bookkeeping that makes this fast lives in [`tables::ErrorTables`]
//! (per-constraint and per-variable error tables plus the variable to
//! constraint incidence matrix, built once) and [`tabu::WeakTabuList`]
//! (decaying per-variable freeze counters). [`neighborhood::Neighborhood`]
//! fixes the move shape: assign a new domain value, or, for permutation
//! problems, swap two variables' values.

pub mod neighborhood;
pub mod tables;
pub mod tabu;
pub mod unit;

/// Error magnitudes at or below this are treated as exactly zero, absorbing
/// floating-point residue from incremental delta arithmetic.
pub const ERROR_EPSILON: f64 = 1.0e-10;
