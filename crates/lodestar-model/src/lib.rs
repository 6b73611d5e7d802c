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

//! # Lodestar Model
//!
//! **The problem model layer for the Lodestar CSP/COP solver.**
//!
//! This crate defines everything needed to state a combinatorial problem:
//! integer decision variables over finite domains, user-defined constraints
//! that score their own violation, an optional objective function, and
//! auxiliary data structures kept in sync with the assignment.
//!
//! ## Architecture
//!
//! The crate separates the **user-facing extension traits** from the
//! **engine-facing cells** that wrap them:
//!
//! * **`index`**: Strongly-typed wrappers (`VariableId`, `ConstraintId`) so
//!   variable and constraint indices cannot be mixed up.
//! * **`domain`** / **`variable`**: Immutable value domains and the decision
//!   variables ranging over them.
//! * **`constraint`** / **`objective`** / **`auxiliary`**: The extension
//!   traits users implement, plus the mirror-holding cells the engine drives.
//! * **`model`** / **`builder`**: The assembled `Model` (owned by one search
//!   unit) and the `ModelBuilder` declaration hooks that produce it.
//! * **`global`**: A small catalog of ready-made constraints
//!   (`AllDifferent`, `Linear`, `FixValue`).
//!
//! ## Design Philosophy
//!
//! 1.  **Exclusive ownership**: Every search unit owns its model outright;
//!     constraints and the objective each own a private mirror of the
//!     variables they watch. No aliasing, no locks.
//! 2.  **Fail-fast**: Domain membership and contract violations (negative or
//!     NaN errors) are surfaced as typed errors at the point of the offense.
//! 3.  **Closed hot path**: Incidence and id mappings are computed once at
//!     model construction so the search loop never re-scans constraints.

pub mod auxiliary;
pub mod builder;
pub mod constraint;
pub mod domain;
pub mod error;
pub mod global;
pub mod index;
pub mod model;
pub mod objective;
pub mod variable;
