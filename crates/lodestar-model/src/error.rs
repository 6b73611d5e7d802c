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

//! Fatal error conditions of a solver run.
//!
//! Running out of budget is *not* an error: the solver then reports the best
//! candidate found and returns `false`. The variants below all indicate a bug
//! in the model or in an extension point and abort the run.

use crate::index::{ConstraintId, VariableId};

/// Fatal failures surfaced to the caller of `solve`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolverError {
    /// A value outside a variable's domain was assigned to it.
    ///
    /// Domains are immutable after construction, so this always indicates a
    /// bug in a constraint, an objective post-process, or a custom starting
    /// point.
    #[error(
        "value {value} is not in the domain of variable {id} \"{name}\" \
         (domain range [{min}, {max}])"
    )]
    Domain {
        id: VariableId,
        name: String,
        value: i32,
        min: i32,
        max: i32,
    },

    /// A constraint broke its error contract: `error()` returned a negative
    /// or NaN value.
    #[error("constraint {id} returned the invalid error value {value} on assignment {assignment:?}")]
    Contract {
        id: ConstraintId,
        value: f64,
        assignment: Vec<i32>,
    },

    /// An objective broke its cost contract: `cost()` returned NaN.
    #[error("objective \"{name}\" returned NaN on assignment {assignment:?}")]
    Cost { name: String, assignment: Vec<i32> },

    /// A constraint watches a variable id that does not exist in the model.
    #[error("constraint {id} watches variable {variable}, which is not part of the model")]
    UnknownVariable {
        id: ConstraintId,
        variable: VariableId,
    },

    /// A constraint declared an empty watch list.
    #[error("constraint {id} watches no variables")]
    EmptyScope { id: ConstraintId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_message() {
        let err = SolverError::Domain {
            id: VariableId::new(2),
            name: "bottle".to_string(),
            value: 99,
            min: 0,
            max: 50,
        };
        let msg = err.to_string();
        assert!(msg.contains("99"), "message should name the value: {msg}");
        assert!(msg.contains("bottle"), "message should name the variable: {msg}");
        assert!(msg.contains("[0, 50]"), "message should show the range: {msg}");
    }

    #[test]
    fn test_contract_error_message() {
        let err = SolverError::Contract {
            id: ConstraintId::new(0),
            value: -1.0,
            assignment: vec![1, 2, 3],
        };
        assert!(err.to_string().contains("-1"));
    }
}
