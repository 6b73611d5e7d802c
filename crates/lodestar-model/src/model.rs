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

//! The assembled problem model.
//!
//! A `Model` is what one search unit owns and mutates: the variable vector
//! (engine ids are vector positions), the constraint cells, the objective
//! cell, and the auxiliary-data cell. Construction wires everything up once:
//! it translates watched original ids into engine ids, installs the id
//! mappings and mirrors, probes each constraint for an expert delta, and
//! validates the initial errors. After that the search loop never re-scans
//! scopes.

use crate::{
    auxiliary::{AuxiliaryCell, AuxiliaryData},
    constraint::{Constraint, ConstraintCell},
    error::SolverError,
    index::{ConstraintId, VariableId},
    objective::{Objective, ObjectiveCell},
    variable::Variable,
};
use std::collections::HashMap;

/// A complete problem instance, exclusively owned by one search unit.
///
/// The fields are public on purpose: the engine reads and writes them in its
/// hot loop, and the model layer has already enforced every structural
/// invariant at construction time.
pub struct Model {
    /// Decision variables; the position in this vector is the engine id.
    pub variables: Vec<Variable>,
    /// Constraint cells; the position in this vector is the constraint id.
    pub constraints: Vec<ConstraintCell>,
    /// Objective cell (the null objective for pure satisfaction problems).
    pub objective: ObjectiveCell,
    /// Auxiliary-data cell (a no-op cell when none is declared).
    pub auxiliary: AuxiliaryCell,
    is_optimization: bool,
}

impl Model {
    /// Assembles a model and performs the one-time construction work.
    ///
    /// Fails if a constraint watches an unknown variable id or declares an
    /// empty scope, and propagates contract violations from the initial
    /// error evaluation.
    ///
    /// # Panics
    ///
    /// Panics if two variables share an original id.
    pub fn new(
        variables: Vec<Variable>,
        constraints: Vec<Box<dyn Constraint>>,
        objective: Option<Box<dyn Objective>>,
        auxiliary: Option<Box<dyn AuxiliaryData>>,
    ) -> Result<Self, SolverError> {
        let mut engine_ids: HashMap<VariableId, usize> = HashMap::with_capacity(variables.len());
        for (engine_id, variable) in variables.iter().enumerate() {
            let previous = engine_ids.insert(variable.original_id(), engine_id);
            assert!(
                previous.is_none(),
                "called `Model::new` with duplicate variable id {}",
                variable.original_id()
            );
        }

        let mut cells = Vec::with_capacity(constraints.len());
        for (index, inner) in constraints.into_iter().enumerate() {
            let id = ConstraintId::new(index);
            let mut cell = ConstraintCell::new(id, inner);
            let watched = cell.watched_original_ids().to_vec();
            if watched.is_empty() {
                return Err(SolverError::EmptyScope { id });
            }
            for original_id in watched {
                let engine_id = *engine_ids.get(&original_id).ok_or(
                    SolverError::UnknownVariable {
                        id,
                        variable: original_id,
                    },
                )?;
                cell.make_variable_id_mapping(engine_id, &variables[engine_id]);
            }
            cell.probe_expert_delta();
            cell.refresh_error()?;
            cells.push(cell);
        }

        let is_optimization = objective.is_some();
        let objective = match objective {
            Some(inner) => ObjectiveCell::new(inner, &variables),
            None => ObjectiveCell::null(&variables),
        };

        let auxiliary = match auxiliary {
            Some(inner) => {
                let mut cell = AuxiliaryCell::new(inner);
                for original_id in cell.watched_original_ids().to_vec() {
                    let engine_id = *engine_ids.get(&original_id).unwrap_or_else(|| {
                        panic!(
                            "auxiliary data watches variable {original_id}, which is not part of the model"
                        )
                    });
                    cell.make_variable_id_mapping(engine_id, &variables[engine_id]);
                }
                cell
            }
            None => AuxiliaryCell::null(),
        };

        Ok(Self {
            variables,
            constraints: cells,
            objective,
            auxiliary,
            is_optimization,
        })
    }

    /// Number of decision variables.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Models always carry at least one variable in practice; clippy symmetry.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Whether an objective was declared (a COP rather than a CSP).
    #[inline(always)]
    pub fn is_optimization(&self) -> bool {
        self.is_optimization
    }

    /// Snapshot of the current assignment, by engine id.
    pub fn values(&self) -> Vec<i32> {
        self.variables.iter().map(Variable::value).collect()
    }

    /// Writes `values` into the variables through the checked path and
    /// re-syncs every mirror.
    pub fn restore(&mut self, values: &[i32]) -> Result<(), SolverError> {
        debug_assert_eq!(
            values.len(),
            self.variables.len(),
            "called `Model::restore` with {} values for {} variables",
            values.len(),
            self.variables.len()
        );
        for (variable, &value) in self.variables.iter_mut().zip(values) {
            variable.set_value(value)?;
        }
        self.sync_mirrors();
        Ok(())
    }

    /// Pushes the current variable values into every constraint mirror, the
    /// objective mirror, and the auxiliary data (with a full rebuild).
    pub fn sync_mirrors(&mut self) {
        for cell in &mut self.constraints {
            for position in 0..cell.watched_engine_ids().len() {
                let engine_id = cell.watched_engine_ids()[position];
                let value = self.variables[engine_id].value();
                cell.update_variable(engine_id, value);
            }
        }
        for engine_id in 0..self.variables.len() {
            let value = self.variables[engine_id].value();
            self.objective.update_variable(engine_id, value);
        }
        self.auxiliary.refresh(&self.variables);
    }

    /// Recomputes every constraint error from its mirror; returns the total.
    pub fn refresh_errors(&mut self) -> Result<f64, SolverError> {
        let mut total = 0.0;
        for cell in &mut self.constraints {
            total += cell.refresh_error()?;
        }
        Ok(total)
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("variables", &self.variables.len())
            .field("constraints", &self.constraints.len())
            .field("objective", &self.objective.name())
            .field("is_optimization", &self.is_optimization)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;

    struct PairDiffers {
        scope: Vec<VariableId>,
    }

    impl Constraint for PairDiffers {
        fn variables(&self) -> &[VariableId] {
            &self.scope
        }

        fn error(&self, assignment: &[Variable]) -> f64 {
            if assignment[0].value() == assignment[1].value() {
                1.0
            } else {
                0.0
            }
        }
    }

    fn variables(n: usize) -> Vec<Variable> {
        (0..n)
            .map(|i| Variable::new(VariableId::new(i), format!("v{i}"), Domain::range(0, 4), 0))
            .collect()
    }

    fn pair(a: usize, b: usize) -> Box<dyn Constraint> {
        Box::new(PairDiffers {
            scope: vec![VariableId::new(a), VariableId::new(b)],
        })
    }

    #[test]
    fn test_construction_wires_mappings_and_errors() {
        let model = Model::new(variables(3), vec![pair(0, 1), pair(1, 2)], None, None).unwrap();
        assert_eq!(model.len(), 3);
        assert!(!model.is_optimization());

        // All variables start at 0, so both constraints are violated.
        assert_eq!(model.constraints[0].current_error(), 1.0);
        assert_eq!(model.constraints[1].current_error(), 1.0);
        assert_eq!(model.constraints[0].watched_engine_ids(), &[0, 1]);
        assert_eq!(model.constraints[1].watched_engine_ids(), &[1, 2]);
    }

    #[test]
    fn test_unknown_variable_is_rejected() {
        let err = Model::new(variables(2), vec![pair(0, 5)], None, None).unwrap_err();
        match err {
            SolverError::UnknownVariable { variable, .. } => {
                assert_eq!(variable, VariableId::new(5));
            }
            other => panic!("expected an unknown-variable error, got {other:?}"),
        }
    }

    #[test]
    fn test_restore_syncs_mirrors() {
        let mut model = Model::new(variables(2), vec![pair(0, 1)], None, None).unwrap();
        model.restore(&[2, 2]).unwrap();
        assert_eq!(model.constraints[0].mirror()[0].value(), 2);
        assert_eq!(model.constraints[0].mirror()[1].value(), 2);
        assert_eq!(model.refresh_errors().unwrap(), 1.0);

        model.restore(&[2, 3]).unwrap();
        assert_eq!(model.refresh_errors().unwrap(), 0.0);
    }

    #[test]
    fn test_restore_rejects_out_of_domain_values() {
        let mut model = Model::new(variables(2), vec![pair(0, 1)], None, None).unwrap();
        assert!(matches!(
            model.restore(&[0, 99]),
            Err(SolverError::Domain { .. })
        ));
    }
}
