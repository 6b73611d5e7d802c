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

//! Problem declaration.
//!
//! A [`ModelBuilder`] is the four-hook declaration interface users implement
//! to state their problem. Each hook receives a [`ModelDraft`] to push
//! variables, constraints, an objective, and auxiliary data into; the
//! provided [`ModelBuilder::build_model`] then assembles a fresh [`Model`].
//!
//! Builders must be able to produce any number of identical models: the
//! driver builds one model per search unit when racing several units in
//! parallel, so the hooks take `&self` and must be deterministic.

use crate::{
    auxiliary::AuxiliaryData,
    constraint::Constraint,
    domain::Domain,
    error::SolverError,
    index::VariableId,
    model::Model,
    objective::Objective,
    variable::Variable,
};

/// Mutable staging area the declaration hooks write into.
#[derive(Default)]
pub struct ModelDraft {
    variables: Vec<Variable>,
    constraints: Vec<Box<dyn Constraint>>,
    objective: Option<Box<dyn Objective>>,
    auxiliary: Option<Box<dyn AuxiliaryData>>,
}

impl ModelDraft {
    /// Creates an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares one variable over `domain`, starting at the domain value at
    /// `start_index`. Returns the id the variable can be referred to by.
    ///
    /// Ids are handed out consecutively in declaration order.
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        domain: Domain,
        start_index: usize,
    ) -> VariableId {
        let id = VariableId::new(self.variables.len());
        self.variables
            .push(Variable::new(id, name, domain, start_index));
        id
    }

    /// Declares `count` variables sharing an explicit value domain, all
    /// starting at the first domain value. Returns their ids.
    pub fn create_n_variables(&mut self, count: usize, values: &[i32]) -> Vec<VariableId> {
        let domain = Domain::new(values.to_vec());
        (0..count)
            .map(|_| {
                let index = self.variables.len();
                self.add_variable(format!("v{index}"), domain.clone(), 0)
            })
            .collect()
    }

    /// Declares `count` variables over the contiguous domain
    /// `[start, start + len)`, all starting at the first value.
    pub fn create_n_variables_range(
        &mut self,
        count: usize,
        start: i32,
        len: usize,
    ) -> Vec<VariableId> {
        let domain = Domain::range(start, len);
        (0..count)
            .map(|_| {
                let index = self.variables.len();
                self.add_variable(format!("v{index}"), domain.clone(), 0)
            })
            .collect()
    }

    /// The variables declared so far.
    #[inline]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Mutable access to the declared variables, e.g. to install a custom
    /// starting assignment before the search begins.
    #[inline]
    pub fn variables_mut(&mut self) -> &mut [Variable] {
        &mut self.variables
    }

    /// Declares a constraint.
    pub fn add_constraint(&mut self, constraint: impl Constraint + 'static) {
        self.constraints.push(Box::new(constraint));
    }

    /// Declares the objective. At most one may be declared.
    ///
    /// # Panics
    ///
    /// Panics if an objective was already declared.
    pub fn set_objective(&mut self, objective: impl Objective + 'static) {
        assert!(
            self.objective.is_none(),
            "called `ModelDraft::set_objective` twice, but a model has at most one objective"
        );
        self.objective = Some(Box::new(objective));
    }

    /// Declares the auxiliary data. At most one may be declared.
    ///
    /// # Panics
    ///
    /// Panics if auxiliary data was already declared.
    pub fn set_auxiliary_data(&mut self, auxiliary: impl AuxiliaryData + 'static) {
        assert!(
            self.auxiliary.is_none(),
            "called `ModelDraft::set_auxiliary_data` twice"
        );
        self.auxiliary = Some(Box::new(auxiliary));
    }
}

/// The declaration interface of a problem.
pub trait ModelBuilder: Send + Sync {
    /// Declares the decision variables.
    fn declare_variables(&self, draft: &mut ModelDraft);

    /// Declares the constraints.
    fn declare_constraints(&self, draft: &mut ModelDraft);

    /// Declares the objective; the default declares none, which makes the
    /// run a pure satisfaction search.
    fn declare_objective(&self, draft: &mut ModelDraft) {
        let _ = draft;
    }

    /// Declares auxiliary data; the default declares none.
    fn declare_auxiliary_data(&self, draft: &mut ModelDraft) {
        let _ = draft;
    }

    /// Runs the four hooks and assembles a fresh model.
    fn build_model(&self) -> Result<Model, SolverError> {
        let mut draft = ModelDraft::new();
        self.declare_variables(&mut draft);
        self.declare_constraints(&mut draft);
        self.declare_objective(&mut draft);
        self.declare_auxiliary_data(&mut draft);
        Model::new(
            draft.variables,
            draft.constraints,
            draft.objective,
            draft.auxiliary,
        )
    }

    /// Number of variables this builder declares, without building a model.
    fn variable_count(&self) -> usize {
        let mut draft = ModelDraft::new();
        self.declare_variables(&mut draft);
        draft.variables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AllSame {
        scope: Vec<VariableId>,
    }

    impl Constraint for AllSame {
        fn variables(&self) -> &[VariableId] {
            &self.scope
        }

        fn error(&self, assignment: &[Variable]) -> f64 {
            let first = assignment[0].value();
            assignment
                .iter()
                .filter(|v| v.value() != first)
                .count() as f64
        }
    }

    struct TinyProblem;

    impl ModelBuilder for TinyProblem {
        fn declare_variables(&self, draft: &mut ModelDraft) {
            draft.create_n_variables_range(4, 1, 3);
        }

        fn declare_constraints(&self, draft: &mut ModelDraft) {
            let scope: Vec<VariableId> = (0..4).map(VariableId::new).collect();
            draft.add_constraint(AllSame { scope });
        }
    }

    #[test]
    fn test_builder_produces_fresh_models() {
        let builder = TinyProblem;
        let first = builder.build_model().unwrap();
        let second = builder.build_model().unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(second.len(), 4);
        assert_eq!(first.values(), second.values());
    }

    #[test]
    fn test_variable_count_matches_declaration() {
        assert_eq!(TinyProblem.variable_count(), 4);
    }

    #[test]
    fn test_variables_mut_installs_a_custom_start() {
        let mut draft = ModelDraft::new();
        draft.create_n_variables_range(3, 1, 3);
        for (offset, variable) in draft.variables_mut().iter_mut().enumerate() {
            variable.set_value(offset as i32 + 1).unwrap();
        }
        assert_eq!(
            draft.variables().iter().map(Variable::value).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_create_n_variables_share_a_domain() {
        let mut draft = ModelDraft::new();
        let ids = draft.create_n_variables(3, &[5, 1, 3]);
        assert_eq!(ids, vec![VariableId::new(0), VariableId::new(1), VariableId::new(2)]);
        for variable in draft.variables() {
            assert_eq!(variable.domain().values(), &[1, 3, 5]);
            assert_eq!(variable.value(), 1);
        }
    }

    #[test]
    #[should_panic(expected = "at most one objective")]
    fn test_double_objective_panics() {
        struct Zero;
        impl Objective for Zero {
            fn name(&self) -> &str {
                "zero"
            }
            fn cost(&self, _assignment: &[Variable]) -> f64 {
                0.0
            }
        }
        let mut draft = ModelDraft::new();
        draft.set_objective(Zero);
        draft.set_objective(Zero);
    }
}
