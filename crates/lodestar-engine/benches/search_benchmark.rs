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

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lodestar_engine::{tables::ErrorTables, tabu::WeakTabuList, unit::SearchUnit};
use lodestar_model::{
    domain::Domain, global::AllDifferent, index::VariableId, model::Model, variable::Variable,
};
use lodestar_search::{
    monitor::{RunMonitor, StopToken, TimeBudget},
    options::Options,
    rng::SearchRng,
};
use std::time::Duration;

fn all_different_model(n: usize) -> Model {
    let variables: Vec<Variable> = (0..n)
        .map(|i| Variable::new(VariableId::new(i), format!("v{i}"), Domain::range(0, n), 0))
        .collect();
    let constraint = AllDifferent::new((0..n).map(VariableId::new).collect());
    Model::new(variables, vec![Box::new(constraint)], None, None).unwrap()
}

fn bench_table_recompute(c: &mut Criterion) {
    let mut model = all_different_model(64);
    let tabu = WeakTabuList::new(64, 1, 32);
    let mut tables = ErrorTables::build(&model);

    c.bench_function("tables_recompute_64", |b| {
        b.iter(|| {
            tables.recompute(black_box(&mut model), &tabu).unwrap();
            black_box(tables.total_error())
        })
    });
}

fn bench_worst_variable_pick(c: &mut Criterion) {
    let mut model = all_different_model(64);
    let tabu = WeakTabuList::new(64, 1, 32);
    let mut tables = ErrorTables::build(&model);
    tables.recompute(&mut model, &tabu).unwrap();
    let mut worst = Vec::new();

    c.bench_function("worst_variables_64", |b| {
        b.iter(|| {
            tables.worst_variables(false, &tabu, black_box(&mut worst));
            black_box(worst.len())
        })
    });
}

fn bench_short_search(c: &mut Criterion) {
    c.bench_function("all_different_16_short_budget", |b| {
        b.iter(|| {
            let mut unit = SearchUnit::new(
                all_different_model(16),
                false,
                &Options::default(),
                SearchRng::seeded(7),
            );
            let monitor = RunMonitor::new(
                TimeBudget::new(Duration::from_micros(500)),
                StopToken::new(),
            );
            black_box(unit.search(&monitor).unwrap())
        })
    });
}

criterion_group!(
    benches,
    bench_table_recompute,
    bench_worst_variable_pick,
    bench_short_search
);
criterion_main!(benches);
