//! Benchmark suite for selection strategies.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use reduction_optimizer::{
    CostEffectivenessStrategy, GeneticAlgorithmStrategy, Initiative, LinearProgrammingStrategy,
    OptimizationStrategy, ReductionProblem,
};

fn create_problem(size: usize) -> ReductionProblem {
    let initiatives: Vec<Initiative> = (0..size)
        .map(|i| {
            let cost = 10_000.0 + ((i * 7919) % 97) as f64 * 1_000.0;
            let reduction = 20.0 + ((i * 104_729) % 53) as f64 * 5.0;
            Initiative::new(format!("initiative-{i}"), cost, reduction)
        })
        .collect();
    let budget = initiatives.iter().map(|i| i.cost).sum::<f64>() * 0.4;
    let target = initiatives.iter().map(|i| i.co2_reduction).sum::<f64>() * 0.3;
    // Generated catalogs are always valid
    ReductionProblem::new(initiatives, budget, target).unwrap()
}

fn bench_deterministic(c: &mut Criterion) {
    let mut group = c.benchmark_group("Deterministic");

    for size in [10, 100, 1000].iter() {
        let problem = create_problem(*size);

        group.bench_with_input(BenchmarkId::new("greedy", size), &problem, |b, problem| {
            let strategy = CostEffectivenessStrategy::new();
            b.iter(|| strategy.optimize(black_box(problem)))
        });

        group.bench_with_input(BenchmarkId::new("relaxation", size), &problem, |b, problem| {
            let strategy = LinearProgrammingStrategy::default();
            b.iter(|| strategy.optimize(black_box(problem)))
        });
    }

    group.finish();
}

fn bench_evolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("Evolution");
    group.sample_size(10);

    for size in [5, 10, 20].iter() {
        let problem = create_problem(*size);
        group.bench_with_input(BenchmarkId::new("genetic", size), &problem, |b, problem| {
            let strategy = GeneticAlgorithmStrategy::default();
            b.iter(|| strategy.optimize(black_box(problem)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_deterministic, bench_evolution);
criterion_main!(benches);
