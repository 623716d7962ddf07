use approx::assert_abs_diff_eq;
use pretty_assertions::assert_eq;
use reduction_optimizer::{
    CostEffectivenessStrategy, GeneticAlgorithmStrategy, Initiative, LinearProgrammingStrategy,
    MultiObjectiveStrategy, ObjectiveWeights, OptimizationResult, OptimizationStrategy,
    OptimizerConfig, OptimizerError, ReductionOptimizer, ReductionProblem, Result,
};
use rstest::rstest;

fn catalog() -> Vec<Initiative> {
    vec![
        Initiative::new("LED retrofit", 50_000.0, 100.0),
        Initiative::new("Solar array", 200_000.0, 500.0),
        Initiative::new("Fleet electrification", 75_000.0, 150.0),
        Initiative::new("Heat pumps", 150_000.0, 200.0),
    ]
}

fn optimizer() -> ReductionOptimizer {
    let mut optimizer = ReductionOptimizer::new(OptimizerConfig::default()).unwrap();
    optimizer.define_problem(catalog(), 300_000.0, 400.0).unwrap();
    optimizer
}

#[test]
fn test_greedy_four_initiatives() {
    let result = optimizer().run_strategy("cost_effectiveness").unwrap();

    assert!(result.success);
    assert_eq!(result.selected_names(), vec!["Solar array", "LED retrofit"]);
    assert_abs_diff_eq!(result.total_cost, 250_000.0);
    assert_abs_diff_eq!(result.total_reduction, 600.0);
    assert!(result.target_achievement >= 1.0);
    assert_abs_diff_eq!(result.average_cost_per_tonne, 250_000.0 / 600.0, epsilon = 1e-9);
}

#[test]
fn test_define_problem_summary() {
    let mut optimizer = ReductionOptimizer::new(OptimizerConfig::default()).unwrap();
    let summary = optimizer.define_problem(catalog(), 300_000.0, 400.0).unwrap();
    assert_eq!(summary.num_initiatives, 4);
    assert_abs_diff_eq!(summary.total_potential_reduction, 950.0);
    assert_abs_diff_eq!(summary.total_cost_if_all, 475_000.0);
    assert!(optimizer.problem().is_some());
}

#[rstest]
#[case(60_000.0)]
#[case(130_000.0)]
#[case(300_000.0)]
#[case(475_000.0)]
fn test_successful_results_respect_budget(#[case] budget: f64) {
    let problem = ReductionProblem::new(catalog(), budget, 400.0).unwrap();
    let strategies: Vec<Box<dyn OptimizationStrategy>> = vec![
        Box::new(CostEffectivenessStrategy::new()),
        Box::new(LinearProgrammingStrategy::default()),
        Box::new(GeneticAlgorithmStrategy::default()),
        Box::new(MultiObjectiveStrategy::default()),
    ];

    for strategy in &strategies {
        let result = strategy.optimize(&problem).unwrap();
        if result.success {
            assert!(
                result.total_cost <= budget,
                "{} spent {} of {}",
                result.method,
                result.total_cost,
                budget
            );
        }
    }
}

#[test]
fn test_relaxation_fills_budget() {
    let result = optimizer().run_strategy("linear_programming").unwrap();
    assert!(result.success);
    assert_abs_diff_eq!(result.total_reduction, 700.0, epsilon = 1e-9);
    assert_abs_diff_eq!(result.budget_utilization, 1.0, epsilon = 1e-9);

    let partial = result
        .selected_initiatives
        .iter()
        .find(|s| s.name == "Fleet electrification")
        .unwrap();
    assert_abs_diff_eq!(partial.implementation_level.unwrap(), 2.0 / 3.0, epsilon = 1e-9);
}

#[test]
fn test_run_all_report() {
    let report = optimizer().run_all().unwrap();

    assert_eq!(report.optimization_results.len(), 4);
    assert!(report.optimization_results.iter().all(|r| r.success));
    // The relaxation reaches 700 t at full utilization, no binary selection scores higher
    assert_eq!(report.best_method, "linear_programming");
    assert_abs_diff_eq!(report.best_score, 0.7 * 1.75, epsilon = 1e-9);
    assert_eq!(report.comparison.len(), 4);
    assert_eq!(report.comparison["cost_effectiveness"].num_initiatives, 2);
    assert_eq!(
        report.recommendations[0],
        "For maximum carbon reduction, use linear_programming method achieving 700.0 tonnes CO2e reduction"
    );
}

#[test]
fn test_low_utilization_recommendation() {
    let mut optimizer = ReductionOptimizer::new(OptimizerConfig::default()).unwrap();
    optimizer
        .define_problem(vec![Initiative::new("Insulation", 10_000.0, 40.0)], 100_000.0, 30.0)
        .unwrap();
    let report = optimizer.run_all().unwrap();

    assert!(report
        .recommendations
        .contains(&"cost_effectiveness method uses only 10.0% of budget - consider additional initiatives".to_string()));
}

#[test]
fn test_determinism() {
    let first = optimizer().run_all().unwrap();
    let second = optimizer().run_all().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_result_serde_round_trip() {
    let result = optimizer().run_strategy("multi_objective").unwrap();
    let json = serde_json::to_string(&result).unwrap();
    let decoded: OptimizationResult = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded.method, result.method);
    assert_eq!(decoded.selected_names(), result.selected_names());
    assert_abs_diff_eq!(decoded.total_cost, result.total_cost, epsilon = 1e-6);
    assert_abs_diff_eq!(decoded.total_reduction, result.total_reduction, epsilon = 1e-6);
    assert_eq!(decoded.risk_level, result.risk_level);
}

#[test]
fn test_problem_not_defined() {
    let optimizer = ReductionOptimizer::new(OptimizerConfig::default()).unwrap();
    assert!(matches!(optimizer.run_all(), Err(OptimizerError::ProblemNotDefined)));
    assert!(matches!(
        optimizer.run_strategy("cost_effectiveness"),
        Err(OptimizerError::ProblemNotDefined)
    ));
}

#[test]
fn test_unknown_strategy() {
    assert!(matches!(
        optimizer().run_strategy("simulated_annealing"),
        Err(OptimizerError::UnknownStrategy(_))
    ));
}

#[rstest]
#[case(Vec::new(), 100.0, 10.0)]
#[case(vec![Initiative::new("Free", 0.0, 10.0)], 100.0, 10.0)]
#[case(vec![Initiative::new("Negative", 10.0, -1.0)], 100.0, 10.0)]
#[case(vec![Initiative::new("Risky", 10.0, 1.0).with_risk(1.5)], 100.0, 10.0)]
#[case(vec![Initiative::new("Valid", 10.0, 1.0)], 0.0, 10.0)]
#[case(vec![Initiative::new("Valid", 10.0, 1.0)], 100.0, -5.0)]
fn test_define_problem_rejects(
    #[case] initiatives: Vec<Initiative>,
    #[case] budget: f64,
    #[case] target: f64,
) {
    let mut optimizer = ReductionOptimizer::new(OptimizerConfig::default()).unwrap();
    assert!(optimizer.define_problem(initiatives, budget, target).is_err());
    assert!(optimizer.problem().is_none());
}

#[test]
fn test_rejects_unbalanced_weights() {
    let config = OptimizerConfig {
        weights: ObjectiveWeights {
            reduction: 0.5,
            cost: 0.5,
            risk: 0.5,
        },
        ..OptimizerConfig::default()
    };
    assert!(matches!(
        ReductionOptimizer::new(config),
        Err(OptimizerError::InvalidWeights(_))
    ));
}

struct BrokenStrategy;

impl OptimizationStrategy for BrokenStrategy {
    fn name(&self) -> &str {
        "broken"
    }

    fn optimize(&self, _problem: &ReductionProblem) -> Result<OptimizationResult> {
        Err(OptimizerError::CalculationError("solver diverged".to_string()))
    }
}

struct OverspendingStrategy;

impl OptimizationStrategy for OverspendingStrategy {
    fn name(&self) -> &str {
        "everything"
    }

    fn optimize(&self, problem: &ReductionProblem) -> Result<OptimizationResult> {
        let picks: Vec<usize> = (0..problem.len()).collect();
        Ok(OptimizationResult::from_picks(self.name(), problem, &picks))
    }
}

#[test]
fn test_failing_strategies_are_reported() {
    let mut optimizer = optimizer();
    optimizer.register(Box::new(BrokenStrategy));
    optimizer.register(Box::new(OverspendingStrategy));
    let report = optimizer.run_all().unwrap();

    assert_eq!(report.optimization_results.len(), 6);
    let broken = report.result("broken").unwrap();
    assert!(!broken.success);
    assert!(broken.message.as_deref().unwrap().contains("solver diverged"));

    let everything = report.result("everything").unwrap();
    assert!(!everything.success);
    assert!(everything.selected_initiatives.is_empty());
    assert!(!report.comparison.contains_key("everything"));
}
