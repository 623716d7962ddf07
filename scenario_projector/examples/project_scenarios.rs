use scenario_projector::{
    EmissionsProfile, Intervention, ScenarioConfig, ScenarioProjector, TargetStrategy,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Scenario Projector: Intervention Planning Example");
    println!("=================================================\n");

    let catalog = vec![
        Intervention::new("Renewable power purchase", 2_000.0, 400_000.0),
        Intervention::new("Building retrofit", 900.0, 250_000.0).with_ramp(2),
        Intervention::new("Fleet electrification", 1_200.0, 600_000.0).starting_at(2),
        Intervention::new("Process heat recovery", 600.0, 120_000.0),
    ];
    let mut projector = ScenarioProjector::new(ScenarioConfig::default())?.with_catalog(catalog.clone())?;

    let baseline = projector.create_baseline(EmissionsProfile::new(20_000.0))?;
    println!(
        "Baseline: {:.0} t cumulative, {:.0} t in the final year",
        baseline.projections.summary.total_cumulative, baseline.projections.summary.final_year_emissions
    );

    projector.create_intervention_scenario("quick_wins", catalog[..2].to_vec())?;
    projector.create_intervention_scenario("full_programme", catalog)?;

    let epoch_year = baseline.epoch_year().ok_or("baseline has no epoch year")?;
    let target = projector.create_target_scenario(0.3, epoch_year + 5, TargetStrategy::CostEffective)?;
    if let Some(feasibility) = &target.feasibility_analysis {
        println!(
            "30% target: score {:.2}, achievable {}, risk {}",
            feasibility.feasibility_score, feasibility.is_achievable, feasibility.risk_level
        );
    }

    let comparison = projector.compare_scenarios(&["quick_wins", "full_programme", target.name.as_str()])?;
    println!("\nComparison:");
    for (name, metrics) in &comparison.comparison_metrics {
        println!(
            "  {:<28} reduction {:>8.0} t  cost {:>10.0}  cost/t {:>7.1}",
            name, metrics.emission_reduction, metrics.total_cost, metrics.cost_per_tonne
        );
    }
    if let Some(best) = &comparison.best_scenario {
        println!("Highest reduction: {}", best.highest_reduction);
    }

    let sampled = projector.sample_scenario("full_programme", 500, 7)?;
    println!(
        "\nMonte Carlo ({} runs): reduction p5 {:.0} / p50 {:.0} / p95 {:.0}",
        sampled.runs, sampled.p5_total_reduction, sampled.p50_total_reduction, sampled.p95_total_reduction
    );

    Ok(())
}
