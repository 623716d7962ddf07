use reduction_optimizer::recommendations::{Band, CatalogEntry, CompanySize, Pace};
use reduction_optimizer::{
    CompanyProfile, Initiative, OptimizerConfig, RecommendationConfig, RecommendationEngine,
    ReductionOptimizer,
};

fn catalog() -> Vec<Initiative> {
    vec![
        Initiative::new("LED retrofit", 50_000.0, 100.0).with_risk(0.1),
        Initiative::new("Solar array", 200_000.0, 500.0).with_risk(0.4),
        Initiative::new("Fleet electrification", 75_000.0, 150.0).with_risk(0.5),
        Initiative::new("Heat pumps", 150_000.0, 200.0).with_risk(0.3),
        Initiative::new("Supplier engagement", 30_000.0, 40.0).with_risk(0.6),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Reduction Optimizer: Strategy Comparison Example");
    println!("================================================\n");

    let mut optimizer = ReductionOptimizer::new(OptimizerConfig::default())?;
    let summary = optimizer.define_problem(catalog(), 300_000.0, 600.0)?;
    println!(
        "{} initiatives, {:.0} t potential for {:.0} if all were funded\n",
        summary.num_initiatives, summary.total_potential_reduction, summary.total_cost_if_all
    );

    let report = optimizer.run_all()?;
    for result in &report.optimization_results {
        println!(
            "{:<20} success={} cost={:>9.0} reduction={:>6.1} picks={:?}",
            result.method,
            result.success,
            result.total_cost,
            result.total_reduction,
            result.selected_names()
        );
    }
    println!("\nBest method: {} (score {:.3})", report.best_method, report.best_score);
    for recommendation in &report.recommendations {
        println!("  - {}", recommendation);
    }

    println!("\nRecommendations for a small technology company:");
    let entries: Vec<CatalogEntry> = catalog()
        .into_iter()
        .map(|initiative| {
            let quick = initiative.cost < 60_000.0;
            CatalogEntry::new(initiative)
                .with_complexity(if quick { Band::Low } else { Band::Medium })
                .with_timing(
                    if quick { Pace::Short } else { Pace::Medium },
                    Pace::Medium,
                )
                .for_industry("Technology")
                .for_size(CompanySize::Small)
        })
        .collect();

    let mut engine = RecommendationEngine::new(RecommendationConfig::default())?;
    engine.load_catalog(entries)?;
    let profile = CompanyProfile::new("Technology", CompanySize::Small, 1_200.0, Band::Low)
        .with_initiative("LED retrofit");
    let recommendations = engine.recommend(&profile, 3, true)?;
    println!(
        "Maturity {:?}, {} initiatives considered",
        recommendations.profile_summary.maturity, recommendations.total_considered
    );
    for rec in &recommendations.recommendations {
        println!(
            "  {:<20} score {:.2} confidence {:.2} timeline {}",
            rec.entry.name(),
            rec.score,
            rec.confidence,
            rec.roadmap.total_timeline
        );
        for reason in &rec.rationale {
            println!("      {}", reason);
        }
    }

    Ok(())
}
