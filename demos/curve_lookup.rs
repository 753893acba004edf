//! Curve lookup example: interpolate a sparse growth profile and summarize a
//! small farm.
//!
//! Run from the project root:
//!   cargo run --example curve_lookup

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use uuid::Uuid;

use poultry_feed_model::analysis::CurveMetric;
use poultry_feed_model::io::read_growth_curves_json;
use poultry_feed_model::visualization::format_farm_report;
use poultry_feed_model::{
    ConsumptionEstimator, CycleAccumulator, DailyRecordInput, FarmReport, GrowthCurve,
    ProductionCycle,
};

const PROFILES: &str = r#"[
    {"id": "00000000-0000-0000-0000-0000000000a1", "breed": "ross308", "sex": "macho",
     "samples": [{"day": 1, "feedPerBird": 13}, {"day": 7, "feedPerBird": 38},
                 {"day": 14, "feedPerBird": 80}, {"day": 28, "feedPerBird": 160}]},
    {"id": "00000000-0000-0000-0000-0000000000a2", "breed": "hubbard", "sex": "hembra",
     "samples": [{"day": 1, "feedPerBird": 11}, {"day": 10, "feedPerBird": 52}]}
]"#;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let curves = read_growth_curves_json(PROFILES).expect("Failed to read growth profiles");

    for curve in &curves {
        println!("\n=== {} ({} to day {}) ===", curve.name(), curve.first_day(), curve.last_day());
        let estimator = ConsumptionEstimator::new(curve);
        for day in [1, 4, 7, 10, 20, 35] {
            println!(
                "day {:>2}: {:>6.1} g/bird, {:>8.1} kg for 10,000 birds",
                day,
                estimator.per_bird(day, CurveMetric::Feed),
                estimator.expected_feed_kg(day, 10_000)
            );
        }
    }

    let start = NaiveDate::from_ymd_opt(2026, 10, 1).expect("valid date");
    let accumulator = CycleAccumulator::default();
    let mut cycles = Vec::new();
    for (curve, birds) in curves.iter().zip([8_000, 5_500]) {
        let mut cycle = ProductionCycle::new(
            Uuid::new_v4(),
            Uuid::from_u128(1),
            curve.id(),
            start,
            start + Days::new(35),
            birds,
        )
        .expect("Failed to create cycle");
        let input = DailyRecordInput::new(start, 20, f64::from(birds) * 0.012, 2000.0);
        if let Err(e) = accumulator.ingest(&mut cycle, curve, input) {
            eprintln!("Record rejected: {e}");
        }
        cycles.push(cycle);
    }

    let by_id: HashMap<Uuid, GrowthCurve> = curves.into_iter().map(|c| (c.id(), c)).collect();
    match FarmReport::compute(&cycles, &by_id, &accumulator) {
        Ok(report) => print!("{}", format_farm_report(&report)),
        Err(e) => eprintln!("Could not build farm report: {e}"),
    }
}
