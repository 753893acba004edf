//! Cycle reconciliation example: ingest a week of daily records, correct one
//! day, finalize the cycle and print the resulting tables.
//!
//! Run from the project root:
//!   RUST_LOG=poultry_feed_model=debug cargo run --example cycle_reconciliation

use chrono::{Days, NaiveDate};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use poultry_feed_model::analysis::CycleAnalyzer;
use poultry_feed_model::io::{read_growth_curve_json, read_production_cycle_json, write_production_cycle_json};
use poultry_feed_model::visualization::{
    format_cycle_summary, format_daily_ledger, format_expected_series, format_variance_table,
};
use poultry_feed_model::{
    CycleAccumulator, DailyRecordInput, Finalization, ModelConfig, ProductionCycle,
};

const PROFILE: &str = r#"{
    "id": "6f3c0f1e-2b1a-4c52-9a7e-0d5e1b9a0c11",
    "name": "Cobb 500 mixto",
    "breed": "cobb500",
    "sex": "mixto",
    "samples": [
        {"day": 1, "feedPerBird": 12, "waterPerBird": 24, "expectedWeight": 42},
        {"day": 7, "feedPerBird": 35, "waterPerBird": 63, "expectedWeight": 185},
        {"day": 14, "feedPerBird": 72, "waterPerBird": 130, "expectedWeight": 465},
        {"day": 21, "feedPerBird": 115, "waterPerBird": 205, "expectedWeight": 950}
    ]
}"#;

const CONFIG: &str = r#"
population_model = "ledger"
shortfall_policy = "flag"
reserve_tolerance_kg = 0.5
"#;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "poultry_feed_model=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let curve = read_growth_curve_json(PROFILE).expect("Failed to read growth profile");
    let config = ModelConfig::from_toml_str(CONFIG).expect("Failed to read config");
    let accumulator = CycleAccumulator::new(config.clone());

    let start = NaiveDate::from_ymd_opt(2026, 9, 1).expect("valid date");
    let mut cycle = ProductionCycle::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        curve.id(),
        start,
        start + Days::new(21),
        12_000,
    )
    .expect("Failed to create cycle");

    // (mortality, consumed kg, received kg)
    let week = [
        (35, 140.0, 1500.0),
        (22, 171.0, 0.0),
        (18, 215.0, 0.0),
        (15, 262.0, 0.0),
        (12, 300.0, 0.0),
        (10, 352.0, 0.0),
        (9, 410.0, 1000.0),
    ];
    for (i, (mortality, consumed, received)) in week.into_iter().enumerate() {
        let input = DailyRecordInput::new(start + Days::new(i as u64), mortality, consumed, received);
        match accumulator.ingest(&mut cycle, &curve, input) {
            Ok(rec) => println!(
                "day {:>2}: expected {:>7.1} kg, reserve {:>8.1} kg{}",
                rec.day,
                rec.expected_consumption_kg,
                rec.reserve_kg,
                if rec.shortfall.is_some() { " (shortfall)" } else { "" }
            ),
            Err(e) => eprintln!("Record rejected: {e}"),
        }
    }

    // A late weighing corrects day 3
    let fix = DailyRecordInput::new(start + Days::new(2), 20, 212.0, 0.0).with_weight(78.0);
    if let Err(e) = accumulator.correct(&mut cycle, &curve, fix) {
        eprintln!("Correction rejected: {e}");
    }

    let analyzer = CycleAnalyzer::new(&cycle, &curve, config.clone()).expect("matching curve");
    print!("{}", format_daily_ledger(cycle.ledger()));
    print!("{}", format_expected_series(&analyzer.expected_series()));
    match analyzer.consumption_variance(0.95) {
        Ok(variance) => print!("{}", format_variance_table(&variance)),
        Err(e) => eprintln!("Could not compute consumption variance: {e}"),
    }

    cycle
        .finalize(Finalization {
            end_date: start + Days::new(7),
            final_bird_count: cycle.current_bird_count(),
            average_weight_g: 190.0,
        })
        .expect("Failed to finalize cycle");

    let json = write_production_cycle_json(&cycle, false).expect("Failed to write cycle");
    let replayed = read_production_cycle_json(&json).expect("Failed to replay cycle");
    let analyzer = CycleAnalyzer::new(&replayed, &curve, config).expect("matching curve");
    match analyzer.summary() {
        Ok(summary) => print!("{}", format_cycle_summary(&summary)),
        Err(e) => eprintln!("Could not summarize cycle: {e}"),
    }
}
