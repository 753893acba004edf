use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::accumulator::{elapsed_days, CycleAccumulator};
use crate::error::FeedModelError;
use crate::models::{CycleStatus, GrowthCurve, ProductionCycle};

/// Cycle-to-date figures for one production cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleSummary {
    pub cycle_id: Uuid,
    pub farm_id: Uuid,
    pub curve_name: String,
    pub status: CycleStatus,
    pub start_date: NaiveDate,
    pub reference_end_date: NaiveDate,
    pub elapsed_days: u32,
    pub recorded_days: u32,
    pub initial_bird_count: u32,
    pub added_birds: u64,
    pub current_bird_count: u32,
    pub cumulative_mortality: u64,
    pub mortality_percent: f64,
    /// Expected feed over all elapsed days, kg
    pub expected_total_kg: f64,
    /// Expected feed stored on the recorded days, kg
    pub expected_to_date_kg: f64,
    pub consumed_kg: f64,
    pub received_kg: f64,
    pub reserve_kg: f64,
    pub shortfall_days: Vec<u32>,
    /// Feed consumed per kg of live weight; completed cycles only
    pub feed_conversion_ratio: Option<f64>,
}

impl CycleSummary {
    pub fn compute(
        cycle: &ProductionCycle,
        curve: &GrowthCurve,
        accumulator: &CycleAccumulator,
    ) -> Result<Self, FeedModelError> {
        if curve.id() != cycle.growth_profile_id() {
            return Err(FeedModelError::ValidationError(format!(
                "Cycle {} uses growth profile {}, got {}",
                cycle.id(),
                cycle.growth_profile_id(),
                curve.id()
            )));
        }
        let ledger = cycle.ledger();
        let totals = ledger.totals();
        let feed_conversion_ratio = cycle.finalization().and_then(|f| {
            let live_weight_kg = f64::from(f.final_bird_count) * f.average_weight_g / 1000.0;
            (live_weight_kg > 0.0).then(|| cycle.total_concentrate_consumed_kg() / live_weight_kg)
        });

        Ok(Self {
            cycle_id: cycle.id(),
            farm_id: cycle.farm_id(),
            curve_name: curve.name().to_string(),
            status: cycle.status(),
            start_date: cycle.start_date(),
            reference_end_date: cycle.reference_end_date(),
            elapsed_days: elapsed_days(cycle),
            recorded_days: ledger.last_day(),
            initial_bird_count: cycle.initial_bird_count(),
            added_birds: cycle.added_birds(),
            current_bird_count: cycle.current_bird_count(),
            cumulative_mortality: totals.mortality,
            mortality_percent: cycle.mortality_percent(),
            expected_total_kg: accumulator.total_expected_consumption(cycle, curve),
            expected_to_date_kg: ledger.expected_to_date_kg(),
            consumed_kg: cycle.total_concentrate_consumed_kg(),
            received_kg: cycle.total_concentrate_received_kg(),
            reserve_kg: cycle.concentrate_reserve_kg(),
            shortfall_days: ledger.shortfall_days(),
            feed_conversion_ratio,
        })
    }

    /// Actual minus expected consumption over the recorded days, kg.
    pub fn consumption_gap_kg(&self) -> f64 {
        self.consumed_kg - self.expected_to_date_kg
    }
}

/// Batch aggregation over many cycles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FarmReport {
    pub cycles: Vec<CycleSummary>,
    pub active_cycles: usize,
    pub total_birds: u64,
    pub expected_total_kg: f64,
    pub consumed_kg: f64,
    pub received_kg: f64,
    pub reserve_kg: f64,
    /// Cycles with at least one shortfall-flagged day
    pub cycles_with_shortfall: usize,
}

impl FarmReport {
    /// Summarize `cycles`, looking each curve up by the cycle's growth
    /// profile id.
    pub fn compute(
        cycles: &[ProductionCycle],
        curves: &HashMap<Uuid, GrowthCurve>,
        accumulator: &CycleAccumulator,
    ) -> Result<Self, FeedModelError> {
        let mut report = FarmReport::default();
        for cycle in cycles {
            let curve = curves.get(&cycle.growth_profile_id()).ok_or_else(|| {
                FeedModelError::ValidationError(format!(
                    "Cycle {}: growth profile {} not found",
                    cycle.id(),
                    cycle.growth_profile_id()
                ))
            })?;
            let summary = CycleSummary::compute(cycle, curve, accumulator)?;
            if summary.status == CycleStatus::Active {
                report.active_cycles += 1;
                report.total_birds += u64::from(summary.current_bird_count);
            }
            if !summary.shortfall_days.is_empty() {
                report.cycles_with_shortfall += 1;
            }
            report.expected_total_kg += summary.expected_total_kg;
            report.consumed_kg += summary.consumed_kg;
            report.received_kg += summary.received_kg;
            report.reserve_kg += summary.reserve_kg;
            report.cycles.push(summary);
        }
        tracing::debug!(cycles = report.cycles.len(), "farm report computed");
        Ok(report)
    }

    /// Summaries for one farm only.
    pub fn for_farm(&self, farm_id: Uuid) -> impl Iterator<Item = &CycleSummary> + '_ {
        self.cycles.iter().filter(move |c| c.farm_id == farm_id)
    }
}
