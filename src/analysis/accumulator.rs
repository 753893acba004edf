use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::estimator::ConsumptionEstimator;
use crate::config::{ModelConfig, PopulationModel, ShortfallPolicy};
use crate::error::FeedModelError;
use crate::models::{DailyRecord, DailyRecordInput, DailyRecordLedger, GrowthCurve, ProductionCycle};

/// Whole days between the cycle start and its end (or estimated end).
pub fn elapsed_days(cycle: &ProductionCycle) -> u32 {
    let days = (cycle.reference_end_date() - cycle.start_date()).num_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

/// 1-based cycle day for `date`, or `None` before the cycle starts.
pub fn day_of_cycle(cycle: &ProductionCycle, date: NaiveDate) -> Option<u32> {
    let offset = (date - cycle.start_date()).num_days();
    if offset < 0 {
        return None;
    }
    u32::try_from(offset + 1).ok()
}

/// Expected figures for one day of a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyExpectation {
    pub day: u32,
    pub bird_count: u32,
    pub feed_kg: f64,
    pub water_liters: f64,
    pub weight_g: f64,
}

/// A reserve that went below zero on `day`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReserveShortfall {
    pub day: u32,
    /// Resulting (negative) reserve in kg
    pub reserve_kg: f64,
}

impl From<ReserveShortfall> for FeedModelError {
    fn from(s: ReserveShortfall) -> Self {
        FeedModelError::ReserveShortfall {
            day: s.day,
            reserve_kg: s.reserve_kg,
        }
    }
}

/// Outcome of folding one record into a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub day: u32,
    pub revision: u32,
    pub expected_consumption_kg: f64,
    pub reserve_kg: f64,
    /// Set when the record was accepted under `ShortfallPolicy::Flag`
    pub shortfall: Option<ReserveShortfall>,
}

/// Folds per-day estimates and ledger actuals into a cycle's running totals.
#[derive(Debug, Clone, Default)]
pub struct CycleAccumulator {
    config: ModelConfig,
}

impl CycleAccumulator {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Bird count used to scale the estimate for `day`.
    pub fn bird_count_for_day(&self, cycle: &ProductionCycle, day: u32) -> u32 {
        match self.config.population_model {
            PopulationModel::Snapshot => {
                if day <= 1 {
                    cycle.initial_bird_count()
                } else {
                    cycle.current_bird_count()
                }
            }
            PopulationModel::Ledger => cycle.population_on_day(day),
        }
    }

    pub fn expected_for_day(&self, cycle: &ProductionCycle, curve: &GrowthCurve, day: u32) -> DailyExpectation {
        let estimator = ConsumptionEstimator::new(curve);
        let bird_count = self.bird_count_for_day(cycle, day);
        DailyExpectation {
            day,
            bird_count,
            feed_kg: estimator.expected_feed_kg(day, bird_count),
            water_liters: estimator.expected_water_liters(day, bird_count),
            weight_g: estimator.expected_weight_g(day),
        }
    }

    /// Expected figures for days 1 through `elapsed_days(cycle)`.
    pub fn expected_series(&self, cycle: &ProductionCycle, curve: &GrowthCurve) -> Vec<DailyExpectation> {
        (1..=elapsed_days(cycle))
            .map(|day| self.expected_for_day(cycle, curve, day))
            .collect()
    }

    /// Expected feed in kg summed over the cycle's elapsed days.
    pub fn total_expected_consumption(&self, cycle: &ProductionCycle, curve: &GrowthCurve) -> f64 {
        let estimator = ConsumptionEstimator::new(curve);
        (1..=elapsed_days(cycle))
            .map(|day| estimator.expected_feed_kg(day, self.bird_count_for_day(cycle, day)))
            .sum()
    }

    /// Ingest the next day's record: compute its expectation, validate
    /// mortality, and reconcile the concentrate reserve.
    pub fn ingest(
        &self,
        cycle: &mut ProductionCycle,
        curve: &GrowthCurve,
        input: DailyRecordInput,
    ) -> Result<Reconciliation, FeedModelError> {
        cycle.ensure_active("append a daily record to")?;
        check_curve(cycle, curve)?;
        input.validate()?;

        let day = cycle.day_for_date(input.date)?;
        let next = cycle.ledger().next_day();
        if day != next {
            return Err(FeedModelError::ValidationError(format!(
                "Cycle {}: next record must be day {next} ({}), got day {day}",
                cycle.id(),
                cycle.date_of_day(next)
            )));
        }
        if input.mortality > cycle.current_bird_count() {
            return Err(FeedModelError::MortalityExceedsPopulation {
                day,
                mortality: input.mortality,
                current: cycle.current_bird_count(),
            });
        }

        // same totals commit_original will store
        let received_kg = cycle.total_concentrate_received_kg() + input.concentrate_received_kg;
        let consumed_kg = cycle.total_concentrate_consumed_kg() + input.actual_consumption_kg;
        let shortfall = self.check_reserve(day, received_kg - consumed_kg)?;

        let expectation = self.expected_for_day(cycle, curve, day);
        let record = build_record(day, 0, &expectation, input, shortfall.is_some());
        tracing::trace!(cycle = %cycle.id(), day, expected_kg = expectation.feed_kg, "ingesting daily record");
        cycle.commit_original(record)?;

        Ok(Reconciliation {
            day,
            revision: 0,
            expected_consumption_kg: expectation.feed_kg,
            reserve_kg: cycle.concentrate_reserve_kg(),
            shortfall,
        })
    }

    /// Append a correction for an already-recorded day. The superseded
    /// revision stays in the ledger.
    ///
    /// The running reserve is re-checked from the corrected day onward. A
    /// later day whose shortfall flag changes gets a flag-only revision.
    pub fn correct(
        &self,
        cycle: &mut ProductionCycle,
        curve: &GrowthCurve,
        input: DailyRecordInput,
    ) -> Result<Reconciliation, FeedModelError> {
        cycle.ensure_active("correct a daily record of")?;
        check_curve(cycle, curve)?;
        input.validate()?;

        let day = cycle.day_for_date(input.date)?;
        let previous = cycle.ledger().effective(day).cloned().ok_or_else(|| {
            FeedModelError::ValidationError(format!(
                "Cycle {}: cannot correct day {day}, it has not been recorded",
                cycle.id()
            ))
        })?;
        let available = cycle.current_bird_count().saturating_add(previous.mortality);
        if input.mortality > available {
            return Err(FeedModelError::MortalityExceedsPopulation {
                day,
                mortality: input.mortality,
                current: available,
            });
        }

        let tolerance = self.config.reserve_tolerance_kg;
        let balances = running_reserve_from(cycle.ledger(), day, &input);
        let shortfalls: Vec<ReserveShortfall> = balances
            .iter()
            .filter(|(_, reserve_kg)| *reserve_kg < -tolerance)
            .map(|&(d, reserve_kg)| ReserveShortfall { day: d, reserve_kg })
            .collect();
        for s in &shortfalls {
            self.apply_policy(*s)?;
        }
        let shortfall = shortfalls.first().copied();
        let reflags: Vec<DailyRecord> = balances
            .iter()
            .filter(|(d, _)| *d > day)
            .filter_map(|&(d, reserve_kg)| {
                let flagged = reserve_kg < -tolerance;
                let current = cycle.ledger().effective(d)?;
                (current.reserve_shortfall != flagged).then(|| DailyRecord {
                    revision: current.revision + 1,
                    reserve_shortfall: flagged,
                    ..current.clone()
                })
            })
            .collect();

        // the corrected day keeps the population snapshot it was recorded with
        let estimator = ConsumptionEstimator::new(curve);
        let expectation = DailyExpectation {
            day,
            bird_count: previous.bird_count,
            feed_kg: estimator.expected_feed_kg(day, previous.bird_count),
            water_liters: estimator.expected_water_liters(day, previous.bird_count),
            weight_g: estimator.expected_weight_g(day),
        };
        let revision = previous.revision + 1;
        let flagged = shortfalls.iter().any(|s| s.day == day);
        let record = build_record(day, revision, &expectation, input, flagged);
        tracing::debug!(cycle = %cycle.id(), day, revision, "correcting daily record");
        cycle.commit_correction(record)?;
        for record in reflags {
            tracing::debug!(
                cycle = %cycle.id(),
                day = record.day,
                shortfall = record.reserve_shortfall,
                "reflagging daily record"
            );
            cycle.commit_correction(record)?;
        }

        Ok(Reconciliation {
            day,
            revision,
            expected_consumption_kg: expectation.feed_kg,
            reserve_kg: cycle.concentrate_reserve_kg(),
            shortfall,
        })
    }

    fn check_reserve(&self, day: u32, reserve_kg: f64) -> Result<Option<ReserveShortfall>, FeedModelError> {
        if reserve_kg >= -self.config.reserve_tolerance_kg {
            return Ok(None);
        }
        self.apply_policy(ReserveShortfall { day, reserve_kg }).map(Some)
    }

    fn apply_policy(&self, shortfall: ReserveShortfall) -> Result<ReserveShortfall, FeedModelError> {
        match self.config.shortfall_policy {
            ShortfallPolicy::Reject => Err(shortfall.into()),
            ShortfallPolicy::Flag => {
                tracing::warn!(
                    day = shortfall.day,
                    reserve_kg = shortfall.reserve_kg,
                    "concentrate reserve shortfall accepted"
                );
                Ok(shortfall)
            }
        }
    }
}

/// Running reserve at the close of each recorded day from `from` onward,
/// with `input` in place of the effective record of day `from`. Folds in the
/// same order as `DailyRecordLedger::totals`, so the last balance is the
/// reserve the cycle will store.
fn running_reserve_from(ledger: &DailyRecordLedger, from: u32, input: &DailyRecordInput) -> Vec<(u32, f64)> {
    let mut received_kg = 0.0;
    let mut consumed_kg = 0.0;
    let mut balances = Vec::new();
    for record in ledger.effective_records() {
        if record.day == from {
            received_kg += input.concentrate_received_kg;
            consumed_kg += input.actual_consumption_kg;
        } else {
            received_kg += record.concentrate_received_kg;
            consumed_kg += record.actual_consumption_kg;
        }
        if record.day >= from {
            balances.push((record.day, received_kg - consumed_kg));
        }
    }
    balances
}

fn check_curve(cycle: &ProductionCycle, curve: &GrowthCurve) -> Result<(), FeedModelError> {
    if curve.id() != cycle.growth_profile_id() {
        return Err(FeedModelError::ValidationError(format!(
            "Cycle {} uses growth profile {}, got {}",
            cycle.id(),
            cycle.growth_profile_id(),
            curve.id()
        )));
    }
    Ok(())
}

fn build_record(
    day: u32,
    revision: u32,
    expectation: &DailyExpectation,
    input: DailyRecordInput,
    reserve_shortfall: bool,
) -> DailyRecord {
    DailyRecord {
        day,
        date: input.date,
        revision,
        bird_count: expectation.bird_count,
        mortality: input.mortality,
        expected_consumption_kg: expectation.feed_kg,
        actual_consumption_kg: input.actual_consumption_kg,
        expected_water_liters: Some(expectation.water_liters),
        actual_water_liters: input.actual_water_liters,
        bird_weight_g: input.bird_weight_g,
        concentrate_received_kg: input.concentrate_received_kg,
        reserve_shortfall,
    }
}
