use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::FeedModelError;
use crate::models::{
    BirdEntry, CurveSample, CycleStatus, DailyRecord, Finalization, GrowthCurve, ProductionCycle,
};

/// Stored totals may differ from a replay by this much.
const REPLAY_TOLERANCE_KG: f64 = 1e-6;

/// Growth profile row as delivered by the query layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGrowthProfile {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    pub breed: String,
    pub sex: String,
    #[serde(default)]
    pub samples: Vec<RawCurveSample>,
}

/// Loosely-typed checkpoint: signed day, optional water and weight.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCurveSample {
    pub day: i64,
    #[serde(alias = "feed_per_bird")]
    pub feed_per_bird: f64,
    #[serde(default, alias = "water_per_bird")]
    pub water_per_bird: Option<f64>,
    #[serde(default, alias = "expected_weight")]
    pub expected_weight: Option<f64>,
}

impl TryFrom<RawGrowthProfile> for GrowthCurve {
    type Error = FeedModelError;

    fn try_from(raw: RawGrowthProfile) -> Result<Self, Self::Error> {
        let breed = raw.breed.parse()?;
        let sex = raw.sex.parse()?;
        let samples = raw
            .samples
            .into_iter()
            .map(|s| {
                let day = u32::try_from(s.day)
                    .ok()
                    .filter(|d| *d > 0)
                    .ok_or_else(|| {
                        FeedModelError::InvalidCurve(format!(
                            "sample day must be a positive integer, got {}",
                            s.day
                        ))
                    })?;
                Ok(CurveSample::new(
                    day,
                    s.feed_per_bird,
                    s.water_per_bird.unwrap_or(0.0),
                    s.expected_weight.unwrap_or(0.0),
                ))
            })
            .collect::<Result<Vec<_>, FeedModelError>>()?;
        let name = raw.name.unwrap_or_else(|| format!("{breed} {sex}"));
        GrowthCurve::new(raw.id.unwrap_or_default(), name, breed, sex, samples)
    }
}

/// Production cycle row with its entries and records, as stored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProductionCycle {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub growth_profile_id: Uuid,
    pub start_date: NaiveDate,
    pub estimated_end_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub initial_bird_count: i64,
    #[serde(default)]
    pub current_bird_count: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub finalization: Option<Finalization>,
    #[serde(default)]
    pub bird_entries: Vec<BirdEntry>,
    #[serde(default)]
    pub daily_records: Vec<DailyRecord>,
    #[serde(default, rename = "totalConcentrateReceivedKg")]
    pub total_concentrate_received_kg: Option<f64>,
    #[serde(default, rename = "totalConcentrateConsumedKg")]
    pub total_concentrate_consumed_kg: Option<f64>,
    #[serde(default, rename = "concentrateReserveKg")]
    pub concentrate_reserve_kg: Option<f64>,
}

impl TryFrom<RawProductionCycle> for ProductionCycle {
    type Error = FeedModelError;

    /// Rebuild a cycle by replaying its entries and records, then check any
    /// stored aggregates against the replay.
    fn try_from(raw: RawProductionCycle) -> Result<Self, Self::Error> {
        let initial = u32::try_from(raw.initial_bird_count).map_err(|_| {
            FeedModelError::ValidationError(format!(
                "Cycle {}: initial bird count must be a non-negative integer, got {}",
                raw.id, raw.initial_bird_count
            ))
        })?;
        let mut cycle = ProductionCycle::new(
            raw.id,
            raw.farm_id,
            raw.growth_profile_id,
            raw.start_date,
            raw.estimated_end_date,
            initial,
        )?;

        let mut entries = raw.bird_entries;
        entries.sort_by_key(|e| e.entry_date);
        for entry in entries {
            cycle.add_bird_entry(entry)?;
        }
        for record in raw.daily_records {
            if record.is_correction() {
                cycle.commit_correction(record)?;
            } else {
                cycle.commit_original(record)?;
            }
        }

        if let Some(stored) = raw.current_bird_count {
            if stored != i64::from(cycle.current_bird_count()) {
                return Err(FeedModelError::ValidationError(format!(
                    "Cycle {}: stored current bird count {stored} disagrees with replay ({})",
                    raw.id,
                    cycle.current_bird_count()
                )));
            }
        }
        let stored_totals = [
            ("received", raw.total_concentrate_received_kg, cycle.total_concentrate_received_kg()),
            ("consumed", raw.total_concentrate_consumed_kg, cycle.total_concentrate_consumed_kg()),
            ("reserve", raw.concentrate_reserve_kg, cycle.concentrate_reserve_kg()),
        ];
        for (name, stored, replayed) in stored_totals {
            if let Some(stored) = stored {
                if (stored - replayed).abs() > REPLAY_TOLERANCE_KG {
                    return Err(FeedModelError::ValidationError(format!(
                        "Cycle {}: stored {name} total {stored} kg disagrees with replay ({replayed} kg)",
                        raw.id
                    )));
                }
            }
        }

        let status = match raw.status.as_deref() {
            Some(s) => s.parse()?,
            None => CycleStatus::Active,
        };
        match status {
            CycleStatus::Active => {
                if raw.finalization.is_some() {
                    return Err(FeedModelError::ValidationError(format!(
                        "Cycle {}: active cycle carries finalization data",
                        raw.id
                    )));
                }
            }
            CycleStatus::Completed => {
                let finalization = raw.finalization.ok_or_else(|| {
                    FeedModelError::ValidationError(format!(
                        "Cycle {}: completed cycle requires final bird count and average weight",
                        raw.id
                    ))
                })?;
                if raw.end_date.is_some_and(|d| d != finalization.end_date) {
                    return Err(FeedModelError::ValidationError(format!(
                        "Cycle {}: end date disagrees with finalization",
                        raw.id
                    )));
                }
                cycle.finalize(finalization)?;
            }
            CycleStatus::Cancelled => {
                let on = raw.end_date.ok_or_else(|| {
                    FeedModelError::ValidationError(format!(
                        "Cycle {}: cancelled cycle requires an end date",
                        raw.id
                    ))
                })?;
                cycle.cancel(on)?;
            }
        }
        Ok(cycle)
    }
}
