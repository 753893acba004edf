use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FeedModelError;

/// User-entered values for one day of a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecordInput {
    pub date: NaiveDate,
    /// Birds lost that day
    pub mortality: u32,
    /// Feed actually consumed in kg
    pub actual_consumption_kg: f64,
    /// Concentrate delivered that day in kg
    pub concentrate_received_kg: f64,
    pub actual_water_liters: Option<f64>,
    /// Sampled average body weight in grams
    pub bird_weight_g: Option<f64>,
}

impl DailyRecordInput {
    pub fn new(date: NaiveDate, mortality: u32, actual_consumption_kg: f64, concentrate_received_kg: f64) -> Self {
        Self {
            date,
            mortality,
            actual_consumption_kg,
            concentrate_received_kg,
            actual_water_liters: None,
            bird_weight_g: None,
        }
    }

    pub fn with_water(mut self, liters: f64) -> Self {
        self.actual_water_liters = Some(liters);
        self
    }

    pub fn with_weight(mut self, grams: f64) -> Self {
        self.bird_weight_g = Some(grams);
        self
    }

    pub fn validate(&self) -> Result<(), FeedModelError> {
        let required = [
            ("actual consumption", self.actual_consumption_kg),
            ("concentrate received", self.concentrate_received_kg),
        ];
        let optional = [
            ("actual water", self.actual_water_liters),
            ("bird weight", self.bird_weight_g),
        ];
        let present = optional
            .iter()
            .filter_map(|(name, v)| v.map(|v| (*name, v)));
        for (name, value) in required.into_iter().chain(present) {
            if !value.is_finite() || value < 0.0 {
                return Err(FeedModelError::ValidationError(format!(
                    "{}: {name} must be a non-negative number, got {value}",
                    self.date
                )));
            }
        }
        Ok(())
    }
}

/// One day's expected-vs-actual entry as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    /// 1-based offset from the cycle start
    pub day: u32,
    pub date: NaiveDate,
    /// 0 for the original entry, incremented by each correction
    #[serde(default)]
    pub revision: u32,
    /// Population the day's expected figures were scaled by, taken before
    /// that day's mortality
    pub bird_count: u32,
    pub mortality: u32,
    #[serde(rename = "expectedConsumption")]
    pub expected_consumption_kg: f64,
    #[serde(rename = "actualConsumption")]
    pub actual_consumption_kg: f64,
    #[serde(rename = "expectedWaterConsumption", default)]
    pub expected_water_liters: Option<f64>,
    #[serde(rename = "actualWaterConsumption", default)]
    pub actual_water_liters: Option<f64>,
    #[serde(rename = "birdWeight", default)]
    pub bird_weight_g: Option<f64>,
    #[serde(rename = "concentrateReceived")]
    pub concentrate_received_kg: f64,
    /// Accepted although the reserve went negative
    #[serde(default)]
    pub reserve_shortfall: bool,
}

impl DailyRecord {
    pub fn is_correction(&self) -> bool {
        self.revision > 0
    }

    /// Actual minus expected consumption in kg.
    pub fn consumption_deviation_kg(&self) -> f64 {
        self.actual_consumption_kg - self.expected_consumption_kg
    }
}

/// Received, consumed and mortality folded over the effective records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub received_kg: f64,
    pub consumed_kg: f64,
    pub mortality: u64,
}

/// Append-only sequence of daily records. Corrections are appended as new
/// revisions of an existing day; nothing is ever edited or removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DailyRecordLedger {
    records: Vec<DailyRecord>,
}

impl DailyRecordLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record ever appended, corrections included, in append order.
    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest day recorded so far (0 when empty).
    pub fn last_day(&self) -> u32 {
        self.records.iter().map(|r| r.day).max().unwrap_or(0)
    }

    pub fn next_day(&self) -> u32 {
        self.last_day() + 1
    }

    /// Latest revision for `day`.
    pub fn effective(&self, day: u32) -> Option<&DailyRecord> {
        self.records.iter().rev().find(|r| r.day == day)
    }

    /// Latest revision of every recorded day, in day order.
    pub fn effective_records(&self) -> impl Iterator<Item = &DailyRecord> + '_ {
        (1..=self.last_day()).filter_map(move |day| self.effective(day))
    }

    /// All revisions of `day`, oldest first.
    pub fn revisions(&self, day: u32) -> impl Iterator<Item = &DailyRecord> + '_ {
        self.records.iter().filter(move |r| r.day == day)
    }

    pub fn totals(&self) -> LedgerTotals {
        self.effective_records()
            .fold(LedgerTotals::default(), |acc, r| LedgerTotals {
                received_kg: acc.received_kg + r.concentrate_received_kg,
                consumed_kg: acc.consumed_kg + r.actual_consumption_kg,
                mortality: acc.mortality + u64::from(r.mortality),
            })
    }

    /// Cumulative effective mortality of the days strictly before `day`.
    pub fn mortality_before(&self, day: u32) -> u64 {
        self.effective_records()
            .take_while(|r| r.day < day)
            .map(|r| u64::from(r.mortality))
            .sum()
    }

    /// Sum of expected consumption over the effective records.
    pub fn expected_to_date_kg(&self) -> f64 {
        self.effective_records().map(|r| r.expected_consumption_kg).sum()
    }

    /// Days whose effective record was accepted with a reserve shortfall.
    pub fn shortfall_days(&self) -> Vec<u32> {
        self.effective_records()
            .filter(|r| r.reserve_shortfall)
            .map(|r| r.day)
            .collect()
    }

    pub(crate) fn push_original(&mut self, record: DailyRecord) -> Result<(), FeedModelError> {
        let next = self.next_day();
        if record.revision != 0 || record.day != next {
            return Err(FeedModelError::ValidationError(format!(
                "expected an original record for day {next}, got day {} revision {}",
                record.day, record.revision
            )));
        }
        self.records.push(record);
        Ok(())
    }

    pub(crate) fn push_correction(&mut self, record: DailyRecord) -> Result<(), FeedModelError> {
        let current = self.effective(record.day).ok_or_else(|| {
            FeedModelError::ValidationError(format!(
                "cannot correct day {}: no record exists",
                record.day
            ))
        })?;
        if record.revision != current.revision + 1 {
            return Err(FeedModelError::ValidationError(format!(
                "correction of day {} must be revision {}, got {}",
                record.day,
                current.revision + 1,
                record.revision
            )));
        }
        self.records.push(record);
        Ok(())
    }
}
