use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BirdEntry, DailyRecord, DailyRecordLedger};
use crate::error::FeedModelError;

/// Aggregates may differ from the ledger fold by this much before
/// `verify_aggregates` reports them.
const AGGREGATE_TOLERANCE_KG: f64 = 1e-6;

/// Lifecycle state of a production cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    Active,
    Completed,
    Cancelled,
}

impl CycleStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CycleStatus::Active)
    }
}

impl std::fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleStatus::Active => write!(f, "active"),
            CycleStatus::Completed => write!(f, "completed"),
            CycleStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for CycleStatus {
    type Err = FeedModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(CycleStatus::Active),
            "completed" => Ok(CycleStatus::Completed),
            "cancelled" | "canceled" => Ok(CycleStatus::Cancelled),
            _ => Err(FeedModelError::ValidationError(format!(
                "Unknown cycle status: '{s}'"
            ))),
        }
    }
}

/// Human-confirmed closing figures of a completed cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finalization {
    pub end_date: NaiveDate,
    pub final_bird_count: u32,
    /// Average live weight in grams
    #[serde(rename = "averageWeight")]
    pub average_weight_g: f64,
}

/// One flock's lifecycle in one shed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "crate::io::RawProductionCycle")]
pub struct ProductionCycle {
    id: Uuid,
    farm_id: Uuid,
    growth_profile_id: Uuid,
    start_date: NaiveDate,
    estimated_end_date: NaiveDate,
    end_date: Option<NaiveDate>,
    initial_bird_count: u32,
    current_bird_count: u32,
    #[serde(rename = "totalConcentrateReceivedKg")]
    total_concentrate_received_kg: f64,
    #[serde(rename = "totalConcentrateConsumedKg")]
    total_concentrate_consumed_kg: f64,
    #[serde(rename = "concentrateReserveKg")]
    concentrate_reserve_kg: f64,
    status: CycleStatus,
    finalization: Option<Finalization>,
    bird_entries: Vec<BirdEntry>,
    #[serde(rename = "dailyRecords")]
    ledger: DailyRecordLedger,
}

impl ProductionCycle {
    /// Start a new active cycle with an empty ledger.
    pub fn new(
        id: Uuid,
        farm_id: Uuid,
        growth_profile_id: Uuid,
        start_date: NaiveDate,
        estimated_end_date: NaiveDate,
        initial_bird_count: u32,
    ) -> Result<Self, FeedModelError> {
        if estimated_end_date < start_date {
            return Err(FeedModelError::ValidationError(format!(
                "Cycle {id}: estimated end date {estimated_end_date} precedes start date {start_date}"
            )));
        }
        if initial_bird_count == 0 {
            return Err(FeedModelError::ValidationError(format!(
                "Cycle {id}: initial bird count must be positive"
            )));
        }
        Ok(Self {
            id,
            farm_id,
            growth_profile_id,
            start_date,
            estimated_end_date,
            end_date: None,
            initial_bird_count,
            current_bird_count: initial_bird_count,
            total_concentrate_received_kg: 0.0,
            total_concentrate_consumed_kg: 0.0,
            concentrate_reserve_kg: 0.0,
            status: CycleStatus::Active,
            finalization: None,
            bird_entries: Vec::new(),
            ledger: DailyRecordLedger::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn farm_id(&self) -> Uuid {
        self.farm_id
    }

    pub fn growth_profile_id(&self) -> Uuid {
        self.growth_profile_id
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn estimated_end_date(&self) -> NaiveDate {
        self.estimated_end_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// The end date if set, otherwise the estimated end date.
    pub fn reference_end_date(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.estimated_end_date)
    }

    pub fn initial_bird_count(&self) -> u32 {
        self.initial_bird_count
    }

    pub fn current_bird_count(&self) -> u32 {
        self.current_bird_count
    }

    pub fn status(&self) -> CycleStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == CycleStatus::Active
    }

    pub fn finalization(&self) -> Option<&Finalization> {
        self.finalization.as_ref()
    }

    pub fn bird_entries(&self) -> &[BirdEntry] {
        &self.bird_entries
    }

    pub fn ledger(&self) -> &DailyRecordLedger {
        &self.ledger
    }

    pub fn total_concentrate_received_kg(&self) -> f64 {
        self.total_concentrate_received_kg
    }

    pub fn total_concentrate_consumed_kg(&self) -> f64 {
        self.total_concentrate_consumed_kg
    }

    pub fn concentrate_reserve_kg(&self) -> f64 {
        self.concentrate_reserve_kg
    }

    pub fn total_concentrate_received_tonnes(&self) -> f64 {
        self.total_concentrate_received_kg / 1000.0
    }

    pub fn total_concentrate_consumed_tonnes(&self) -> f64 {
        self.total_concentrate_consumed_kg / 1000.0
    }

    pub fn concentrate_reserve_tonnes(&self) -> f64 {
        self.concentrate_reserve_kg / 1000.0
    }

    /// Birds added through entries after the cycle was created.
    pub fn added_birds(&self) -> u64 {
        self.bird_entries.iter().map(|e| u64::from(e.quantity)).sum()
    }

    /// Cumulative mortality as a percentage of all birds housed.
    pub fn mortality_percent(&self) -> f64 {
        let housed = u64::from(self.initial_bird_count) + self.added_birds();
        if housed == 0 {
            return 0.0;
        }
        self.ledger.totals().mortality as f64 / housed as f64 * 100.0
    }

    /// Calendar date of a 1-based cycle day.
    pub fn date_of_day(&self, day: u32) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(u64::from(day.saturating_sub(1))))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Population on `day` derived from entries and the mortality recorded
    /// before that day.
    pub fn population_on_day(&self, day: u32) -> u32 {
        let date = self.date_of_day(day);
        let added: u64 = self
            .bird_entries
            .iter()
            .filter(|e| e.entry_date <= date)
            .map(|e| u64::from(e.quantity))
            .sum();
        let housed = u64::from(self.initial_bird_count) + added;
        let alive = housed.saturating_sub(self.ledger.mortality_before(day));
        u32::try_from(alive).unwrap_or(u32::MAX)
    }

    /// Add birds to a shed of this cycle.
    pub fn add_bird_entry(&mut self, entry: BirdEntry) -> Result<(), FeedModelError> {
        self.ensure_active("add a bird entry to")?;
        entry.validate()?;
        if entry.cycle_id != self.id || entry.farm_id != self.farm_id {
            return Err(FeedModelError::ValidationError(format!(
                "Bird entry {} belongs to cycle {} on farm {}, not cycle {} on farm {}",
                entry.id, entry.cycle_id, entry.farm_id, self.id, self.farm_id
            )));
        }
        if entry.entry_date < self.start_date {
            return Err(FeedModelError::ValidationError(format!(
                "Bird entry {} dated {} precedes cycle start {}",
                entry.id, entry.entry_date, self.start_date
            )));
        }
        self.current_bird_count = self
            .current_bird_count
            .checked_add(entry.quantity)
            .ok_or_else(|| {
                FeedModelError::ValidationError(format!(
                    "Bird entry {} overflows the bird count",
                    entry.id
                ))
            })?;
        tracing::debug!(cycle = %self.id, quantity = entry.quantity, shed = entry.shed_number, "bird entry added");
        self.bird_entries.push(entry);
        Ok(())
    }

    /// Close the cycle as completed with the confirmed final figures.
    pub fn finalize(&mut self, finalization: Finalization) -> Result<(), FeedModelError> {
        self.ensure_active("finalize")?;
        if finalization.end_date < self.start_date {
            return Err(FeedModelError::ValidationError(format!(
                "Cycle {}: end date {} precedes start date {}",
                self.id, finalization.end_date, self.start_date
            )));
        }
        if finalization.final_bird_count > self.current_bird_count {
            return Err(FeedModelError::ValidationError(format!(
                "Cycle {}: final bird count {} exceeds current bird count {}",
                self.id, finalization.final_bird_count, self.current_bird_count
            )));
        }
        if !finalization.average_weight_g.is_finite() || finalization.average_weight_g <= 0.0 {
            return Err(FeedModelError::ValidationError(format!(
                "Cycle {}: average weight must be positive, got {}",
                self.id, finalization.average_weight_g
            )));
        }
        self.end_date = Some(finalization.end_date);
        self.finalization = Some(finalization);
        self.status = CycleStatus::Completed;
        tracing::debug!(cycle = %self.id, "cycle completed");
        Ok(())
    }

    /// Abandon the cycle. No further records are accepted.
    pub fn cancel(&mut self, on: NaiveDate) -> Result<(), FeedModelError> {
        self.ensure_active("cancel")?;
        if on < self.start_date {
            return Err(FeedModelError::ValidationError(format!(
                "Cycle {}: cancellation date {on} precedes start date {}",
                self.id, self.start_date
            )));
        }
        self.end_date = Some(on);
        self.status = CycleStatus::Cancelled;
        tracing::debug!(cycle = %self.id, "cycle cancelled");
        Ok(())
    }

    /// Recompute every aggregate from the ledger and entries and compare.
    pub fn verify_aggregates(&self) -> Result<(), FeedModelError> {
        let totals = self.ledger.totals();
        let expected_birds = (u64::from(self.initial_bird_count) + self.added_birds())
            .saturating_sub(totals.mortality);
        if u64::from(self.current_bird_count) != expected_birds {
            return Err(FeedModelError::ValidationError(format!(
                "Cycle {}: current bird count {} disagrees with ledger ({expected_birds})",
                self.id, self.current_bird_count
            )));
        }
        let checks = [
            ("received", self.total_concentrate_received_kg, totals.received_kg),
            ("consumed", self.total_concentrate_consumed_kg, totals.consumed_kg),
            (
                "reserve",
                self.concentrate_reserve_kg,
                totals.received_kg - totals.consumed_kg,
            ),
        ];
        for (name, stored, folded) in checks {
            if (stored - folded).abs() > AGGREGATE_TOLERANCE_KG {
                return Err(FeedModelError::ValidationError(format!(
                    "Cycle {}: {name} total {stored} kg disagrees with ledger ({folded} kg)",
                    self.id
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn ensure_active(&self, operation: &'static str) -> Result<(), FeedModelError> {
        if self.status.is_terminal() {
            return Err(FeedModelError::InvalidTransition {
                operation,
                status: self.status,
            });
        }
        Ok(())
    }

    /// Day index for a record date, or an error if it precedes the start.
    pub(crate) fn day_for_date(&self, date: NaiveDate) -> Result<u32, FeedModelError> {
        let offset = (date - self.start_date).num_days();
        if offset < 0 {
            return Err(FeedModelError::ValidationError(format!(
                "Cycle {}: date {date} precedes cycle start {}",
                self.id, self.start_date
            )));
        }
        u32::try_from(offset + 1).map_err(|_| {
            FeedModelError::ValidationError(format!("Cycle {}: date {date} is out of range", self.id))
        })
    }

    /// Append an original record and fold it into the aggregates.
    pub(crate) fn commit_original(&mut self, record: DailyRecord) -> Result<(), FeedModelError> {
        self.ensure_active("append a daily record to")?;
        self.check_record(&record)?;
        if record.mortality > self.current_bird_count {
            return Err(FeedModelError::MortalityExceedsPopulation {
                day: record.day,
                mortality: record.mortality,
                current: self.current_bird_count,
            });
        }
        let mortality = record.mortality;
        let received = record.concentrate_received_kg;
        let consumed = record.actual_consumption_kg;
        self.ledger.push_original(record)?;

        self.total_concentrate_received_kg += received;
        self.total_concentrate_consumed_kg += consumed;
        self.concentrate_reserve_kg =
            self.total_concentrate_received_kg - self.total_concentrate_consumed_kg;
        self.current_bird_count -= mortality;
        Ok(())
    }

    /// Append a correction for an existing day and refold the aggregates.
    pub(crate) fn commit_correction(&mut self, record: DailyRecord) -> Result<(), FeedModelError> {
        self.ensure_active("correct a daily record of")?;
        self.check_record(&record)?;
        let previous_mortality = self
            .ledger
            .effective(record.day)
            .map(|r| r.mortality)
            .ok_or_else(|| {
                FeedModelError::ValidationError(format!(
                    "cannot correct day {}: no record exists",
                    record.day
                ))
            })?;
        let available = self.current_bird_count.saturating_add(previous_mortality);
        if record.mortality > available {
            return Err(FeedModelError::MortalityExceedsPopulation {
                day: record.day,
                mortality: record.mortality,
                current: available,
            });
        }
        self.ledger.push_correction(record)?;
        self.refold();
        Ok(())
    }

    fn check_record(&self, record: &DailyRecord) -> Result<(), FeedModelError> {
        let expected = self.date_of_day(record.day);
        if record.day == 0 || record.date != expected {
            return Err(FeedModelError::ValidationError(format!(
                "Cycle {}: day {} must be dated {expected}, got {}",
                self.id, record.day, record.date
            )));
        }
        for (name, value) in [
            ("consumption", record.actual_consumption_kg),
            ("concentrate received", record.concentrate_received_kg),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FeedModelError::ValidationError(format!(
                    "Cycle {}: day {} {name} must be a non-negative number, got {value}",
                    self.id, record.day
                )));
            }
        }
        Ok(())
    }

    fn refold(&mut self) {
        let totals = self.ledger.totals();
        self.total_concentrate_received_kg = totals.received_kg;
        self.total_concentrate_consumed_kg = totals.consumed_kg;
        self.concentrate_reserve_kg = totals.received_kg - totals.consumed_kg;
        let housed = u64::from(self.initial_bird_count) + self.added_birds();
        let alive = housed.saturating_sub(totals.mortality);
        self.current_bird_count = u32::try_from(alive).unwrap_or(u32::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Breed;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_cycle(birds: u32) -> ProductionCycle {
        ProductionCycle::new(
            Uuid::from_u128(1),
            Uuid::from_u128(2),
            Uuid::from_u128(3),
            date(2026, 3, 1),
            date(2026, 4, 12),
            birds,
        )
        .unwrap()
    }

    fn make_record(cycle: &ProductionCycle, day: u32, mortality: u32, consumed: f64, received: f64) -> DailyRecord {
        DailyRecord {
            day,
            date: cycle.date_of_day(day),
            revision: 0,
            bird_count: cycle.current_bird_count(),
            mortality,
            expected_consumption_kg: 0.0,
            actual_consumption_kg: consumed,
            expected_water_liters: None,
            actual_water_liters: None,
            bird_weight_g: None,
            concentrate_received_kg: received,
            reserve_shortfall: false,
        }
    }

    fn make_entry(cycle: &ProductionCycle, quantity: u32, entry_date: NaiveDate) -> BirdEntry {
        BirdEntry {
            id: Uuid::from_u128(99),
            cycle_id: cycle.id(),
            farm_id: cycle.farm_id(),
            entry_date,
            quantity,
            shed_number: 2,
            breed: Breed::Cobb500,
            notes: Some("second batch".to_string()),
        }
    }

    fn finalization(birds: u32) -> Finalization {
        Finalization {
            end_date: date(2026, 4, 10),
            final_bird_count: birds,
            average_weight_g: 2450.0,
        }
    }

    #[test]
    fn test_status_display_and_parse() {
        assert_eq!(CycleStatus::Active.to_string(), "active");
        assert_eq!("Completed".parse::<CycleStatus>().unwrap(), CycleStatus::Completed);
        assert_eq!("canceled".parse::<CycleStatus>().unwrap(), CycleStatus::Cancelled);
        assert!("paused".parse::<CycleStatus>().is_err());
        assert!(CycleStatus::Cancelled.is_terminal());
        assert!(!CycleStatus::Active.is_terminal());
    }

    #[test]
    fn test_new_cycle_defaults() {
        let cycle = make_cycle(1000);
        assert!(cycle.is_active());
        assert_eq!(cycle.current_bird_count(), 1000);
        assert_eq!(cycle.concentrate_reserve_kg(), 0.0);
        assert!(cycle.ledger().is_empty());
        assert_eq!(cycle.reference_end_date(), date(2026, 4, 12));
        assert!(cycle.verify_aggregates().is_ok());
    }

    #[test]
    fn test_new_cycle_rejects_bad_dates_and_zero_birds() {
        assert!(ProductionCycle::new(
            Uuid::nil(),
            Uuid::nil(),
            Uuid::nil(),
            date(2026, 3, 1),
            date(2026, 2, 1),
            100
        )
        .is_err());
        assert!(ProductionCycle::new(
            Uuid::nil(),
            Uuid::nil(),
            Uuid::nil(),
            date(2026, 3, 1),
            date(2026, 4, 1),
            0
        )
        .is_err());
    }

    #[test]
    fn test_date_of_day() {
        let cycle = make_cycle(10);
        assert_eq!(cycle.date_of_day(1), date(2026, 3, 1));
        assert_eq!(cycle.date_of_day(31), date(2026, 3, 31));
        assert_eq!(cycle.date_of_day(32), date(2026, 4, 1));
        assert_eq!(cycle.day_for_date(date(2026, 3, 5)).unwrap(), 5);
        assert!(cycle.day_for_date(date(2026, 2, 28)).is_err());
    }

    #[test]
    fn test_commit_original_updates_aggregates() {
        let mut cycle = make_cycle(1000);
        let r1 = make_record(&cycle, 1, 10, 20.0, 500.0);
        cycle.commit_original(r1).unwrap();
        let r2 = make_record(&cycle, 2, 5, 25.0, 0.0);
        cycle.commit_original(r2).unwrap();
        assert_eq!(cycle.current_bird_count(), 985);
        assert!((cycle.total_concentrate_received_kg() - 500.0).abs() < 1e-9);
        assert!((cycle.total_concentrate_consumed_kg() - 45.0).abs() < 1e-9);
        assert!((cycle.concentrate_reserve_kg() - 455.0).abs() < 1e-9);
        assert!((cycle.concentrate_reserve_tonnes() - 0.455).abs() < 1e-9);
        assert!(cycle.verify_aggregates().is_ok());
    }

    #[test]
    fn test_mortality_exceeding_population_rejected() {
        let mut cycle = make_cycle(40);
        let record = make_record(&cycle, 1, 50, 1.0, 0.0);
        let err = cycle.commit_original(record).unwrap_err();
        assert!(matches!(
            err,
            FeedModelError::MortalityExceedsPopulation {
                mortality: 50,
                current: 40,
                ..
            }
        ));
        assert_eq!(cycle.current_bird_count(), 40);
        assert!(cycle.ledger().is_empty());
    }

    #[test]
    fn test_record_with_wrong_date_rejected() {
        let mut cycle = make_cycle(100);
        let mut record = make_record(&cycle, 1, 0, 1.0, 0.0);
        record.date = date(2026, 3, 3);
        assert!(cycle.commit_original(record).is_err());
    }

    #[test]
    fn test_record_with_negative_amount_rejected() {
        let mut cycle = make_cycle(100);
        let record = make_record(&cycle, 1, 0, -4.0, 0.0);
        assert!(cycle.commit_original(record).is_err());
        assert!(cycle.ledger().is_empty());
    }

    #[test]
    fn test_correction_refolds_aggregates() {
        let mut cycle = make_cycle(1000);
        let r1 = make_record(&cycle, 1, 10, 20.0, 500.0);
        cycle.commit_original(r1).unwrap();
        let mut fix = make_record(&cycle, 1, 4, 22.0, 450.0);
        fix.revision = 1;
        cycle.commit_correction(fix).unwrap();
        assert_eq!(cycle.current_bird_count(), 996);
        assert!((cycle.concentrate_reserve_kg() - 428.0).abs() < 1e-9);
        assert_eq!(cycle.ledger().len(), 2);
        assert!(cycle.verify_aggregates().is_ok());
    }

    #[test]
    fn test_correction_mortality_limited_by_population() {
        let mut cycle = make_cycle(100);
        let r1 = make_record(&cycle, 1, 90, 1.0, 0.0);
        cycle.commit_original(r1).unwrap();
        let mut fix = make_record(&cycle, 1, 101, 1.0, 0.0);
        fix.revision = 1;
        let err = cycle.commit_correction(fix).unwrap_err();
        assert!(matches!(
            err,
            FeedModelError::MortalityExceedsPopulation { current: 100, .. }
        ));
        assert_eq!(cycle.current_bird_count(), 10);
    }

    #[test]
    fn test_bird_entry_increases_population() {
        let mut cycle = make_cycle(1000);
        let entry = make_entry(&cycle, 500, date(2026, 3, 3));
        cycle.add_bird_entry(entry).unwrap();
        assert_eq!(cycle.current_bird_count(), 1500);
        assert_eq!(cycle.added_birds(), 500);
        assert!(cycle.verify_aggregates().is_ok());
    }

    #[test]
    fn test_bird_entry_for_other_cycle_rejected() {
        let mut cycle = make_cycle(1000);
        let mut entry = make_entry(&cycle, 500, date(2026, 3, 3));
        entry.cycle_id = Uuid::from_u128(42);
        assert!(cycle.add_bird_entry(entry).is_err());
        assert_eq!(cycle.current_bird_count(), 1000);
    }

    #[test]
    fn test_bird_entry_before_start_rejected() {
        let mut cycle = make_cycle(1000);
        let entry = make_entry(&cycle, 500, date(2026, 2, 20));
        assert!(cycle.add_bird_entry(entry).is_err());
    }

    #[test]
    fn test_population_on_day() {
        let mut cycle = make_cycle(1000);
        let r1 = make_record(&cycle, 1, 10, 20.0, 0.0);
        cycle.commit_original(r1).unwrap();
        let r2 = make_record(&cycle, 2, 20, 20.0, 0.0);
        cycle.commit_original(r2).unwrap();
        let entry = make_entry(&cycle, 300, date(2026, 3, 3));
        cycle.add_bird_entry(entry).unwrap();

        assert_eq!(cycle.population_on_day(1), 1000);
        assert_eq!(cycle.population_on_day(2), 990);
        assert_eq!(cycle.population_on_day(3), 1270);
        assert_eq!(cycle.population_on_day(20), 1270);
    }

    #[test]
    fn test_mortality_percent() {
        let mut cycle = make_cycle(1000);
        let r1 = make_record(&cycle, 1, 25, 1.0, 0.0);
        cycle.commit_original(r1).unwrap();
        assert!((cycle.mortality_percent() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_finalize_completes_and_sets_end_date() {
        let mut cycle = make_cycle(1000);
        cycle.finalize(finalization(990)).unwrap();
        assert_eq!(cycle.status(), CycleStatus::Completed);
        assert_eq!(cycle.end_date(), Some(date(2026, 4, 10)));
        assert_eq!(cycle.reference_end_date(), date(2026, 4, 10));
        assert_eq!(cycle.finalization().unwrap().final_bird_count, 990);
    }

    #[test]
    fn test_finalize_validates_figures() {
        let mut cycle = make_cycle(1000);
        assert!(cycle.finalize(finalization(1001)).is_err());
        let mut bad_weight = finalization(900);
        bad_weight.average_weight_g = 0.0;
        assert!(cycle.finalize(bad_weight).is_err());
        assert!(cycle.is_active());
    }

    #[test]
    fn test_no_transition_out_of_terminal_state() {
        let mut cycle = make_cycle(1000);
        cycle.cancel(date(2026, 3, 10)).unwrap();
        assert_eq!(cycle.status(), CycleStatus::Cancelled);
        assert!(matches!(
            cycle.finalize(finalization(900)),
            Err(FeedModelError::InvalidTransition { .. })
        ));
        assert!(matches!(
            cycle.cancel(date(2026, 3, 11)),
            Err(FeedModelError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_append_to_completed_cycle_rejected() {
        let mut cycle = make_cycle(1000);
        cycle.finalize(finalization(1000)).unwrap();
        let record = make_record(&cycle, 1, 0, 1.0, 0.0);
        let err = cycle.commit_original(record).unwrap_err();
        assert!(matches!(
            err,
            FeedModelError::InvalidTransition {
                status: CycleStatus::Completed,
                ..
            }
        ));
        assert!(cycle.ledger().is_empty());

        let entry = make_entry(&cycle, 10, date(2026, 3, 2));
        assert!(cycle.add_bird_entry(entry).is_err());
        assert!(cycle.bird_entries().is_empty());
    }
}
