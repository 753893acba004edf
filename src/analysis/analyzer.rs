use chrono::NaiveDate;

use crate::analysis::{
    day_of_cycle, ConsumptionEstimator, ConsumptionVariance, CycleAccumulator, CycleSummary,
    DailyExpectation,
};
use crate::config::ModelConfig;
use crate::error::FeedModelError;
use crate::models::{GrowthCurve, ProductionCycle};

/// Unified read-only analysis API over one cycle and its growth curve.
pub struct CycleAnalyzer<'a> {
    cycle: &'a ProductionCycle,
    curve: &'a GrowthCurve,
    accumulator: CycleAccumulator,
}

impl<'a> CycleAnalyzer<'a> {
    /// Create an analyzer. The curve must be the cycle's growth profile.
    pub fn new(
        cycle: &'a ProductionCycle,
        curve: &'a GrowthCurve,
        config: ModelConfig,
    ) -> Result<Self, FeedModelError> {
        if curve.id() != cycle.growth_profile_id() {
            return Err(FeedModelError::ValidationError(format!(
                "Cycle {} uses growth profile {}, got {}",
                cycle.id(),
                cycle.growth_profile_id(),
                curve.id()
            )));
        }
        Ok(Self {
            cycle,
            curve,
            accumulator: CycleAccumulator::new(config),
        })
    }

    pub fn cycle(&self) -> &'a ProductionCycle {
        self.cycle
    }

    pub fn curve(&self) -> &'a GrowthCurve {
        self.curve
    }

    /// Expected feed in kg on a calendar date, scaled by the population the
    /// configured model assigns to that day.
    pub fn expected_feed_on(&self, date: NaiveDate) -> Result<f64, FeedModelError> {
        let day = day_of_cycle(self.cycle, date).ok_or_else(|| {
            FeedModelError::ValidationError(format!(
                "Date {date} precedes cycle start {}",
                self.cycle.start_date()
            ))
        })?;
        Ok(self.expected_feed_for_day(day))
    }

    pub fn expected_feed_for_day(&self, day: u32) -> f64 {
        let birds = self.accumulator.bird_count_for_day(self.cycle, day);
        ConsumptionEstimator::new(self.curve).expected_feed_kg(day, birds)
    }

    pub fn total_expected_consumption(&self) -> f64 {
        self.accumulator
            .total_expected_consumption(self.cycle, self.curve)
    }

    pub fn expected_series(&self) -> Vec<DailyExpectation> {
        self.accumulator.expected_series(self.cycle, self.curve)
    }

    pub fn summary(&self) -> Result<CycleSummary, FeedModelError> {
        CycleSummary::compute(self.cycle, self.curve, &self.accumulator)
    }

    /// Deviation statistics of actual against expected consumption at the
    /// given confidence level (e.g. 0.95).
    pub fn consumption_variance(&self, confidence: f64) -> Result<ConsumptionVariance, FeedModelError> {
        ConsumptionVariance::compute(self.cycle.ledger(), confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Breed, CurveSample, DailyRecordInput, Sex};
    use uuid::Uuid;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
    }

    fn make_curve() -> GrowthCurve {
        GrowthCurve::new(
            Uuid::from_u128(5),
            "Hubbard hembra",
            Breed::Hubbard,
            Sex::Hembra,
            vec![
                CurveSample::new(1, 11.0, 22.0, 40.0),
                CurveSample::new(8, 39.0, 70.0, 200.0),
            ],
        )
        .unwrap()
    }

    fn sample_cycle(curve: &GrowthCurve) -> ProductionCycle {
        let mut cycle = ProductionCycle::new(
            Uuid::from_u128(6),
            Uuid::from_u128(7),
            curve.id(),
            start(),
            start() + chrono::Days::new(14),
            2000,
        )
        .unwrap();
        let acc = CycleAccumulator::default();
        let actuals = [(12, 21.0, 1000.0), (8, 31.5, 0.0), (5, 40.0, 0.0)];
        for (i, (mortality, consumed, received)) in actuals.into_iter().enumerate() {
            let date = start() + chrono::Days::new(i as u64);
            acc.ingest(&mut cycle, curve, DailyRecordInput::new(date, mortality, consumed, received))
                .unwrap();
        }
        cycle
    }

    #[test]
    fn test_analyzer_rejects_foreign_curve() {
        let curve = make_curve();
        let cycle = sample_cycle(&curve);
        let other = GrowthCurve::new(
            Uuid::from_u128(99),
            "other",
            Breed::Otras,
            Sex::Mixto,
            vec![CurveSample::new(1, 1.0, 1.0, 1.0)],
        )
        .unwrap();
        assert!(CycleAnalyzer::new(&cycle, &other, ModelConfig::default()).is_err());
    }

    #[test]
    fn test_expected_feed_on_matches_day_index() {
        let curve = make_curve();
        let cycle = sample_cycle(&curve);
        let analyzer = CycleAnalyzer::new(&cycle, &curve, ModelConfig::default()).unwrap();
        let on_date = analyzer
            .expected_feed_on(start() + chrono::Days::new(3))
            .unwrap();
        assert_eq!(on_date, analyzer.expected_feed_for_day(4));
        // day 4: 11 + 3/7 * 28 = 23 g for the 1975 current birds
        assert!((on_date - 23.0 / 1000.0 * 1975.0).abs() < 1e-9);
        assert!(analyzer
            .expected_feed_on(NaiveDate::from_ymd_opt(2026, 6, 30).unwrap())
            .is_err());
    }

    #[test]
    fn test_total_matches_standalone() {
        let curve = make_curve();
        let cycle = sample_cycle(&curve);
        let analyzer = CycleAnalyzer::new(&cycle, &curve, ModelConfig::default()).unwrap();
        let standalone = CycleAccumulator::default().total_expected_consumption(&cycle, &curve);
        assert_eq!(analyzer.total_expected_consumption(), standalone);
        let series: f64 = analyzer.expected_series().iter().map(|e| e.feed_kg).sum();
        assert_eq!(series, standalone);
        assert_eq!(analyzer.expected_series().len(), 14);
    }

    #[test]
    fn test_summary_matches_standalone() {
        let curve = make_curve();
        let cycle = sample_cycle(&curve);
        let analyzer = CycleAnalyzer::new(&cycle, &curve, ModelConfig::default()).unwrap();
        let from_analyzer = analyzer.summary().unwrap();
        let from_standalone =
            CycleSummary::compute(&cycle, &curve, &CycleAccumulator::default()).unwrap();
        assert_eq!(from_analyzer.recorded_days, from_standalone.recorded_days);
        assert!((from_analyzer.reserve_kg - from_standalone.reserve_kg).abs() < 1e-9);
        assert!(
            (from_analyzer.expected_total_kg - from_standalone.expected_total_kg).abs() < 1e-9
        );
    }

    #[test]
    fn test_consumption_variance_matches_standalone() {
        let curve = make_curve();
        let cycle = sample_cycle(&curve);
        let analyzer = CycleAnalyzer::new(&cycle, &curve, ModelConfig::default()).unwrap();
        let from_analyzer = analyzer.consumption_variance(0.95).unwrap();
        let from_standalone = ConsumptionVariance::compute(cycle.ledger(), 0.95).unwrap();
        assert!(
            (from_analyzer.deviation_kg.mean - from_standalone.deviation_kg.mean).abs() < 1e-9
        );
    }

    #[test]
    fn test_analyzer_empty_ledger() {
        let curve = make_curve();
        let cycle = ProductionCycle::new(
            Uuid::from_u128(6),
            Uuid::from_u128(7),
            curve.id(),
            start(),
            start(),
            500,
        )
        .unwrap();
        let analyzer = CycleAnalyzer::new(&cycle, &curve, ModelConfig::default()).unwrap();
        assert_eq!(analyzer.total_expected_consumption(), 0.0);
        assert!(analyzer.consumption_variance(0.95).is_err());
    }
}
