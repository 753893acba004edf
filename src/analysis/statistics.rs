use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::FeedModelError;
use crate::models::DailyRecordLedger;

/// Student-t confidence interval around a sample mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub mean: f64,
    pub std_error: f64,
    pub lower: f64,
    pub upper: f64,
    pub confidence_level: f64,
    pub sample_size: usize,
    /// Half-width as a percentage of the mean (0 when the mean is 0)
    pub margin_percent: f64,
}

impl ConfidenceInterval {
    /// True when zero lies inside the interval.
    pub fn contains_zero(&self) -> bool {
        self.lower <= 0.0 && self.upper >= 0.0
    }
}

/// How far actual daily consumption strays from the growth curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionVariance {
    /// Actual minus expected, kg per day
    pub deviation_kg: ConfidenceInterval,
    /// Actual minus expected as a percentage of expected, over days with a
    /// non-zero expectation
    pub deviation_percent: Option<ConfidenceInterval>,
    /// Largest absolute daily deviation in kg
    pub max_abs_deviation_kg: f64,
}

impl ConsumptionVariance {
    /// Compute deviation statistics over the effective ledger records.
    pub fn compute(ledger: &DailyRecordLedger, confidence: f64) -> Result<Self, FeedModelError> {
        let deviations: Vec<f64> = ledger
            .effective_records()
            .map(|r| r.consumption_deviation_kg())
            .collect();
        if deviations.len() < 2 {
            return Err(FeedModelError::InsufficientData(
                "Need at least 2 daily records for variance analysis".to_string(),
            ));
        }
        let percents: Vec<f64> = ledger
            .effective_records()
            .filter(|r| r.expected_consumption_kg > 0.0)
            .map(|r| r.consumption_deviation_kg() / r.expected_consumption_kg * 100.0)
            .collect();
        let deviation_percent = if percents.len() >= 2 {
            Some(compute_ci(&percents, confidence)?)
        } else {
            None
        };
        let max_abs_deviation_kg = deviations.iter().fold(0.0_f64, |m, d| m.max(d.abs()));

        Ok(Self {
            deviation_kg: compute_ci(&deviations, confidence)?,
            deviation_percent,
            max_abs_deviation_kg,
        })
    }
}

/// Compute a confidence interval from a set of values.
fn compute_ci(values: &[f64], confidence: f64) -> Result<ConfidenceInterval, FeedModelError> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(FeedModelError::AnalysisError(format!(
            "confidence must be between 0 and 1, got {confidence}"
        )));
    }
    let n = values.len();
    if n < 2 {
        return Err(FeedModelError::InsufficientData(
            "Need at least 2 observations".to_string(),
        ));
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_error = variance.sqrt() / (n as f64).sqrt();

    let df = (n - 1) as f64;
    let alpha = 1.0 - confidence;
    let t_dist =
        StudentsT::new(0.0, 1.0, df).map_err(|e| FeedModelError::AnalysisError(e.to_string()))?;
    let t_value = t_dist.inverse_cdf(1.0 - alpha / 2.0);

    let margin = t_value * std_error;
    let margin_percent = if mean.abs() > f64::EPSILON {
        (margin / mean).abs() * 100.0
    } else {
        0.0
    };

    Ok(ConfidenceInterval {
        mean,
        std_error,
        lower: mean - margin,
        upper: mean + margin,
        confidence_level: confidence,
        sample_size: n,
        margin_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::CycleAccumulator;
    use crate::models::{Breed, CurveSample, DailyRecordInput, GrowthCurve, ProductionCycle, Sex};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn flat_curve() -> GrowthCurve {
        GrowthCurve::new(
            Uuid::from_u128(1),
            "flat",
            Breed::Otras,
            Sex::Mixto,
            vec![CurveSample::new(1, 20.0, 40.0, 100.0)],
        )
        .unwrap()
    }

    /// Cycle of 1000 birds expecting 20 kg/day, with the given actuals.
    fn cycle_with_actuals(actuals: &[f64]) -> ProductionCycle {
        let curve = flat_curve();
        let start = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let mut cycle = ProductionCycle::new(
            Uuid::from_u128(2),
            Uuid::from_u128(3),
            curve.id(),
            start,
            NaiveDate::from_ymd_opt(2026, 6, 10).unwrap(),
            1000,
        )
        .unwrap();
        let acc = CycleAccumulator::default();
        for (i, actual) in actuals.iter().enumerate() {
            let date = start + chrono::Days::new(i as u64);
            acc.ingest(&mut cycle, &curve, DailyRecordInput::new(date, 0, *actual, 100.0))
                .unwrap();
        }
        cycle
    }

    // --- compute_ci tests ---

    #[test]
    fn test_compute_ci_basic() {
        let values = vec![1.5, -0.5, 2.0, 0.5, 1.0];
        let ci = compute_ci(&values, 0.95).unwrap();
        assert!((ci.mean - 0.9).abs() < 1e-9);
        assert!(ci.lower < ci.mean);
        assert!(ci.upper > ci.mean);
        assert_eq!(ci.sample_size, 5);
    }

    #[test]
    fn test_compute_ci_symmetric() {
        let values = vec![3.0, 4.0, 8.0, 1.0];
        let ci = compute_ci(&values, 0.95).unwrap();
        assert!(((ci.mean - ci.lower) - (ci.upper - ci.mean)).abs() < 1e-9);
    }

    #[test]
    fn test_compute_ci_insufficient_data() {
        assert!(compute_ci(&[4.0], 0.95).is_err());
        assert!(compute_ci(&[], 0.95).is_err());
    }

    #[test]
    fn test_compute_ci_bad_confidence() {
        let values = vec![1.0, 2.0, 3.0];
        assert!(matches!(
            compute_ci(&values, 1.0),
            Err(FeedModelError::AnalysisError(_))
        ));
        assert!(compute_ci(&values, 0.0).is_err());
        assert!(compute_ci(&values, f64::NAN).is_err());
    }

    #[test]
    fn test_compute_ci_higher_confidence_wider() {
        let values = vec![2.0, -1.0, 0.5, 1.5, 3.0, -0.5];
        let ci_90 = compute_ci(&values, 0.90).unwrap();
        let ci_99 = compute_ci(&values, 0.99).unwrap();
        assert!(ci_99.upper - ci_99.lower > ci_90.upper - ci_90.lower);
    }

    #[test]
    fn test_margin_percent_zero_mean() {
        let ci = compute_ci(&[-2.0, 2.0, -2.0, 2.0], 0.95).unwrap();
        assert_eq!(ci.margin_percent, 0.0);
        assert!(ci.contains_zero());
    }

    // --- ConsumptionVariance tests ---

    #[test]
    fn test_variance_on_target_flock() {
        let cycle = cycle_with_actuals(&[20.0, 20.0, 20.0]);
        let var = ConsumptionVariance::compute(cycle.ledger(), 0.95).unwrap();
        assert!(var.deviation_kg.mean.abs() < 1e-9);
        assert!(var.max_abs_deviation_kg < 1e-9);
        assert!(var.deviation_kg.contains_zero());
    }

    #[test]
    fn test_variance_overconsumption() {
        let cycle = cycle_with_actuals(&[22.0, 23.0, 21.0, 22.0]);
        let var = ConsumptionVariance::compute(cycle.ledger(), 0.95).unwrap();
        assert!((var.deviation_kg.mean - 2.0).abs() < 1e-9);
        assert!((var.max_abs_deviation_kg - 3.0).abs() < 1e-9);
        let pct = var.deviation_percent.unwrap();
        assert!((pct.mean - 10.0).abs() < 1e-9);
        assert!(!var.deviation_kg.contains_zero());
    }

    #[test]
    fn test_variance_needs_two_days() {
        let cycle = cycle_with_actuals(&[20.0]);
        assert!(matches!(
            ConsumptionVariance::compute(cycle.ledger(), 0.95),
            Err(FeedModelError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_variance_json_roundtrip() {
        let cycle = cycle_with_actuals(&[18.0, 19.0, 21.0]);
        let var = ConsumptionVariance::compute(cycle.ledger(), 0.90).unwrap();
        let json = serde_json::to_string(&var).unwrap();
        let back: ConsumptionVariance = serde_json::from_str(&json).unwrap();
        assert!((back.deviation_kg.mean - var.deviation_kg.mean).abs() < 1e-9);
    }
}
