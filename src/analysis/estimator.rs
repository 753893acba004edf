use serde::{Deserialize, Serialize};

use crate::models::{bracket, CurveSample, GrowthCurve};

/// Which per-bird quantity of a sample to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveMetric {
    /// Feed per bird in grams
    Feed,
    /// Water per bird in millilitres
    Water,
    /// Expected body weight in grams
    Weight,
}

impl CurveMetric {
    fn of(self, sample: &CurveSample) -> f64 {
        match self {
            CurveMetric::Feed => sample.feed_per_bird_g,
            CurveMetric::Water => sample.water_per_bird_ml,
            CurveMetric::Weight => sample.expected_weight_g,
        }
    }
}

/// Per-bird rate for `day`: the exact sample, a linear blend of the two
/// neighbouring samples, or the nearest boundary sample held constant.
/// An empty slice yields 0.
pub fn per_bird_rate(samples: &[CurveSample], day: u32, metric: CurveMetric) -> f64 {
    if let Ok(i) = samples.binary_search_by_key(&day, |s| s.day) {
        return metric.of(&samples[i]);
    }
    match bracket(samples, day) {
        (Some(lower), Some(upper)) => {
            let ratio = f64::from(day - lower.day) / f64::from(upper.day - lower.day);
            let low = metric.of(lower);
            low + ratio * (metric.of(upper) - low)
        }
        (Some(lower), None) => metric.of(lower),
        (None, Some(upper)) => metric.of(upper),
        (None, None) => 0.0,
    }
}

/// Expected consumption for one day of a growth curve.
///
/// Range aggregation in [`crate::analysis::CycleAccumulator`] calls the same
/// methods, so a single-day query and a summed range never disagree.
#[derive(Debug, Clone, Copy)]
pub struct ConsumptionEstimator<'a> {
    curve: &'a GrowthCurve,
}

impl<'a> ConsumptionEstimator<'a> {
    pub fn new(curve: &'a GrowthCurve) -> Self {
        Self { curve }
    }

    pub fn curve(&self) -> &'a GrowthCurve {
        self.curve
    }

    pub fn per_bird(&self, day: u32, metric: CurveMetric) -> f64 {
        per_bird_rate(self.curve.samples(), day, metric)
    }

    /// Expected feed in kg for `bird_count` birds on `day`.
    ///
    /// # Examples
    ///
    /// ```
    /// use poultry_feed_model::{Breed, ConsumptionEstimator, CurveSample, GrowthCurve, Sex};
    /// use uuid::Uuid;
    ///
    /// let curve = GrowthCurve::new(
    ///     Uuid::nil(), "example", Breed::Cobb500, Sex::Mixto,
    ///     vec![CurveSample::new(1, 12.0, 0.0, 0.0), CurveSample::new(7, 35.0, 0.0, 0.0)],
    /// ).unwrap();
    /// let kg = ConsumptionEstimator::new(&curve).expected_feed_kg(4, 1000);
    /// assert!((kg - 23.5).abs() < 1e-9);
    /// ```
    pub fn expected_feed_kg(&self, day: u32, bird_count: u32) -> f64 {
        self.per_bird(day, CurveMetric::Feed) / 1000.0 * f64::from(bird_count)
    }

    /// Expected water in litres for `bird_count` birds on `day`.
    pub fn expected_water_liters(&self, day: u32, bird_count: u32) -> f64 {
        self.per_bird(day, CurveMetric::Water) / 1000.0 * f64::from(bird_count)
    }

    /// Expected body weight of one bird in grams on `day`.
    pub fn expected_weight_g(&self, day: u32) -> f64 {
        self.per_bird(day, CurveMetric::Weight)
    }
}
