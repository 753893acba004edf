mod accumulator;
mod analyzer;
mod estimator;
mod report;
mod statistics;

pub use accumulator::{
    day_of_cycle, elapsed_days, CycleAccumulator, DailyExpectation, Reconciliation,
    ReserveShortfall,
};
pub use analyzer::CycleAnalyzer;
pub use estimator::{per_bird_rate, ConsumptionEstimator, CurveMetric};
pub use report::{CycleSummary, FarmReport};
pub use statistics::{ConfidenceInterval, ConsumptionVariance};
