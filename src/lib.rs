pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod visualization;

pub use analysis::{ConsumptionEstimator, CycleAccumulator, CycleAnalyzer, CycleSummary, FarmReport};
pub use config::{ModelConfig, PopulationModel, ShortfallPolicy};
pub use error::FeedModelError;
pub use models::{
    BirdEntry, Breed, CurveSample, CycleStatus, DailyRecord, DailyRecordInput, DailyRecordLedger,
    Finalization, GrowthCurve, ProductionCycle, Sex,
};
