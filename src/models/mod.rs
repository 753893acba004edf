mod curve;
mod entry;
mod ledger;
mod cycle;

pub use curve::{Breed, CurveSample, GrowthCurve, Sex};
pub(crate) use curve::bracket;
pub use entry::BirdEntry;
pub use ledger::{DailyRecord, DailyRecordInput, DailyRecordLedger, LedgerTotals};
pub use cycle::{CycleStatus, Finalization, ProductionCycle};
