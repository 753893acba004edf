//! Boundary between loosely-typed query-layer JSON and the validated domain
//! types. Nothing here touches the filesystem.

mod json_io;
mod raw;

pub use json_io::{
    growth_curve_from_bytes, production_cycle_from_bytes, read_growth_curve_json,
    read_growth_curves_json, read_production_cycle_json, write_growth_curve_json,
    write_production_cycle_json,
};
pub use raw::{RawCurveSample, RawGrowthProfile, RawProductionCycle};
