#![no_main]

use libfuzzer_sys::fuzz_target;
use poultry_feed_model::io::{growth_curve_from_bytes, production_cycle_from_bytes};

fuzz_target!(|data: &[u8]| {
    if let Ok(curve) = growth_curve_from_bytes(data) {
        assert!(!curve.is_empty());
    }
    if let Ok(cycle) = production_cycle_from_bytes(data) {
        assert!(cycle.verify_aggregates().is_ok());
    }
});
