use crate::error::FeedModelError;
use crate::models::{GrowthCurve, ProductionCycle};

use super::raw::{RawGrowthProfile, RawProductionCycle};

/// Decode and validate a growth profile from query-layer JSON.
pub fn read_growth_curve_json(content: &str) -> Result<GrowthCurve, FeedModelError> {
    let raw: RawGrowthProfile = serde_json::from_str(content)?;
    GrowthCurve::try_from(raw)
}

/// Decode a JSON array of growth profiles. The first invalid profile fails
/// the whole batch.
pub fn read_growth_curves_json(content: &str) -> Result<Vec<GrowthCurve>, FeedModelError> {
    let raw: Vec<RawGrowthProfile> = serde_json::from_str(content)?;
    raw.into_iter().map(GrowthCurve::try_from).collect()
}

/// Decode a growth profile from UTF-8 JSON bytes.
pub fn growth_curve_from_bytes(data: &[u8]) -> Result<GrowthCurve, FeedModelError> {
    let content = std::str::from_utf8(data)
        .map_err(|e| FeedModelError::ValidationError(format!("Invalid UTF-8: {e}")))?;
    read_growth_curve_json(content)
}

/// Decode a production cycle, replaying its stored entries and records.
pub fn read_production_cycle_json(content: &str) -> Result<ProductionCycle, FeedModelError> {
    let raw: RawProductionCycle = serde_json::from_str(content)?;
    ProductionCycle::try_from(raw)
}

/// Decode a production cycle from UTF-8 JSON bytes.
pub fn production_cycle_from_bytes(data: &[u8]) -> Result<ProductionCycle, FeedModelError> {
    let content = std::str::from_utf8(data)
        .map_err(|e| FeedModelError::ValidationError(format!("Invalid UTF-8: {e}")))?;
    read_production_cycle_json(content)
}

pub fn write_growth_curve_json(curve: &GrowthCurve, pretty: bool) -> Result<String, FeedModelError> {
    let content = if pretty {
        serde_json::to_string_pretty(curve)?
    } else {
        serde_json::to_string(curve)?
    };
    Ok(content)
}

pub fn write_production_cycle_json(
    cycle: &ProductionCycle,
    pretty: bool,
) -> Result<String, FeedModelError> {
    let content = if pretty {
        serde_json::to_string_pretty(cycle)?
    } else {
        serde_json::to_string(cycle)?
    };
    Ok(content)
}
