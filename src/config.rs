use serde::{Deserialize, Serialize};

use crate::error::FeedModelError;

/// How the bird count for a given day of the cycle is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationModel {
    /// Initial count on day 1, latest current count on every later day.
    #[default]
    Snapshot,
    /// Initial count plus entries to date minus mortality recorded before the day.
    Ledger,
}

/// What the accumulator does when a record would drive the reserve negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortfallPolicy {
    /// Return `FeedModelError::ReserveShortfall` and leave the cycle untouched.
    #[default]
    Reject,
    /// Append the record, mark it, and report the shortfall in the result.
    Flag,
}

/// Tunable behaviour of the accumulator.
///
/// ```
/// use poultry_feed_model::config::{ModelConfig, PopulationModel, ShortfallPolicy};
///
/// let config = ModelConfig::from_toml_str(r#"
///     population_model = "ledger"
///     shortfall_policy = "flag"
/// "#).unwrap();
/// assert_eq!(config.population_model, PopulationModel::Ledger);
/// assert_eq!(config.shortfall_policy, ShortfallPolicy::Flag);
/// assert_eq!(config.reserve_tolerance_kg, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub population_model: PopulationModel,
    pub shortfall_policy: ShortfallPolicy,
    /// Reserve may dip this many kg below zero before it counts as a shortfall.
    pub reserve_tolerance_kg: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            population_model: PopulationModel::Snapshot,
            shortfall_policy: ShortfallPolicy::Reject,
            reserve_tolerance_kg: 0.0,
        }
    }
}

impl ModelConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, FeedModelError> {
        let config: ModelConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FeedModelError> {
        if !self.reserve_tolerance_kg.is_finite() || self.reserve_tolerance_kg < 0.0 {
            return Err(FeedModelError::ValidationError(format!(
                "reserve_tolerance_kg must be a non-negative number, got {}",
                self.reserve_tolerance_kg
            )));
        }
        Ok(())
    }
}
