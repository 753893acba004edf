use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Breed;
use crate::error::FeedModelError;

/// Birds added to a shed already tied to a running cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirdEntry {
    pub id: Uuid,
    pub cycle_id: Uuid,
    pub farm_id: Uuid,
    pub entry_date: NaiveDate,
    /// Number of birds added
    pub quantity: u32,
    /// Shed the birds were housed in (1-based)
    pub shed_number: u32,
    pub breed: Breed,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BirdEntry {
    /// Validate the entry on its own. Cycle membership is checked by the cycle.
    pub fn validate(&self) -> Result<(), FeedModelError> {
        if self.quantity == 0 {
            return Err(FeedModelError::ValidationError(format!(
                "Bird entry {}: quantity must be positive",
                self.id
            )));
        }
        if self.shed_number == 0 {
            return Err(FeedModelError::ValidationError(format!(
                "Bird entry {}: shed number must be positive",
                self.id
            )));
        }
        Ok(())
    }
}
