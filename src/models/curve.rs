use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FeedModelError;

/// Broiler breed a growth profile applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Breed {
    Cobb500,
    Ross308,
    Hubbard,
    ArborAcres,
    Otras,
}

impl std::fmt::Display for Breed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Breed::Cobb500 => write!(f, "cobb500"),
            Breed::Ross308 => write!(f, "ross308"),
            Breed::Hubbard => write!(f, "hubbard"),
            Breed::ArborAcres => write!(f, "arbor_acres"),
            Breed::Otras => write!(f, "otras"),
        }
    }
}

impl std::str::FromStr for Breed {
    type Err = FeedModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        match normalized.as_str() {
            "cobb500" | "cobb" => Ok(Breed::Cobb500),
            "ross308" | "ross" => Ok(Breed::Ross308),
            "hubbard" => Ok(Breed::Hubbard),
            "arboracres" => Ok(Breed::ArborAcres),
            "otras" | "otra" | "other" => Ok(Breed::Otras),
            _ => Err(FeedModelError::ValidationError(format!(
                "Unknown breed: '{s}'"
            ))),
        }
    }
}

/// Sex of the flock a growth profile applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Macho,
    Hembra,
    Mixto,
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sex::Macho => write!(f, "macho"),
            Sex::Hembra => write!(f, "hembra"),
            Sex::Mixto => write!(f, "mixto"),
        }
    }
}

impl std::str::FromStr for Sex {
    type Err = FeedModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "macho" | "m" => Ok(Sex::Macho),
            "hembra" | "h" => Ok(Sex::Hembra),
            "mixto" | "x" => Ok(Sex::Mixto),
            _ => Err(FeedModelError::ValidationError(format!("Unknown sex: '{s}'"))),
        }
    }
}

/// One sampled checkpoint of a growth profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSample {
    /// Day of the cycle (1-based)
    pub day: u32,
    /// Feed per bird in grams
    #[serde(rename = "feedPerBird")]
    pub feed_per_bird_g: f64,
    /// Water per bird in millilitres
    #[serde(rename = "waterPerBird")]
    pub water_per_bird_ml: f64,
    /// Expected body weight in grams
    #[serde(rename = "expectedWeight")]
    pub expected_weight_g: f64,
}

impl CurveSample {
    pub fn new(day: u32, feed_per_bird_g: f64, water_per_bird_ml: f64, expected_weight_g: f64) -> Self {
        Self {
            day,
            feed_per_bird_g,
            water_per_bird_ml,
            expected_weight_g,
        }
    }

    fn validate(&self) -> Result<(), FeedModelError> {
        if self.day == 0 {
            return Err(FeedModelError::InvalidCurve(
                "sample day must be positive, got 0".to_string(),
            ));
        }
        let quantities = [
            ("feedPerBird", self.feed_per_bird_g),
            ("waterPerBird", self.water_per_bird_ml),
            ("expectedWeight", self.expected_weight_g),
        ];
        for (name, value) in quantities {
            if !value.is_finite() || value < 0.0 {
                return Err(FeedModelError::InvalidCurve(format!(
                    "Day {}: {name} must be a non-negative number, got {value}",
                    self.day
                )));
            }
        }
        Ok(())
    }
}

/// A validated breed/sex growth profile.
///
/// Samples are kept private so the ordering invariant cannot be broken after
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "crate::io::RawGrowthProfile")]
pub struct GrowthCurve {
    id: Uuid,
    name: String,
    breed: Breed,
    sex: Sex,
    samples: Vec<CurveSample>,
}

impl GrowthCurve {
    /// Build a curve, rejecting empty or non-increasing sample sequences and
    /// negative quantities.
    ///
    /// # Examples
    ///
    /// ```
    /// use poultry_feed_model::{Breed, CurveSample, GrowthCurve, Sex};
    /// use uuid::Uuid;
    ///
    /// let curve = GrowthCurve::new(
    ///     Uuid::nil(),
    ///     "Cobb 500 mixto",
    ///     Breed::Cobb500,
    ///     Sex::Mixto,
    ///     vec![
    ///         CurveSample::new(1, 12.0, 25.0, 42.0),
    ///         CurveSample::new(7, 35.0, 60.0, 185.0),
    ///     ],
    /// ).unwrap();
    /// assert_eq!(curve.sample_at(7).unwrap().feed_per_bird_g, 35.0);
    /// assert!(curve.sample_at(4).is_none());
    /// ```
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        breed: Breed,
        sex: Sex,
        samples: Vec<CurveSample>,
    ) -> Result<Self, FeedModelError> {
        if samples.is_empty() {
            return Err(FeedModelError::InvalidCurve(
                "growth curve must contain at least one sample".to_string(),
            ));
        }
        for sample in &samples {
            sample.validate()?;
        }
        if let Some(pair) = samples.windows(2).find(|w| w[1].day <= w[0].day) {
            return Err(FeedModelError::InvalidCurve(format!(
                "sample days must be strictly increasing, got day {} after day {}",
                pair[1].day, pair[0].day
            )));
        }
        Ok(Self {
            id,
            name: name.into(),
            breed,
            sex,
            samples,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn breed(&self) -> Breed {
        self.breed
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn samples(&self) -> &[CurveSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed curve.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first_day(&self) -> u32 {
        self.samples.first().map(|s| s.day).unwrap_or(0)
    }

    pub fn last_day(&self) -> u32 {
        self.samples.last().map(|s| s.day).unwrap_or(0)
    }

    /// Exact checkpoint for `day`, or `None` when the caller must interpolate.
    pub fn sample_at(&self, day: u32) -> Option<&CurveSample> {
        self.samples
            .binary_search_by_key(&day, |s| s.day)
            .ok()
            .map(|i| &self.samples[i])
    }

    /// The samples strictly before and strictly after `day`.
    pub fn bracket(&self, day: u32) -> (Option<&CurveSample>, Option<&CurveSample>) {
        bracket(&self.samples, day)
    }
}

pub(crate) fn bracket(samples: &[CurveSample], day: u32) -> (Option<&CurveSample>, Option<&CurveSample>) {
    let idx = samples.partition_point(|s| s.day < day);
    let lower = idx.checked_sub(1).and_then(|i| samples.get(i));
    let upper_idx = if samples.get(idx).is_some_and(|s| s.day == day) {
        idx + 1
    } else {
        idx
    };
    (lower, samples.get(upper_idx))
}
