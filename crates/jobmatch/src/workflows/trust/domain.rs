use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::identity::UserId;

/// Post-engagement rating on a 1 to 5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingError::OutOfRange(value))
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RatingError {
    #[error("rating {0} is outside 1..=5")]
    OutOfRange(u8),
}

/// One party's rating of another after working together. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub evaluator_id: UserId,
    pub evaluated_id: UserId,
    pub rating: Rating,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl TrustLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        }
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregate reputation for one user, recomputed from the evaluation set on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrustStats {
    pub average_rating: f64,
    pub total_evaluations: usize,
    /// Percentage of ratings at 4 or above, unrounded.
    pub rehire_rate: f64,
    pub last_work_date: Option<DateTime<Utc>>,
    pub trust_level: TrustLevel,
}

impl TrustStats {
    pub fn empty() -> Self {
        Self {
            average_rating: 0.0,
            total_evaluations: 0,
            rehire_rate: 0.0,
            last_work_date: None,
            trust_level: TrustLevel::Low,
        }
    }
}
