use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::identity::{PostingId, UserId};

/// Structured subset of a candidate's resume used for matching.
///
/// Every field except the id is optional in practice; scoring treats an empty
/// set, `None`, or a blank string as "rule does not apply".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub candidate_id: UserId,
    #[serde(default)]
    pub desired_categories: BTreeSet<String>,
    #[serde(default)]
    pub desired_wage: Option<u32>,
    #[serde(default)]
    pub customer_service_experience: bool,
    #[serde(default)]
    pub restaurant_experience: bool,
    #[serde(default)]
    pub languages: BTreeSet<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Offered wage band. Either bound may be missing on loosely filled postings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WageRange {
    #[serde(default)]
    pub min: Option<u32>,
    #[serde(default)]
    pub max: Option<u32>,
}

/// Open job listing as supplied by the posting repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingSnapshot {
    pub id: PostingId,
    pub created_at: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub wage: WageRange,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Heuristic ranking value, always within `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MatchScore(u8);

impl MatchScore {
    pub const MAX: u8 = 100;

    /// Clamp a raw point tally into the score range.
    pub fn from_points(points: i32) -> Self {
        Self(points.clamp(0, i32::from(Self::MAX)) as u8)
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<MatchScore> for u8 {
    fn from(score: MatchScore) -> Self {
        score.0
    }
}
