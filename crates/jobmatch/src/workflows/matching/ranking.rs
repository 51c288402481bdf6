use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use super::domain::{MatchScore, PostingSnapshot, ProfileSnapshot};
use super::scoring::ScoringEngine;
use crate::workflows::identity::PostingId;

pub const DEFAULT_PREVIEW_LEN: usize = 5;

/// Posting paired with the score it was ranked by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedPosting {
    pub posting: PostingSnapshot,
    pub score: MatchScore,
}

/// Full ranked list plus the preview boundary for progressive disclosure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendations {
    ranked: Vec<RankedPosting>,
    preview_len: usize,
}

impl Recommendations {
    pub fn preview(&self) -> &[RankedPosting] {
        &self.ranked[..self.ranked.len().min(self.preview_len)]
    }

    pub fn all(&self) -> &[RankedPosting] {
        &self.ranked
    }

    /// Whether the full list holds more than the preview shows.
    pub fn has_more(&self) -> bool {
        self.ranked.len() > self.preview_len
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Filters out inactive and already-applied postings, then orders the rest by score.
#[derive(Debug, Clone)]
pub struct RecommendationRanker {
    engine: ScoringEngine,
    preview_len: usize,
}

impl Default for RecommendationRanker {
    fn default() -> Self {
        Self::new(ScoringEngine::default(), DEFAULT_PREVIEW_LEN)
    }
}

impl RecommendationRanker {
    pub fn new(engine: ScoringEngine, preview_len: usize) -> Self {
        Self {
            engine,
            preview_len,
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn rank(
        &self,
        profile: &ProfileSnapshot,
        postings: &[PostingSnapshot],
        applied: &HashSet<PostingId>,
        now: DateTime<Utc>,
    ) -> Recommendations {
        let mut ranked: Vec<RankedPosting> = postings
            .par_iter()
            .filter(|posting| posting.active && !applied.contains(&posting.id))
            .map(|posting| RankedPosting {
                score: self.engine.score(profile, posting, now),
                posting: posting.clone(),
            })
            .collect();

        ranked.sort_by(compare_ranked);

        Recommendations {
            ranked,
            preview_len: self.preview_len,
        }
    }
}

/// Score descending, then newer postings first, then id ascending.
fn compare_ranked(left: &RankedPosting, right: &RankedPosting) -> Ordering {
    right
        .score
        .cmp(&left.score)
        .then_with(|| right.posting.created_at.cmp(&left.posting.created_at))
        .then_with(|| left.posting.id.cmp(&right.posting.id))
}
