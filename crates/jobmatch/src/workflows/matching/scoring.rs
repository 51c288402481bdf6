use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{MatchScore, PostingSnapshot, ProfileSnapshot};

const BASE_POINTS: u8 = 10;
const FRESH_POSTING_DAYS: i64 = 7;
const FRESH_POSTING_POINTS: u8 = 30;
const RECENT_POSTING_DAYS: i64 = 14;
const RECENT_POSTING_POINTS: u8 = 15;
const CATEGORY_POINTS: u8 = 25;
const EXPERIENCE_POINTS: u8 = 15;
const LANGUAGE_POINTS: u8 = 10;
const LOCATION_POINTS: u8 = 20;

/// (maximum wage gap, points) bands, checked in order.
const WAGE_BANDS: [(u64, u8); 3] = [(1_000, 20), (2_000, 10), (5_000, 5)];

/// Rule that contributed points to a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFactor {
    Base,
    Recency,
    WageProximity,
    Category,
    CustomerServiceExperience,
    RestaurantExperience,
    Language,
    Location,
}

/// Discrete contribution to a match score, kept for audits and UI hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: MatchFactor,
    pub points: u8,
    pub notes: String,
}

/// Capped score plus the uncapped trail of components that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchEvaluation {
    pub score: MatchScore,
    pub components: Vec<ScoreComponent>,
}

/// Keywords searched for in posting descriptions for the experience bonuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordVocabulary {
    pub customer_service: Vec<String>,
    pub food_service: Vec<String>,
}

impl Default for KeywordVocabulary {
    fn default() -> Self {
        let owned = |words: &[&str]| -> Vec<String> {
            words.iter().map(|word| word.to_string()).collect()
        };
        Self {
            customer_service: owned(&[
                "customer service",
                "接客",
                "販売",
                "reception",
                "front desk",
                "cashier",
                "hospitality",
            ]),
            food_service: owned(&[
                "restaurant",
                "飲食",
                "調理",
                "kitchen",
                "cafe",
                "café",
                "barista",
                "food",
            ]),
        }
    }
}

/// Stateless scorer applying the additive matching heuristic.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    vocabulary: KeywordVocabulary,
}

impl ScoringEngine {
    pub fn new(vocabulary: KeywordVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &KeywordVocabulary {
        &self.vocabulary
    }

    pub fn score(
        &self,
        profile: &ProfileSnapshot,
        posting: &PostingSnapshot,
        now: DateTime<Utc>,
    ) -> MatchScore {
        self.evaluate(profile, posting, now).score
    }

    pub fn evaluate(
        &self,
        profile: &ProfileSnapshot,
        posting: &PostingSnapshot,
        now: DateTime<Utc>,
    ) -> MatchEvaluation {
        let mut components = vec![ScoreComponent {
            factor: MatchFactor::Base,
            points: BASE_POINTS,
            notes: "base score".to_string(),
        }];

        let days_posted = (now - posting.created_at).num_days();
        if days_posted <= FRESH_POSTING_DAYS {
            components.push(ScoreComponent {
                factor: MatchFactor::Recency,
                points: FRESH_POSTING_POINTS,
                notes: format!("posted {days_posted} day(s) ago"),
            });
        } else if days_posted <= RECENT_POSTING_DAYS {
            components.push(ScoreComponent {
                factor: MatchFactor::Recency,
                points: RECENT_POSTING_POINTS,
                notes: format!("posted {days_posted} day(s) ago"),
            });
        }

        if let (Some(desired), Some(offered)) = (profile.desired_wage, posting.wage.min) {
            let gap = u64::from(desired.abs_diff(offered));
            if let Some((_, points)) = WAGE_BANDS.iter().find(|(limit, _)| gap <= *limit) {
                components.push(ScoreComponent {
                    factor: MatchFactor::WageProximity,
                    points: *points,
                    notes: format!("desired wage {desired} within {gap} of offered {offered}"),
                });
            }
        }

        if let Some(category) = profile
            .desired_categories
            .iter()
            .find(|category| overlaps(category, &posting.title))
        {
            components.push(ScoreComponent {
                factor: MatchFactor::Category,
                points: CATEGORY_POINTS,
                notes: format!("category '{}' matches title", category.trim()),
            });
        }

        let description = posting.description.as_str();
        if profile.customer_service_experience {
            if let Some(keyword) = first_keyword(&self.vocabulary.customer_service, description) {
                components.push(ScoreComponent {
                    factor: MatchFactor::CustomerServiceExperience,
                    points: EXPERIENCE_POINTS,
                    notes: format!("customer service experience; mentions '{keyword}'"),
                });
            }
        }

        if profile.restaurant_experience {
            if let Some(keyword) = first_keyword(&self.vocabulary.food_service, description) {
                components.push(ScoreComponent {
                    factor: MatchFactor::RestaurantExperience,
                    points: EXPERIENCE_POINTS,
                    notes: format!("food service experience; mentions '{keyword}'"),
                });
            }
        }

        if let Some(language) = profile
            .languages
            .iter()
            .find(|language| contains_ignore_case(description, language))
        {
            components.push(ScoreComponent {
                factor: MatchFactor::Language,
                points: LANGUAGE_POINTS,
                notes: format!("description mentions '{}'", language.trim()),
            });
        }

        if let (Some(address), Some(location)) = (&profile.address, &posting.location) {
            if overlaps(address, location) {
                components.push(ScoreComponent {
                    factor: MatchFactor::Location,
                    points: LOCATION_POINTS,
                    notes: format!("address overlaps posting location '{}'", location.trim()),
                });
            }
        }

        let total: i32 = components
            .iter()
            .map(|component| i32::from(component.points))
            .sum();

        MatchEvaluation {
            score: MatchScore::from_points(total),
            components,
        }
    }
}

/// Case-insensitive containment; blank needles never match.
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return false;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Substring relationship in either direction.
fn overlaps(left: &str, right: &str) -> bool {
    contains_ignore_case(left, right) || contains_ignore_case(right, left)
}

fn first_keyword<'a>(keywords: &'a [String], text: &str) -> Option<&'a str> {
    keywords
        .iter()
        .map(String::as_str)
        .find(|keyword| contains_ignore_case(text, keyword))
}
