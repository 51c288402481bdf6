use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::workflows::identity::{PostingId, UserId};
use crate::workflows::matching::domain::{PostingSnapshot, ProfileSnapshot, WageRange};
use crate::workflows::matching::repository::{PostingRepository, ProfileRepository};
use crate::workflows::matching::{MatchingConfig, MatchingService};
use crate::workflows::repository::RepositoryError;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub(super) fn bare_profile() -> ProfileSnapshot {
    ProfileSnapshot {
        candidate_id: UserId::new("cand-1"),
        ..ProfileSnapshot::default()
    }
}

pub(super) fn barista_profile() -> ProfileSnapshot {
    ProfileSnapshot {
        candidate_id: UserId::new("cand-1"),
        desired_categories: set(&["barista"]),
        desired_wage: Some(12_000),
        ..ProfileSnapshot::default()
    }
}

pub(super) fn posting(id: &str, days_ago: i64) -> PostingSnapshot {
    PostingSnapshot {
        id: PostingId::new(id),
        created_at: now() - Duration::days(days_ago),
        title: "Warehouse associate".to_string(),
        description: "Sorting and packing parcels.".to_string(),
        location: Some("Kawasaki".to_string()),
        wage: WageRange {
            min: Some(30_000),
            max: None,
        },
        active: true,
    }
}

pub(super) fn barista_posting(id: &str, days_ago: i64) -> PostingSnapshot {
    PostingSnapshot {
        title: "Barista (weekday mornings)".to_string(),
        description: "Espresso bar near the station.".to_string(),
        wage: WageRange {
            min: Some(12_500),
            max: Some(14_000),
        },
        ..posting(id, days_ago)
    }
}

pub(super) fn applied(ids: &[&str]) -> HashSet<PostingId> {
    ids.iter().map(|id| PostingId::new(*id)).collect()
}

pub(super) fn build_service(
    profiles: Vec<ProfileSnapshot>,
    postings: Vec<PostingSnapshot>,
) -> (
    MatchingService<MemoryProfiles, MemoryPostings>,
    Arc<MemoryPostings>,
) {
    let profiles = Arc::new(MemoryProfiles::with(profiles));
    let postings = Arc::new(MemoryPostings::with(postings));
    let service = MatchingService::new(profiles, postings.clone(), MatchingConfig::default());
    (service, postings)
}

#[derive(Default)]
pub(super) struct MemoryProfiles {
    profiles: Mutex<HashMap<UserId, ProfileSnapshot>>,
}

impl MemoryProfiles {
    pub(super) fn with(profiles: Vec<ProfileSnapshot>) -> Self {
        let map = profiles
            .into_iter()
            .map(|profile| (profile.candidate_id.clone(), profile))
            .collect();
        Self {
            profiles: Mutex::new(map),
        }
    }
}

#[async_trait]
impl ProfileRepository for MemoryProfiles {
    async fn profile(
        &self,
        candidate_id: &UserId,
    ) -> Result<Option<ProfileSnapshot>, RepositoryError> {
        let guard = self.profiles.lock().expect("profile mutex poisoned");
        Ok(guard.get(candidate_id).cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryPostings {
    postings: Mutex<Vec<PostingSnapshot>>,
    applied: Mutex<HashMap<UserId, HashSet<PostingId>>>,
}

impl MemoryPostings {
    pub(super) fn with(postings: Vec<PostingSnapshot>) -> Self {
        Self {
            postings: Mutex::new(postings),
            applied: Mutex::default(),
        }
    }

    pub(super) fn record_application(&self, candidate_id: &str, posting_id: &str) {
        self.applied
            .lock()
            .expect("applied mutex poisoned")
            .entry(UserId::new(candidate_id))
            .or_default()
            .insert(PostingId::new(posting_id));
    }
}

#[async_trait]
impl PostingRepository for MemoryPostings {
    async fn active_postings(&self) -> Result<Vec<PostingSnapshot>, RepositoryError> {
        let guard = self.postings.lock().expect("posting mutex poisoned");
        Ok(guard.iter().filter(|posting| posting.active).cloned().collect())
    }

    async fn applied_posting_ids(
        &self,
        candidate_id: &UserId,
    ) -> Result<HashSet<PostingId>, RepositoryError> {
        let guard = self.applied.lock().expect("applied mutex poisoned");
        Ok(guard.get(candidate_id).cloned().unwrap_or_default())
    }
}

pub(super) struct UnavailablePostings;

#[async_trait]
impl PostingRepository for UnavailablePostings {
    async fn active_postings(&self) -> Result<Vec<PostingSnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("posting index offline".to_string()))
    }

    async fn applied_posting_ids(
        &self,
        _candidate_id: &UserId,
    ) -> Result<HashSet<PostingId>, RepositoryError> {
        Err(RepositoryError::Unavailable("posting index offline".to_string()))
    }
}
