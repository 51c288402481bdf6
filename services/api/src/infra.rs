use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jobmatch::workflows::applications::{
    Application, ApplicationStore, CompareAndSet, DispatchError, NotificationDispatcher,
    NotificationRequest, StatusUpdate,
};
use jobmatch::workflows::matching::{
    PostingRepository, PostingSnapshot, ProfileRepository, ProfileSnapshot, WageRange,
};
use jobmatch::workflows::trust::{EvaluationRecord, EvaluationRepository, Rating};
use jobmatch::workflows::{ApplicationId, PostingId, RepositoryError, UserId};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local backing store for every collaborator trait. Applications
/// double as the applied-posting index used by recommendations.
#[derive(Default, Clone)]
pub(crate) struct InMemoryMarketplace {
    profiles: Arc<Mutex<HashMap<UserId, ProfileSnapshot>>>,
    postings: Arc<Mutex<Vec<PostingSnapshot>>>,
    applications: Arc<Mutex<HashMap<ApplicationId, Application>>>,
    evaluations: Arc<Mutex<Vec<EvaluationRecord>>>,
    outbox: Arc<Mutex<Vec<NotificationRequest>>>,
}

impl InMemoryMarketplace {
    pub(crate) fn upsert_profile(&self, profile: ProfileSnapshot) {
        let mut guard = self.profiles.lock().expect("profile mutex poisoned");
        guard.insert(profile.candidate_id.clone(), profile);
    }

    pub(crate) fn replace_postings(&self, postings: Vec<PostingSnapshot>) {
        *self.postings.lock().expect("posting mutex poisoned") = postings;
    }

    pub(crate) fn record_evaluation(&self, record: EvaluationRecord) {
        self.evaluations
            .lock()
            .expect("evaluation mutex poisoned")
            .push(record);
    }

    pub(crate) fn outbox(&self) -> Vec<NotificationRequest> {
        self.outbox.lock().expect("outbox mutex poisoned").clone()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryMarketplace {
    async fn profile(
        &self,
        candidate_id: &UserId,
    ) -> Result<Option<ProfileSnapshot>, RepositoryError> {
        let guard = self.profiles.lock().expect("profile mutex poisoned");
        Ok(guard.get(candidate_id).cloned())
    }
}

#[async_trait]
impl PostingRepository for InMemoryMarketplace {
    async fn active_postings(&self) -> Result<Vec<PostingSnapshot>, RepositoryError> {
        let guard = self.postings.lock().expect("posting mutex poisoned");
        Ok(guard.iter().filter(|posting| posting.active).cloned().collect())
    }

    async fn applied_posting_ids(
        &self,
        candidate_id: &UserId,
    ) -> Result<HashSet<PostingId>, RepositoryError> {
        let guard = self.applications.lock().expect("application mutex poisoned");
        Ok(guard
            .values()
            .filter(|application| &application.candidate_id == candidate_id)
            .map(|application| application.posting_id.clone())
            .collect())
    }
}

#[async_trait]
impl ApplicationStore for InMemoryMarketplace {
    async fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.applications.lock().expect("application mutex poisoned");
        let duplicate = guard.values().any(|existing| {
            existing.candidate_id == application.candidate_id
                && existing.posting_id == application.posting_id
        });
        if duplicate || guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    async fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.applications.lock().expect("application mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    async fn compare_and_set(
        &self,
        update: StatusUpdate,
    ) -> Result<CompareAndSet, RepositoryError> {
        let mut guard = self.applications.lock().expect("application mutex poisoned");
        let application = guard
            .get_mut(&update.application_id)
            .ok_or(RepositoryError::NotFound)?;
        if application.status != update.expected_status {
            return Ok(CompareAndSet::Conflict {
                actual: application.status,
            });
        }
        update.apply_to(application);
        Ok(CompareAndSet::Applied(application.clone()))
    }
}

/// Records notifications instead of delivering them.
#[async_trait]
impl NotificationDispatcher for InMemoryMarketplace {
    async fn dispatch(&self, notification: NotificationRequest) -> Result<(), DispatchError> {
        info!(
            recipient = %notification.recipient_id,
            application = %notification.payload.application_id,
            status = %notification.payload.new_status,
            "notification queued"
        );
        self.outbox
            .lock()
            .expect("outbox mutex poisoned")
            .push(notification);
        Ok(())
    }
}

#[async_trait]
impl EvaluationRepository for InMemoryMarketplace {
    async fn evaluations_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let guard = self.evaluations.lock().expect("evaluation mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.evaluated_id == user_id)
            .cloned()
            .collect())
    }
}

pub(crate) const DEMO_CANDIDATE: &str = "cand-aiko";
pub(crate) const DEMO_EMPLOYER: &str = "emp-kissa";

pub(crate) fn demo_profile() -> ProfileSnapshot {
    ProfileSnapshot {
        candidate_id: UserId::new(DEMO_CANDIDATE),
        desired_categories: BTreeSet::from(["barista".to_string(), "cafe".to_string()]),
        desired_wage: Some(1_200),
        customer_service_experience: true,
        restaurant_experience: true,
        languages: BTreeSet::from(["English".to_string(), "日本語".to_string()]),
        address: Some("Shibuya, Tokyo".to_string()),
    }
}

pub(crate) fn demo_postings(now: DateTime<Utc>) -> Vec<PostingSnapshot> {
    let posting = |id: &str, days_ago: i64, title: &str, description: &str, location: &str| {
        PostingSnapshot {
            id: PostingId::new(id),
            created_at: now - Duration::days(days_ago),
            title: title.to_string(),
            description: description.to_string(),
            location: Some(location.to_string()),
            wage: WageRange::default(),
            active: true,
        }
    };

    vec![
        PostingSnapshot {
            wage: WageRange {
                min: Some(1_250),
                max: Some(1_400),
            },
            ..posting(
                "p-kissa-barista",
                1,
                "Barista",
                "Neighbourhood cafe; customer service in English welcome.",
                "Shibuya",
            )
        },
        PostingSnapshot {
            wage: WageRange {
                min: Some(1_150),
                max: None,
            },
            ..posting(
                "p-izakaya-floor",
                10,
                "Floor staff",
                "Izakaya restaurant floor and register.",
                "Shinjuku",
            )
        },
        PostingSnapshot {
            wage: WageRange {
                min: Some(1_500),
                max: None,
            },
            ..posting(
                "p-hotel-desk",
                4,
                "Front desk associate",
                "Hotel reception with hospitality training.",
                "Shibuya",
            )
        },
        posting(
            "p-warehouse",
            20,
            "Warehouse associate",
            "Sorting parcels on the night shift.",
            "Kawasaki",
        ),
        PostingSnapshot {
            active: false,
            ..posting(
                "p-closed-cafe",
                2,
                "Barista (closed)",
                "Filled position.",
                "Shibuya",
            )
        },
        posting(
            "p-bakery",
            6,
            "Bakery counter",
            "Cafe counter service, food prep.",
            "Meguro",
        ),
    ]
}

/// Seed a marketplace with the demo candidate, postings, and past evaluations.
pub(crate) fn seeded_marketplace(now: DateTime<Utc>) -> InMemoryMarketplace {
    let market = InMemoryMarketplace::default();
    market.upsert_profile(demo_profile());
    market.replace_postings(demo_postings(now));

    for (index, rating) in [5u8, 5, 4, 5, 3, 5].into_iter().enumerate() {
        if let Ok(rating) = Rating::try_from(rating) {
            market.record_evaluation(EvaluationRecord {
                evaluator_id: UserId::new(format!("emp-{index:02}")),
                evaluated_id: UserId::new(DEMO_CANDIDATE),
                rating,
                created_at: now - Duration::days(30 * (index as i64 + 1)),
            });
        }
    }

    market
}

pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as an RFC 3339 timestamp ({err})"))
}
