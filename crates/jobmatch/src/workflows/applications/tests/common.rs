use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::applications::domain::{
    Application, ApplicationStatus, ApplicationSubmission, NotificationRequest,
};
use crate::workflows::applications::repository::{
    ApplicationStore, CompareAndSet, DispatchError, NotificationDispatcher, StatusUpdate,
};
use crate::workflows::applications::{ApplicationLifecycleService, LifecycleConfig};
use crate::workflows::identity::{ApplicationId, PostingId, UserId};
use crate::workflows::repository::RepositoryError;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn submission() -> ApplicationSubmission {
    ApplicationSubmission {
        posting_id: PostingId::new("p-barista"),
        candidate_id: UserId::new("cand-1"),
        employer_id: UserId::new("emp-1"),
    }
}

pub(super) fn build_service() -> (
    ApplicationLifecycleService<MemoryStore, MemoryDispatcher>,
    Arc<MemoryStore>,
    Arc<MemoryDispatcher>,
) {
    let store = Arc::new(MemoryStore::default());
    let dispatcher = Arc::new(MemoryDispatcher::default());
    let service = ApplicationLifecycleService::new(
        store.clone(),
        dispatcher.clone(),
        LifecycleConfig::default(),
    );
    (service, store, dispatcher)
}

#[derive(Default)]
pub(super) struct MemoryStore {
    applications: Mutex<HashMap<ApplicationId, Application>>,
}

impl MemoryStore {
    /// Overwrite the stored status as a competing writer would.
    pub(super) fn force_status(&self, id: &ApplicationId, status: ApplicationStatus) {
        let mut guard = self.applications.lock().expect("store mutex poisoned");
        if let Some(application) = guard.get_mut(id) {
            application.status = status;
        }
    }

    pub(super) fn stored(&self, id: &ApplicationId) -> Option<Application> {
        let guard = self.applications.lock().expect("store mutex poisoned");
        guard.get(id).cloned()
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.applications.lock().expect("store mutex poisoned");
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
        let guard = self.applications.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    async fn compare_and_set(
        &self,
        update: StatusUpdate,
    ) -> Result<CompareAndSet, RepositoryError> {
        let mut guard = self.applications.lock().expect("store mutex poisoned");
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

/// Store where another writer sneaks in a status change before the next
/// compare-and-set lands.
pub(super) struct RacingStore {
    pub(super) inner: MemoryStore,
    interference: Mutex<Option<ApplicationStatus>>,
}

impl RacingStore {
    pub(super) fn interfering_with(status: ApplicationStatus) -> Self {
        Self {
            inner: MemoryStore::default(),
            interference: Mutex::new(Some(status)),
        }
    }
}

#[async_trait]
impl ApplicationStore for RacingStore {
    async fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        self.inner.insert(application).await
    }

    async fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.inner.fetch(id).await
    }

    async fn compare_and_set(
        &self,
        update: StatusUpdate,
    ) -> Result<CompareAndSet, RepositoryError> {
        let interference = self
            .interference
            .lock()
            .expect("interference mutex poisoned")
            .take();
        if let Some(status) = interference {
            self.inner.force_status(&update.application_id, status);
        }
        self.inner.compare_and_set(update).await
    }
}

/// Store whose conditional writes always lose.
#[derive(Default)]
pub(super) struct ContendedStore {
    pub(super) inner: MemoryStore,
    attempts: AtomicUsize,
}

impl ContendedStore {
    pub(super) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ApplicationStore for ContendedStore {
    async fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        self.inner.insert(application).await
    }

    async fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.inner.fetch(id).await
    }

    async fn compare_and_set(
        &self,
        update: StatusUpdate,
    ) -> Result<CompareAndSet, RepositoryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Ok(CompareAndSet::Conflict {
            actual: update.expected_status,
        })
    }
}

pub(super) struct UnavailableStore;

#[async_trait]
impl ApplicationStore for UnavailableStore {
    async fn insert(&self, _application: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("application store offline".to_string()))
    }

    async fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("application store offline".to_string()))
    }

    async fn compare_and_set(
        &self,
        _update: StatusUpdate,
    ) -> Result<CompareAndSet, RepositoryError> {
        Err(RepositoryError::Unavailable("application store offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryDispatcher {
    sent: Mutex<Vec<NotificationRequest>>,
}

impl MemoryDispatcher {
    pub(super) fn sent(&self) -> Vec<NotificationRequest> {
        self.sent.lock().expect("dispatcher mutex poisoned").clone()
    }
}

#[async_trait]
impl NotificationDispatcher for MemoryDispatcher {
    async fn dispatch(&self, notification: NotificationRequest) -> Result<(), DispatchError> {
        self.sent
            .lock()
            .expect("dispatcher mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct FailingDispatcher;

#[async_trait]
impl NotificationDispatcher for FailingDispatcher {
    async fn dispatch(&self, _notification: NotificationRequest) -> Result<(), DispatchError> {
        Err(DispatchError::Transport("push gateway down".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
