use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use super::domain::{
    ActorRole, Application, ApplicationStatus, ApplicationSubmission, InterviewDetails,
};
use super::lifecycle::{self, TransitionError, TransitionOutcome};
use super::repository::{ApplicationStore, CompareAndSet, NotificationDispatcher, StatusUpdate};
use super::LifecycleConfig;
use crate::workflows::identity::ApplicationId;
use crate::workflows::repository::RepositoryError;

/// Status change requested through the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusChangeRequest {
    pub actor: ActorRole,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub feedback: Option<String>,
    /// Recorded only when moving to `interview_scheduled`.
    #[serde(default)]
    pub interview: Option<InterviewDetails>,
}

/// Service applying lifecycle transitions against the store with optimistic
/// concurrency, then handing the resulting notification to the dispatcher.
pub struct ApplicationLifecycleService<S, N> {
    store: Arc<S>,
    notifications: Arc<N>,
    config: LifecycleConfig,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<S, N> ApplicationLifecycleService<S, N>
where
    S: ApplicationStore + 'static,
    N: NotificationDispatcher + 'static,
{
    pub fn new(store: Arc<S>, notifications: Arc<N>, config: LifecycleConfig) -> Self {
        Self {
            store,
            notifications,
            config,
        }
    }

    /// Record a new application in the `pending` state.
    pub async fn submit(
        &self,
        submission: ApplicationSubmission,
        now: DateTime<Utc>,
    ) -> Result<Application, LifecycleServiceError> {
        let application = Application::submitted(next_application_id(), submission, now);
        let stored = self.store.insert(application).await?;
        info!(
            application = %stored.id,
            posting = %stored.posting_id,
            candidate = %stored.candidate_id,
            "application submitted"
        );
        Ok(stored)
    }

    pub async fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Application, LifecycleServiceError> {
        let application = self
            .store
            .fetch(application_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(application)
    }

    /// Move an application along an employer edge.
    pub async fn update_status(
        &self,
        application_id: &ApplicationId,
        request: StatusChangeRequest,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, LifecycleServiceError> {
        self.apply_with_retry(application_id, now, |current| {
            let mut outcome = lifecycle::transition(
                current,
                request.actor,
                request.status,
                request.feedback.as_deref(),
                now,
            )?;
            if request.status == ApplicationStatus::InterviewScheduled {
                if let Some(details) = &request.interview {
                    outcome.application.interview = Some(details.clone());
                }
            }
            Ok(outcome)
        })
        .await
    }

    /// Withdraw on the candidate's behalf from any non-terminal state.
    pub async fn withdraw(
        &self,
        application_id: &ApplicationId,
        actor: ActorRole,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, LifecycleServiceError> {
        self.apply_with_retry(application_id, now, |current| {
            lifecycle::withdraw(current, actor, reason, now)
        })
        .await
    }

    async fn apply_with_retry<F>(
        &self,
        application_id: &ApplicationId,
        now: DateTime<Utc>,
        step: F,
    ) -> Result<TransitionOutcome, LifecycleServiceError>
    where
        F: Fn(&Application) -> Result<TransitionOutcome, TransitionError>,
    {
        let attempts = self.config.max_attempts.max(1);

        for attempt in 1..=attempts {
            let current = self.get(application_id).await?;
            let outcome = step(&current)?;
            let update = StatusUpdate::from_outcome(&outcome);

            match self.store.compare_and_set(update).await? {
                CompareAndSet::Applied(stored) => {
                    info!(
                        application = %application_id,
                        from = %outcome.notification.payload.previous_status,
                        to = %stored.status,
                        actor = %outcome.entry.actor,
                        attempt,
                        at = %now,
                        "application status updated"
                    );
                    let outcome = TransitionOutcome {
                        application: stored,
                        ..outcome
                    };
                    self.dispatch(&outcome).await;
                    return Ok(outcome);
                }
                CompareAndSet::Conflict { actual } => {
                    warn!(
                        application = %application_id,
                        expected = %current.status,
                        actual = %actual,
                        attempt,
                        "application changed concurrently"
                    );
                }
            }
        }

        Err(LifecycleServiceError::ConcurrentModification {
            application_id: application_id.clone(),
            attempts,
        })
    }

    /// Delivery failures are logged only; the committed outcome still carries
    /// the notification so the caller can resend it.
    async fn dispatch(&self, outcome: &TransitionOutcome) {
        let notification = outcome.notification.clone();
        let recipient = notification.recipient_id.clone();
        if let Err(error) = self.notifications.dispatch(notification).await {
            warn!(
                application = %outcome.application.id,
                recipient = %recipient,
                %error,
                "status change stored but notification dispatch failed"
            );
        }
    }
}

/// Error raised by the lifecycle service.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleServiceError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("application {application_id} changed concurrently on all {attempts} attempts")]
    ConcurrentModification {
        application_id: ApplicationId,
        attempts: u8,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
