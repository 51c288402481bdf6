use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    Application, ApplicationStatus, FeedbackEntry, InterviewDetails, NotificationRequest,
};
use super::lifecycle::TransitionOutcome;
use crate::workflows::identity::{ApplicationId, PostingId, UserId};
use crate::workflows::repository::RepositoryError;

/// Conditional status write: applied only while the stored status still equals
/// `expected_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub application_id: ApplicationId,
    pub expected_status: ApplicationStatus,
    pub new_status: ApplicationStatus,
    pub feedback: FeedbackEntry,
    pub updated_at: DateTime<Utc>,
    pub interview: Option<InterviewDetails>,
}

impl StatusUpdate {
    /// Build the write that persists `outcome`, guarded on the status it started from.
    pub fn from_outcome(outcome: &TransitionOutcome) -> Self {
        Self {
            application_id: outcome.application.id.clone(),
            expected_status: outcome.notification.payload.previous_status,
            new_status: outcome.application.status,
            feedback: outcome.entry.clone(),
            updated_at: outcome.entry.recorded_at,
            interview: outcome.application.interview.clone(),
        }
    }

    /// Apply the update to a stored record whose status already matched.
    pub fn apply_to(&self, application: &mut Application) {
        application.status = self.new_status;
        application.updated_at = Some(self.updated_at);
        application.feedback.push(self.feedback.clone());
        if self.interview.is_some() {
            application.interview = self.interview.clone();
        }
    }
}

/// Result of a compare-and-set against the application store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareAndSet {
    Applied(Application),
    /// Stored status no longer matched; carries what was found instead.
    Conflict { actual: ApplicationStatus },
}

/// Storage abstraction for applications; writes after submission go through
/// [`ApplicationStore::compare_and_set`] only.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, application: Application) -> Result<Application, RepositoryError>;

    async fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;

    async fn compare_and_set(&self, update: StatusUpdate)
        -> Result<CompareAndSet, RepositoryError>;
}

/// Outbound hook for notification delivery (push, e-mail, in-app inbox).
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: NotificationRequest) -> Result<(), DispatchError>;
}

/// Notification dispatch error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Representation of an application exposed over HTTP.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub application_id: ApplicationId,
    pub posting_id: PostingId,
    pub candidate_id: UserId,
    pub employer_id: UserId,
    pub status: &'static str,
    pub is_terminal: bool,
    pub applied_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview: Option<InterviewDetails>,
    pub history: Vec<FeedbackEntry>,
}

impl From<&Application> for ApplicationView {
    fn from(application: &Application) -> Self {
        Self {
            application_id: application.id.clone(),
            posting_id: application.posting_id.clone(),
            candidate_id: application.candidate_id.clone(),
            employer_id: application.employer_id.clone(),
            status: application.status.label(),
            is_terminal: application.status.is_terminal(),
            applied_at: application.applied_at,
            updated_at: application.updated_at,
            latest_feedback: application.latest_feedback().map(str::to_owned),
            interview: application.interview.clone(),
            history: application.feedback.clone(),
        }
    }
}
