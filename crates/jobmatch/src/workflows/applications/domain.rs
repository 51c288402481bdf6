use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::identity::{ApplicationId, PostingId, UserId};

/// Position of an application in the hiring workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    InterviewScheduled,
    InterviewCompleted,
    OfferSent,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Pending,
            Self::Reviewing,
            Self::InterviewScheduled,
            Self::InterviewCompleted,
            Self::OfferSent,
            Self::Accepted,
            Self::Rejected,
            Self::Withdrawn,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::InterviewScheduled => "interview_scheduled",
            Self::InterviewCompleted => "interview_completed",
            Self::OfferSent => "offer_sent",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Withdrawn)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Party requesting a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Employer,
    Candidate,
}

impl ActorRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Employer => "employer",
            Self::Candidate => "candidate",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry in an application's feedback log; written on every applied transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub status: ApplicationStatus,
    pub actor: ActorRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewDetails {
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A candidate's submission against one posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub posting_id: PostingId,
    pub candidate_id: UserId,
    pub employer_id: UserId,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub feedback: Vec<FeedbackEntry>,
    #[serde(default)]
    pub interview: Option<InterviewDetails>,
}

impl Application {
    /// Freshly submitted application in the `pending` state.
    pub fn submitted(
        id: ApplicationId,
        submission: ApplicationSubmission,
        applied_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            posting_id: submission.posting_id,
            candidate_id: submission.candidate_id,
            employer_id: submission.employer_id,
            status: ApplicationStatus::Pending,
            applied_at,
            updated_at: None,
            feedback: Vec::new(),
            interview: None,
        }
    }

    pub fn latest_feedback(&self) -> Option<&str> {
        self.feedback
            .iter()
            .rev()
            .find_map(|entry| entry.text.as_deref())
    }
}

/// Payload accepted when a candidate applies to a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub posting_id: PostingId,
    pub candidate_id: UserId,
    pub employer_id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    StatusChanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub application_id: ApplicationId,
    pub posting_id: PostingId,
    pub previous_status: ApplicationStatus,
    pub new_status: ApplicationStatus,
}

/// Notification the caller should hand to a dispatcher; never delivered here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub recipient_id: UserId,
    pub kind: NotificationKind,
    pub payload: NotificationPayload,
}
