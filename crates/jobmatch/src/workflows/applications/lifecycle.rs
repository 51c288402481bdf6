//! Application status state machine.
//!
//! Employers move an application forward one step at a time:
//!
//! ```text
//! pending              -> reviewing | rejected
//! reviewing            -> interview_scheduled | rejected
//! interview_scheduled  -> interview_completed | rejected
//! interview_completed  -> offer_sent | rejected
//! offer_sent           -> accepted | rejected
//! ```
//!
//! Candidates may withdraw from any non-terminal state. `accepted`, `rejected`
//! and `withdrawn` are terminal.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    ActorRole, Application, ApplicationStatus, FeedbackEntry, NotificationKind,
    NotificationPayload, NotificationRequest,
};
use crate::workflows::identity::UserId;

/// Statuses an employer may move an application to from `status`.
pub const fn successors(status: ApplicationStatus) -> &'static [ApplicationStatus] {
    use ApplicationStatus::*;

    match status {
        Pending => &[Reviewing, Rejected],
        Reviewing => &[InterviewScheduled, Rejected],
        InterviewScheduled => &[InterviewCompleted, Rejected],
        InterviewCompleted => &[OfferSent, Rejected],
        OfferSent => &[Accepted, Rejected],
        Accepted | Rejected | Withdrawn => &[],
    }
}

pub fn is_successor(from: ApplicationStatus, to: ApplicationStatus) -> bool {
    successors(from).contains(&to)
}

/// Broad classes of rejected transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionErrorKind {
    InvalidTransition,
    TerminalState,
}

/// Reason a requested status change was refused. No state is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot move application from {from} to {to}")]
    NotASuccessor {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("{actor} may not move application from {from} to {to}")]
    ActorNotPermitted {
        actor: ActorRole,
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("application is already {status} and accepts no further transitions")]
    TerminalState { status: ApplicationStatus },
}

impl TransitionError {
    pub fn kind(&self) -> TransitionErrorKind {
        match self {
            TransitionError::NotASuccessor { .. } | TransitionError::ActorNotPermitted { .. } => {
                TransitionErrorKind::InvalidTransition
            }
            TransitionError::TerminalState { .. } => TransitionErrorKind::TerminalState,
        }
    }
}

/// Updated application, the log entry appended to it, and the notification
/// describing the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionOutcome {
    pub application: Application,
    pub entry: FeedbackEntry,
    pub notification: NotificationRequest,
}

/// Move `application` to `requested` on behalf of `actor`.
///
/// Only direct employer edges are accepted; use [`withdraw`] for candidates.
pub fn transition(
    application: &Application,
    actor: ActorRole,
    requested: ApplicationStatus,
    feedback: Option<&str>,
    now: DateTime<Utc>,
) -> Result<TransitionOutcome, TransitionError> {
    let from = application.status;
    if from.is_terminal() {
        return Err(TransitionError::TerminalState { status: from });
    }
    if !is_successor(from, requested) {
        return Err(TransitionError::NotASuccessor {
            from,
            to: requested,
        });
    }
    if actor != ActorRole::Employer {
        return Err(TransitionError::ActorNotPermitted {
            actor,
            from,
            to: requested,
        });
    }

    let recipient = application.candidate_id.clone();
    Ok(apply(application, actor, requested, feedback, now, recipient))
}

/// Withdraw an application on the candidate's behalf; the employer is notified.
pub fn withdraw(
    application: &Application,
    actor: ActorRole,
    reason: Option<&str>,
    now: DateTime<Utc>,
) -> Result<TransitionOutcome, TransitionError> {
    let from = application.status;
    if from.is_terminal() {
        return Err(TransitionError::TerminalState { status: from });
    }
    if actor != ActorRole::Candidate {
        return Err(TransitionError::ActorNotPermitted {
            actor,
            from,
            to: ApplicationStatus::Withdrawn,
        });
    }

    let recipient = application.employer_id.clone();
    Ok(apply(
        application,
        actor,
        ApplicationStatus::Withdrawn,
        reason,
        now,
        recipient,
    ))
}

fn apply(
    application: &Application,
    actor: ActorRole,
    status: ApplicationStatus,
    feedback: Option<&str>,
    now: DateTime<Utc>,
    recipient_id: UserId,
) -> TransitionOutcome {
    let entry = FeedbackEntry {
        status,
        actor,
        text: feedback
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned),
        recorded_at: now,
    };
    let mut updated = application.clone();
    updated.status = status;
    updated.updated_at = Some(now);
    updated.feedback.push(entry.clone());

    let notification = NotificationRequest {
        recipient_id,
        kind: NotificationKind::StatusChanged,
        payload: NotificationPayload {
            application_id: application.id.clone(),
            posting_id: application.posting_id.clone(),
            previous_status: application.status,
            new_status: status,
        },
    };

    TransitionOutcome {
        application: updated,
        entry,
        notification,
    }
}
