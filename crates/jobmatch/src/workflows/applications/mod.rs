//! Application lifecycle: the status state machine, the optimistic-concurrency
//! service around it, and the HTTP surface.

pub mod domain;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ActorRole, Application, ApplicationStatus, ApplicationSubmission, FeedbackEntry,
    InterviewDetails, NotificationKind, NotificationPayload, NotificationRequest,
};
pub use lifecycle::{
    is_successor, successors, transition, withdraw, TransitionError, TransitionErrorKind,
    TransitionOutcome,
};
pub use repository::{
    ApplicationStore, ApplicationView, CompareAndSet, DispatchError, NotificationDispatcher,
    StatusUpdate,
};
pub use router::application_router;
pub use service::{ApplicationLifecycleService, LifecycleServiceError, StatusChangeRequest};

pub const DEFAULT_TRANSITION_ATTEMPTS: u8 = 3;

/// Retry policy for status writes that lose a compare-and-set race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleConfig {
    pub max_attempts: u8,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_TRANSITION_ATTEMPTS,
        }
    }
}
