use std::sync::Arc;

use super::common::*;
use crate::workflows::applications::domain::{
    ActorRole, Application, ApplicationStatus, InterviewDetails, NotificationKind,
};
use crate::workflows::applications::lifecycle::{TransitionError, TransitionErrorKind};
use crate::workflows::applications::{
    ApplicationLifecycleService, ApplicationStore, LifecycleConfig, LifecycleServiceError,
    StatusChangeRequest,
};
use crate::workflows::identity::{ApplicationId, UserId};
use crate::workflows::repository::RepositoryError;

fn employer_moves_to(status: ApplicationStatus) -> StatusChangeRequest {
    StatusChangeRequest {
        actor: ActorRole::Employer,
        status,
        feedback: None,
        interview: None,
    }
}

#[tokio::test]
async fn submit_creates_pending_application() {
    let (service, store, dispatcher) = build_service();

    let application = service
        .submit(submission(), now())
        .await
        .expect("submission succeeds");

    assert_eq!(application.status, ApplicationStatus::Pending);
    assert!(application.id.as_str().starts_with("app-"));
    assert_eq!(application.applied_at, now());
    assert!(application.feedback.is_empty());
    assert_eq!(store.stored(&application.id), Some(application));
    assert!(dispatcher.sent().is_empty());
}

#[tokio::test]
async fn duplicate_submission_is_a_conflict() {
    let (service, _, _) = build_service();
    service
        .submit(submission(), now())
        .await
        .expect("first submission succeeds");

    match service.submit(submission(), now()).await {
        Err(LifecycleServiceError::Repository(RepositoryError::Conflict)) => {}
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn get_propagates_not_found() {
    let (service, _, _) = build_service();

    match service.get(&ApplicationId::new("app-missing")).await {
        Err(LifecycleServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn update_status_persists_and_notifies_candidate() {
    let (service, store, dispatcher) = build_service();
    let application = service.submit(submission(), now()).await.expect("submitted");

    let outcome = service
        .update_status(
            &application.id,
            StatusChangeRequest {
                feedback: Some("Strong latte art portfolio".to_string()),
                ..employer_moves_to(ApplicationStatus::Reviewing)
            },
            now(),
        )
        .await
        .expect("review starts");

    assert_eq!(outcome.application.status, ApplicationStatus::Reviewing);
    let stored = store.stored(&application.id).expect("still stored");
    assert_eq!(stored, outcome.application);
    assert_eq!(stored.updated_at, Some(now()));
    assert_eq!(stored.latest_feedback(), Some("Strong latte art portfolio"));

    let sent = dispatcher.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient_id, UserId::new("cand-1"));
    assert_eq!(sent[0].kind, NotificationKind::StatusChanged);
    assert_eq!(sent[0].payload.new_status, ApplicationStatus::Reviewing);
}

#[tokio::test]
async fn invalid_transition_leaves_store_untouched() {
    let (service, store, dispatcher) = build_service();
    let application = service.submit(submission(), now()).await.expect("submitted");

    match service
        .update_status(
            &application.id,
            employer_moves_to(ApplicationStatus::InterviewScheduled),
            now(),
        )
        .await
    {
        Err(LifecycleServiceError::Transition(error)) => {
            assert_eq!(error.kind(), TransitionErrorKind::InvalidTransition);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }

    assert_eq!(store.stored(&application.id), Some(application));
    assert!(dispatcher.sent().is_empty());
}

#[tokio::test]
async fn interview_details_are_recorded_when_scheduling() {
    let (service, _, _) = build_service();
    let application = service.submit(submission(), now()).await.expect("submitted");
    service
        .update_status(
            &application.id,
            employer_moves_to(ApplicationStatus::Reviewing),
            now(),
        )
        .await
        .expect("review starts");

    let details = InterviewDetails {
        scheduled_at: Some(now() + chrono::Duration::days(2)),
        location: Some("Shop counter, Kawasaki".to_string()),
        notes: Some("Bring apron".to_string()),
    };
    let outcome = service
        .update_status(
            &application.id,
            StatusChangeRequest {
                interview: Some(details.clone()),
                ..employer_moves_to(ApplicationStatus::InterviewScheduled)
            },
            now(),
        )
        .await
        .expect("interview scheduled");

    assert_eq!(outcome.application.interview, Some(details));
}

#[tokio::test]
async fn interview_details_are_ignored_for_other_steps() {
    let (service, _, _) = build_service();
    let application = service.submit(submission(), now()).await.expect("submitted");

    let outcome = service
        .update_status(
            &application.id,
            StatusChangeRequest {
                interview: Some(InterviewDetails::default()),
                ..employer_moves_to(ApplicationStatus::Reviewing)
            },
            now(),
        )
        .await
        .expect("review starts");

    assert!(outcome.application.interview.is_none());
}

#[tokio::test]
async fn losing_racer_rechecks_against_the_new_status() {
    let store = Arc::new(RacingStore::interfering_with(ApplicationStatus::Reviewing));
    let dispatcher = Arc::new(MemoryDispatcher::default());
    let service = ApplicationLifecycleService::new(
        store.clone(),
        dispatcher.clone(),
        LifecycleConfig::default(),
    );
    let application = service.submit(submission(), now()).await.expect("submitted");

    match service
        .update_status(
            &application.id,
            employer_moves_to(ApplicationStatus::Reviewing),
            now(),
        )
        .await
    {
        Err(LifecycleServiceError::Transition(TransitionError::NotASuccessor { from, to })) => {
            assert_eq!(from, ApplicationStatus::Reviewing);
            assert_eq!(to, ApplicationStatus::Reviewing);
        }
        other => panic!("expected re-validated failure, got {other:?}"),
    }
    assert!(dispatcher.sent().is_empty());
}

#[tokio::test]
async fn retry_applies_when_the_step_is_still_valid() {
    let store = Arc::new(RacingStore::interfering_with(ApplicationStatus::Reviewing));
    let dispatcher = Arc::new(MemoryDispatcher::default());
    let service = ApplicationLifecycleService::new(
        store.clone(),
        dispatcher.clone(),
        LifecycleConfig::default(),
    );
    let application = service.submit(submission(), now()).await.expect("submitted");

    let outcome = service
        .withdraw(
            &application.id,
            ActorRole::Candidate,
            Some("Found a closer job"),
            now(),
        )
        .await
        .expect("withdrawal lands on retry");

    assert_eq!(outcome.application.status, ApplicationStatus::Withdrawn);
    assert_eq!(
        outcome.notification.payload.previous_status,
        ApplicationStatus::Reviewing
    );
    assert_eq!(dispatcher.sent()[0].recipient_id, UserId::new("emp-1"));
    let stored = store.inner.stored(&application.id).expect("stored");
    assert_eq!(stored.status, ApplicationStatus::Withdrawn);
}

#[tokio::test]
async fn exhausted_retries_surface_concurrent_modification() {
    let store = Arc::new(ContendedStore::default());
    let service = ApplicationLifecycleService::new(
        store.clone(),
        Arc::new(MemoryDispatcher::default()),
        LifecycleConfig { max_attempts: 4 },
    );
    let application = store
        .insert(Application::submitted(
            ApplicationId::new("app-contended"),
            submission(),
            now(),
        ))
        .await
        .expect("seeded");

    match service
        .update_status(
            &application.id,
            employer_moves_to(ApplicationStatus::Reviewing),
            now(),
        )
        .await
    {
        Err(LifecycleServiceError::ConcurrentModification {
            application_id,
            attempts,
        }) => {
            assert_eq!(application_id, application.id);
            assert_eq!(attempts, 4);
        }
        other => panic!("expected concurrent modification, got {other:?}"),
    }
    assert_eq!(store.attempts(), 4);
}

#[tokio::test]
async fn terminal_applications_reject_withdrawal() {
    let (service, store, _) = build_service();
    let application = service.submit(submission(), now()).await.expect("submitted");
    store.force_status(&application.id, ApplicationStatus::Rejected);

    match service
        .withdraw(&application.id, ActorRole::Candidate, None, now())
        .await
    {
        Err(LifecycleServiceError::Transition(error)) => {
            assert_eq!(error.kind(), TransitionErrorKind::TerminalState);
        }
        other => panic!("expected terminal state, got {other:?}"),
    }
}

#[tokio::test]
async fn dispatch_failure_still_returns_the_committed_outcome() {
    let store = Arc::new(MemoryStore::default());
    let service = ApplicationLifecycleService::new(
        store.clone(),
        Arc::new(FailingDispatcher),
        LifecycleConfig::default(),
    );
    let application = service.submit(submission(), now()).await.expect("submitted");

    let outcome = service
        .update_status(
            &application.id,
            employer_moves_to(ApplicationStatus::Rejected),
            now(),
        )
        .await
        .expect("stored transition is reported as applied");

    assert_eq!(outcome.application.status, ApplicationStatus::Rejected);
    assert_eq!(outcome.notification.recipient_id, application.candidate_id);
    assert_eq!(
        outcome.notification.payload.previous_status,
        ApplicationStatus::Pending
    );
    assert_eq!(
        outcome.notification.payload.new_status,
        ApplicationStatus::Rejected
    );

    let stored = store.stored(&application.id).expect("stored");
    assert_eq!(stored.status, ApplicationStatus::Rejected);
}

#[tokio::test]
async fn repository_failures_propagate() {
    let service = ApplicationLifecycleService::new(
        Arc::new(UnavailableStore),
        Arc::new(MemoryDispatcher::default()),
        LifecycleConfig::default(),
    );

    match service
        .update_status(
            &ApplicationId::new("app-1"),
            employer_moves_to(ApplicationStatus::Reviewing),
            now(),
        )
        .await
    {
        Err(LifecycleServiceError::Repository(RepositoryError::Unavailable(reason))) => {
            assert!(reason.contains("offline"));
        }
        other => panic!("expected unavailable store, got {other:?}"),
    }
}
