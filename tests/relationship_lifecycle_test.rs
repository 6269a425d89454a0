// ABOUTME: Integration tests for the coach/athlete relationship lifecycle manager
// ABOUTME: Covers requests, guarded transitions on both execution paths, bulk operations, and refresh
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use coachlink::database::ProcedureSupport;
use coachlink::errors::ErrorCode;
use coachlink::models::guards::{ACTIVE_WITH_OTHER_COACH, ALREADY_LINKED, DUPLICATE_PENDING};
use coachlink::models::{RelationshipFilter, RelationshipStatus};
use coachlink::relationships::TransitionOutcome;
use common::{create_file_database, LifecycleFixture, BOTH_PATHS};
use tempfile::TempDir;
use uuid::Uuid;

// ============================================================================
// Requests
// ============================================================================

#[tokio::test]
async fn test_request_creates_trimmed_pending_row() {
    let fx = LifecycleFixture::new(ProcedureSupport::Available)
        .await
        .unwrap();
    let athlete = fx.athlete();

    let created = athlete
        .request(
            fx.athlete_id,
            fx.coach_id,
            "  Trail Running  ",
            None,
            Some("looking for a marathon plan".to_owned()),
        )
        .await
        .unwrap();

    assert_eq!(created.status, RelationshipStatus::Pending);
    assert_eq!(created.modality, "Trail Running");
    assert_eq!(created.athlete_id, fx.athlete_id);
    assert_eq!(created.coach_id, fx.coach_id);
    assert_eq!(
        created.notes.as_deref(),
        Some("looking for a marathon plan")
    );
    assert!(created.approved_at.is_none());

    let cached = athlete.cached().await;
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].id, created.id);
}

#[tokio::test]
async fn test_blank_modality_is_invalid_input() {
    let fx = LifecycleFixture::new(ProcedureSupport::Available)
        .await
        .unwrap();

    for modality in ["", "   ", "\t\n"] {
        let error = fx
            .athlete()
            .request(fx.athlete_id, fx.coach_id, modality, None, None)
            .await
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::InvalidInput);
    }
    assert!(fx
        .repository
        .find(&RelationshipFilter::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_request_must_come_from_the_athlete() {
    let fx = LifecycleFixture::new(ProcedureSupport::Available)
        .await
        .unwrap();

    let error = fx
        .coach()
        .request(fx.athlete_id, fx.coach_id, "Running", None, None)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_athlete_cannot_request_themselves() {
    let fx = LifecycleFixture::new(ProcedureSupport::Available)
        .await
        .unwrap();

    let error = fx
        .athlete()
        .request(fx.athlete_id, fx.athlete_id, "Running", None, None)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_duplicate_pending_request_conflicts() {
    let fx = LifecycleFixture::new(ProcedureSupport::Available)
        .await
        .unwrap();
    fx.request("Running").await.unwrap();

    let error = fx
        .athlete()
        .request(fx.athlete_id, fx.coach_id, " Running ", None, None)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::Conflict);
    assert_eq!(error.message, DUPLICATE_PENDING);
}

#[tokio::test]
async fn test_request_to_current_coach_is_already_linked() {
    for procedures in BOTH_PATHS {
        let fx = LifecycleFixture::new(procedures).await.unwrap();
        fx.link("Running").await.unwrap();

        let error = fx
            .athlete()
            .request(fx.athlete_id, fx.coach_id, "Running", None, None)
            .await
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::Conflict);
        assert_eq!(error.message, ALREADY_LINKED);
    }
}

#[tokio::test]
async fn test_modalities_are_independent() {
    let fx = LifecycleFixture::new(ProcedureSupport::Available)
        .await
        .unwrap();
    fx.link("Running").await.unwrap();

    let cycling = fx
        .athlete()
        .request(fx.athlete_id, fx.other_coach_id, "Cycling", None, None)
        .await
        .unwrap();
    let approved = fx.other_coach().approve(cycling.id, None, None).await.unwrap();
    assert_eq!(approved.status, RelationshipStatus::Active);
}

// ============================================================================
// Approve
// ============================================================================

#[tokio::test]
async fn test_concurrent_approvals_leave_one_active_coach() {
    for procedures in BOTH_PATHS {
        let dir = TempDir::new().unwrap();
        let database = create_file_database(&dir).await.unwrap();
        let fx = LifecycleFixture::with_database(database, procedures);
        let first = fx.request("Running").await.unwrap();
        let second = fx
            .athlete()
            .request(fx.athlete_id, fx.other_coach_id, "Running", None, None)
            .await
            .unwrap();

        let coach = fx.coach();
        let other_coach = fx.other_coach();
        let (left, right) = tokio::join!(
            coach.approve(first.id, None, None),
            other_coach.approve(second.id, None, None)
        );

        let errors: Vec<_> = [left, right].into_iter().filter_map(Result::err).collect();
        assert_eq!(errors.len(), 1, "{procedures:?}: {errors:?}");
        assert_eq!(errors[0].code, ErrorCode::Conflict, "{procedures:?}");
        assert_eq!(errors[0].message, ACTIVE_WITH_OTHER_COACH);

        let active = fx
            .repository
            .find(
                &RelationshipFilter::default()
                    .athlete(fx.athlete_id)
                    .modality("Running")
                    .status(RelationshipStatus::Active),
            )
            .await
            .unwrap();
        assert_eq!(active.len(), 1, "{procedures:?}");
    }
}

#[tokio::test]
async fn test_single_active_coach_per_modality() {
    for procedures in BOTH_PATHS {
        let fx = LifecycleFixture::new(procedures).await.unwrap();
        let first = fx.request("Running").await.unwrap();
        let second = fx
            .athlete()
            .request(fx.athlete_id, fx.other_coach_id, "Running", None, None)
            .await
            .unwrap();

        fx.coach().approve(first.id, None, None).await.unwrap();
        let error = fx
            .other_coach()
            .approve(second.id, None, None)
            .await
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::Conflict, "{procedures:?}");
        assert_eq!(error.message, ACTIVE_WITH_OTHER_COACH);

        let active = fx
            .repository
            .find(
                &RelationshipFilter::default()
                    .athlete(fx.athlete_id)
                    .modality("Running")
                    .status(RelationshipStatus::Active),
            )
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].coach_id, fx.coach_id);

        let error = fx
            .athlete()
            .request(fx.athlete_id, fx.other_coach_id, "Running", None, None)
            .await
            .unwrap_err();
        assert_eq!(error.message, ACTIVE_WITH_OTHER_COACH);
    }
}

#[tokio::test]
async fn test_approve_stamps_approval_fields() {
    for procedures in BOTH_PATHS {
        let fx = LifecycleFixture::new(procedures).await.unwrap();
        let pending = fx.request("Swimming").await.unwrap();
        let team_id = Uuid::new_v4();

        let approved = fx
            .coach()
            .approve(pending.id, Some(team_id), Some("welcome aboard".to_owned()))
            .await
            .unwrap();

        assert_eq!(approved.status, RelationshipStatus::Active);
        assert_eq!(approved.approved_by, Some(fx.coach_id));
        assert!(approved.approved_at.is_some());
        assert_eq!(approved.team_id, Some(team_id));
        assert_eq!(approved.notes.as_deref(), Some("welcome aboard"));
        assert!(approved.updated_at >= pending.updated_at);
    }
}

#[tokio::test]
async fn test_approve_guards() {
    for procedures in BOTH_PATHS {
        let fx = LifecycleFixture::new(procedures).await.unwrap();
        let pending = fx.request("Running").await.unwrap();

        let error = fx
            .other_coach()
            .approve(pending.id, None, None)
            .await
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::PermissionDenied);

        let error = fx
            .coach()
            .approve(Uuid::new_v4(), None, None)
            .await
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::ResourceNotFound);

        fx.coach().approve(pending.id, None, None).await.unwrap();
        let error = fx
            .coach()
            .approve(pending.id, None, None)
            .await
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::InvalidState);
    }
}

// ============================================================================
// Reject
// ============================================================================

#[tokio::test]
async fn test_reject_then_request_again() {
    for procedures in BOTH_PATHS {
        let fx = LifecycleFixture::new(procedures).await.unwrap();
        let pending = fx.request("Running").await.unwrap();

        let outcome = fx
            .coach()
            .reject(pending.id, Some("calendar is full".to_owned()))
            .await
            .unwrap();
        let TransitionOutcome::Updated(rejected) = outcome else {
            panic!("expected the row to be updated");
        };
        assert_eq!(rejected.status, RelationshipStatus::Rejected);
        assert_eq!(rejected.notes.as_deref(), Some("calendar is full"));

        let again = fx.request("Running").await.unwrap();
        assert_eq!(again.status, RelationshipStatus::Pending);
        assert_ne!(again.id, pending.id);
    }
}

#[tokio::test]
async fn test_failed_reject_restores_cache() {
    for procedures in BOTH_PATHS {
        let fx = LifecycleFixture::new(procedures).await.unwrap();
        let active = fx.link("Running").await.unwrap();
        let coach = fx.coach();
        coach.refresh().await.unwrap();

        let error = coach.reject(active.id, None).await.unwrap_err();
        assert_eq!(error.code, ErrorCode::InvalidState);

        let cached = coach.cached().await;
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].status, RelationshipStatus::Active);
    }
}

#[tokio::test]
async fn test_reject_removes_pending_row_from_cache() {
    let fx = LifecycleFixture::new(ProcedureSupport::Available)
        .await
        .unwrap();
    let pending = fx.request("Running").await.unwrap();
    let coach = fx.coach();
    assert_eq!(coach.refresh().await.unwrap().len(), 1);

    coach.reject(pending.id, None).await.unwrap();

    assert!(coach
        .cached()
        .await
        .iter()
        .all(|row| row.status != RelationshipStatus::Pending));
}

#[tokio::test]
async fn test_reject_by_other_coach_is_denied() {
    for procedures in BOTH_PATHS {
        let fx = LifecycleFixture::new(procedures).await.unwrap();
        let pending = fx.request("Running").await.unwrap();

        let error = fx.other_coach().reject(pending.id, None).await.unwrap_err();
        assert_eq!(error.code, ErrorCode::PermissionDenied);

        let row = fx.repository.require(pending.id).await.unwrap();
        assert_eq!(row.status, RelationshipStatus::Pending);
    }
}

// ============================================================================
// Deactivate / unlink
// ============================================================================

#[tokio::test]
async fn test_deactivate_twice_differs_by_path() {
    for procedures in BOTH_PATHS {
        let fx = LifecycleFixture::new(procedures).await.unwrap();
        let active = fx.link("Running").await.unwrap();

        let inactive = fx.coach().deactivate(active.id).await.unwrap();
        assert_eq!(inactive.status, RelationshipStatus::Inactive);

        let second = fx.coach().deactivate(active.id).await;
        match procedures {
            ProcedureSupport::Available => {
                assert_eq!(second.unwrap().status, RelationshipStatus::Inactive);
            }
            ProcedureSupport::Unavailable => {
                assert_eq!(second.unwrap_err().code, ErrorCode::InvalidState);
            }
        }
    }
}

#[tokio::test]
async fn test_unlink_is_athlete_scoped() {
    for procedures in BOTH_PATHS {
        let fx = LifecycleFixture::new(procedures).await.unwrap();
        let active = fx.link("Running").await.unwrap();

        let error = fx.coach().unlink(active.id).await.unwrap_err();
        assert_eq!(error.code, ErrorCode::PermissionDenied);
        let error = fx.athlete().deactivate(active.id).await.unwrap_err();
        assert_eq!(error.code, ErrorCode::PermissionDenied);

        let inactive = fx.athlete().unlink(active.id).await.unwrap();
        assert_eq!(inactive.status, RelationshipStatus::Inactive);

        // The modality is free for another coach once unlinked
        let next = fx
            .athlete()
            .request(fx.athlete_id, fx.other_coach_id, "Running", None, None)
            .await
            .unwrap();
        let approved = fx.other_coach().approve(next.id, None, None).await.unwrap();
        assert_eq!(approved.status, RelationshipStatus::Active);
    }
}

#[tokio::test]
async fn test_deactivate_pending_is_invalid_state() {
    for procedures in BOTH_PATHS {
        let fx = LifecycleFixture::new(procedures).await.unwrap();
        let pending = fx.request("Running").await.unwrap();

        let error = fx.coach().deactivate(pending.id).await.unwrap_err();
        assert_eq!(error.code, ErrorCode::InvalidState);
    }
}

// ============================================================================
// Remove from view
// ============================================================================

#[tokio::test]
async fn test_remove_from_view_requires_deactivation() {
    let fx = LifecycleFixture::new(ProcedureSupport::Available)
        .await
        .unwrap();
    let pending = fx.request("Running").await.unwrap();
    let active = fx
        .coach()
        .approve(pending.id, None, Some("weekly check-ins".to_owned()))
        .await
        .unwrap();

    let error = fx.coach().remove_from_view(active.id).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::Conflict);
    assert_eq!(
        fx.repository.require(active.id).await.unwrap().status,
        RelationshipStatus::Active
    );

    fx.coach().deactivate(active.id).await.unwrap();
    let removed = fx.coach().remove_from_view(active.id).await.unwrap();
    assert_eq!(removed.status, RelationshipStatus::Removed);
    let notes = removed.notes.clone().unwrap();
    assert!(notes.starts_with("weekly check-ins\n[removed by coach at "));
    assert!(notes.ends_with(']'));

    // Removing again leaves the audit row untouched
    let again = fx.coach().remove_from_view(active.id).await.unwrap();
    assert_eq!(again.notes, removed.notes);
}

#[tokio::test]
async fn test_remove_from_view_visibility() {
    let fx = LifecycleFixture::new(ProcedureSupport::Unavailable)
        .await
        .unwrap();
    let pending = fx.request("Running").await.unwrap();
    fx.request("Cycling").await.unwrap();

    let error = fx.athlete().remove_from_view(pending.id).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::PermissionDenied);

    let coach = fx.coach();
    let removed = coach.remove_from_view(pending.id).await.unwrap();
    assert!(removed
        .notes
        .unwrap()
        .starts_with("[removed by coach at "));

    let coach_rows = coach.refresh().await.unwrap();
    assert_eq!(coach_rows.len(), 1);
    assert_eq!(coach_rows[0].modality, "Cycling");

    let athlete_rows = fx.athlete().refresh().await.unwrap();
    assert_eq!(athlete_rows.len(), 2);
}

// ============================================================================
// Bulk
// ============================================================================

#[tokio::test]
async fn test_bulk_request_partial_success() {
    let fx = LifecycleFixture::new(ProcedureSupport::Available)
        .await
        .unwrap();
    let modalities = vec!["Running".to_owned(), "  ".to_owned(), "Cycling".to_owned()];

    let outcome = fx
        .athlete()
        .request_bulk(fx.coach_id, &modalities, None, None)
        .await
        .unwrap();

    assert_eq!(outcome.successes, 2);
    assert_eq!(outcome.failures, 1);
    assert_eq!(outcome.total, 3);
    assert_eq!(outcome.errors[0].code, ErrorCode::InvalidInput);
    assert_eq!(fx.coach().list_pending_for_coach().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_bulk_request_total_failure_returns_first_error() {
    let fx = LifecycleFixture::new(ProcedureSupport::Available)
        .await
        .unwrap();
    fx.link("Running").await.unwrap();
    let modalities = vec!["Running".to_owned(), "   ".to_owned()];

    let error = fx
        .athlete()
        .request_bulk(fx.coach_id, &modalities, None, None)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::Conflict);
    assert_eq!(error.message, ALREADY_LINKED);
}

#[tokio::test]
async fn test_bulk_request_rejects_empty_list() {
    let fx = LifecycleFixture::new(ProcedureSupport::Available)
        .await
        .unwrap();

    let error = fx
        .athlete()
        .request_bulk(fx.coach_id, &[], None, None)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_approve_all_pending_for_athlete() {
    let fx = LifecycleFixture::new(ProcedureSupport::Available)
        .await
        .unwrap();
    for modality in ["Running", "Cycling", "Swimming"] {
        fx.request(modality).await.unwrap();
    }
    let coach = fx.coach();

    let count = coach
        .approve_all_pending_for_athlete(fx.athlete_id, None)
        .await
        .unwrap();
    assert_eq!(count, 3);
    assert!(coach.list_pending_for_coach().await.unwrap().is_empty());

    let active = coach.list_active_athletes().await.unwrap();
    assert_eq!(active.len(), 3);
    assert!(active
        .iter()
        .all(|row| row.approved_by == Some(fx.coach_id)));
    assert_eq!(coach.cached().await.len(), 3);
}

#[tokio::test]
async fn test_approve_all_checks_other_coaches_first() {
    let fx = LifecycleFixture::new(ProcedureSupport::Available)
        .await
        .unwrap();
    fx.request("Running").await.unwrap();
    fx.request("Cycling").await.unwrap();
    let rival = fx
        .athlete()
        .request(fx.athlete_id, fx.other_coach_id, "Running", None, None)
        .await
        .unwrap();
    fx.other_coach().approve(rival.id, None, None).await.unwrap();

    let coach = fx.coach();
    let error = coach
        .approve_all_pending_for_athlete(fx.athlete_id, None)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::Conflict);
    assert_eq!(error.message, ACTIVE_WITH_OTHER_COACH);

    // Nothing was written and the cache was restored
    assert_eq!(coach.list_pending_for_coach().await.unwrap().len(), 2);
    assert_eq!(coach.cached().await.len(), 2);
}

#[tokio::test]
async fn test_reject_all_pending_for_athlete() {
    let fx = LifecycleFixture::new(ProcedureSupport::Unavailable)
        .await
        .unwrap();
    fx.request("Running").await.unwrap();
    fx.request("Cycling").await.unwrap();
    let unrelated = fx
        .athlete()
        .request(fx.athlete_id, fx.other_coach_id, "Swimming", None, None)
        .await
        .unwrap();

    let coach = fx.coach();
    let count = coach
        .reject_all_pending_for_athlete(fx.athlete_id, Some("not this season".to_owned()))
        .await
        .unwrap();
    assert_eq!(count, 2);
    assert_eq!(
        coach
            .reject_all_pending_for_athlete(fx.athlete_id, None)
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        fx.repository.require(unrelated.id).await.unwrap().status,
        RelationshipStatus::Pending
    );
}

// ============================================================================
// Refresh
// ============================================================================

#[tokio::test]
async fn test_refresh_is_scoped_to_the_caller() {
    let fx = LifecycleFixture::new(ProcedureSupport::Available)
        .await
        .unwrap();
    fx.request("Running").await.unwrap();
    fx.athlete()
        .request(fx.athlete_id, fx.other_coach_id, "Cycling", None, None)
        .await
        .unwrap();

    assert_eq!(fx.athlete().refresh().await.unwrap().len(), 2);

    let coach_rows = fx.coach().refresh().await.unwrap();
    assert_eq!(coach_rows.len(), 1);
    assert_eq!(coach_rows[0].coach_id, fx.coach_id);
}
