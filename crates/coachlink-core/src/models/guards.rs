// ABOUTME: Transition guards shared by the atomic procedure path and the conditional-update fallback
// ABOUTME: Ownership, status, and uniqueness checks plus audit note formatting for relationship rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Relationship transition guards
//!
//! Both execution paths for a lifecycle transition run exactly these checks,
//! so the only behavioral difference between them is atomicity.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use super::relationship::{Relationship, RelationshipStatus};
use crate::errors::{AppError, AppResult};

/// Conflict message when another coach already holds the active link
pub const ACTIVE_WITH_OTHER_COACH: &str = "athlete already actively coached in this modality";
/// Conflict message for a duplicate pending request
pub const DUPLICATE_PENDING: &str = "duplicate pending request";
/// Conflict message when the same coach is already actively linked
pub const ALREADY_LINKED: &str = "already linked";

/// Verify the caller is the coach on the row
///
/// # Errors
///
/// Returns `PermissionDenied` when the coach does not match
pub fn ensure_coach_owns(relationship: &Relationship, caller: Uuid) -> AppResult<()> {
    if relationship.coach_id != caller {
        return Err(AppError::permission_denied(
            "relationship belongs to a different coach",
        )
        .with_user_id(caller)
        .with_resource_id(relationship.id.to_string()));
    }
    Ok(())
}

/// Verify the caller is the athlete on the row
///
/// # Errors
///
/// Returns `PermissionDenied` when the athlete does not match
pub fn ensure_athlete_owns(relationship: &Relationship, caller: Uuid) -> AppResult<()> {
    if relationship.athlete_id != caller {
        return Err(AppError::permission_denied(
            "relationship belongs to a different athlete",
        )
        .with_user_id(caller)
        .with_resource_id(relationship.id.to_string()));
    }
    Ok(())
}

/// Verify the row is currently in `expected` status
///
/// # Errors
///
/// Returns `InvalidState` naming the attempted action and the actual status
pub fn ensure_status(
    relationship: &Relationship,
    expected: RelationshipStatus,
    action: &str,
) -> AppResult<()> {
    if relationship.status != expected {
        return Err(AppError::invalid_state(format!(
            "cannot {action} a relationship that is {} (expected {expected})",
            relationship.status
        ))
        .with_resource_id(relationship.id.to_string()));
    }
    Ok(())
}

/// Check the uniqueness invariants for linking `athlete_id` to `coach_id` in `modality`
///
/// `existing` holds the athlete's rows in that modality; `exclude` skips the
/// row being transitioned. Checks run in a fixed order: another coach's
/// active link, then a duplicate pending request (only when
/// `check_pending` is set), then an existing active link to the same coach.
///
/// # Errors
///
/// Returns `Conflict` with the message of the first violated invariant
pub fn ensure_link_available(
    existing: &[Relationship],
    athlete_id: Uuid,
    coach_id: Uuid,
    modality: &str,
    exclude: Option<Uuid>,
    check_pending: bool,
) -> AppResult<()> {
    let others = || {
        existing.iter().filter(move |row| {
            Some(row.id) != exclude && row.athlete_id == athlete_id && row.modality == modality
        })
    };

    if others().any(|row| row.status == RelationshipStatus::Active && row.coach_id != coach_id) {
        return Err(AppError::conflict(ACTIVE_WITH_OTHER_COACH).with_user_id(athlete_id));
    }
    if check_pending
        && others().any(|row| row.status == RelationshipStatus::Pending && row.coach_id == coach_id)
    {
        return Err(AppError::conflict(DUPLICATE_PENDING).with_user_id(athlete_id));
    }
    if others().any(|row| row.status == RelationshipStatus::Active && row.coach_id == coach_id) {
        return Err(AppError::conflict(ALREADY_LINKED).with_user_id(athlete_id));
    }
    Ok(())
}

/// Append `note` to `existing` notes, keeping prior content as a prefix
#[must_use]
pub fn append_note(existing: Option<&str>, note: &str) -> String {
    match existing {
        Some(prior) if !prior.is_empty() => format!("{prior}\n{note}"),
        _ => note.to_owned(),
    }
}

/// Audit note written when a coach removes a relationship from view
#[must_use]
pub fn removal_note(at: DateTime<Utc>) -> String {
    format!(
        "[removed by coach at {}]",
        at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}
