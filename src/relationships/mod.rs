// ABOUTME: Coach/athlete relationship lifecycle manager enforcing the link invariants
// ABOUTME: Requests, guarded transitions with atomic and fallback paths, bulk operations, and cache refresh
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Relationship Lifecycle
//!
//! ```text
//! (none) --request--> pending --approve--> active --deactivate/unlink--> inactive
//!                        |
//!                        +--reject--> rejected
//! pending/rejected/inactive --remove_from_view--> removed
//! ```
//!
//! Every row is scoped to one athlete, one coach, and one modality. The
//! manager guarantees that an athlete has at most one active coach per
//! modality, at most one pending request per coach and modality, and never
//! requests a coach they are already actively linked to.
//!
//! Guarded transitions try the store's atomic procedure first and fall back
//! to conditional updates when the backend reports the procedure missing.

mod bulk;
mod cache;
mod transitions;

use chrono::Utc;
use futures_util::future::join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub use bulk::{BulkRequestFailure, BulkRequestOutcome};
pub use cache::RelationshipCache;
pub use transitions::{
    AtomicTransitions, ConditionalTransitions, RelationshipTransitions, TransitionOutcome,
    TransitionRequest,
};

use crate::constants::RELATIONSHIP_REFRESH_LIMIT;
use crate::context::SessionContext;
use crate::database::repositories::RelationshipRepository;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::guards::{append_note, ensure_coach_owns, ensure_link_available, removal_note};
use crate::models::{
    normalize_modality, CallerRole, NewRelationship, Relationship, RelationshipChanges,
    RelationshipFilter, RelationshipStatus,
};

/// Lifecycle operations acting on behalf of one authenticated session
#[derive(Clone)]
pub struct RelationshipLifecycleManager {
    repository: RelationshipRepository,
    session: SessionContext,
    atomic: AtomicTransitions,
    fallback: ConditionalTransitions,
}

impl RelationshipLifecycleManager {
    /// Create a manager for `session`
    #[must_use]
    pub fn new(repository: RelationshipRepository, session: SessionContext) -> Self {
        Self {
            atomic: AtomicTransitions::new(repository.clone()),
            fallback: ConditionalTransitions::new(repository.clone()),
            repository,
            session,
        }
    }

    /// Rows currently cached for the session
    pub async fn cached(&self) -> Vec<Relationship> {
        self.session.cache().snapshot().await
    }

    fn caller_id(&self) -> Uuid {
        self.session.user_id()
    }

    // ================================================================================================
    // Requests
    // ================================================================================================

    /// Athlete requests `coach_id` for `modality`
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the modality is blank or the athlete names themselves
    /// - `PermissionDenied` if the caller is not `athlete_id`
    /// - `Conflict` if a link invariant would be violated
    pub async fn request(
        &self,
        athlete_id: Uuid,
        coach_id: Uuid,
        modality: &str,
        team_id: Option<Uuid>,
        notes: Option<String>,
    ) -> AppResult<Relationship> {
        let created = self
            .request_one(athlete_id, coach_id, modality, team_id, notes)
            .await?;
        self.refresh_logged().await;
        Ok(created)
    }

    /// Athlete requests `coach_id` for several modalities at once
    ///
    /// Requests run concurrently and never abort early.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `modalities` is empty
    /// - the first captured error when every request failed
    pub async fn request_bulk(
        &self,
        coach_id: Uuid,
        modalities: &[String],
        team_id: Option<Uuid>,
        notes: Option<String>,
    ) -> AppResult<BulkRequestOutcome> {
        if modalities.is_empty() {
            return Err(AppError::invalid_input("at least one modality is required"));
        }

        let athlete_id = self.caller_id();
        let requests = modalities.iter().map(|modality| {
            let notes = notes.clone();
            async move {
                let result = self
                    .request_one(athlete_id, coach_id, modality, team_id, notes)
                    .await;
                (modality.clone(), result)
            }
        });
        let results = join_all(requests).await;
        self.refresh_logged().await;

        let outcome = BulkRequestOutcome::collect(results);
        match &outcome {
            Ok(summary) => AppLogger::log_bulk_request(
                athlete_id,
                coach_id,
                summary.successes,
                summary.total,
            ),
            Err(_) => AppLogger::log_bulk_request(athlete_id, coach_id, 0, modalities.len()),
        }
        outcome
    }

    async fn request_one(
        &self,
        athlete_id: Uuid,
        coach_id: Uuid,
        modality: &str,
        team_id: Option<Uuid>,
        notes: Option<String>,
    ) -> AppResult<Relationship> {
        let modality = normalize_modality(modality)?;
        if athlete_id != self.caller_id() {
            return Err(AppError::permission_denied(
                "only the athlete can request a coach for themselves",
            )
            .with_user_id(self.caller_id()));
        }
        if athlete_id == coach_id {
            return Err(AppError::invalid_input("an athlete cannot coach themselves"));
        }

        let existing = self
            .repository
            .for_athlete_modality(athlete_id, &modality)
            .await?;
        ensure_link_available(&existing, athlete_id, coach_id, &modality, None, true)?;

        let created = self
            .repository
            .create(&NewRelationship::pending(
                athlete_id, coach_id, team_id, modality, notes,
            ))
            .await?;
        info!(
            relationship.id = %created.id,
            user.id = %athlete_id,
            coach.id = %coach_id,
            modality = %created.modality,
            "Coach requested"
        );
        Ok(created)
    }

    // ================================================================================================
    // Guarded transitions
    // ================================================================================================

    /// Coach approves a pending request
    ///
    /// # Errors
    ///
    /// `ResourceNotFound`, `PermissionDenied`, `InvalidState`, or `Conflict`
    pub async fn approve(
        &self,
        relationship_id: Uuid,
        team_id: Option<Uuid>,
        notes: Option<String>,
    ) -> AppResult<Relationship> {
        let outcome = self
            .transition(relationship_id, &TransitionRequest::Approve { team_id, notes })
            .await?;
        self.refresh_logged().await;
        outcome.into_relationship()
    }

    /// Coach rejects a pending request
    ///
    /// The row leaves the cache immediately and the cache is reloaded
    /// afterwards whether or not the rejection succeeded.
    ///
    /// # Errors
    ///
    /// `ResourceNotFound`, `PermissionDenied`, or `InvalidState`
    pub async fn reject(
        &self,
        relationship_id: Uuid,
        notes: Option<String>,
    ) -> AppResult<TransitionOutcome> {
        self.session.cache().remove(relationship_id).await;
        let result = self
            .transition(relationship_id, &TransitionRequest::Reject { notes })
            .await;
        self.refresh_logged().await;
        result
    }

    /// Coach ends an active link
    ///
    /// # Errors
    ///
    /// `ResourceNotFound`, `PermissionDenied`, or `InvalidState`
    pub async fn deactivate(&self, relationship_id: Uuid) -> AppResult<Relationship> {
        let outcome = self
            .transition(relationship_id, &TransitionRequest::Deactivate)
            .await?;
        self.refresh_logged().await;
        outcome.into_relationship()
    }

    /// Athlete ends an active link
    ///
    /// # Errors
    ///
    /// `ResourceNotFound`, `PermissionDenied`, or `InvalidState`
    pub async fn unlink(&self, relationship_id: Uuid) -> AppResult<Relationship> {
        let outcome = self
            .transition(relationship_id, &TransitionRequest::Unlink)
            .await?;
        self.refresh_logged().await;
        outcome.into_relationship()
    }

    /// Run `request` on the atomic path, or the fallback if the backend lacks it
    async fn transition(
        &self,
        relationship_id: Uuid,
        request: &TransitionRequest,
    ) -> AppResult<TransitionOutcome> {
        let caller = self.caller_id();
        let action = request.action();

        let (path, result) = match request.apply(&self.atomic, caller, relationship_id).await {
            Err(e) if e.is_backend_unavailable() => {
                debug!(
                    relationship.id = %relationship_id,
                    relationship.action = action,
                    reason = %e.message,
                    "Atomic procedure unavailable, using conditional updates"
                );
                (
                    self.fallback.path(),
                    request.apply(&self.fallback, caller, relationship_id).await,
                )
            }
            result => (self.atomic.path(), result),
        };

        AppLogger::log_transition(relationship_id, action, caller, path, result.is_ok());
        result
    }

    // ================================================================================================
    // Coach housekeeping
    // ================================================================================================

    /// Coach hides a finished relationship, keeping it as an audit row
    ///
    /// Existing notes are kept and the removal marker is appended on a new
    /// line. Removing an already removed row returns it unchanged.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` if the caller is not the row's coach
    /// - `Conflict` if the relationship is still active
    pub async fn remove_from_view(&self, relationship_id: Uuid) -> AppResult<Relationship> {
        let caller = self.caller_id();
        let current = self.repository.require(relationship_id).await?;
        ensure_coach_owns(&current, caller)?;

        if current.status == RelationshipStatus::Removed {
            return Ok(current);
        }
        if !current.status.can_transition_to(RelationshipStatus::Removed) {
            return Err(deactivate_first(relationship_id));
        }

        let changes = RelationshipChanges {
            notes: Some(append_note(
                current.notes.as_deref(),
                &removal_note(Utc::now()),
            )),
            ..RelationshipChanges::status(RelationshipStatus::Removed)
        };
        let removed = self
            .repository
            .update_where(
                &RelationshipFilter::by_id(relationship_id).status(current.status),
                &changes,
            )
            .await?
            .into_iter()
            .next();

        let result = match removed {
            Some(row) => Ok(row),
            None => match self.repository.require(relationship_id).await?.status {
                RelationshipStatus::Active => Err(deactivate_first(relationship_id)),
                status => Err(AppError::invalid_state(format!(
                    "relationship changed to {status} while being removed"
                ))
                .with_resource_id(relationship_id.to_string())),
            },
        };
        AppLogger::log_transition(relationship_id, "remove", caller, "conditional", result.is_ok());
        self.refresh_logged().await;
        result
    }

    /// Coach approves every pending request from `athlete_id`
    ///
    /// Returns the number of rows activated.
    ///
    /// # Errors
    ///
    /// `Conflict` if any pending modality is already actively coached
    pub async fn approve_all_pending_for_athlete(
        &self,
        athlete_id: Uuid,
        notes: Option<String>,
    ) -> AppResult<usize> {
        let coach_id = self.caller_id();
        let result = self.approve_all(coach_id, athlete_id, notes).await;
        self.refresh_logged().await;
        result
    }

    async fn approve_all(
        &self,
        coach_id: Uuid,
        athlete_id: Uuid,
        notes: Option<String>,
    ) -> AppResult<usize> {
        let filter = RelationshipRepository::pending_between_filter(coach_id, athlete_id);
        self.session.cache().remove_matching(&filter).await;

        let pending = self.repository.find(&filter).await?;
        if pending.is_empty() {
            return Ok(0);
        }
        let active = self.repository.active_for_athlete(athlete_id).await?;
        for row in &pending {
            ensure_link_available(&active, athlete_id, coach_id, &row.modality, None, false)?;
        }

        let updated = self
            .repository
            .update_where(
                &filter,
                &RelationshipChanges::approval(coach_id, None, notes),
            )
            .await?;
        info!(
            coach.id = %coach_id,
            user.id = %athlete_id,
            count = updated.len(),
            "Approved all pending requests"
        );
        Ok(updated.len())
    }

    /// Coach rejects every pending request from `athlete_id`
    ///
    /// Returns the number of rows rejected.
    ///
    /// # Errors
    ///
    /// Returns a store error if the update fails
    pub async fn reject_all_pending_for_athlete(
        &self,
        athlete_id: Uuid,
        notes: Option<String>,
    ) -> AppResult<usize> {
        let coach_id = self.caller_id();
        let filter = RelationshipRepository::pending_between_filter(coach_id, athlete_id);
        self.session.cache().remove_matching(&filter).await;

        let result = self
            .repository
            .update_where(&filter, &RelationshipChanges::rejection(notes))
            .await
            .map(|rows| rows.len());
        if let Ok(count) = result {
            info!(
                coach.id = %coach_id,
                user.id = %athlete_id,
                count,
                "Rejected all pending requests"
            );
        }
        self.refresh_logged().await;
        result
    }

    // ================================================================================================
    // Reads
    // ================================================================================================

    /// Reload the caller's relationships into the session cache
    ///
    /// Athletes see all their rows; coaches see theirs minus removed rows.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails
    pub async fn refresh(&self) -> AppResult<Vec<Relationship>> {
        let caller = self.caller_id();
        let filter = match self.session.role() {
            CallerRole::Athlete => RelationshipFilter::default().athlete(caller),
            CallerRole::Coach => RelationshipFilter::default()
                .coach(caller)
                .excluding(RelationshipStatus::Removed),
        }
        .limit(RELATIONSHIP_REFRESH_LIMIT);

        let rows = self.repository.find(&filter).await?;
        self.session.cache().replace_all(rows.clone()).await;
        debug!(user.id = %caller, count = rows.len(), "Relationship cache refreshed");
        Ok(rows)
    }

    /// Refresh after a write; a failed refresh leaves the cache stale but
    /// does not change the write's result
    async fn refresh_logged(&self) {
        if let Err(e) = self.refresh().await {
            warn!(user.id = %self.caller_id(), error = %e, "Relationship cache refresh failed");
        }
    }

    /// Pending requests addressed to the calling coach
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails
    pub async fn list_pending_for_coach(&self) -> AppResult<Vec<Relationship>> {
        self.repository
            .for_coach_with_status(self.caller_id(), RelationshipStatus::Pending)
            .await
    }

    /// Active links of the calling coach
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails
    pub async fn list_active_athletes(&self) -> AppResult<Vec<Relationship>> {
        self.repository
            .for_coach_with_status(self.caller_id(), RelationshipStatus::Active)
            .await
    }
}

fn deactivate_first(relationship_id: Uuid) -> AppError {
    AppError::conflict("deactivate the relationship before removing it")
        .with_resource_id(relationship_id.to_string())
}
