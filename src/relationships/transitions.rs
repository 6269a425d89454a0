// ABOUTME: The two execution paths for relationship state transitions
// ABOUTME: Atomic store procedures and the conditional-update fallback for backends without them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Transition Paths
//!
//! [`AtomicTransitions`] delegates each transition to a store procedure that
//! checks and writes as one unit. [`ConditionalTransitions`] runs the same
//! guards from [`crate::models::guards`] in sequence and makes every write
//! conditional on the status it read, so a concurrent change surfaces as
//! `InvalidState` instead of a lost update. The window between the
//! uniqueness check and the write is closed by the store's unique indexes.

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::database::repositories::RelationshipRepository;
use crate::database::ProcedureCall;
use crate::errors::{AppError, AppResult};
use crate::models::guards::{
    ensure_athlete_owns, ensure_coach_owns, ensure_link_available, ensure_status,
};
use crate::models::{Relationship, RelationshipChanges, RelationshipFilter, RelationshipStatus};

/// Result of a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Row written with its new state
    Updated(Relationship),
    /// Row physically deleted (only the fallback reject path does this)
    Deleted(Uuid),
}

impl TransitionOutcome {
    /// The updated row
    ///
    /// # Errors
    ///
    /// Returns an internal error if the row was deleted instead
    pub fn into_relationship(self) -> AppResult<Relationship> {
        match self {
            Self::Updated(relationship) => Ok(relationship),
            Self::Deleted(id) => Err(AppError::internal(format!(
                "relationship {id} was deleted instead of updated"
            ))),
        }
    }
}

/// A requested lifecycle transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionRequest {
    /// Coach accepts a pending request
    Approve {
        /// Optional team assignment
        team_id: Option<Uuid>,
        /// Optional replacement notes
        notes: Option<String>,
    },
    /// Coach declines a pending request
    Reject {
        /// Optional replacement notes
        notes: Option<String>,
    },
    /// Coach ends an active link
    Deactivate,
    /// Athlete ends an active link
    Unlink,
}

impl TransitionRequest {
    /// Action name used in errors and logs
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Approve { .. } => "approve",
            Self::Reject { .. } => "reject",
            Self::Deactivate => "deactivate",
            Self::Unlink => "unlink",
        }
    }

    /// Run this request on one execution path
    ///
    /// # Errors
    ///
    /// Propagates the path's guard or store error
    pub async fn apply(
        &self,
        transitions: &dyn RelationshipTransitions,
        caller: Uuid,
        relationship_id: Uuid,
    ) -> AppResult<TransitionOutcome> {
        match self {
            Self::Approve { team_id, notes } => {
                transitions
                    .approve(caller, relationship_id, *team_id, notes.clone())
                    .await
            }
            Self::Reject { notes } => {
                transitions
                    .reject(caller, relationship_id, notes.clone())
                    .await
            }
            Self::Deactivate => transitions.deactivate(caller, relationship_id).await,
            Self::Unlink => transitions.unlink(caller, relationship_id).await,
        }
    }
}

/// One way of executing the four guarded transitions
#[async_trait]
pub trait RelationshipTransitions: Send + Sync {
    /// Path name for logs
    fn path(&self) -> &'static str;

    /// `pending` to `active`, coach only
    async fn approve(
        &self,
        caller: Uuid,
        relationship_id: Uuid,
        team_id: Option<Uuid>,
        notes: Option<String>,
    ) -> AppResult<TransitionOutcome>;

    /// `pending` to `rejected`, coach only
    async fn reject(
        &self,
        caller: Uuid,
        relationship_id: Uuid,
        notes: Option<String>,
    ) -> AppResult<TransitionOutcome>;

    /// `active` to `inactive`, coach only
    async fn deactivate(&self, caller: Uuid, relationship_id: Uuid)
        -> AppResult<TransitionOutcome>;

    /// `active` to `inactive`, athlete only
    async fn unlink(&self, caller: Uuid, relationship_id: Uuid) -> AppResult<TransitionOutcome>;
}

/// Transitions executed by the store's atomic procedures
#[derive(Clone)]
pub struct AtomicTransitions {
    repository: RelationshipRepository,
}

impl AtomicTransitions {
    /// Create the atomic path over `repository`
    #[must_use]
    pub const fn new(repository: RelationshipRepository) -> Self {
        Self { repository }
    }

    async fn call(&self, call: ProcedureCall) -> AppResult<TransitionOutcome> {
        self.repository
            .call_procedure(&call)
            .await
            .map(TransitionOutcome::Updated)
    }
}

#[async_trait]
impl RelationshipTransitions for AtomicTransitions {
    fn path(&self) -> &'static str {
        "atomic"
    }

    async fn approve(
        &self,
        caller: Uuid,
        relationship_id: Uuid,
        team_id: Option<Uuid>,
        notes: Option<String>,
    ) -> AppResult<TransitionOutcome> {
        self.call(ProcedureCall::Approve {
            relationship_id,
            caller,
            team_id,
            notes,
        })
        .await
    }

    async fn reject(
        &self,
        caller: Uuid,
        relationship_id: Uuid,
        notes: Option<String>,
    ) -> AppResult<TransitionOutcome> {
        self.call(ProcedureCall::Reject {
            relationship_id,
            caller,
            notes,
        })
        .await
    }

    async fn deactivate(
        &self,
        caller: Uuid,
        relationship_id: Uuid,
    ) -> AppResult<TransitionOutcome> {
        self.call(ProcedureCall::Deactivate {
            relationship_id,
            caller,
        })
        .await
    }

    async fn unlink(&self, caller: Uuid, relationship_id: Uuid) -> AppResult<TransitionOutcome> {
        self.call(ProcedureCall::Unlink {
            relationship_id,
            caller,
        })
        .await
    }
}

/// Transitions built from guarded reads and status-conditional writes
#[derive(Clone)]
pub struct ConditionalTransitions {
    repository: RelationshipRepository,
}

impl ConditionalTransitions {
    /// Create the fallback path over `repository`
    #[must_use]
    pub const fn new(repository: RelationshipRepository) -> Self {
        Self { repository }
    }

    /// Write `changes` only if the row is still in `expected` status
    async fn write_if(
        &self,
        relationship_id: Uuid,
        expected: RelationshipStatus,
        changes: &RelationshipChanges,
    ) -> AppResult<Option<Relationship>> {
        Ok(self
            .repository
            .update_where(
                &RelationshipFilter::by_id(relationship_id).status(expected),
                changes,
            )
            .await?
            .into_iter()
            .next())
    }

    async fn end_link(
        &self,
        current: &Relationship,
        action: &str,
    ) -> AppResult<TransitionOutcome> {
        ensure_status(current, RelationshipStatus::Active, action)?;
        self.write_if(
            current.id,
            RelationshipStatus::Active,
            &RelationshipChanges::status(RelationshipStatus::Inactive),
        )
        .await?
        .map(TransitionOutcome::Updated)
        .ok_or_else(|| no_longer(current.id, RelationshipStatus::Active))
    }
}

fn no_longer(relationship_id: Uuid, expected: RelationshipStatus) -> AppError {
    AppError::invalid_state(format!("relationship is no longer {expected}"))
        .with_resource_id(relationship_id.to_string())
}

#[async_trait]
impl RelationshipTransitions for ConditionalTransitions {
    fn path(&self) -> &'static str {
        "conditional"
    }

    async fn approve(
        &self,
        caller: Uuid,
        relationship_id: Uuid,
        team_id: Option<Uuid>,
        notes: Option<String>,
    ) -> AppResult<TransitionOutcome> {
        let current = self.repository.require(relationship_id).await?;
        ensure_coach_owns(&current, caller)?;
        ensure_status(&current, RelationshipStatus::Pending, "approve")?;

        let active = self
            .repository
            .find(
                &RelationshipFilter::default()
                    .athlete(current.athlete_id)
                    .modality(current.modality.clone())
                    .status(RelationshipStatus::Active),
            )
            .await?;
        ensure_link_available(
            &active,
            current.athlete_id,
            current.coach_id,
            &current.modality,
            Some(current.id),
            false,
        )?;

        let changes = RelationshipChanges::approval(caller, team_id, notes);
        self.write_if(relationship_id, RelationshipStatus::Pending, &changes)
            .await?
            .map(TransitionOutcome::Updated)
            .ok_or_else(|| no_longer(relationship_id, RelationshipStatus::Pending))
    }

    async fn reject(
        &self,
        caller: Uuid,
        relationship_id: Uuid,
        notes: Option<String>,
    ) -> AppResult<TransitionOutcome> {
        let current = self.repository.require(relationship_id).await?;
        ensure_coach_owns(&current, caller)?;
        ensure_status(&current, RelationshipStatus::Pending, "reject")?;

        let changes = RelationshipChanges::rejection(notes);
        if let Some(updated) = self
            .write_if(relationship_id, RelationshipStatus::Pending, &changes)
            .await?
        {
            return Ok(TransitionOutcome::Updated(updated));
        }

        // The row left `pending` between read and write; clear it unless it
        // has become (or once was) a real link.
        let deleted = self
            .repository
            .delete_where(
                &RelationshipFilter::by_id(relationship_id)
                    .excluding(RelationshipStatus::Active)
                    .excluding(RelationshipStatus::Inactive)
                    .excluding(RelationshipStatus::Removed),
            )
            .await?;
        if deleted > 0 {
            debug!(
                relationship.id = %relationship_id,
                "Deleted relationship whose conditional reject matched no rows"
            );
            return Ok(TransitionOutcome::Deleted(relationship_id));
        }
        let latest = self.repository.require(relationship_id).await?;
        ensure_status(&latest, RelationshipStatus::Pending, "reject")?;
        Err(no_longer(relationship_id, RelationshipStatus::Pending))
    }

    async fn deactivate(
        &self,
        caller: Uuid,
        relationship_id: Uuid,
    ) -> AppResult<TransitionOutcome> {
        let current = self.repository.require(relationship_id).await?;
        ensure_coach_owns(&current, caller)?;
        self.end_link(&current, "deactivate").await
    }

    async fn unlink(&self, caller: Uuid, relationship_id: Uuid) -> AppResult<TransitionOutcome> {
        let current = self.repository.require(relationship_id).await?;
        ensure_athlete_owns(&current, caller)?;
        self.end_link(&current, "unlink").await
    }
}
