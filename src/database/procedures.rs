// ABOUTME: Atomic relationship transition procedures executed as single SQLite transactions
// ABOUTME: Each procedure re-reads the row, runs the shared guards, and writes before committing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Server-side transition procedures
//!
//! These play the role of stored procedures: existence, ownership, status,
//! and uniqueness checks run on the same connection as the write, inside one
//! transaction, so no other writer can interleave between check and write.

use sqlx::SqliteConnection;
use tracing::debug;

use super::relationships::{select_on, update_on, SqliteRelationshipStore};
use super::store::ProcedureCall;
use super::transactions::{retry_transaction, SqliteTransactionGuard};
use crate::constants::TRANSACTION_MAX_ATTEMPTS;
use crate::errors::{AppError, AppResult};
use crate::models::guards::{
    ensure_athlete_owns, ensure_coach_owns, ensure_link_available, ensure_status,
};
use crate::models::{Relationship, RelationshipChanges, RelationshipFilter, RelationshipStatus};

impl SqliteRelationshipStore {
    /// Run `call` atomically, retrying on lock contention
    pub(super) async fn run_procedure(&self, call: &ProcedureCall) -> AppResult<Relationship> {
        retry_transaction(|| self.run_procedure_once(call), TRANSACTION_MAX_ATTEMPTS).await
    }

    async fn run_procedure_once(&self, call: &ProcedureCall) -> AppResult<Relationship> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = SqliteTransactionGuard::new(tx);
        let conn = guard.executor()?;

        let current = fetch_for_update(conn, call).await?;
        let updated = match call {
            ProcedureCall::Approve {
                caller,
                team_id,
                notes,
                ..
            } => {
                ensure_coach_owns(&current, *caller)?;
                ensure_status(&current, RelationshipStatus::Pending, "approve")?;
                let active = select_on(
                    conn,
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
                let changes = RelationshipChanges::approval(*caller, *team_id, notes.clone());
                write_transition(conn, &current, RelationshipStatus::Pending, &changes).await?
            }
            ProcedureCall::Reject { caller, notes, .. } => {
                ensure_coach_owns(&current, *caller)?;
                ensure_status(&current, RelationshipStatus::Pending, "reject")?;
                let changes = RelationshipChanges::rejection(notes.clone());
                write_transition(conn, &current, RelationshipStatus::Pending, &changes).await?
            }
            ProcedureCall::Deactivate { caller, .. } => {
                ensure_coach_owns(&current, *caller)?;
                end_link(conn, current, "deactivate").await?
            }
            ProcedureCall::Unlink { caller, .. } => {
                ensure_athlete_owns(&current, *caller)?;
                end_link(conn, current, "unlink").await?
            }
        };

        guard.commit().await?;
        debug!(
            procedure = call.name(),
            relationship.id = %updated.id,
            relationship.status = %updated.status,
            "Atomic transition committed"
        );
        Ok(updated)
    }
}

async fn fetch_for_update(
    conn: &mut SqliteConnection,
    call: &ProcedureCall,
) -> AppResult<Relationship> {
    let id = call.relationship_id();
    select_on(conn, &RelationshipFilter::by_id(id))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("Relationship").with_resource_id(id.to_string()))
}

/// `active` to `inactive`; an already inactive row is returned unchanged
async fn end_link(
    conn: &mut SqliteConnection,
    current: Relationship,
    action: &str,
) -> AppResult<Relationship> {
    if current.status == RelationshipStatus::Inactive {
        return Ok(current);
    }
    ensure_status(&current, RelationshipStatus::Active, action)?;
    write_transition(
        conn,
        &current,
        RelationshipStatus::Active,
        &RelationshipChanges::status(RelationshipStatus::Inactive),
    )
    .await
}

async fn write_transition(
    conn: &mut SqliteConnection,
    current: &Relationship,
    expected: RelationshipStatus,
    changes: &RelationshipChanges,
) -> AppResult<Relationship> {
    update_on(
        conn,
        &RelationshipFilter::by_id(current.id).status(expected),
        changes,
    )
    .await?
    .into_iter()
    .next()
    .ok_or_else(|| {
        AppError::invalid_state(format!("relationship is no longer {expected}"))
            .with_resource_id(current.id.to_string())
    })
}
