// ABOUTME: Relationship repository providing CRUD and filtered queries over the generic store
// ABOUTME: Thin wrapper with no business rules; the lifecycle manager enforces invariants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use uuid::Uuid;

use crate::database::{ProcedureCall, RelationshipStore};
use crate::errors::{AppError, AppResult};
use crate::models::{
    NewRelationship, Relationship, RelationshipChanges, RelationshipFilter, RelationshipStatus,
};

/// CRUD and filtered-query wrapper over a [`RelationshipStore`]
#[derive(Clone)]
pub struct RelationshipRepository {
    store: Arc<dyn RelationshipStore>,
}

impl RelationshipRepository {
    /// Create a repository over `store`
    #[must_use]
    pub fn new(store: Arc<dyn RelationshipStore>) -> Self {
        Self { store }
    }

    /// Insert a new row
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if a unique index rejects the row, or a store error
    pub async fn create(&self, relationship: &NewRelationship) -> AppResult<Relationship> {
        self.store.insert(relationship).await
    }

    /// Fetch one row by id
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<Relationship>> {
        Ok(self
            .store
            .select(&RelationshipFilter::by_id(id))
            .await?
            .into_iter()
            .next())
    }

    /// Fetch one row by id, failing when it does not exist
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when no row has `id`
    pub async fn require(&self, id: Uuid) -> AppResult<Relationship> {
        self.get(id).await?.ok_or_else(|| {
            AppError::not_found("Relationship").with_resource_id(id.to_string())
        })
    }

    /// Rows matching an arbitrary filter
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails
    pub async fn find(&self, filter: &RelationshipFilter) -> AppResult<Vec<Relationship>> {
        self.store.select(filter).await
    }

    /// All rows of an athlete in one modality
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails
    pub async fn for_athlete_modality(
        &self,
        athlete_id: Uuid,
        modality: &str,
    ) -> AppResult<Vec<Relationship>> {
        self.find(
            &RelationshipFilter::default()
                .athlete(athlete_id)
                .modality(modality),
        )
        .await
    }

    /// Active rows of an athlete across all modalities
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails
    pub async fn active_for_athlete(&self, athlete_id: Uuid) -> AppResult<Vec<Relationship>> {
        self.find(
            &RelationshipFilter::default()
                .athlete(athlete_id)
                .status(RelationshipStatus::Active),
        )
        .await
    }

    /// Rows of a coach with the given status
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails
    pub async fn for_coach_with_status(
        &self,
        coach_id: Uuid,
        status: RelationshipStatus,
    ) -> AppResult<Vec<Relationship>> {
        self.find(&RelationshipFilter::default().coach(coach_id).status(status))
            .await
    }

    /// Filter for the pending rows between one coach and one athlete
    #[must_use]
    pub fn pending_between_filter(coach_id: Uuid, athlete_id: Uuid) -> RelationshipFilter {
        RelationshipFilter::default()
            .coach(coach_id)
            .athlete(athlete_id)
            .status(RelationshipStatus::Pending)
    }

    /// Whether `coach_id` holds an active link with `athlete_id` in any modality
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails
    pub async fn has_active_link(&self, coach_id: Uuid, athlete_id: Uuid) -> AppResult<bool> {
        let rows = self
            .find(
                &RelationshipFilter::default()
                    .coach(coach_id)
                    .athlete(athlete_id)
                    .status(RelationshipStatus::Active)
                    .limit(1),
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /// Apply `changes` to rows matching `filter`
    ///
    /// # Errors
    ///
    /// Returns a store error if the update fails
    pub async fn update_where(
        &self,
        filter: &RelationshipFilter,
        changes: &RelationshipChanges,
    ) -> AppResult<Vec<Relationship>> {
        self.store.update(filter, changes).await
    }

    /// Delete rows matching `filter`
    ///
    /// # Errors
    ///
    /// Returns a store error if the delete fails
    pub async fn delete_where(&self, filter: &RelationshipFilter) -> AppResult<u64> {
        self.store.delete(filter).await
    }

    /// Invoke an atomic transition procedure
    ///
    /// # Errors
    ///
    /// Returns `BackendUnavailable` when the store lacks the procedure, or
    /// the procedure's own guard error
    pub async fn call_procedure(&self, call: &ProcedureCall) -> AppResult<Relationship> {
        self.store.call_procedure(call).await
    }
}
