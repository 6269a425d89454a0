// ABOUTME: Repository layer over the relationship store and training-session storage
// ABOUTME: Defines the training-session repository seam consumed by the analytics facade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Repositories
//!
//! Repositories add no business rules; they shape store calls into the
//! queries the lifecycle manager and the analytics facade need.

mod relationship_repository;
mod training_session_repository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::{DateRange, TrainingSession};

pub use relationship_repository::RelationshipRepository;
pub use training_session_repository::TrainingSessionRepositoryImpl;

/// Source of an athlete's training sessions
#[async_trait]
pub trait TrainingSessionRepository: Send + Sync {
    /// Planned and completed sessions of `athlete_id`, optionally within `range`
    async fn sessions_for_athlete(
        &self,
        athlete_id: Uuid,
        range: Option<DateRange>,
    ) -> AppResult<Vec<TrainingSession>>;
}
