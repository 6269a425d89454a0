// ABOUTME: SQLite implementation of the training-session repository
// ABOUTME: Delegates to TrainingSessionManager queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use uuid::Uuid;

use super::TrainingSessionRepository;
use crate::database::TrainingSessionManager;
use crate::errors::AppResult;
use crate::models::{DateRange, TrainingSession};

/// `SQLite` implementation of `TrainingSessionRepository`
#[derive(Clone)]
pub struct TrainingSessionRepositoryImpl {
    sessions: TrainingSessionManager,
}

impl TrainingSessionRepositoryImpl {
    /// Create a repository over the given manager
    #[must_use]
    pub const fn new(sessions: TrainingSessionManager) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl TrainingSessionRepository for TrainingSessionRepositoryImpl {
    async fn sessions_for_athlete(
        &self,
        athlete_id: Uuid,
        range: Option<DateRange>,
    ) -> AppResult<Vec<TrainingSession>> {
        self.sessions.list_for_user(athlete_id, range).await
    }
}
