// ABOUTME: Analytics facade that fetches an athlete's sessions and runs the load calculator
// ABOUTME: Enforces athlete-or-linked-coach access and hands results to an insight collaborator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use coachlink_intelligence::{LoadAnalysis, LoadCalculator};
use tracing::debug;
use uuid::Uuid;

use crate::context::SessionContext;
use crate::database::repositories::{RelationshipRepository, TrainingSessionRepository};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::DateRange;

/// External collaborator that turns computed load into athlete-facing text
///
/// Implementations own prompt construction and ratio interpretation; they
/// receive raw series only.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Produce an insight for `athlete_id` from `analysis`
    async fn generate(&self, athlete_id: Uuid, analysis: &LoadAnalysis) -> AppResult<String>;
}

/// Training-load analytics for one session
#[derive(Clone)]
pub struct AnalyticsService {
    sessions: Arc<dyn TrainingSessionRepository>,
    relationships: RelationshipRepository,
    calculator: LoadCalculator,
    session: SessionContext,
}

impl AnalyticsService {
    /// Create a facade for `session`
    #[must_use]
    pub fn new(
        sessions: Arc<dyn TrainingSessionRepository>,
        relationships: RelationshipRepository,
        calculator: LoadCalculator,
        session: SessionContext,
    ) -> Self {
        Self {
            sessions,
            relationships,
            calculator,
            session,
        }
    }

    /// Calculator in use
    #[must_use]
    pub const fn calculator(&self) -> &LoadCalculator {
        &self.calculator
    }

    /// Load analysis for `athlete_id`, or `None` when there are no sessions
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` unless the caller is the athlete or an actively linked coach
    /// - a store error if sessions cannot be read
    pub async fn training_load(
        &self,
        athlete_id: Uuid,
        range: Option<DateRange>,
    ) -> AppResult<Option<LoadAnalysis>> {
        self.ensure_can_view(athlete_id).await?;

        let started = Instant::now();
        let sessions = self.sessions.sessions_for_athlete(athlete_id, range).await?;
        let analysis = self.calculator.calculate(&sessions);
        AppLogger::log_analytics_run(
            athlete_id,
            sessions.len(),
            started.elapsed().as_millis(),
            analysis.is_some(),
        );
        Ok(analysis)
    }

    /// Insight text for `athlete_id` produced by `generator`
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when there is no training data to analyze
    /// - any error from [`Self::training_load`] or the generator
    pub async fn insight(
        &self,
        athlete_id: Uuid,
        range: Option<DateRange>,
        generator: &dyn InsightGenerator,
    ) -> AppResult<String> {
        let analysis = self
            .training_load(athlete_id, range)
            .await?
            .ok_or_else(|| {
                AppError::invalid_input("insufficient training data").with_user_id(athlete_id)
            })?;
        generator.generate(athlete_id, &analysis).await
    }

    async fn ensure_can_view(&self, athlete_id: Uuid) -> AppResult<()> {
        let caller = self.session.user_id();
        if caller == athlete_id {
            return Ok(());
        }
        if self.session.caller().is_coach()
            && self.relationships.has_active_link(caller, athlete_id).await?
        {
            debug!(coach.id = %caller, user.id = %athlete_id, "Coach viewing linked athlete");
            return Ok(());
        }
        Err(AppError::permission_denied(
            "training data is visible only to the athlete and their active coaches",
        )
        .with_user_id(caller))
    }
}
