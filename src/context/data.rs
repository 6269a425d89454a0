// ABOUTME: Data context for dependency injection of database handles and repositories
// ABOUTME: Builds lifecycle managers and analytics services for an authenticated session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use coachlink_intelligence::LoadCalculator;
use tracing::info;

use super::SessionContext;
use crate::config::environment::{AnalyticsConfig, RelationshipConfig, ServerConfig};
use crate::database::repositories::{RelationshipRepository, TrainingSessionRepository};
use crate::database::{Database, ProcedureSupport};
use crate::errors::AppResult;
use crate::relationships::RelationshipLifecycleManager;
use crate::services::AnalyticsService;

/// Data context containing database and repository dependencies
///
/// # Dependencies
/// - `database`: pool owner, used for training-session imports
/// - `relationships`: repository over the relationship store
/// - `training_sessions`: session source for the analytics facade
/// - `analytics`: load window configuration
#[derive(Clone)]
pub struct DataContext {
    database: Database,
    relationships: RelationshipRepository,
    training_sessions: Arc<dyn TrainingSessionRepository>,
    analytics: AnalyticsConfig,
}

impl DataContext {
    /// Create a data context over an opened database
    #[must_use]
    pub fn new(
        database: Database,
        relationships: RelationshipConfig,
        analytics: AnalyticsConfig,
    ) -> Self {
        let store =
            database.relationship_store(ProcedureSupport::from_flag(relationships.atomic_transitions));
        let training_sessions: Arc<dyn TrainingSessionRepository> =
            Arc::new(database.training_session_repository());
        Self {
            database,
            relationships: RelationshipRepository::new(store),
            training_sessions,
            analytics,
        }
    }

    /// Open the configured database and build the context
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated
    pub async fn from_config(config: &ServerConfig) -> AppResult<Self> {
        let database = Database::new(&config.database).await?;
        info!(
            atomic_transitions = config.relationships.atomic_transitions,
            acute_window_days = config.analytics.acute_window_days,
            chronic_window_days = config.analytics.chronic_window_days,
            "Data context ready"
        );
        Ok(Self::new(database, config.relationships, config.analytics))
    }

    /// Database handle
    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.database
    }

    /// Lifecycle manager acting for `session`
    #[must_use]
    pub fn lifecycle_manager(&self, session: SessionContext) -> RelationshipLifecycleManager {
        RelationshipLifecycleManager::new(self.relationships.clone(), session)
    }

    /// Analytics facade acting for `session`
    #[must_use]
    pub fn analytics_service(&self, session: SessionContext) -> AnalyticsService {
        AnalyticsService::new(
            Arc::clone(&self.training_sessions),
            self.relationships.clone(),
            LoadCalculator::with_windows(self.analytics.windows()),
            session,
        )
    }
}
