// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, in-memory databases, and per-role lifecycle managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `coachlink`

use std::env;
use std::sync::Once;

use anyhow::Result;
use coachlink::config::environment::{DatabaseConfig, DatabaseUrl};
use coachlink::context::SessionContext;
use coachlink::database::repositories::RelationshipRepository;
use coachlink::database::{Database, ProcedureSupport};
use coachlink::models::Relationship;
use coachlink::relationships::RelationshipLifecycleManager;
use tempfile::TempDir;
use tracing::Level;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new(&DatabaseConfig::in_memory()).await?)
}

/// File-backed database with a multi-connection pool, for tests that need real concurrency
pub async fn create_file_database(dir: &TempDir) -> Result<Database> {
    init_test_logging();
    let config = DatabaseConfig {
        url: DatabaseUrl::SQLite {
            path: dir.path().join("coachlink.db"),
        },
        max_connections: 8,
    };
    Ok(Database::new(&config).await?)
}

/// Both transition paths, for tests that must hold on either
pub const BOTH_PATHS: [ProcedureSupport; 2] =
    [ProcedureSupport::Available, ProcedureSupport::Unavailable];

/// One athlete, two coaches, and a shared store
pub struct LifecycleFixture {
    pub database: Database,
    pub repository: RelationshipRepository,
    pub athlete_id: Uuid,
    pub coach_id: Uuid,
    pub other_coach_id: Uuid,
}

impl LifecycleFixture {
    pub async fn new(procedures: ProcedureSupport) -> Result<Self> {
        Ok(Self::with_database(create_test_database().await?, procedures))
    }

    pub fn with_database(database: Database, procedures: ProcedureSupport) -> Self {
        let repository = RelationshipRepository::new(database.relationship_store(procedures));
        Self {
            database,
            repository,
            athlete_id: Uuid::new_v4(),
            coach_id: Uuid::new_v4(),
            other_coach_id: Uuid::new_v4(),
        }
    }

    pub fn manager(&self, session: SessionContext) -> RelationshipLifecycleManager {
        RelationshipLifecycleManager::new(self.repository.clone(), session)
    }

    pub fn athlete(&self) -> RelationshipLifecycleManager {
        self.manager(SessionContext::athlete(self.athlete_id))
    }

    pub fn coach(&self) -> RelationshipLifecycleManager {
        self.manager(SessionContext::coach(self.coach_id))
    }

    pub fn other_coach(&self) -> RelationshipLifecycleManager {
        self.manager(SessionContext::coach(self.other_coach_id))
    }

    /// Pending request from the athlete to the primary coach
    pub async fn request(&self, modality: &str) -> Result<Relationship> {
        Ok(self
            .athlete()
            .request(self.athlete_id, self.coach_id, modality, None, None)
            .await?)
    }

    /// Active link between the athlete and the primary coach
    pub async fn link(&self, modality: &str) -> Result<Relationship> {
        let pending = self.request(modality).await?;
        Ok(self.coach().approve(pending.id, None, None).await?)
    }
}
