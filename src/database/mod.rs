// ABOUTME: Database bootstrap for relationship and training-session storage on SQLite
// ABOUTME: Opens the pool, runs idempotent migrations, and hands out store and repository handles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! [`Database`] owns the `SQLite` pool. The relationship invariants that the
//! lifecycle manager checks are also backed by partial unique indexes, so a
//! race lost on the non-atomic path fails with a conflict instead of
//! leaving two active links behind.

mod procedures;
mod relationships;
/// Repository layer over the stores
pub mod repositories;
/// Generic relationship store interface
pub mod store;
mod training_sessions;
/// Transaction guard and retry helpers
pub mod transactions;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

pub use relationships::SqliteRelationshipStore;
pub use store::{ProcedureCall, ProcedureSupport, RelationshipStore};
pub use training_sessions::TrainingSessionManager;

use crate::config::environment::{DatabaseConfig, DatabaseUrl};
use crate::errors::{AppError, AppResult};
use repositories::TrainingSessionRepositoryImpl;

/// Database handle shared by stores and repositories
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database described by `config` and run migrations
    ///
    /// In-memory databases use a single long-lived connection so every
    /// caller sees the same data.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        let pool = match &config.url {
            DatabaseUrl::Memory => SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await,
            DatabaseUrl::SQLite { path } => {
                ensure_parent_dir(path)?;
                SqlitePoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect_with(
                        SqliteConnectOptions::new()
                            .filename(path)
                            .create_if_missing(true),
                    )
                    .await
            }
        }
        .map_err(|e| AppError::database(format!("Failed to open {}: {e}", config.url)))?;

        let db = Self::from_pool(pool).await?;
        info!(database = %config.url, "Database ready");
        Ok(db)
    }

    /// Wrap an existing, unmigrated pool and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails
    pub async fn from_pool(pool: SqlitePool) -> AppResult<Self> {
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Underlying pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Relationship store with or without the atomic procedures
    #[must_use]
    pub fn relationship_store(&self, procedures: ProcedureSupport) -> Arc<dyn RelationshipStore> {
        Arc::new(SqliteRelationshipStore::new(self.pool.clone(), procedures))
    }

    /// Training session persistence
    #[must_use]
    pub fn training_sessions(&self) -> TrainingSessionManager {
        TrainingSessionManager::new(self.pool.clone())
    }

    /// Training session repository for the analytics facade
    #[must_use]
    pub fn training_session_repository(&self) -> TrainingSessionRepositoryImpl {
        TrainingSessionRepositoryImpl::new(self.training_sessions())
    }

    /// Run idempotent migrations
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_relationships().await?;
        self.migrate_training_sessions().await?;
        Ok(())
    }

    async fn execute(&self, statement: &str) -> AppResult<()> {
        sqlx::query(statement)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        Ok(())
    }

    async fn migrate_relationships(&self) -> AppResult<()> {
        self.execute(
            r"
            CREATE TABLE IF NOT EXISTS coach_athlete_relationships (
                id TEXT PRIMARY KEY,
                athlete_id TEXT NOT NULL,
                coach_id TEXT NOT NULL,
                team_id TEXT,
                modality TEXT NOT NULL CHECK (length(trim(modality)) > 0),
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'active', 'rejected', 'inactive', 'removed')),
                notes TEXT,
                requested_at TEXT NOT NULL,
                approved_at TEXT,
                approved_by TEXT,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .await?;

        // One active coach per athlete and modality
        self.execute(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_relationships_single_active \
             ON coach_athlete_relationships(athlete_id, modality) WHERE status = 'active'",
        )
        .await?;
        // One pending request per athlete, coach, and modality
        self.execute(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_relationships_single_pending \
             ON coach_athlete_relationships(athlete_id, coach_id, modality) WHERE status = 'pending'",
        )
        .await?;
        self.execute(
            "CREATE INDEX IF NOT EXISTS idx_relationships_coach \
             ON coach_athlete_relationships(coach_id, status)",
        )
        .await?;
        self.execute(
            "CREATE INDEX IF NOT EXISTS idx_relationships_athlete \
             ON coach_athlete_relationships(athlete_id, status)",
        )
        .await
    }

    async fn migrate_training_sessions(&self) -> AppResult<()> {
        self.execute(
            r"
            CREATE TABLE IF NOT EXISTS training_sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                training_date TEXT NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('planned', 'completed')),
                payload TEXT NOT NULL DEFAULT '{}'
            )
            ",
        )
        .await?;
        self.execute(
            "CREATE INDEX IF NOT EXISTS idx_training_sessions_user_date \
             ON training_sessions(user_id, training_date)",
        )
        .await
    }
}

fn ensure_parent_dir(path: &Path) -> AppResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|e| {
                AppError::database(format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ))
            }),
        _ => Ok(()),
    }
}
