// ABOUTME: SQLite storage for training sessions keyed by athlete and date with a JSON metrics payload
// ABOUTME: Tolerates historical payload shapes; rows that cannot be read are skipped with a warning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::warn;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{DateRange, SessionStatus, TrainingSession};

/// Date format of the `training_date` column
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Training session persistence
#[derive(Clone)]
pub struct TrainingSessionManager {
    pool: SqlitePool,
}

impl TrainingSessionManager {
    /// Create a manager over an already migrated pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace a session
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub async fn upsert(&self, session: &TrainingSession) -> AppResult<()> {
        let payload = serde_json::to_value(session)?;
        self.upsert_payload(
            session.id,
            session.user_id,
            session.training_date,
            session.status,
            &payload,
        )
        .await
    }

    /// Insert or replace a session from a raw JSON payload
    ///
    /// Used for imports from older clients whose metric fields do not match
    /// the current shape; the payload is stored as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails
    pub async fn upsert_payload(
        &self,
        id: Uuid,
        user_id: Uuid,
        training_date: NaiveDate,
        status: SessionStatus,
        payload: &Value,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO training_sessions (id, user_id, training_date, status, payload)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT(id) DO UPDATE SET
                training_date = excluded.training_date,
                status = excluded.status,
                payload = excluded.payload
            ",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(training_date.format(DATE_FORMAT).to_string())
        .bind(status.as_str())
        .bind(payload.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to store training session: {e}")))?;
        Ok(())
    }

    /// Sessions for `user_id`, oldest first, optionally limited to `range`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        range: Option<DateRange>,
    ) -> AppResult<Vec<TrainingSession>> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, user_id, training_date, status, payload FROM training_sessions WHERE user_id = ",
        );
        builder.push_bind(user_id.to_string());
        if let Some(range) = range {
            builder
                .push(" AND training_date >= ")
                .push_bind(range.start.format(DATE_FORMAT).to_string())
                .push(" AND training_date <= ")
                .push_bind(range.end.format(DATE_FORMAT).to_string());
        }
        builder.push(" ORDER BY training_date, id");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list training sessions: {e}")))?;

        Ok(rows
            .iter()
            .filter_map(|row| match row_to_session(row) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(user.id = %user_id, error = %e, "Skipping unreadable training session");
                    None
                }
            })
            .collect())
    }

    /// Delete every session of `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM training_sessions WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete training sessions: {e}")))?;
        Ok(result.rows_affected())
    }
}

/// Columns are authoritative for identity, date, and status; the payload supplies metrics
fn row_to_session(row: &SqliteRow) -> AppResult<TrainingSession> {
    let payload: String = row.get("payload");
    let mut value: Value = serde_json::from_str(&payload)?;
    let Value::Object(fields) = &mut value else {
        return Err(AppError::serialization("training session payload is not an object"));
    };
    for column in ["id", "user_id", "training_date", "status"] {
        let raw: String = row.get(column);
        fields.insert(column.to_owned(), Value::String(raw));
    }
    Ok(serde_json::from_value(value)?)
}
