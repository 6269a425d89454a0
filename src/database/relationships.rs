// ABOUTME: SQLite implementation of the relationship store with dynamic filtered queries
// ABOUTME: Maps rows to Relationship models and translates unique-index violations into invariant conflicts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqliteRow;
use sqlx::{Error as SqlxError, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::store::{ProcedureCall, ProcedureSupport, RelationshipStore};
use crate::constants::procedures::FUNCTION_NOT_FOUND;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::guards::{ACTIVE_WITH_OTHER_COACH, DUPLICATE_PENDING};
use crate::models::{
    NewRelationship, Relationship, RelationshipChanges, RelationshipFilter, RelationshipStatus,
};

const SELECT_RELATIONSHIPS: &str = "SELECT id, athlete_id, coach_id, team_id, modality, status, \
     notes, requested_at, approved_at, approved_by, updated_at FROM coach_athlete_relationships";

const RETURNING_COLUMNS: &str = " RETURNING id, athlete_id, coach_id, team_id, modality, status, \
     notes, requested_at, approved_at, approved_by, updated_at";

/// Timestamps are stored as fixed-width RFC 3339 text so they sort lexically
pub(super) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid timestamp '{raw}': {e}")))
}

fn parse_uuid(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))
}

fn row_to_relationship(row: &SqliteRow) -> AppResult<Relationship> {
    let id: String = row.get("id");
    let athlete_id: String = row.get("athlete_id");
    let coach_id: String = row.get("coach_id");
    let team_id: Option<String> = row.get("team_id");
    let status: String = row.get("status");
    let requested_at: String = row.get("requested_at");
    let approved_at: Option<String> = row.get("approved_at");
    let approved_by: Option<String> = row.get("approved_by");
    let updated_at: String = row.get("updated_at");

    Ok(Relationship {
        id: parse_uuid(&id)?,
        athlete_id: parse_uuid(&athlete_id)?,
        coach_id: parse_uuid(&coach_id)?,
        team_id: team_id.as_deref().map(parse_uuid).transpose()?,
        modality: row.get("modality"),
        status: status.parse()?,
        notes: row.get("notes"),
        requested_at: parse_timestamp(&requested_at)?,
        approved_at: approved_at.as_deref().map(parse_timestamp).transpose()?,
        approved_by: approved_by.as_deref().map(parse_uuid).transpose()?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

/// Map a `sqlx` failure, naming the violated invariant for unique-index conflicts
pub(super) fn store_error(operation: &'static str) -> impl FnOnce(SqlxError) -> AppError {
    move |error| {
        let mapped = AppError::from(error);
        match mapped.code {
            // The pending index is the only one keyed on coach_id
            ErrorCode::Conflict if mapped.message.contains(".coach_id") => AppError {
                message: DUPLICATE_PENDING.to_owned(),
                ..mapped
            },
            ErrorCode::Conflict => AppError {
                message: ACTIVE_WITH_OTHER_COACH.to_owned(),
                ..mapped
            },
            ErrorCode::DatabaseError => AppError {
                message: format!("Failed to {operation}: {}", mapped.message),
                ..mapped
            },
            _ => mapped,
        }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &RelationshipFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(id) = filter.id {
        builder.push(" AND id = ").push_bind(id.to_string());
    }
    if let Some(athlete_id) = filter.athlete_id {
        builder
            .push(" AND athlete_id = ")
            .push_bind(athlete_id.to_string());
    }
    if let Some(coach_id) = filter.coach_id {
        builder.push(" AND coach_id = ").push_bind(coach_id.to_string());
    }
    if let Some(modality) = &filter.modality {
        builder.push(" AND modality = ").push_bind(modality.clone());
    }
    push_status_list(builder, " AND status IN (", &filter.statuses);
    push_status_list(builder, " AND status NOT IN (", &filter.excluded_statuses);
}

fn push_status_list(
    builder: &mut QueryBuilder<'_, Sqlite>,
    clause: &str,
    statuses: &[RelationshipStatus],
) {
    if statuses.is_empty() {
        return;
    }
    builder.push(clause);
    let mut separated = builder.separated(", ");
    for status in statuses {
        separated.push_bind(status.as_str());
    }
    separated.push_unseparated(")");
}

/// Select rows on an open connection (shared with the atomic procedures)
pub(super) async fn select_on(
    conn: &mut SqliteConnection,
    filter: &RelationshipFilter,
) -> AppResult<Vec<Relationship>> {
    let mut builder = QueryBuilder::<Sqlite>::new(SELECT_RELATIONSHIPS);
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY requested_at DESC, id");
    if let Some(limit) = filter.limit {
        builder.push(" LIMIT ").push_bind(i64::from(limit));
    }

    let rows = builder
        .build()
        .fetch_all(&mut *conn)
        .await
        .map_err(store_error("select relationships"))?;
    rows.iter().map(row_to_relationship).collect()
}

/// Update rows on an open connection (shared with the atomic procedures)
pub(super) async fn update_on(
    conn: &mut SqliteConnection,
    filter: &RelationshipFilter,
    changes: &RelationshipChanges,
) -> AppResult<Vec<Relationship>> {
    let mut builder =
        QueryBuilder::<Sqlite>::new("UPDATE coach_athlete_relationships SET updated_at = ");
    builder.push_bind(format_timestamp(Utc::now()));
    if let Some(status) = changes.status {
        builder.push(", status = ").push_bind(status.as_str());
    }
    if let Some(team_id) = changes.team_id {
        builder.push(", team_id = ").push_bind(team_id.to_string());
    }
    if let Some(notes) = &changes.notes {
        builder.push(", notes = ").push_bind(notes.clone());
    }
    if let Some(approved_at) = changes.approved_at {
        builder
            .push(", approved_at = ")
            .push_bind(format_timestamp(approved_at));
    }
    if let Some(approved_by) = changes.approved_by {
        builder
            .push(", approved_by = ")
            .push_bind(approved_by.to_string());
    }
    push_filter(&mut builder, filter);
    builder.push(RETURNING_COLUMNS);

    let rows = builder
        .build()
        .fetch_all(&mut *conn)
        .await
        .map_err(store_error("update relationships"))?;
    rows.iter().map(row_to_relationship).collect()
}

/// `SQLite`-backed relationship store
#[derive(Clone)]
pub struct SqliteRelationshipStore {
    pub(super) pool: SqlitePool,
    procedures: ProcedureSupport,
}

impl SqliteRelationshipStore {
    /// Create a store over an already migrated pool
    #[must_use]
    pub const fn new(pool: SqlitePool, procedures: ProcedureSupport) -> Self {
        Self { pool, procedures }
    }

    async fn connection(&self) -> AppResult<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .map_err(store_error("acquire connection"))
    }
}

#[async_trait]
impl RelationshipStore for SqliteRelationshipStore {
    async fn insert(&self, relationship: &NewRelationship) -> AppResult<Relationship> {
        let now = format_timestamp(Utc::now());
        let mut builder = QueryBuilder::<Sqlite>::new(
            "INSERT INTO coach_athlete_relationships (id, athlete_id, coach_id, team_id, \
             modality, status, notes, requested_at, approved_at, approved_by, updated_at) VALUES (",
        );
        builder
            .separated(", ")
            .push_bind(Uuid::new_v4().to_string())
            .push_bind(relationship.athlete_id.to_string())
            .push_bind(relationship.coach_id.to_string())
            .push_bind(relationship.team_id.map(|id| id.to_string()))
            .push_bind(relationship.modality.clone())
            .push_bind(relationship.status.as_str())
            .push_bind(relationship.notes.clone())
            .push_bind(now.clone())
            .push("NULL")
            .push("NULL")
            .push_bind(now)
            .push_unseparated(")");
        builder.push(RETURNING_COLUMNS);

        let row = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(store_error("insert relationship"))?;
        let inserted = row_to_relationship(&row)?;

        debug!(
            relationship.id = %inserted.id,
            relationship.status = %inserted.status,
            "Inserted relationship row"
        );
        Ok(inserted)
    }

    async fn select(&self, filter: &RelationshipFilter) -> AppResult<Vec<Relationship>> {
        let mut conn = self.connection().await?;
        select_on(&mut conn, filter).await
    }

    async fn update(
        &self,
        filter: &RelationshipFilter,
        changes: &RelationshipChanges,
    ) -> AppResult<Vec<Relationship>> {
        let mut conn = self.connection().await?;
        update_on(&mut conn, filter, changes).await
    }

    async fn delete(&self, filter: &RelationshipFilter) -> AppResult<u64> {
        let mut builder = QueryBuilder::<Sqlite>::new("DELETE FROM coach_athlete_relationships");
        push_filter(&mut builder, filter);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(store_error("delete relationships"))?;
        Ok(result.rows_affected())
    }

    async fn call_procedure(&self, call: &ProcedureCall) -> AppResult<Relationship> {
        match self.procedures {
            ProcedureSupport::Available => self.run_procedure(call).await,
            ProcedureSupport::Unavailable => Err(AppError::backend_unavailable(format!(
                "{FUNCTION_NOT_FOUND}: {}",
                call.name()
            ))
            .with_details(json!({ "procedure": call.name() }))),
        }
    }
}
