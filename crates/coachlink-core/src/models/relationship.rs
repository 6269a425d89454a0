// ABOUTME: Coach/athlete relationship models scoped to one training modality
// ABOUTME: Status state machine, store filter/change types, and modality normalization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

// ============================================================================
// Status
// ============================================================================

/// Lifecycle status of a coach/athlete relationship
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    /// Requested by the athlete, awaiting the coach
    #[default]
    Pending,
    /// Approved by the coach
    Active,
    /// Declined by the coach
    Rejected,
    /// Ended by either party after being active
    Inactive,
    /// Hidden from the coach's history (soft delete)
    Removed,
}

impl Display for RelationshipStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "rejected" => Ok(Self::Rejected),
            "inactive" => Ok(Self::Inactive),
            "removed" => Ok(Self::Removed),
            _ => Err(AppError::invalid_input(format!(
                "Invalid relationship status: {s}"
            ))),
        }
    }
}

impl RelationshipStatus {
    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Rejected => "rejected",
            Self::Inactive => "inactive",
            Self::Removed => "removed",
        }
    }

    /// Whether the state machine allows moving from `self` to `next`
    ///
    /// There is no way back to `pending` or `active` from a terminal status;
    /// a new relationship row must be created instead.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Active | Self::Rejected | Self::Removed)
                | (Self::Active, Self::Inactive)
                | (Self::Rejected | Self::Inactive, Self::Removed)
        )
    }
}

// ============================================================================
// Relationship row
// ============================================================================

/// Link between one athlete and one coach for one modality
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relationship {
    /// Store-generated identifier
    pub id: Uuid,
    /// Athlete side of the link
    pub athlete_id: Uuid,
    /// Coach side of the link
    pub coach_id: Uuid,
    /// Optional coach-owned grouping
    pub team_id: Option<Uuid>,
    /// Training modality label (trimmed, never empty)
    pub modality: String,
    /// Current lifecycle status
    pub status: RelationshipStatus,
    /// Free text notes
    pub notes: Option<String>,
    /// When the athlete requested the link
    pub requested_at: DateTime<Utc>,
    /// When the coach approved the link
    pub approved_at: Option<DateTime<Utc>>,
    /// Coach who approved the link
    pub approved_by: Option<Uuid>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new relationship row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRelationship {
    /// Athlete side of the link
    pub athlete_id: Uuid,
    /// Coach side of the link
    pub coach_id: Uuid,
    /// Optional team
    pub team_id: Option<Uuid>,
    /// Normalized modality
    pub modality: String,
    /// Initial status (always `pending` for athlete requests)
    pub status: RelationshipStatus,
    /// Optional notes from the athlete
    pub notes: Option<String>,
}

impl NewRelationship {
    /// Pending request from `athlete_id` to `coach_id`
    #[must_use]
    pub const fn pending(
        athlete_id: Uuid,
        coach_id: Uuid,
        team_id: Option<Uuid>,
        modality: String,
        notes: Option<String>,
    ) -> Self {
        Self {
            athlete_id,
            coach_id,
            team_id,
            modality,
            status: RelationshipStatus::Pending,
            notes,
        }
    }
}

/// Normalize a modality label, rejecting empty values
///
/// # Errors
///
/// Returns `InvalidInput` when the label is missing or blank after trimming
pub fn normalize_modality(modality: &str) -> AppResult<String> {
    let trimmed = modality.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("modality is required"));
    }
    Ok(trimmed.to_owned())
}

// ============================================================================
// Store query and mutation types
// ============================================================================

/// Equality filter over relationship rows; unset fields match anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipFilter {
    /// Exact row id
    pub id: Option<Uuid>,
    /// Athlete id
    pub athlete_id: Option<Uuid>,
    /// Coach id
    pub coach_id: Option<Uuid>,
    /// Normalized modality
    pub modality: Option<String>,
    /// Allowed statuses (empty matches any status)
    pub statuses: Vec<RelationshipStatus>,
    /// Statuses to exclude
    pub excluded_statuses: Vec<RelationshipStatus>,
    /// Maximum number of rows to return
    pub limit: Option<u32>,
}

impl RelationshipFilter {
    /// Filter matching a single row by id
    #[must_use]
    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Restrict to an athlete
    #[must_use]
    pub const fn athlete(mut self, athlete_id: Uuid) -> Self {
        self.athlete_id = Some(athlete_id);
        self
    }

    /// Restrict to a coach
    #[must_use]
    pub const fn coach(mut self, coach_id: Uuid) -> Self {
        self.coach_id = Some(coach_id);
        self
    }

    /// Restrict to a modality
    #[must_use]
    pub fn modality(mut self, modality: impl Into<String>) -> Self {
        self.modality = Some(modality.into());
        self
    }

    /// Restrict to a single status
    #[must_use]
    pub fn status(mut self, status: RelationshipStatus) -> Self {
        self.statuses = vec![status];
        self
    }

    /// Exclude a status
    #[must_use]
    pub fn excluding(mut self, status: RelationshipStatus) -> Self {
        self.excluded_statuses.push(status);
        self
    }

    /// Cap the number of returned rows
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluate the filter against a row (used by in-memory caches)
    #[must_use]
    pub fn matches(&self, row: &Relationship) -> bool {
        self.id.is_none_or(|id| row.id == id)
            && self.athlete_id.is_none_or(|id| row.athlete_id == id)
            && self.coach_id.is_none_or(|id| row.coach_id == id)
            && self.modality.as_deref().is_none_or(|m| row.modality == m)
            && (self.statuses.is_empty() || self.statuses.contains(&row.status))
            && !self.excluded_statuses.contains(&row.status)
    }
}

/// Column changes applied by a store update; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipChanges {
    /// New status
    pub status: Option<RelationshipStatus>,
    /// New team
    pub team_id: Option<Uuid>,
    /// Replacement notes
    pub notes: Option<String>,
    /// Approval timestamp
    pub approved_at: Option<DateTime<Utc>>,
    /// Approving coach
    pub approved_by: Option<Uuid>,
}

impl RelationshipChanges {
    /// Change only the status
    #[must_use]
    pub fn status(status: RelationshipStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Changes applied when a coach approves a pending row
    #[must_use]
    pub fn approval(coach_id: Uuid, team_id: Option<Uuid>, notes: Option<String>) -> Self {
        Self {
            status: Some(RelationshipStatus::Active),
            team_id,
            notes,
            approved_at: Some(Utc::now()),
            approved_by: Some(coach_id),
        }
    }

    /// Changes applied when a coach rejects a pending row
    #[must_use]
    pub fn rejection(notes: Option<String>) -> Self {
        Self {
            status: Some(RelationshipStatus::Rejected),
            notes,
            ..Self::default()
        }
    }
}
