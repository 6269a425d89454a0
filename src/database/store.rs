// ABOUTME: Generic relationship store interface consumed by the repository and lifecycle manager
// ABOUTME: Filtered select/update/delete plus atomic transition procedures that a backend may lack
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Relationship Store
//!
//! The store is the only component that touches persistence. Besides plain
//! filtered CRUD it can expose server-side transition procedures that
//! perform the checks and the write as one atomic unit. Backends that do not
//! install those procedures answer every [`RelationshipStore::call_procedure`]
//! with [`ErrorCode::BackendUnavailable`](crate::errors::ErrorCode), which the
//! lifecycle manager treats as the signal to use its fallback sequence.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::procedures::{
    APPROVE_RELATIONSHIP, DEACTIVATE_RELATIONSHIP, REJECT_RELATIONSHIP, UNLINK_RELATIONSHIP,
};
use crate::errors::AppResult;
use crate::models::{NewRelationship, Relationship, RelationshipChanges, RelationshipFilter};

/// Whether the backend has the atomic transition procedures installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureSupport {
    /// Procedures are installed
    #[default]
    Available,
    /// Legacy backend without procedures
    Unavailable,
}

impl ProcedureSupport {
    /// Map the `atomic_transitions` config flag
    #[must_use]
    pub const fn from_flag(enabled: bool) -> Self {
        if enabled {
            Self::Available
        } else {
            Self::Unavailable
        }
    }
}

/// Invocation of an atomic transition procedure
///
/// `caller` is the authenticated user the procedure checks ownership against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcedureCall {
    /// `pending` to `active`
    Approve {
        /// Target row
        relationship_id: Uuid,
        /// Coach approving
        caller: Uuid,
        /// Optional team reassignment
        team_id: Option<Uuid>,
        /// Optional replacement notes
        notes: Option<String>,
    },
    /// `pending` to `rejected`
    Reject {
        /// Target row
        relationship_id: Uuid,
        /// Coach rejecting
        caller: Uuid,
        /// Optional replacement notes
        notes: Option<String>,
    },
    /// Coach ends an `active` link
    Deactivate {
        /// Target row
        relationship_id: Uuid,
        /// Coach ending the link
        caller: Uuid,
    },
    /// Athlete ends an `active` link
    Unlink {
        /// Target row
        relationship_id: Uuid,
        /// Athlete ending the link
        caller: Uuid,
    },
}

impl ProcedureCall {
    /// Procedure name as installed in the backend
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Approve { .. } => APPROVE_RELATIONSHIP,
            Self::Reject { .. } => REJECT_RELATIONSHIP,
            Self::Deactivate { .. } => DEACTIVATE_RELATIONSHIP,
            Self::Unlink { .. } => UNLINK_RELATIONSHIP,
        }
    }

    /// Row the procedure operates on
    #[must_use]
    pub const fn relationship_id(&self) -> Uuid {
        match self {
            Self::Approve {
                relationship_id, ..
            }
            | Self::Reject {
                relationship_id, ..
            }
            | Self::Deactivate {
                relationship_id, ..
            }
            | Self::Unlink {
                relationship_id, ..
            } => *relationship_id,
        }
    }

    /// Authenticated user invoking the procedure
    #[must_use]
    pub const fn caller(&self) -> Uuid {
        match self {
            Self::Approve { caller, .. }
            | Self::Reject { caller, .. }
            | Self::Deactivate { caller, .. }
            | Self::Unlink { caller, .. } => *caller,
        }
    }
}

/// Generic query/mutation interface over relationship rows
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Insert a row; the store generates `id` and timestamps
    async fn insert(&self, relationship: &NewRelationship) -> AppResult<Relationship>;

    /// Rows matching `filter`, newest request first
    async fn select(&self, filter: &RelationshipFilter) -> AppResult<Vec<Relationship>>;

    /// Apply `changes` to every row matching `filter`, returning the updated rows
    async fn update(
        &self,
        filter: &RelationshipFilter,
        changes: &RelationshipChanges,
    ) -> AppResult<Vec<Relationship>>;

    /// Physically delete rows matching `filter`, returning the count
    async fn delete(&self, filter: &RelationshipFilter) -> AppResult<u64>;

    /// Run an atomic transition procedure
    ///
    /// Returns `BackendUnavailable` when the backend does not provide it.
    async fn call_procedure(&self, call: &ProcedureCall) -> AppResult<Relationship>;
}
