// ABOUTME: Authenticated caller identity used to scope relationship and analytics operations
// ABOUTME: Carries the user id and whether the session acts as an athlete or a coach
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Side of the relationship the session acts on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CallerRole {
    /// Athlete account
    Athlete,
    /// Coach account
    Coach,
}

impl Display for CallerRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Athlete => f.write_str("athlete"),
            Self::Coach => f.write_str("coach"),
        }
    }
}

/// Identity of the authenticated caller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Caller {
    /// Authenticated user id
    pub user_id: Uuid,
    /// Role the session acts in
    pub role: CallerRole,
}

impl Caller {
    /// Athlete caller
    #[must_use]
    pub const fn athlete(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: CallerRole::Athlete,
        }
    }

    /// Coach caller
    #[must_use]
    pub const fn coach(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: CallerRole::Coach,
        }
    }

    /// Whether the session acts as a coach
    #[must_use]
    pub const fn is_coach(&self) -> bool {
        matches!(self.role, CallerRole::Coach)
    }
}
