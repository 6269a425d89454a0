// ABOUTME: Per-session context carrying the authenticated caller and their relationship cache
// ABOUTME: Passed explicitly to the lifecycle manager and analytics facade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use uuid::Uuid;

use crate::models::{Caller, CallerRole};
use crate::relationships::RelationshipCache;

/// Authenticated caller plus the state scoped to their session
///
/// Clones share the same cache.
#[derive(Debug, Clone)]
pub struct SessionContext {
    caller: Caller,
    cache: Arc<RelationshipCache>,
}

impl SessionContext {
    /// Session for `caller` with an empty cache
    #[must_use]
    pub fn new(caller: Caller) -> Self {
        Self {
            caller,
            cache: Arc::new(RelationshipCache::new()),
        }
    }

    /// Session acting as an athlete
    #[must_use]
    pub fn athlete(user_id: Uuid) -> Self {
        Self::new(Caller::athlete(user_id))
    }

    /// Session acting as a coach
    #[must_use]
    pub fn coach(user_id: Uuid) -> Self {
        Self::new(Caller::coach(user_id))
    }

    /// Authenticated caller
    #[must_use]
    pub const fn caller(&self) -> Caller {
        self.caller
    }

    /// Authenticated user id
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.caller.user_id
    }

    /// Role the session acts in
    #[must_use]
    pub const fn role(&self) -> CallerRole {
        self.caller.role
    }

    /// Relationship rows visible to this session
    #[must_use]
    pub fn cache(&self) -> &RelationshipCache {
        &self.cache
    }
}
