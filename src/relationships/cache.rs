// ABOUTME: Session-scoped cache of the relationship rows visible to the current caller
// ABOUTME: Optimistic removal before writes, full replacement on refresh
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Relationship, RelationshipFilter};

/// Relationship rows as last seen by one session
///
/// The store is authoritative. Entries removed optimistically before a write
/// come back on the next refresh if the write fails.
#[derive(Debug, Default)]
pub struct RelationshipCache {
    rows: RwLock<Vec<Relationship>>,
}

impl RelationshipCache {
    /// Empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the cached rows
    pub async fn snapshot(&self) -> Vec<Relationship> {
        self.rows.read().await.clone()
    }

    /// Drop the row with `id`, returning it if it was cached
    pub async fn remove(&self, id: Uuid) -> Option<Relationship> {
        let mut rows = self.rows.write().await;
        let index = rows.iter().position(|row| row.id == id)?;
        Some(rows.remove(index))
    }

    /// Drop every row matching `filter`, returning how many were dropped
    pub async fn remove_matching(&self, filter: &RelationshipFilter) -> usize {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| !filter.matches(row));
        before - rows.len()
    }

    /// Replace the cached rows with a fresh read from the store
    pub async fn replace_all(&self, fresh: Vec<Relationship>) {
        *self.rows.write().await = fresh;
    }
}
