// ABOUTME: RAII transaction guard and bounded retry used by the atomic relationship procedures
// ABOUTME: Uncommitted guards roll back on drop; lock contention is retried with exponential backoff
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Transaction helpers
//!
//! An atomic relationship transition reads the row, runs the guards, and
//! writes inside one [`SqliteTransactionGuard`]. Returning early with `?`
//! drops the guard, which rolls the transaction back.

use std::future::Future;
use std::time::Duration;

use sqlx::{Database, Sqlite, Transaction};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::errors::{AppError, AppResult, ErrorCode};

/// Base backoff between retries; doubles each attempt
const BASE_BACKOFF_MS: u64 = 10;

/// Retry `f` while it fails with a transient lock error, up to `max_attempts` runs
///
/// Domain errors (conflicts, invalid state, permission) are returned
/// immediately: retrying cannot change their outcome.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted or a non-transient error occurs
pub async fn retry_transaction<F, Fut, T>(mut f: F, max_attempts: u32) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && is_transient(&e) => {
                let backoff_ms = BASE_BACKOFF_MS << attempt;
                warn!(
                    attempt,
                    max_attempts,
                    backoff_ms,
                    error = %e,
                    "Relationship transaction hit lock contention, retrying"
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Whether a store error is lock contention that may clear on retry
fn is_transient(error: &AppError) -> bool {
    if error.code != ErrorCode::DatabaseError {
        return false;
    }
    let message = error.message.to_lowercase();
    message.contains("database is locked") || message.contains("busy")
}

/// RAII wrapper around a `sqlx` transaction that rolls back unless committed
pub struct TransactionGuard<'c, DB: Database> {
    transaction: Option<Transaction<'c, DB>>,
}

impl<'c, DB: Database> TransactionGuard<'c, DB> {
    /// Wrap a freshly started transaction
    #[must_use]
    pub fn new(transaction: Transaction<'c, DB>) -> Self {
        Self {
            transaction: Some(transaction),
        }
    }

    /// Commit and consume the guard
    ///
    /// # Errors
    ///
    /// Returns a database error if the commit fails
    pub async fn commit(mut self) -> AppResult<()> {
        let Some(tx) = self.transaction.take() else {
            return Err(AppError::internal("Transaction already consumed"));
        };
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Transaction commit failed: {e}")))?;
        debug!("Transaction committed");
        Ok(())
    }

    /// Connection to run queries on inside the transaction
    ///
    /// # Errors
    ///
    /// Returns an internal error if the guard was already committed
    pub fn executor(&mut self) -> AppResult<&mut <DB as Database>::Connection> {
        self.transaction
            .as_deref_mut()
            .ok_or_else(|| AppError::internal("Transaction guard used after commit"))
    }
}

impl<DB: Database> Drop for TransactionGuard<'_, DB> {
    fn drop(&mut self) {
        if self.transaction.is_some() {
            debug!("Transaction dropped without commit, rolling back");
        }
    }
}

/// `SQLite` transaction guard
pub type SqliteTransactionGuard<'c> = TransactionGuard<'c, Sqlite>;
