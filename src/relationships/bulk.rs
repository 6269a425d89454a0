// ABOUTME: Aggregation of concurrent per-modality relationship requests
// ABOUTME: Collects every result and raises only when all of them failed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::Relationship;

/// One modality that could not be requested
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkRequestFailure {
    /// Modality as supplied by the caller
    pub modality: String,
    /// Error code of the failure
    pub code: ErrorCode,
    /// Error message of the failure
    pub message: String,
}

/// Aggregate result of a bulk request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkRequestOutcome {
    /// Number of rows created
    pub successes: usize,
    /// Number of modalities that failed
    pub failures: usize,
    /// Number of modalities attempted
    pub total: usize,
    /// Rows created, in input order
    pub created: Vec<Relationship>,
    /// Failures, in input order
    pub errors: Vec<BulkRequestFailure>,
}

impl BulkRequestOutcome {
    /// Fold per-modality results into an outcome
    ///
    /// # Errors
    ///
    /// Returns the first captured error when every request failed
    pub fn collect(results: Vec<(String, AppResult<Relationship>)>) -> AppResult<Self> {
        let total = results.len();
        let mut created = Vec::new();
        let mut errors = Vec::new();
        let mut first_error: Option<AppError> = None;

        for (modality, result) in results {
            match result {
                Ok(relationship) => created.push(relationship),
                Err(error) => {
                    errors.push(BulkRequestFailure {
                        modality,
                        code: error.code,
                        message: error.message.clone(),
                    });
                    first_error.get_or_insert(error);
                }
            }
        }

        if created.is_empty() {
            if let Some(error) = first_error {
                return Err(error);
            }
        }

        Ok(Self {
            successes: created.len(),
            failures: errors.len(),
            total,
            created,
            errors,
        })
    }

    /// Whether every modality succeeded
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failures == 0
    }
}
