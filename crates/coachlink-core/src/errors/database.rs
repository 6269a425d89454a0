// ABOUTME: Conversion of sqlx errors into the unified AppError taxonomy
// ABOUTME: Maps unique-constraint violations to Conflict and everything else to DatabaseError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use sqlx::Error as SqlxError;

use super::{AppError, ErrorCode};

impl From<SqlxError> for AppError {
    fn from(error: SqlxError) -> Self {
        let mapped = match &error {
            SqlxError::RowNotFound => Self::not_found("Row"),
            // Partial unique indexes back the relationship invariants; a lost race lands here
            SqlxError::Database(db_err) if db_err.is_unique_violation() => Self::new(
                ErrorCode::Conflict,
                format!("Uniqueness constraint violated: {}", db_err.message()),
            ),
            _ => Self::database(error.to_string()),
        };
        mapped.with_source(error)
    }
}
