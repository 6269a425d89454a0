// ABOUTME: Error types re-exported from coachlink-core
// ABOUTME: AppError, ErrorCode, and the AppResult alias used across the service crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Error Handling
//!
//! All fallible operations return [`AppResult`]. Lifecycle failures carry
//! one of the taxonomy codes (`InvalidInput`, `PermissionDenied`,
//! `ResourceNotFound`, `Conflict`, `InvalidState`) so callers can branch on
//! [`ErrorCode`] rather than on message text.

pub use coachlink_core::errors::*;
