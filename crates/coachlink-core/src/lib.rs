// ABOUTME: Core types and constants for the coach/athlete relationship platform
// ABOUTME: Foundation crate with error handling, relationship and training models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Coachlink Core
//!
//! Foundation crate shared by the relationship lifecycle manager and the
//! training-load calculator. It changes rarely and carries no I/O.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Constants organized by domain
//! - **models**: Relationship, caller, and training session models

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models
pub mod models;
