// ABOUTME: Domain models re-exported from coachlink-core
// ABOUTME: Relationship rows, filters, transition guards, callers, and training sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models

pub use coachlink_core::models::*;
