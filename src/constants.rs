// ABOUTME: Service-level constants for the coachlink crate
// ABOUTME: Re-exports the domain constants from coachlink-core alongside runtime defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module

pub use coachlink_core::constants::{load, modality, procedures, tables, time};

/// Service name used in structured logs
pub const SERVICE_NAME: &str = "coachlink";

/// Attempts made by an atomic transition before giving up on lock contention
pub const TRANSACTION_MAX_ATTEMPTS: u32 = 3;

/// Relationship rows fetched per refresh
pub const RELATIONSHIP_REFRESH_LIMIT: u32 = 500;
