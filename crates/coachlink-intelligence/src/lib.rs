// ABOUTME: Training-load intelligence for coach/athlete analytics
// ABOUTME: Pure calculators over training sessions with no I/O or store access
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Coachlink Intelligence
//!
//! Deterministic analysis of an athlete's training sessions. Everything here
//! is synchronous and reentrant so it can run inside any async task.

/// Session load, acute/chronic series, and per-modality aggregates
pub mod load;

pub use load::{
    is_running_modality, session_load, EfficiencyPoint, LoadAnalysis, LoadCalculator, LoadPoint,
    LoadSummary, LoadWindows, ModalityStats, PlanComparison, SessionLoad,
};
