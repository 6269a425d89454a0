// ABOUTME: Domain service layer over the repositories and calculators
// ABOUTME: Analytics facade with access control, usable from any protocol entry point
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer

/// Training-load analytics with athlete/coach access control
pub mod analytics;

pub use analytics::{AnalyticsService, InsightGenerator};
