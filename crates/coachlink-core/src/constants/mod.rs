// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for relationships, procedures, and training-load analysis
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants grouped by domain

/// Time conversion constants
pub mod time {
    /// Minutes in one hour
    pub const MINUTES_PER_HOUR: f64 = 60.0;
}

/// Modality labels and classification keywords
pub mod modality {
    /// Grouping key for sessions without a modality
    pub const UNCLASSIFIED: &str = "Unclassified";
    /// Case-insensitive substrings that mark a modality as running
    pub const RUNNING_KEYWORDS: &[&str] = &["run", "corrida"];
}

/// Training-load window defaults
pub mod load {
    /// Acute window length in days (inclusive of the anchor date)
    pub const DEFAULT_ACUTE_WINDOW_DAYS: u32 = 7;
    /// Chronic window length in days (inclusive of the anchor date)
    pub const DEFAULT_CHRONIC_WINDOW_DAYS: u32 = 28;
    /// Percentage multiplier for completion rates
    pub const PERCENT: f64 = 100.0;
}

/// Atomic transition procedure names exposed by the relationship store
pub mod procedures {
    /// Approve a pending relationship
    pub const APPROVE_RELATIONSHIP: &str = "approve_relationship";
    /// Reject a pending relationship
    pub const REJECT_RELATIONSHIP: &str = "reject_relationship";
    /// Coach ends an active relationship
    pub const DEACTIVATE_RELATIONSHIP: &str = "deactivate_relationship";
    /// Athlete ends an active relationship
    pub const UNLINK_RELATIONSHIP: &str = "unlink_relationship";
    /// Message reported by stores that lack a procedure
    pub const FUNCTION_NOT_FOUND: &str = "function not found";
}

/// Store table names
pub mod tables {
    /// Relationship rows
    pub const RELATIONSHIPS: &str = "coach_athlete_relationships";
    /// Training session rows
    pub const TRAINING_SESSIONS: &str = "training_sessions";
}
