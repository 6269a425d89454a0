// ABOUTME: Core data models for coach/athlete relationships and training sessions
// ABOUTME: Re-exports relationship, caller, and training session types plus transition guards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! - `Relationship`: one athlete linked to one coach for one modality
//! - `TrainingSession`: a planned or completed workout with tolerant numeric fields
//! - `Caller`: the authenticated identity operations are scoped to
//!
//! The [`guards`] module holds the transition checks shared by every
//! execution path that mutates relationship rows.

mod caller;
pub mod guards;
mod relationship;
mod training;

pub use caller::{Caller, CallerRole};
pub use relationship::{
    normalize_modality, NewRelationship, Relationship, RelationshipChanges, RelationshipFilter,
    RelationshipStatus,
};
pub use training::{loose_value, DateRange, LooseNumber, SessionStatus, TrainingSession};
