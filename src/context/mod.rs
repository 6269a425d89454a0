// ABOUTME: Dependency injection contexts for lifecycle and analytics services
// ABOUTME: Per-session caller state plus shared data dependencies built from configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Focused dependency injection contexts
//!
//! - `SessionContext`: the authenticated caller and their relationship cache,
//!   created once per session and passed to each service
//! - `DataContext`: database handles and repositories shared by all sessions

/// Shared data dependencies
pub mod data;
/// Per-session caller state
pub mod session;

pub use data::DataContext;
pub use session::SessionContext;
