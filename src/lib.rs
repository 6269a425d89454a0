// ABOUTME: Main library entry point for coach/athlete relationships and training-load analytics
// ABOUTME: Wires configuration, logging, SQLite storage, the lifecycle manager, and the analytics facade
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Crate-level attributes:
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![deny(unsafe_code)]

//! # Coachlink
//!
//! Connects athletes with coaches and tracks training workload.
//!
//! ## Features
//!
//! - **Relationship lifecycle**: request, approve, reject, deactivate, unlink,
//!   and remove coach/athlete links while keeping one active coach per
//!   athlete and modality
//! - **Dual execution paths**: atomic store procedures with a conditional
//!   update fallback for backends that lack them
//! - **Training load**: per-session load, acute and chronic rolling means,
//!   running efficiency, planned vs completed, and per-modality aggregates
//!
//! ## Architecture
//!
//! - **Database**: `SQLite` store, atomic procedures, and repositories
//! - **Relationships**: lifecycle manager with a session-scoped cache
//! - **Services**: analytics facade over `coachlink-intelligence`
//! - **Context**: per-session caller state and shared data dependencies
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use coachlink::config::environment::ServerConfig;
//! use coachlink::context::{DataContext, SessionContext};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     coachlink::logging::init_from_env()?;
//!     let config = ServerConfig::from_env()?;
//!     let data = DataContext::from_config(&config).await?;
//!
//!     let athlete = Uuid::new_v4();
//!     let manager = data.lifecycle_manager(SessionContext::athlete(athlete));
//!     manager
//!         .request(athlete, Uuid::new_v4(), "Running", None, None)
//!         .await?;
//!     Ok(())
//! }
//! ```

/// Environment-based configuration
pub mod config;

/// Service constants
pub mod constants;

/// Session and data dependency injection contexts
pub mod context;

/// `SQLite` storage, atomic procedures, and repositories
pub mod database;

/// Error types
pub mod errors;

/// Structured logging setup and domain log helpers
pub mod logging;

/// Domain models
pub mod models;

/// Relationship lifecycle manager
pub mod relationships;

/// Analytics facade
pub mod services;

pub use coachlink_intelligence as intelligence;
