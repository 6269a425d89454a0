// ABOUTME: Configuration module for store, lifecycle, and analytics settings
// ABOUTME: Re-exports the environment-driven ServerConfig and its sections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration
//!
//! All settings come from environment variables; see
//! [`environment::ServerConfig::from_env`].

/// Environment and server configuration
pub mod environment;

pub use environment::{
    AnalyticsConfig, DatabaseConfig, DatabaseUrl, Environment, LogLevel, RelationshipConfig,
    ServerConfig,
};
