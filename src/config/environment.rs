// ABOUTME: Environment configuration for the relationship store and analytics engine
// ABOUTME: Parses database, transition-path, and load-window settings from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration

use std::env;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use coachlink_core::constants::load::{DEFAULT_ACUTE_WINDOW_DAYS, DEFAULT_CHRONIC_WINDOW_DAYS};
use coachlink_intelligence::LoadWindows;
use serde::{Deserialize, Serialize};
use tracing::{info, Level};

/// Default `SQLite` database file
const DEFAULT_DATABASE_PATH: &str = "./data/coachlink.db";
/// Default pool size for file-backed databases
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to a `tracing` level
    #[must_use]
    pub const fn to_tracing_level(self) -> Level {
        match self {
            Self::Error => Level::ERROR,
            Self::Warn => Level::WARN,
            Self::Info => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Parse from string, falling back to `info`
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let label = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(label)
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string, falling back to `development`
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Whether this is a production deployment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let label = match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        };
        f.write_str(label)
    }
}

/// Location of the relationship and training-session store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` file
    SQLite {
        /// Database file path
        path: PathBuf,
    },
    /// In-memory `SQLite` (tests and demos)
    Memory,
}

impl DatabaseUrl {
    /// Parse a `sqlite:` URL or bare file path
    ///
    /// # Errors
    ///
    /// Returns an error for non-`SQLite` URLs or an empty path
    pub fn parse_url(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.starts_with("postgres://") || trimmed.starts_with("postgresql://") {
            anyhow::bail!("Only SQLite databases are supported, got {trimmed}");
        }
        let path = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
        let path = path.strip_prefix("//").unwrap_or(path);
        match path {
            "" => anyhow::bail!("Database URL is empty"),
            ":memory:" => Ok(Self::Memory),
            file => Ok(Self::SQLite {
                path: PathBuf::from(file),
            }),
        }
    }

    /// `sqlx` connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Whether this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.to_connection_string())
    }
}

/// Database pool settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Store location
    pub url: DatabaseUrl,
    /// Pool size (forced to 1 for in-memory databases)
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// In-memory database settings
    #[must_use]
    pub const fn in_memory() -> Self {
        Self {
            url: DatabaseUrl::Memory,
            max_connections: 1,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DatabaseUrl::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Relationship lifecycle settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationshipConfig {
    /// Install the atomic transition procedures; when off the store behaves
    /// like a legacy backend and the conditional-update path runs
    pub atomic_transitions: bool,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            atomic_transitions: true,
        }
    }
}

/// Training-load analysis settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Acute window in days
    pub acute_window_days: u32,
    /// Chronic window in days
    pub chronic_window_days: u32,
}

impl AnalyticsConfig {
    /// Calculator windows
    #[must_use]
    pub const fn windows(&self) -> LoadWindows {
        LoadWindows {
            acute_days: self.acute_window_days,
            chronic_days: self.chronic_window_days,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            acute_window_days: DEFAULT_ACUTE_WINDOW_DAYS,
            chronic_window_days: DEFAULT_CHRONIC_WINDOW_DAYS,
        }
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
    /// Store settings
    pub database: DatabaseConfig,
    /// Lifecycle settings
    pub relationships: RelationshipConfig,
    /// Analytics settings
    pub analytics: AnalyticsConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is set but cannot be parsed, or when
    /// the acute window is not shorter than the chronic window
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let database_url = match env::var("DATABASE_URL") {
            Ok(url) => DatabaseUrl::parse_url(&url).context("Invalid DATABASE_URL value")?,
            Err(_) => DatabaseUrl::default(),
        };

        let config = Self {
            environment: Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development")),
            log_level: LogLevel::from_str_or_default(&env_var_or("RUST_LOG", "info")),
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_env_or(
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_MAX_CONNECTIONS,
                )?,
            },
            relationships: RelationshipConfig {
                atomic_transitions: parse_env_or("COACHLINK_ATOMIC_TRANSITIONS", true)?,
            },
            analytics: AnalyticsConfig {
                acute_window_days: parse_env_or(
                    "COACHLINK_ACUTE_WINDOW_DAYS",
                    DEFAULT_ACUTE_WINDOW_DAYS,
                )?,
                chronic_window_days: parse_env_or(
                    "COACHLINK_CHRONIC_WINDOW_DAYS",
                    DEFAULT_CHRONIC_WINDOW_DAYS,
                )?,
            },
        };

        config.validate()?;
        info!(
            environment = %config.environment,
            database = %config.database.url,
            atomic_transitions = config.relationships.atomic_transitions,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns an error for zero-length windows, an acute window that is not
    /// shorter than the chronic one, or a zero pool size
    pub fn validate(&self) -> Result<()> {
        let analytics = &self.analytics;
        if analytics.acute_window_days == 0 || analytics.chronic_window_days == 0 {
            anyhow::bail!("Load windows must be at least one day");
        }
        if analytics.acute_window_days >= analytics.chronic_window_days {
            anyhow::bail!(
                "Acute window ({} days) must be shorter than chronic window ({} days)",
                analytics.acute_window_days,
                analytics.chronic_window_days
            );
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be greater than zero");
        }
        Ok(())
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, using `default` when unset
fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {raw}")),
        Err(_) => Ok(default),
    }
}
