// ABOUTME: Training session model for planned and completed workouts
// ABOUTME: Tolerant numeric fields accept numbers or numeric strings across historical payload shapes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::constants::time::MINUTES_PER_HOUR;

/// Whether a session is still a plan or has been logged
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Scheduled, not yet performed
    #[default]
    Planned,
    /// Performed and logged by the athlete
    Completed,
}

impl SessionStatus {
    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Completed => "completed",
        }
    }
}

impl Display for SessionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Numeric field that may arrive as a number, a numeric string, or garbage
///
/// Older clients stored metrics as strings (sometimes with a decimal comma).
/// Anything that does not parse is treated as absent rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    /// Proper JSON number
    Number(f64),
    /// Numeric text such as `"42"` or `"5,5"`
    Text(String),
    /// Any other JSON value
    Other(Value),
}

impl LooseNumber {
    /// Finite numeric value, if the field can be interpreted as one
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        let parsed = match self {
            Self::Number(n) => Some(*n),
            Self::Text(text) => text.trim().replace(',', ".").parse::<f64>().ok(),
            Self::Other(_) => None,
        };
        parsed.filter(|v| v.is_finite())
    }
}

impl From<f64> for LooseNumber {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Read an optional loose field as a number
#[must_use]
pub fn loose_value(field: Option<&LooseNumber>) -> Option<f64> {
    field.and_then(LooseNumber::value)
}

/// Minutes from a direct field, falling back to hour/minute sub-fields, else 0
fn minutes_from(
    direct: Option<&LooseNumber>,
    hours: Option<&LooseNumber>,
    minutes: Option<&LooseNumber>,
) -> f64 {
    if let Some(total) = loose_value(direct) {
        return total;
    }
    let hours = loose_value(hours).unwrap_or(0.0);
    let minutes = loose_value(minutes).unwrap_or(0.0);
    hours.mul_add(MINUTES_PER_HOUR, minutes)
}

/// One logged or planned workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSession {
    /// Session identifier
    pub id: Uuid,
    /// Athlete who owns the session
    pub user_id: Uuid,
    /// Calendar date of the session
    pub training_date: NaiveDate,
    /// Planned or completed
    pub status: SessionStatus,
    /// Modality label (e.g. "Road Running"); `None` when unclassified
    #[serde(default)]
    pub modality: Option<String>,
    /// Logged distance in kilometers
    #[serde(default)]
    pub distance_km: Option<LooseNumber>,
    /// Logged duration in minutes when stored directly
    #[serde(default)]
    pub duration: Option<LooseNumber>,
    /// Hour component of the logged duration
    #[serde(default)]
    pub duration_hours: Option<LooseNumber>,
    /// Minute component of the logged duration
    #[serde(default)]
    pub duration_minutes: Option<LooseNumber>,
    /// Older clients' name for `duration_hours`
    #[serde(default, rename = "hours", skip_serializing_if = "Option::is_none")]
    pub legacy_hours: Option<LooseNumber>,
    /// Older clients' name for `duration_minutes`
    #[serde(default, rename = "minutes", skip_serializing_if = "Option::is_none")]
    pub legacy_minutes: Option<LooseNumber>,
    /// Elevation gain in meters
    #[serde(default)]
    pub elevation_gain_meters: Option<LooseNumber>,
    /// Subjective intensity (0-10)
    #[serde(default)]
    pub perceived_effort: Option<LooseNumber>,
    /// Subjective satisfaction (0-10)
    #[serde(default)]
    pub session_satisfaction: Option<LooseNumber>,
    /// Planned distance in kilometers
    #[serde(default)]
    pub planned_distance_km: Option<LooseNumber>,
    /// Hour component of the planned duration
    #[serde(default)]
    pub planned_duration_hours: Option<LooseNumber>,
    /// Minute component of the planned duration
    #[serde(default)]
    pub planned_duration_minutes: Option<LooseNumber>,
    /// Planned intensity (0-10)
    #[serde(default)]
    pub planned_perceived_effort: Option<LooseNumber>,
}

impl TrainingSession {
    /// Create an empty session for `user_id` on `date`
    #[must_use]
    pub fn new(user_id: Uuid, training_date: NaiveDate, status: SessionStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            training_date,
            status,
            modality: None,
            distance_km: None,
            duration: None,
            duration_hours: None,
            duration_minutes: None,
            legacy_hours: None,
            legacy_minutes: None,
            elevation_gain_meters: None,
            perceived_effort: None,
            session_satisfaction: None,
            planned_distance_km: None,
            planned_duration_hours: None,
            planned_duration_minutes: None,
            planned_perceived_effort: None,
        }
    }

    /// Create a completed session
    #[must_use]
    pub fn completed(user_id: Uuid, training_date: NaiveDate) -> Self {
        Self::new(user_id, training_date, SessionStatus::Completed)
    }

    /// Create a planned session
    #[must_use]
    pub fn planned(user_id: Uuid, training_date: NaiveDate) -> Self {
        Self::new(user_id, training_date, SessionStatus::Planned)
    }

    /// Set the modality label
    #[must_use]
    pub fn with_modality(mut self, modality: impl Into<String>) -> Self {
        self.modality = Some(modality.into());
        self
    }

    /// Set the logged duration in minutes
    #[must_use]
    pub fn with_duration(mut self, minutes: f64) -> Self {
        self.duration = Some(minutes.into());
        self
    }

    /// Set the logged distance in kilometers
    #[must_use]
    pub fn with_distance(mut self, km: f64) -> Self {
        self.distance_km = Some(km.into());
        self
    }

    /// Set perceived effort
    #[must_use]
    pub fn with_effort(mut self, effort: f64) -> Self {
        self.perceived_effort = Some(effort.into());
        self
    }

    /// Set session satisfaction
    #[must_use]
    pub fn with_satisfaction(mut self, satisfaction: f64) -> Self {
        self.session_satisfaction = Some(satisfaction.into());
        self
    }

    /// Set the planned targets
    #[must_use]
    pub fn with_plan(mut self, distance_km: f64, duration_minutes: f64, effort: f64) -> Self {
        self.planned_distance_km = Some(distance_km.into());
        self.planned_duration_hours = None;
        self.planned_duration_minutes = Some(duration_minutes.into());
        self.planned_perceived_effort = Some(effort.into());
        self
    }

    /// Whether the session has been logged
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// Logged duration in minutes (0 when missing or unparseable)
    #[must_use]
    pub fn duration_in_minutes(&self) -> f64 {
        minutes_from(
            self.duration.as_ref(),
            self.duration_hours.as_ref().or(self.legacy_hours.as_ref()),
            self.duration_minutes.as_ref().or(self.legacy_minutes.as_ref()),
        )
    }

    /// Planned duration in minutes (0 when missing or unparseable)
    #[must_use]
    pub fn planned_duration_in_minutes(&self) -> f64 {
        minutes_from(
            None,
            self.planned_duration_hours.as_ref(),
            self.planned_duration_minutes.as_ref(),
        )
    }

    /// Logged distance in kilometers
    #[must_use]
    pub fn distance(&self) -> Option<f64> {
        loose_value(self.distance_km.as_ref())
    }

    /// Planned distance in kilometers
    #[must_use]
    pub fn planned_distance(&self) -> Option<f64> {
        loose_value(self.planned_distance_km.as_ref())
    }

    /// Perceived effort (0 when missing)
    #[must_use]
    pub fn effort(&self) -> f64 {
        loose_value(self.perceived_effort.as_ref()).unwrap_or(0.0)
    }

    /// Planned effort (0 when missing)
    #[must_use]
    pub fn planned_effort(&self) -> f64 {
        loose_value(self.planned_perceived_effort.as_ref()).unwrap_or(0.0)
    }

    /// Session satisfaction (0 when missing)
    #[must_use]
    pub fn satisfaction(&self) -> f64 {
        loose_value(self.session_satisfaction.as_ref()).unwrap_or(0.0)
    }

    /// Trimmed modality label, `None` when missing or blank
    #[must_use]
    pub fn modality_label(&self) -> Option<&str> {
        self.modality
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day included
    pub start: NaiveDate,
    /// Last day included
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, swapping bounds given in reverse order
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Whether `date` falls inside the range
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
