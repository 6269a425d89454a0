// ABOUTME: Training load analysis turning an athlete's sessions into acute and chronic load series
// ABOUTME: Also derives running efficiency, planned-vs-completed deltas, and per-modality aggregates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Session-load analysis
//!
//! Session load is `duration_minutes × perceived_effort`. Acute and chronic
//! load are trailing means of session load over 7 and 28 days, sampled at
//! every date that has a completed session. The ratio between them is left
//! to the consumer.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};
use coachlink_core::constants::load::{
    DEFAULT_ACUTE_WINDOW_DAYS, DEFAULT_CHRONIC_WINDOW_DAYS, PERCENT,
};
use coachlink_core::constants::modality::{RUNNING_KEYWORDS, UNCLASSIFIED};
use coachlink_core::models::{SessionStatus, TrainingSession};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Trailing window lengths, in days, including the anchor date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadWindows {
    /// Acute (fatigue) window
    pub acute_days: u32,
    /// Chronic (fitness) window
    pub chronic_days: u32,
}

impl Default for LoadWindows {
    fn default() -> Self {
        Self {
            acute_days: DEFAULT_ACUTE_WINDOW_DAYS,
            chronic_days: DEFAULT_CHRONIC_WINDOW_DAYS,
        }
    }
}

/// Load of one completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLoad {
    /// Session id
    pub session_id: Uuid,
    /// Session date
    pub date: NaiveDate,
    /// `duration_minutes × perceived_effort`
    pub load: f64,
}

/// One point of a rolling load series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadPoint {
    /// Anchor date (last day of the window)
    pub date: NaiveDate,
    /// Mean session load inside the window
    pub load: f64,
}

/// Pace of one completed running session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyPoint {
    /// Session id
    pub session_id: Uuid,
    /// Session date
    pub date: NaiveDate,
    /// Minutes per kilometer
    pub pace: f64,
    /// Perceived effort of the session
    pub effort: f64,
}

/// Completed session compared with its planned counterpart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanComparison {
    /// Completed session id
    pub session_id: Uuid,
    /// Session date
    pub date: NaiveDate,
    /// Planned distance in kilometers
    pub planned_distance: f64,
    /// Logged distance in kilometers
    pub actual_distance: f64,
    /// Planned duration in minutes
    pub planned_duration: f64,
    /// Logged duration in minutes
    pub actual_duration: f64,
    /// Planned effort
    pub planned_effort: f64,
    /// Logged effort
    pub actual_effort: f64,
    /// `actual_distance / planned_distance × 100`
    pub completion_rate: f64,
}

/// Aggregates for one modality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalityStats {
    /// Modality label, or `Unclassified`
    pub modality: String,
    /// Completed sessions in the group
    pub count: usize,
    /// Sum of logged distance
    pub total_distance: f64,
    /// Sum of logged duration in minutes
    pub total_duration: f64,
    /// Mean perceived effort
    pub avg_effort: f64,
    /// Mean session satisfaction
    pub avg_satisfaction: f64,
}

/// Planned/completed counts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Sessions with `planned` status
    pub total_planned: usize,
    /// Sessions with `completed` status
    pub total_completed: usize,
    /// `total_completed / total_planned × 100`, 0 when nothing was planned
    pub completion_rate: f64,
}

/// Full analysis for one athlete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadAnalysis {
    /// Load of every completed session, in date order
    pub session_loads: Vec<SessionLoad>,
    /// Acute load per distinct completed date
    pub acute_load: Vec<LoadPoint>,
    /// Chronic load per distinct completed date
    pub chronic_load: Vec<LoadPoint>,
    /// Running pace points
    pub running_efficiency: Vec<EfficiencyPoint>,
    /// Completed sessions matched with a same-day plan
    pub planned_vs_completed: Vec<PlanComparison>,
    /// Aggregates per modality, sorted by label
    pub modality_stats: Vec<ModalityStats>,
    /// Planned/completed totals
    pub summary: LoadSummary,
}

impl LoadAnalysis {
    /// Most recent acute load value
    #[must_use]
    pub fn latest_acute(&self) -> Option<f64> {
        self.acute_load.last().map(|point| point.load)
    }

    /// Most recent chronic load value
    #[must_use]
    pub fn latest_chronic(&self) -> Option<f64> {
        self.chronic_load.last().map(|point| point.load)
    }
}

/// Whether a modality label denotes running
///
/// Matches whole words that start with a running keyword, so "Trail Running"
/// and "Corrida de rua" count while "Trunk Stability" does not.
#[must_use]
pub fn is_running_modality(modality: &str) -> bool {
    modality
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| RUNNING_KEYWORDS.iter().any(|keyword| word.starts_with(keyword)))
}

/// Calculator for session-load analysis
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadCalculator {
    windows: LoadWindows,
}

impl LoadCalculator {
    /// Create a calculator with the standard 7/28 day windows
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calculator with custom window sizes
    #[must_use]
    pub const fn with_windows(windows: LoadWindows) -> Self {
        Self { windows }
    }

    /// Configured windows
    #[must_use]
    pub const fn windows(&self) -> LoadWindows {
        self.windows
    }

    /// Analyze one athlete's sessions
    ///
    /// Returns `None` for an empty list so callers can tell "no data" from
    /// "computed zero". Missing or unparseable metrics contribute 0.
    #[must_use]
    pub fn calculate(&self, sessions: &[TrainingSession]) -> Option<LoadAnalysis> {
        if sessions.is_empty() {
            return None;
        }

        let mut completed: Vec<&TrainingSession> =
            sessions.iter().filter(|s| s.is_completed()).collect();
        completed.sort_by_key(|s| (s.training_date, s.id));

        let session_loads: Vec<SessionLoad> = completed
            .iter()
            .map(|s| SessionLoad {
                session_id: s.id,
                date: s.training_date,
                load: session_load(s),
            })
            .collect();

        let analysis = LoadAnalysis {
            acute_load: rolling_means(&session_loads, self.windows.acute_days),
            chronic_load: rolling_means(&session_loads, self.windows.chronic_days),
            running_efficiency: running_efficiency(&completed),
            planned_vs_completed: planned_vs_completed(sessions, &completed),
            modality_stats: modality_stats(&completed),
            summary: summary(sessions),
            session_loads,
        };

        debug!(
            sessions = sessions.len(),
            completed = analysis.summary.total_completed,
            acute_points = analysis.acute_load.len(),
            "Computed training load analysis"
        );

        Some(analysis)
    }
}

/// `duration_minutes × perceived_effort`
#[must_use]
pub fn session_load(session: &TrainingSession) -> f64 {
    session.duration_in_minutes() * session.effort()
}

/// Mean load over `[d - (window - 1), d]` for every distinct date `d`
fn rolling_means(loads: &[SessionLoad], window_days: u32) -> Vec<LoadPoint> {
    let span = Days::new(u64::from(window_days.saturating_sub(1)));
    let dates: BTreeSet<NaiveDate> = loads.iter().map(|l| l.date).collect();

    dates
        .into_iter()
        .map(|date| {
            let start = date.checked_sub_days(span).unwrap_or(NaiveDate::MIN);
            let in_window: Vec<f64> = loads
                .iter()
                .filter(|l| l.date >= start && l.date <= date)
                .map(|l| l.load)
                .collect();
            LoadPoint {
                date,
                load: mean(&in_window),
            }
        })
        .collect()
}

fn running_efficiency(completed: &[&TrainingSession]) -> Vec<EfficiencyPoint> {
    completed
        .iter()
        .filter(|s| s.modality_label().is_some_and(is_running_modality))
        .filter_map(|s| {
            let distance = s.distance().filter(|d| *d > 0.0)?;
            Some(EfficiencyPoint {
                session_id: s.id,
                date: s.training_date,
                pace: s.duration_in_minutes() / distance,
                effort: s.effort(),
            })
        })
        .collect()
}

/// Same-date planned session, preferring one with the same modality
fn planned_counterpart<'a>(
    planned: &[&'a TrainingSession],
    session: &TrainingSession,
) -> Option<&'a TrainingSession> {
    let same_day = || {
        planned
            .iter()
            .copied()
            .filter(move |p| p.training_date == session.training_date)
    };
    same_day()
        .find(|p| p.modality_label() == session.modality_label())
        .or_else(|| same_day().next())
}

fn planned_vs_completed(
    sessions: &[TrainingSession],
    completed: &[&TrainingSession],
) -> Vec<PlanComparison> {
    let planned: Vec<&TrainingSession> = sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Planned)
        .collect();

    completed
        .iter()
        .filter_map(|session| {
            let plan = planned_counterpart(&planned, session)?;
            let planned_distance = plan.planned_distance().or_else(|| plan.distance())?;
            let actual_distance = session.distance()?;
            let planned_duration = match plan.planned_duration_in_minutes() {
                minutes if minutes > 0.0 => minutes,
                _ => plan.duration_in_minutes(),
            };
            let planned_effort = match plan.planned_effort() {
                effort if effort > 0.0 => effort,
                _ => plan.effort(),
            };
            let completion_rate = if planned_distance > 0.0 {
                actual_distance / planned_distance * PERCENT
            } else {
                0.0
            };

            Some(PlanComparison {
                session_id: session.id,
                date: session.training_date,
                planned_distance,
                actual_distance,
                planned_duration,
                actual_duration: session.duration_in_minutes(),
                planned_effort,
                actual_effort: session.effort(),
                completion_rate,
            })
        })
        .collect()
}

fn modality_stats(completed: &[&TrainingSession]) -> Vec<ModalityStats> {
    let mut groups: BTreeMap<&str, Vec<&TrainingSession>> = BTreeMap::new();
    for &session in completed {
        let key = session.modality_label().unwrap_or(UNCLASSIFIED);
        groups.entry(key).or_default().push(session);
    }

    groups
        .into_iter()
        .map(|(modality, group)| {
            let efforts: Vec<f64> = group.iter().map(|s| s.effort()).collect();
            let satisfaction: Vec<f64> = group.iter().map(|s| s.satisfaction()).collect();
            ModalityStats {
                modality: modality.to_owned(),
                count: group.len(),
                total_distance: group.iter().filter_map(|s| s.distance()).sum(),
                total_duration: group.iter().map(|s| s.duration_in_minutes()).sum(),
                avg_effort: mean(&efforts),
                avg_satisfaction: mean(&satisfaction),
            }
        })
        .collect()
}

fn summary(sessions: &[TrainingSession]) -> LoadSummary {
    let total_planned = sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Planned)
        .count();
    let total_completed = sessions.iter().filter(|s| s.is_completed()).count();
    let completion_rate = if total_planned == 0 {
        0.0
    } else {
        total_completed as f64 / total_planned as f64 * PERCENT
    };

    LoadSummary {
        total_planned,
        total_completed,
        completion_rate,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
