// ABOUTME: Integration tests for the training-load analytics facade
// ABOUTME: Covers access control, stored and legacy session payloads, ranges, and insight handoff
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use async_trait::async_trait;
use chrono::NaiveDate;
use coachlink::config::environment::{AnalyticsConfig, DatabaseConfig, ServerConfig};
use coachlink::context::{DataContext, SessionContext};
use coachlink::errors::{AppResult, ErrorCode};
use coachlink::intelligence::LoadAnalysis;
use coachlink::models::{DateRange, SessionStatus, TrainingSession};
use coachlink::services::InsightGenerator;
use serde_json::json;
use uuid::Uuid;

const EPS: f64 = 1e-9;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

async fn data_context(analytics: AnalyticsConfig) -> DataContext {
    common::init_test_logging();
    let config = ServerConfig {
        database: DatabaseConfig::in_memory(),
        analytics,
        ..ServerConfig::default()
    };
    DataContext::from_config(&config).await.unwrap()
}

async fn store_sessions(data: &DataContext, sessions: &[TrainingSession]) {
    let manager = data.database().training_sessions();
    for session in sessions {
        manager.upsert(session).await.unwrap();
    }
}

fn steady_run(athlete: Uuid, d: u32) -> TrainingSession {
    TrainingSession::completed(athlete, day(d))
        .with_modality("Running")
        .with_duration(60.0)
        .with_effort(5.0)
        .with_distance(10.0)
}

struct EchoInsight;

#[async_trait]
impl InsightGenerator for EchoInsight {
    async fn generate(&self, _athlete_id: Uuid, analysis: &LoadAnalysis) -> AppResult<String> {
        Ok(format!(
            "acute {:.0} / chronic {:.0}",
            analysis.latest_acute().unwrap_or_default(),
            analysis.latest_chronic().unwrap_or_default()
        ))
    }
}

#[tokio::test]
async fn test_athlete_sees_own_training_load() {
    let data = data_context(AnalyticsConfig::default()).await;
    let athlete = Uuid::new_v4();
    store_sessions(
        &data,
        &[steady_run(athlete, 1), steady_run(athlete, 4), steady_run(athlete, 7)],
    )
    .await;

    let analysis = data
        .analytics_service(SessionContext::athlete(athlete))
        .training_load(athlete, None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(analysis.session_loads.len(), 3);
    assert!((analysis.latest_acute().unwrap() - 300.0).abs() < EPS);
    assert!((analysis.latest_chronic().unwrap() - 300.0).abs() < EPS);
    assert_eq!(analysis.running_efficiency.len(), 3);
    assert!((analysis.running_efficiency[0].pace - 6.0).abs() < EPS);
    assert_eq!(analysis.summary.total_completed, 3);
    assert!(analysis.summary.completion_rate.abs() < EPS);
}

#[tokio::test]
async fn test_no_sessions_is_none_and_blocks_insight() {
    let data = data_context(AnalyticsConfig::default()).await;
    let athlete = Uuid::new_v4();
    let service = data.analytics_service(SessionContext::athlete(athlete));

    assert!(service.training_load(athlete, None).await.unwrap().is_none());

    let error = service
        .insight(athlete, None, &EchoInsight)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);
    assert_eq!(error.message, "insufficient training data");
}

#[tokio::test]
async fn test_insight_receives_computed_load() {
    let data = data_context(AnalyticsConfig::default()).await;
    let athlete = Uuid::new_v4();
    store_sessions(&data, &[steady_run(athlete, 1), steady_run(athlete, 7)]).await;

    let text = data
        .analytics_service(SessionContext::athlete(athlete))
        .insight(athlete, None, &EchoInsight)
        .await
        .unwrap();
    assert_eq!(text, "acute 300 / chronic 300");
}

#[tokio::test]
async fn test_only_actively_linked_coach_can_view() {
    let data = data_context(AnalyticsConfig::default()).await;
    let athlete = Uuid::new_v4();
    let coach = Uuid::new_v4();
    store_sessions(&data, &[steady_run(athlete, 1)]).await;
    let coach_view = data.analytics_service(SessionContext::coach(coach));

    let error = coach_view.training_load(athlete, None).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::PermissionDenied);

    let pending = data
        .lifecycle_manager(SessionContext::athlete(athlete))
        .request(athlete, coach, "Running", None, None)
        .await
        .unwrap();
    let error = coach_view.training_load(athlete, None).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::PermissionDenied);

    let coach_manager = data.lifecycle_manager(SessionContext::coach(coach));
    coach_manager.approve(pending.id, None, None).await.unwrap();
    assert!(coach_view.training_load(athlete, None).await.unwrap().is_some());

    coach_manager.deactivate(pending.id).await.unwrap();
    let error = coach_view.training_load(athlete, None).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_other_athlete_cannot_view() {
    let data = data_context(AnalyticsConfig::default()).await;
    let athlete = Uuid::new_v4();

    let error = data
        .analytics_service(SessionContext::athlete(Uuid::new_v4()))
        .training_load(athlete, None)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_range_limits_sessions() {
    let data = data_context(AnalyticsConfig::default()).await;
    let athlete = Uuid::new_v4();
    store_sessions(
        &data,
        &[steady_run(athlete, 1), steady_run(athlete, 10), steady_run(athlete, 20)],
    )
    .await;

    let analysis = data
        .analytics_service(SessionContext::athlete(athlete))
        .training_load(athlete, Some(DateRange::new(day(15), day(5))))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(analysis.session_loads.len(), 1);
    assert_eq!(analysis.session_loads[0].date, day(10));
}

#[tokio::test]
async fn test_legacy_payload_fields_are_read() {
    let data = data_context(AnalyticsConfig::default()).await;
    let athlete = Uuid::new_v4();
    let sessions = data.database().training_sessions();
    sessions
        .upsert_payload(
            Uuid::new_v4(),
            athlete,
            day(3),
            SessionStatus::Completed,
            &json!({
                "modality": "Corrida de rua",
                "distance_km": "12,5",
                "hours": "1",
                "minutes": 15,
                "perceived_effort": "6",
                "session_satisfaction": "not sure"
            }),
        )
        .await
        .unwrap();
    sessions
        .upsert_payload(
            Uuid::new_v4(),
            athlete,
            day(4),
            SessionStatus::Completed,
            &json!(["not", "an", "object"]),
        )
        .await
        .unwrap();

    let analysis = data
        .analytics_service(SessionContext::athlete(athlete))
        .training_load(athlete, None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(analysis.session_loads.len(), 1);
    assert!((analysis.session_loads[0].load - 450.0).abs() < EPS);
    assert_eq!(analysis.running_efficiency.len(), 1);
    assert!((analysis.running_efficiency[0].pace - 6.0).abs() < EPS);
    assert_eq!(analysis.modality_stats[0].modality, "Corrida de rua");
    assert!(analysis.modality_stats[0].avg_satisfaction.abs() < EPS);
}

#[tokio::test]
async fn test_mixed_duration_shapes_keep_the_session() {
    let data = data_context(AnalyticsConfig::default()).await;
    let athlete = Uuid::new_v4();
    data.database()
        .training_sessions()
        .upsert_payload(
            Uuid::new_v4(),
            athlete,
            day(5),
            SessionStatus::Completed,
            &json!({
                "duration_minutes": 30,
                "minutes": 30,
                "hours": "1",
                "perceived_effort": 4
            }),
        )
        .await
        .unwrap();

    let analysis = data
        .analytics_service(SessionContext::athlete(athlete))
        .training_load(athlete, None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(analysis.session_loads.len(), 1);
    // duration_minutes wins; the legacy hours fill the missing hour component
    assert!((analysis.session_loads[0].load - 360.0).abs() < EPS);
}

#[tokio::test]
async fn test_planned_sessions_feed_comparison_and_summary() {
    let data = data_context(AnalyticsConfig::default()).await;
    let athlete = Uuid::new_v4();
    store_sessions(
        &data,
        &[
            TrainingSession::planned(athlete, day(2))
                .with_modality("Running")
                .with_distance(10.0)
                .with_duration(50.0)
                .with_effort(4.0),
            TrainingSession::planned(athlete, day(3)).with_modality("Cycling"),
            steady_run(athlete, 2).with_distance(8.0),
        ],
    )
    .await;

    let analysis = data
        .analytics_service(SessionContext::athlete(athlete))
        .training_load(athlete, None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(analysis.summary.total_planned, 2);
    assert_eq!(analysis.summary.total_completed, 1);
    assert!((analysis.summary.completion_rate - 50.0).abs() < EPS);

    assert_eq!(analysis.planned_vs_completed.len(), 1);
    let comparison = &analysis.planned_vs_completed[0];
    assert!((comparison.planned_distance - 10.0).abs() < EPS);
    assert!((comparison.actual_distance - 8.0).abs() < EPS);
    assert!((comparison.completion_rate - 80.0).abs() < EPS);
}

#[tokio::test]
async fn test_configured_windows_reach_the_calculator() {
    let data = data_context(AnalyticsConfig {
        acute_window_days: 3,
        chronic_window_days: 10,
    })
    .await;
    let athlete = Uuid::new_v4();
    store_sessions(
        &data,
        &[
            steady_run(athlete, 1),
            TrainingSession::completed(athlete, day(7))
                .with_duration(30.0)
                .with_effort(4.0),
        ],
    )
    .await;

    let service = data.analytics_service(SessionContext::athlete(athlete));
    assert_eq!(service.calculator().windows().acute_days, 3);

    let analysis = service.training_load(athlete, None).await.unwrap().unwrap();
    // Day 1 falls outside the 3-day window anchored on day 7
    assert!((analysis.latest_acute().unwrap() - 120.0).abs() < EPS);
    assert!((analysis.latest_chronic().unwrap() - 210.0).abs() < EPS);
}
