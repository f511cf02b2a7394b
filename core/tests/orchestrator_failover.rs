mod common;

use std::sync::atomic::Ordering;

use serde_json::json;

use aura_core::api::{
    AgentError, AgentEvent, AgentEventKind, BackendId, EventBus, TaskStatus,
};
use common::{orchestrator_with, simple_task, Behavior, ScriptedProvider};

async fn drain(rx: &mut tokio::sync::broadcast::Receiver<AgentEvent>) -> Vec<AgentEvent> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

#[tokio::test]
async fn first_non_throwing_candidate_wins() {
    let api = ScriptedProvider::new(BackendId::Api, Behavior::Fail("boom"));
    let lux = ScriptedProvider::new(BackendId::Lux, Behavior::Succeed);
    let events = EventBus::new(64, None);
    let mut rx = events.subscribe();

    let orch = orchestrator_with(
        &[api.clone(), lux.clone()],
        &[BackendId::Api, BackendId::Lux],
        0,
        events,
    );

    let mut task = simple_task();
    let result = orch.execute(&mut task).await.unwrap();

    assert!(result.success);
    assert_eq!(result.data, Some(json!({ "by": "lux" })));
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.backend_used, Some(BackendId::Lux));
    assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    assert_eq!(lux.calls.load(Ordering::SeqCst), 1);

    // task_start, error(api), task_complete(lux) - in that order.
    let seq: Vec<AgentEventKind> = drain(&mut rx).await.iter().map(|e| e.kind).collect();
    assert_eq!(
        seq,
        vec![
            AgentEventKind::TaskStart,
            AgentEventKind::Error,
            AgentEventKind::TaskComplete,
        ]
    );
}

#[tokio::test]
async fn exhausting_all_candidates_is_an_aggregate_error() {
    let api = ScriptedProvider::new(BackendId::Api, Behavior::Fail("api down"));
    let lux = ScriptedProvider::new(BackendId::Lux, Behavior::Fail("lux down"));
    let events = EventBus::new(64, None);
    let mut rx = events.subscribe();

    let orch = orchestrator_with(
        &[api, lux],
        &[BackendId::Api, BackendId::Lux],
        0,
        events,
    );

    let mut task = simple_task();
    let err = orch.execute(&mut task).await.unwrap_err();

    match err {
        AgentError::AllBackendsFailed {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 2);
            assert_eq!(last_error, "lux down");
        }
        other => panic!("expected aggregate error, got {other}"),
    }
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.error.as_deref(), Some("lux down"));

    let seq: Vec<AgentEventKind> = drain(&mut rx).await.iter().map(|e| e.kind).collect();
    assert!(!seq.contains(&AgentEventKind::TaskComplete));
    assert_eq!(seq.last(), Some(&AgentEventKind::Error));
}

#[tokio::test]
async fn logical_failure_passes_through_without_fallback() {
    let api = ScriptedProvider::new(BackendId::Api, Behavior::LogicalFail);
    let lux = ScriptedProvider::new(BackendId::Lux, Behavior::Succeed);
    let events = EventBus::new(64, None);

    let orch = orchestrator_with(
        &[api.clone(), lux.clone()],
        &[BackendId::Api, BackendId::Lux],
        0,
        events,
    );

    let mut task = simple_task();
    let result = orch.execute(&mut task).await.unwrap();

    // success:false is still the successful invocation path: returned as-is,
    // no fallback attempted.
    assert!(!result.success);
    assert_eq!(result.logs, vec!["x".to_string()]);
    assert_eq!(lux.calls.load(Ordering::SeqCst), 0);
    assert_eq!(task.backend_used, Some(BackendId::Api));
    assert_eq!(task.status, TaskStatus::Failed);
}

#[tokio::test]
async fn missing_provider_is_skipped_not_fatal() {
    // Health says api is up, but no provider was constructed for it.
    let lux = ScriptedProvider::new(BackendId::Lux, Behavior::Succeed);
    let events = EventBus::new(64, None);
    let mut rx = events.subscribe();

    let orch = orchestrator_with(&[lux], &[BackendId::Api, BackendId::Lux], 0, events);

    let mut task = simple_task();
    let result = orch.execute(&mut task).await.unwrap();

    assert!(result.success);
    assert_eq!(task.backend_used, Some(BackendId::Lux));

    let all = drain(&mut rx).await;
    let synthetic = all
        .iter()
        .find(|e| e.kind == AgentEventKind::Error)
        .unwrap();
    assert_eq!(synthetic.payload["backend"], "api");
    assert!(synthetic.payload["error"]
        .as_str()
        .unwrap()
        .contains("not available"));
}

#[tokio::test]
async fn deadline_cuts_off_a_hanging_backend() {
    let api = ScriptedProvider::new(BackendId::Api, Behavior::Hang);
    let lux = ScriptedProvider::new(BackendId::Lux, Behavior::Succeed);
    let events = EventBus::new(64, None);

    let orch = orchestrator_with(
        &[api, lux],
        &[BackendId::Api, BackendId::Lux],
        50,
        events,
    );

    let mut task = simple_task();
    let err = orch.execute(&mut task).await.unwrap_err();

    match err {
        AgentError::DeadlineExceeded { task_id } => assert_eq!(task_id, task.id),
        other => panic!("expected deadline error, got {other}"),
    }
    assert_eq!(task.status, TaskStatus::Failed);
}

#[tokio::test]
async fn deadline_covers_the_whole_fallback_sequence() {
    // The budget is spent by the first candidate; the healthy fallback must
    // not get a fresh attempt after it.
    let api = ScriptedProvider::new(BackendId::Api, Behavior::Hang);
    let lux = ScriptedProvider::new(BackendId::Lux, Behavior::Succeed);
    let events = EventBus::new(64, None);

    let orch = orchestrator_with(
        &[api.clone(), lux.clone()],
        &[BackendId::Api, BackendId::Lux],
        50,
        events,
    );

    let mut task = simple_task();
    let err = orch.execute(&mut task).await.unwrap_err();

    assert!(matches!(err, AgentError::DeadlineExceeded { .. }));
    assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    assert_eq!(lux.calls.load(Ordering::SeqCst), 0);
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.backend_used, None);
}

#[tokio::test]
async fn routing_error_surfaces_before_any_attempt() {
    // No healthy backend at all.
    let api = ScriptedProvider::new(BackendId::Api, Behavior::Succeed);
    let events = EventBus::new(64, None);
    let mut rx = events.subscribe();

    let orch = orchestrator_with(&[api.clone()], &[], 0, events);

    let mut task = simple_task();
    let err = orch.execute(&mut task).await.unwrap_err();

    assert!(matches!(err, AgentError::Routing { .. }));
    assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    assert!(drain(&mut rx).await.is_empty());
}
