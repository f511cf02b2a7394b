//! End-to-end task execution: plan, route, then attempt each candidate
//! backend in fallback order, emitting lifecycle events along the way.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;

use crate::backend::BackendRegistry;
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::events::{AgentEvent, AgentEventKind, EventBus};
use crate::health::HealthTracker;
use crate::planner::{ExecutionPlan, Planner};
use crate::router::Router;
use crate::task::{Task, TaskResult, TaskStatus};

pub struct Orchestrator {
    registry: BackendRegistry,
    health: Arc<HealthTracker>,
    planner: Planner,
    events: EventBus,
    deadline_ms: u64,
}

impl Orchestrator {
    pub fn new(
        cfg: &AgentConfig,
        registry: BackendRegistry,
        health: Arc<HealthTracker>,
        events: EventBus,
    ) -> Self {
        let router = Arc::new(Router::new(health.clone(), cfg.preferred_backend.clone()));
        Self {
            registry,
            health,
            planner: Planner::new(router),
            events,
            deadline_ms: cfg.deadline_ms,
        }
    }

    pub fn health(&self) -> &Arc<HealthTracker> {
        &self.health
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Dry-run expansion; never touches a backend, so the only failure mode
    /// is a routing error.
    pub fn plan(&self, task: &Task) -> Result<ExecutionPlan, AgentError> {
        self.planner.plan(task)
    }

    /// Execute a task, trying each candidate backend in routed order. Fails
    /// only when every candidate has been exhausted (or the overall deadline
    /// elapsed). A provider returning `success: false` without an error is
    /// passed through untouched: failover triggers on hard errors only.
    pub async fn execute(&self, task: &mut Task) -> Result<TaskResult, AgentError> {
        let plan = self.planner.plan(task)?;
        let candidates = plan.routing.candidates();

        task.status = TaskStatus::Running;
        task.started_at = Some(chrono::Utc::now());
        self.events
            .emit(AgentEvent::new(
                AgentEventKind::TaskStart,
                Some(task.id.clone()),
                json!({ "plan": plan }),
            ))
            .await;

        let deadline = (self.deadline_ms > 0)
            .then(|| Instant::now() + Duration::from_millis(self.deadline_ms));
        let mut last_error: Option<String> = None;

        for backend in &candidates {
            let Some(provider) = self.registry.get(*backend) else {
                // Unconfigured candidate: a per-candidate failure, never
                // fatal on its own.
                let message = AgentError::ProviderUnavailable(*backend).to_string();
                tracing::warn!(task = %task.id, backend = %backend, "{message}");
                self.emit_attempt_error(task, backend.as_str(), &message).await;
                last_error = Some(message);
                continue;
            };

            // Check the remaining budget before constructing the attempt.
            if let Some(deadline) = deadline {
                if deadline.saturating_duration_since(Instant::now()).is_zero() {
                    return self.fail_deadline(task).await;
                }
            }

            let attempt = provider.execute_task(task);
            let outcome = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match tokio::time::timeout(remaining, attempt).await {
                        Ok(outcome) => outcome,
                        Err(_) => return self.fail_deadline(task).await,
                    }
                }
                None => attempt.await,
            };

            match outcome {
                Ok(result) => {
                    task.status = if result.success {
                        TaskStatus::Completed
                    } else {
                        TaskStatus::Failed
                    };
                    task.completed_at = Some(chrono::Utc::now());
                    task.backend_used = Some(*backend);
                    task.result = Some(result.clone());
                    tracing::info!(
                        task = %task.id,
                        backend = %backend,
                        success = result.success,
                        "task finished"
                    );
                    self.events
                        .emit(AgentEvent::new(
                            AgentEventKind::TaskComplete,
                            Some(task.id.clone()),
                            json!({ "backend": backend, "result": result }),
                        ))
                        .await;
                    return Ok(result);
                }
                Err(e) => {
                    let message = e.to_string();
                    tracing::warn!(
                        task = %task.id,
                        backend = %backend,
                        error = %message,
                        "backend attempt failed, trying next candidate"
                    );
                    self.emit_attempt_error(task, backend.as_str(), &message).await;
                    last_error = Some(message);
                }
            }
        }

        let last_error = last_error.unwrap_or_else(|| "no backend attempted".to_string());
        task.status = TaskStatus::Failed;
        task.completed_at = Some(chrono::Utc::now());
        task.error = Some(last_error.clone());
        Err(AgentError::AllBackendsFailed {
            attempts: candidates.len(),
            last_error,
        })
    }

    async fn emit_attempt_error(&self, task: &Task, backend: &str, message: &str) {
        self.events
            .emit(AgentEvent::new(
                AgentEventKind::Error,
                Some(task.id.clone()),
                json!({ "backend": backend, "error": message }),
            ))
            .await;
    }

    async fn fail_deadline(&self, task: &mut Task) -> Result<TaskResult, AgentError> {
        let message = "execution deadline exceeded".to_string();
        task.status = TaskStatus::Failed;
        task.completed_at = Some(chrono::Utc::now());
        task.error = Some(message.clone());
        self.emit_attempt_error(task, "orchestrator", &message).await;
        Err(AgentError::DeadlineExceeded {
            task_id: task.id.clone(),
        })
    }
}
