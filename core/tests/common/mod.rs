use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::json;

use aura_core::api::{
    AgentConfig, BackendId, BackendRegistry, CapabilityProvider, EventBus, HealthTracker,
    Orchestrator, Task, TaskResult, TaskType,
};

/// What a scripted provider does when asked to execute.
#[derive(Clone)]
pub enum Behavior {
    /// Return a successful result tagged with the provider name.
    Succeed,
    /// Return without error but with `success: false`.
    LogicalFail,
    /// Return an execution error.
    Fail(&'static str),
    /// Never finish (for deadline tests).
    Hang,
}

pub struct ScriptedProvider {
    id: BackendId,
    behavior: Behavior,
    pub calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(id: BackendId, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            id,
            behavior,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CapabilityProvider for ScriptedProvider {
    fn id(&self) -> BackendId {
        self.id
    }

    async fn health_check(&self) -> bool {
        true
    }

    async fn execute_task(&self, _task: &Task) -> anyhow::Result<TaskResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Succeed => Ok(TaskResult::ok(Some(json!({ "by": self.id.as_str() })))),
            Behavior::LogicalFail => Ok(TaskResult {
                success: false,
                data: None,
                artifacts: Vec::new(),
                screenshots: Vec::new(),
                logs: vec!["x".to_string()],
            }),
            Behavior::Fail(msg) => Err(anyhow!("{msg}")),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(600)).await;
                Err(anyhow!("unreachable"))
            }
        }
    }
}

/// Orchestrator over scripted providers. Backends present in `providers` are
/// registered; backends in `healthy` are marked up.
pub fn orchestrator_with(
    providers: &[Arc<ScriptedProvider>],
    healthy: &[BackendId],
    deadline_ms: u64,
    events: EventBus,
) -> Orchestrator {
    let mut registry = BackendRegistry::new();
    for p in providers {
        registry.register(p.clone() as Arc<dyn CapabilityProvider>);
    }

    let health = Arc::new(HealthTracker::new());
    for b in BackendId::ALL {
        health.set(b, healthy.contains(&b));
    }

    let cfg = AgentConfig {
        deadline_ms,
        ..AgentConfig::default()
    };
    Orchestrator::new(&cfg, registry, health, events)
}

pub fn simple_task() -> Task {
    Task::new(
        TaskType::CreateProject,
        HashMap::from([("name".to_string(), json!("demo"))]),
    )
}
