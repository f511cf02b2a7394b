//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `aura_core::api` instead of reaching into internal
//! modules.

pub use crate::backend::{BackendRegistry, CapabilityProvider};
pub use crate::capability::{
    capabilities_of, complexity_of, route_reason, BackendId, CapabilityRecord, TaskComplexity,
};
pub use crate::config::{
    load_default, AgentConfig, ApiConfig, BackendPreference, BinaryConfig, Credentials,
    EventsOutConfig, LoggingConfig, LuxConfig, SteelConfig,
};
pub use crate::context::AgentContext;
pub use crate::error::{AgentError, CliError};
pub use crate::events::{AgentEvent, AgentEventKind, EventBus, EventSinkTx};
pub use crate::health::HealthTracker;
pub use crate::orchestrator::Orchestrator;
pub use crate::planner::{ExecutionPlan, ExecutionStep, Planner};
pub use crate::router::{Router, RoutingDecision};
pub use crate::task::{Artifact, ArtifactKind, Task, TaskResult, TaskStatus, TaskType};
