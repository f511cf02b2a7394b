use thiserror::Error;

use crate::capability::{BackendId, TaskComplexity};

/// Failures surfaced by the orchestration core.
#[derive(Error, Debug)]
pub enum AgentError {
    /// No healthy backend supports the required complexity tier. Fatal for the
    /// task; never retried.
    #[error("no healthy backend supports {complexity} tasks")]
    Routing { complexity: TaskComplexity },

    /// A candidate backend has no constructed provider. Per-candidate only; the
    /// failover loop converts it into a recorded attempt failure.
    #[error("backend not available: {0}")]
    ProviderUnavailable(BackendId),

    /// A provider's `execute_task` returned an error.
    #[error("backend {backend} failed: {message}")]
    Backend { backend: BackendId, message: String },

    /// Every candidate in the fallback order was attempted and failed.
    #[error("all {attempts} backend(s) failed, last error: {last_error}")]
    AllBackendsFailed { attempts: usize, last_error: String },

    /// The overall task deadline elapsed before any candidate succeeded.
    #[error("task {task_id} exceeded its execution deadline")]
    DeadlineExceeded { task_id: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by command front-ends (CLI / HTTP server).
#[derive(Error, Debug)]
pub enum CliError {
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}
