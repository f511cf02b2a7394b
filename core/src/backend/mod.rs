//! Provider seam: the contract every execution backend satisfies, and the
//! registry the orchestrator resolves live instances from at dispatch time.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::capability::BackendId;
use crate::task::{Task, TaskResult};

/// One interchangeable execution strategy that can carry a task end-to-end.
///
/// `health_check` never errors; any probe failure reports `false`.
/// `execute_task` returning `Err` is what triggers cross-backend fallback; a
/// returned `TaskResult { success: false, .. }` does not.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    fn id(&self) -> BackendId;

    async fn health_check(&self) -> bool;

    async fn execute_task(&self, task: &Task) -> Result<TaskResult>;
}

/// Maps backend identity to its live provider. Absence means the backend was
/// not configured (missing credentials/URL) and could not be constructed.
#[derive(Default, Clone)]
pub struct BackendRegistry {
    providers: HashMap<BackendId, Arc<dyn CapabilityProvider>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn CapabilityProvider>) {
        self.providers.insert(provider.id(), provider);
    }

    pub fn get(&self, backend: BackendId) -> Option<Arc<dyn CapabilityProvider>> {
        self.providers.get(&backend).cloned()
    }

    pub fn contains(&self, backend: BackendId) -> bool {
        self.providers.contains_key(&backend)
    }

    pub fn configured(&self) -> impl Iterator<Item = BackendId> + '_ {
        BackendId::ALL
            .into_iter()
            .filter(|b| self.providers.contains_key(b))
    }
}
