//! Current up/down status per backend. The one piece of shared mutable state
//! in the core: written by initialization and explicit refresh, read by the
//! router on every routing decision.

use std::collections::HashMap;
use std::sync::RwLock;

use futures::future::join_all;

use crate::backend::BackendRegistry;
use crate::capability::BackendId;

#[derive(Default)]
pub struct HealthTracker {
    status: RwLock<HashMap<BackendId, bool>>,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, backend: BackendId, healthy: bool) {
        let mut map = self.status.write().expect("health map poisoned");
        map.insert(backend, healthy);
    }

    /// `None` means the backend has never been probed.
    pub fn get(&self, backend: BackendId) -> Option<bool> {
        let map = self.status.read().expect("health map poisoned");
        map.get(&backend).copied()
    }

    pub fn is_healthy(&self, backend: BackendId) -> bool {
        self.get(backend).unwrap_or(false)
    }

    pub fn snapshot(&self) -> HashMap<BackendId, bool> {
        self.status.read().expect("health map poisoned").clone()
    }

    /// Probe every backend concurrently and record the outcomes. A missing
    /// provider, a failed probe, or a panicking probe records `false`; one
    /// unreachable backend never aborts the refresh of the others.
    pub async fn refresh_all(&self, registry: &BackendRegistry) -> HashMap<BackendId, bool> {
        let probes = BackendId::ALL.into_iter().map(|backend| {
            let provider = registry.get(backend);
            // Each probe runs in its own task so a panic is contained there.
            let handle = tokio::spawn(async move {
                match provider {
                    Some(p) => p.health_check().await,
                    None => false,
                }
            });
            async move { (backend, handle.await.unwrap_or(false)) }
        });

        let results = join_all(probes).await;
        for (backend, healthy) in &results {
            tracing::debug!(backend = %backend, healthy, "health probe");
            self.set(*backend, *healthy);
        }
        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::anyhow;
    use async_trait::async_trait;

    use super::*;
    use crate::backend::CapabilityProvider;
    use crate::task::{Task, TaskResult};

    struct FixedProvider {
        id: BackendId,
        healthy: bool,
    }

    #[async_trait]
    impl CapabilityProvider for FixedProvider {
        fn id(&self) -> BackendId {
            self.id
        }

        async fn health_check(&self) -> bool {
            self.healthy
        }

        async fn execute_task(&self, _task: &Task) -> anyhow::Result<TaskResult> {
            Err(anyhow!("not under test"))
        }
    }

    #[tokio::test]
    async fn refresh_covers_all_backends_even_with_missing_providers() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(FixedProvider {
            id: BackendId::Api,
            healthy: true,
        }));
        registry.register(Arc::new(FixedProvider {
            id: BackendId::Lux,
            healthy: false,
        }));

        let tracker = HealthTracker::new();
        let map = tracker.refresh_all(&registry).await;

        assert_eq!(map.len(), BackendId::ALL.len());
        assert_eq!(map[&BackendId::Api], true);
        assert_eq!(map[&BackendId::Lux], false);
        // Unconfigured backends probe false rather than being skipped.
        assert_eq!(map[&BackendId::Steel], false);
        assert_eq!(tracker.get(BackendId::Api), Some(true));
        assert_eq!(tracker.get(BackendId::Steel), Some(false));
    }

    struct PanickingProvider;

    #[async_trait]
    impl CapabilityProvider for PanickingProvider {
        fn id(&self) -> BackendId {
            BackendId::Lux
        }

        async fn health_check(&self) -> bool {
            panic!("probe blew up")
        }

        async fn execute_task(&self, _task: &Task) -> anyhow::Result<TaskResult> {
            Err(anyhow!("not under test"))
        }
    }

    #[tokio::test]
    async fn panicking_probe_records_false_without_aborting_the_refresh() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(FixedProvider {
            id: BackendId::Api,
            healthy: true,
        }));
        registry.register(Arc::new(PanickingProvider));

        let tracker = HealthTracker::new();
        let map = tracker.refresh_all(&registry).await;

        assert_eq!(map.len(), BackendId::ALL.len());
        assert_eq!(map[&BackendId::Lux], false);
        assert_eq!(map[&BackendId::Api], true);
        assert_eq!(tracker.get(BackendId::Lux), Some(false));
    }

    #[test]
    fn unknown_until_first_probe() {
        let tracker = HealthTracker::new();
        assert_eq!(tracker.get(BackendId::Api), None);
        assert!(!tracker.is_healthy(BackendId::Api));
        tracker.set(BackendId::Api, true);
        assert!(tracker.is_healthy(BackendId::Api));
    }
}
