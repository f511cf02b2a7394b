//! Construct the provider registry from configuration. A backend whose
//! provider cannot be constructed (missing credentials/URL) is recorded as
//! unhealthy instead of aborting startup.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use aura_core::api::{AgentConfig, BackendId, BackendRegistry, CapabilityProvider};

use crate::backend::{
    AgentBrowserProvider, AuraApiProvider, BrowserUseProvider, LuxProvider, SteelProvider,
};

/// Build providers for every configured backend. Returns the registry plus
/// the initial health map: healthy only where construction succeeded.
pub fn build_registry(cfg: &AgentConfig) -> (BackendRegistry, HashMap<BackendId, bool>) {
    let mut registry = BackendRegistry::new();
    let mut initial_health = HashMap::new();

    let constructors: Vec<(BackendId, Result<Arc<dyn CapabilityProvider>>)> = vec![
        (
            BackendId::Api,
            AuraApiProvider::new(&cfg.api, &cfg.credentials, cfg.timeout_ms)
                .map(|p| Arc::new(p) as Arc<dyn CapabilityProvider>),
        ),
        (
            BackendId::Lux,
            LuxProvider::new(&cfg.lux, cfg.timeout_ms)
                .map(|p| Arc::new(p) as Arc<dyn CapabilityProvider>),
        ),
        (
            BackendId::BrowserUse,
            BrowserUseProvider::new(&cfg.browser_use, cfg.headless, cfg.timeout_ms)
                .map(|p| Arc::new(p) as Arc<dyn CapabilityProvider>),
        ),
        (
            BackendId::Steel,
            SteelProvider::new(&cfg.steel, cfg.headless, cfg.timeout_ms)
                .map(|p| Arc::new(p) as Arc<dyn CapabilityProvider>),
        ),
        (
            BackendId::AgentBrowser,
            AgentBrowserProvider::new(&cfg.agent_browser, cfg.headless, cfg.timeout_ms)
                .map(|p| Arc::new(p) as Arc<dyn CapabilityProvider>),
        ),
    ];

    for (backend, constructed) in constructors {
        match constructed {
            Ok(provider) => {
                registry.register(provider);
                initial_health.insert(backend, true);
            }
            Err(e) => {
                tracing::warn!(backend = %backend, "backend not configured: {e}");
                initial_health.insert(backend, false);
            }
        }
    }

    (registry, initial_health)
}
