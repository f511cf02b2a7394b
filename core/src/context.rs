use std::sync::Arc;

use crate::backend::BackendRegistry;
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::events::{start_event_sink, EventBus};
use crate::health::HealthTracker;
use crate::orchestrator::Orchestrator;

/// Process-wide wiring: immutable config plus the event bus. Built once by
/// the CLI or server front-end and shared from there.
#[derive(Clone)]
pub struct AgentContext {
    cfg: AgentConfig,
    events: EventBus,
}

impl AgentContext {
    pub async fn new(cfg: AgentConfig) -> Result<Self, AgentError> {
        let sink = start_event_sink(&cfg.events_out)
            .await
            .map_err(AgentError::Config)?;
        let events = EventBus::new(cfg.events_out.channel_capacity, sink);
        Ok(Self { cfg, events })
    }

    pub fn cfg(&self) -> &AgentConfig {
        &self.cfg
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Wire an orchestrator over an already-constructed provider registry and
    /// health tracker (the plugins factory produces both).
    pub fn orchestrator(
        &self,
        registry: BackendRegistry,
        health: Arc<HealthTracker>,
    ) -> Orchestrator {
        Orchestrator::new(&self.cfg, registry, health, self.events.clone())
    }
}
