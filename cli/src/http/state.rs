//! Shared state for HTTP handlers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Local};
use tokio::sync::broadcast;

use aura_core::api::{AgentContext, Orchestrator};

#[derive(Clone)]
pub struct AppState {
    pub session_id: String,
    pub ctx: Arc<AgentContext>,
    pub orchestrator: Arc<Orchestrator>,
    pub stats: Arc<RwLock<ServerStats>>,
    pub shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(
        session_id: String,
        ctx: AgentContext,
        orchestrator: Orchestrator,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            session_id,
            ctx: Arc::new(ctx),
            orchestrator: Arc::new(orchestrator),
            stats: Arc::new(RwLock::new(ServerStats::new())),
            shutdown_tx,
        }
    }

    pub fn count_request(&self, endpoint: &str) {
        let mut stats = self.stats.write().expect("stats lock poisoned");
        stats.increment_request(endpoint);
    }

    pub fn count_error(&self) {
        let mut stats = self.stats.write().expect("stats lock poisoned");
        stats.increment_error();
    }
}

pub struct ServerStats {
    pub requests_total: u64,
    pub requests_by_endpoint: HashMap<String, u64>,
    pub errors_total: u64,
    pub start_time: DateTime<Local>,
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            requests_total: 0,
            requests_by_endpoint: HashMap::new(),
            errors_total: 0,
            start_time: Local::now(),
        }
    }

    pub fn increment_request(&mut self, endpoint: &str) {
        self.requests_total += 1;
        *self
            .requests_by_endpoint
            .entry(endpoint.to_string())
            .or_insert(0) += 1;
    }

    pub fn increment_error(&mut self) {
        self.errors_total += 1;
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}
