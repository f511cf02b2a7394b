//! Backend selection: scores healthy, tier-capable backends and produces a
//! primary plus ordered fallbacks for one task. Computed fresh per task;
//! never cached, because health can change between tasks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::capability::{capabilities_of, complexity_of, route_reason, BackendId, CapabilityRecord};
use crate::config::BackendPreference;
use crate::error::AgentError;
use crate::health::HealthTracker;
use crate::task::Task;

const WEIGHT_SPEED: f64 = 0.40;
const WEIGHT_RELIABILITY: f64 = 0.35;
const WEIGHT_COST: f64 = 0.25;

/// Chosen primary backend plus ordered fallbacks for one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub primary: BackendId,
    pub reason: String,
    pub confidence: f64,
    pub fallbacks: Vec<BackendId>,
}

impl RoutingDecision {
    /// Primary first, then fallbacks, in the order execution will try them.
    pub fn candidates(&self) -> Vec<BackendId> {
        let mut out = Vec::with_capacity(1 + self.fallbacks.len());
        out.push(self.primary);
        out.extend(self.fallbacks.iter().copied());
        out
    }
}

fn score(record: &CapabilityRecord) -> f64 {
    WEIGHT_SPEED * f64::from(record.speed)
        + WEIGHT_RELIABILITY * f64::from(record.reliability)
        + WEIGHT_COST * (10.0 - f64::from(record.cost))
}

pub struct Router {
    health: Arc<HealthTracker>,
    preferred: BackendPreference,
}

impl Router {
    pub fn new(health: Arc<HealthTracker>, preferred: BackendPreference) -> Self {
        Self { health, preferred }
    }

    pub fn route(&self, task: &Task) -> Result<RoutingDecision, AgentError> {
        let tier = complexity_of(&task.task_type);

        // A pinned, healthy backend wins outright regardless of score.
        if let Some(pinned) = self.preferred.pinned() {
            if self.health.is_healthy(pinned) {
                let fallbacks: Vec<BackendId> = BackendId::ALL
                    .into_iter()
                    .filter(|b| *b != pinned)
                    .filter(|b| self.health.is_healthy(*b))
                    .filter(|b| capabilities_of(*b).supports_tier(tier))
                    .collect();
                tracing::debug!(task = %task.id, backend = %pinned, "routing to pinned backend");
                return Ok(RoutingDecision {
                    primary: pinned,
                    reason: "user-configured preference".to_string(),
                    confidence: 1.0,
                    fallbacks,
                });
            }
            tracing::warn!(
                backend = %pinned,
                "pinned backend is unhealthy, falling back to scoring"
            );
        }

        // Stable sort: ties keep BackendId::ALL enumeration order.
        let mut scored: Vec<(BackendId, f64)> = BackendId::ALL
            .into_iter()
            .filter(|b| self.health.is_healthy(*b))
            .filter(|b| capabilities_of(*b).supports_tier(tier))
            .map(|b| (b, score(&capabilities_of(b))))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let Some(&(primary, top_score)) = scored.first() else {
            return Err(AgentError::Routing { complexity: tier });
        };

        let fallbacks = scored[1..].iter().map(|(b, _)| *b).collect();
        let confidence = (top_score / 10.0).clamp(0.0, 1.0);
        tracing::debug!(
            task = %task.id,
            backend = %primary,
            score = top_score,
            "routing decision"
        );

        Ok(RoutingDecision {
            primary,
            reason: route_reason(primary).to_string(),
            confidence,
            fallbacks,
        })
    }
}
