//! Static capability data: which backend can run which complexity tier, and
//! how each task type is classified. Load-time constants, no behavior.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::task::TaskType;

/// The fixed set of capability providers. Stable for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendId {
    Api,
    Lux,
    BrowserUse,
    Steel,
    AgentBrowser,
}

impl BackendId {
    /// Enumeration order; doubles as the stable tie-break order for routing.
    pub const ALL: [BackendId; 5] = [
        BackendId::Api,
        BackendId::Lux,
        BackendId::BrowserUse,
        BackendId::Steel,
        BackendId::AgentBrowser,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendId::Api => "api",
            BackendId::Lux => "lux",
            BackendId::BrowserUse => "browser-use",
            BackendId::Steel => "steel",
            BackendId::AgentBrowser => "agent-browser",
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(BackendId::Api),
            "lux" => Ok(BackendId::Lux),
            "browser-use" | "browser_use" | "browseruse" => Ok(BackendId::BrowserUse),
            "steel" => Ok(BackendId::Steel),
            "agent-browser" | "agent_browser" | "agentbrowser" => Ok(BackendId::AgentBrowser),
            other => Err(format!("unknown backend: {other}")),
        }
    }
}

/// Coarse tier used to filter eligible backends. A static function of the task
/// type, never of task content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskComplexity {
    Simple,
    Moderate,
    Complex,
    Visual,
}

impl fmt::Display for TaskComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskComplexity::Simple => "simple",
            TaskComplexity::Moderate => "moderate",
            TaskComplexity::Complex => "complex",
            TaskComplexity::Visual => "visual",
        };
        f.write_str(s)
    }
}

/// Per-backend capability scores on a 1-10 scale. Cost is lower-is-better;
/// the router inverts it when scoring.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityRecord {
    pub supports: &'static [TaskComplexity],
    pub speed: u8,
    pub reliability: u8,
    pub cost: u8,
}

impl CapabilityRecord {
    pub fn supports_tier(&self, tier: TaskComplexity) -> bool {
        self.supports.contains(&tier)
    }
}

/// Classify a task type into its complexity tier. Total: unrecognized types
/// land in the most conservative tier.
pub fn complexity_of(task_type: &TaskType) -> TaskComplexity {
    match task_type {
        TaskType::CreateProject
        | TaskType::GetProject
        | TaskType::ListProjects
        | TaskType::SendPrompt => TaskComplexity::Simple,
        TaskType::Generate | TaskType::ExportHtml | TaskType::ApplyTemplate => {
            TaskComplexity::Moderate
        }
        TaskType::ExportFigma => TaskComplexity::Complex,
        TaskType::Screenshot | TaskType::VisualVerify | TaskType::CustomAction => {
            TaskComplexity::Visual
        }
        TaskType::Other(_) => TaskComplexity::Complex,
    }
}

/// Static capability table. Total over the fixed backend set.
pub fn capabilities_of(backend: BackendId) -> CapabilityRecord {
    use TaskComplexity::*;
    match backend {
        BackendId::Api => CapabilityRecord {
            supports: &[Simple, Moderate],
            speed: 9,
            reliability: 8,
            cost: 1,
        },
        BackendId::Lux => CapabilityRecord {
            supports: &[Simple, Moderate, Complex, Visual],
            speed: 6,
            reliability: 7,
            cost: 5,
        },
        BackendId::BrowserUse => CapabilityRecord {
            supports: &[Moderate, Complex, Visual],
            speed: 5,
            reliability: 6,
            cost: 6,
        },
        BackendId::Steel => CapabilityRecord {
            supports: &[Moderate, Complex],
            speed: 6,
            reliability: 6,
            cost: 4,
        },
        BackendId::AgentBrowser => CapabilityRecord {
            supports: &[Simple, Moderate, Complex, Visual],
            speed: 4,
            reliability: 7,
            cost: 2,
        },
    }
}

/// One fixed explanatory sentence per backend, used as the routing reason.
pub fn route_reason(backend: BackendId) -> &'static str {
    match backend {
        BackendId::Api => "direct REST calls are the fastest and cheapest path for API-mappable tasks",
        BackendId::Lux => "lux vision agent handles visually-driven flows the API cannot express",
        BackendId::BrowserUse => "browser-use agent covers complex multi-step browser interactions",
        BackendId::Steel => "steel browser sessions give reliable scripted control of the live app",
        BackendId::AgentBrowser => "local browser driver works without remote services as a conservative fallback",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complexity_is_total_and_stable() {
        for tt in [
            TaskType::CreateProject,
            TaskType::Generate,
            TaskType::ExportFigma,
            TaskType::CustomAction,
        ] {
            assert_eq!(complexity_of(&tt), complexity_of(&tt));
        }
        assert_eq!(
            complexity_of(&TaskType::Other("no_such_op".into())),
            TaskComplexity::Complex
        );
    }

    #[test]
    fn every_backend_has_capabilities_and_a_reason() {
        for b in BackendId::ALL {
            let rec = capabilities_of(b);
            assert!(!rec.supports.is_empty());
            assert!((1..=10).contains(&rec.speed));
            assert!((1..=10).contains(&rec.reliability));
            assert!((1..=10).contains(&rec.cost));
            assert!(!route_reason(b).is_empty());
        }
    }

    #[test]
    fn backend_id_round_trips_through_strings() {
        for b in BackendId::ALL {
            assert_eq!(b.as_str().parse::<BackendId>().unwrap(), b);
        }
        assert!("nope".parse::<BackendId>().is_err());
    }
}
