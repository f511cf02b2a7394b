//! Advisory task expansion: fixed per-task-type step templates plus a
//! duration estimate. Used for dry-run inspection; execution itself delegates
//! the whole task to one provider, so steps are descriptive, not live state.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::capability::{complexity_of, BackendId, TaskComplexity};
use crate::error::AgentError;
use crate::router::{Router, RoutingDecision};
use crate::task::{Task, TaskType};

const DEFAULT_STEP_TIMEOUT_MS: u64 = 5_000;
const CUSTOM_STEP_TIMEOUT_MS: u64 = 60_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub id: String,
    pub action: String,
    #[serde(default)]
    pub params: HashMap<String, Value>,
    /// Dependency metadata only; the orchestrator does not schedule steps.
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    pub retryable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub task_id: String,
    pub complexity: TaskComplexity,
    pub steps: Vec<ExecutionStep>,
    pub estimated_duration_secs: u64,
    pub routing: RoutingDecision,
}

/// Backend-specific duration multiplier: the API path is roughly twice as
/// fast as a vision agent, the local driver roughly twice as slow.
fn backend_multiplier(backend: BackendId) -> f64 {
    match backend {
        BackendId::Api => 0.5,
        BackendId::Lux => 1.0,
        BackendId::BrowserUse | BackendId::Steel => 1.5,
        BackendId::AgentBrowser => 2.0,
    }
}

fn estimate_duration_secs(steps: &[ExecutionStep], backend: BackendId) -> u64 {
    let total_ms: u64 = steps
        .iter()
        .map(|s| s.timeout_ms.unwrap_or(DEFAULT_STEP_TIMEOUT_MS))
        .sum();
    let scaled = total_ms as f64 * backend_multiplier(backend) / 1000.0;
    scaled.ceil() as u64
}

pub struct Planner {
    router: Arc<Router>,
}

impl Planner {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    pub fn plan(&self, task: &Task) -> Result<ExecutionPlan, AgentError> {
        let routing = self.router.route(task)?;
        let steps = steps_for(task);
        let estimated_duration_secs = estimate_duration_secs(&steps, routing.primary);

        Ok(ExecutionPlan {
            task_id: task.id.clone(),
            complexity: complexity_of(&task.task_type),
            steps,
            estimated_duration_secs,
            routing,
        })
    }
}

/// Linear chain builder: each step depends on the one before it.
struct StepChain {
    steps: Vec<ExecutionStep>,
}

impl StepChain {
    fn new() -> Self {
        Self { steps: Vec::new() }
    }

    fn push(
        mut self,
        action: &str,
        params: HashMap<String, Value>,
        timeout_ms: u64,
        retryable: bool,
    ) -> Self {
        let id = format!("step-{}", self.steps.len() + 1);
        let depends_on = self
            .steps
            .last()
            .map(|prev| vec![prev.id.clone()])
            .unwrap_or_default();
        self.steps.push(ExecutionStep {
            id,
            action: action.to_string(),
            params,
            depends_on,
            timeout_ms: Some(timeout_ms),
            retryable,
        });
        self
    }
}

fn one(key: &str, value: Value) -> HashMap<String, Value> {
    HashMap::from([(key.to_string(), value)])
}

fn str_param(task: &Task, key: &str) -> Value {
    task.param_str(key)
        .map(|s| json!(s))
        .unwrap_or(Value::Null)
}

/// Literal, hardcoded step templates with placeholder substitution from the
/// task's own parameters. Task types without a template get one generic step.
fn steps_for(task: &Task) -> Vec<ExecutionStep> {
    let chain = StepChain::new();
    let steps = match &task.task_type {
        TaskType::CreateProject => chain
            .push("open_dashboard", HashMap::new(), 10_000, true)
            .push("create_project", one("name", str_param(task, "name")), 15_000, false),
        TaskType::Generate => chain
            .push("open_builder", HashMap::new(), 10_000, true)
            .push("submit_prompt", one("prompt", str_param(task, "prompt")), 30_000, false)
            .push("await_generation", HashMap::new(), 60_000, true),
        TaskType::SendPrompt => chain
            .push(
                "open_project",
                one("project_id", str_param(task, "project_id")),
                10_000,
                true,
            )
            .push("submit_prompt", one("prompt", str_param(task, "prompt")), 30_000, false),
        TaskType::ExportHtml | TaskType::ExportFigma => {
            let format = if task.task_type == TaskType::ExportHtml {
                "html"
            } else {
                "figma"
            };
            chain
                .push(
                    "open_project",
                    one("project_id", str_param(task, "project_id")),
                    10_000,
                    true,
                )
                .push("open_export_dialog", HashMap::new(), 5_000, true)
                .push("select_format", one("format", json!(format)), 5_000, true)
                .push("download_artifacts", HashMap::new(), 45_000, false)
        }
        TaskType::ApplyTemplate => chain
            .push(
                "open_project",
                one("project_id", str_param(task, "project_id")),
                10_000,
                true,
            )
            .push(
                "apply_template",
                one("template", str_param(task, "template")),
                20_000,
                false,
            ),
        TaskType::GetProject => chain.push(
            "fetch_project",
            one("project_id", str_param(task, "project_id")),
            5_000,
            true,
        ),
        TaskType::ListProjects => chain.push("fetch_projects", HashMap::new(), 5_000, true),
        TaskType::Screenshot => chain
            .push(
                "open_project",
                one("project_id", str_param(task, "project_id")),
                10_000,
                true,
            )
            .push("capture_screenshot", HashMap::new(), 10_000, true),
        TaskType::VisualVerify => chain
            .push(
                "open_project",
                one("project_id", str_param(task, "project_id")),
                10_000,
                true,
            )
            .push("capture_screenshot", HashMap::new(), 10_000, true)
            .push(
                "verify_visual",
                one("assertion", str_param(task, "assertion")),
                30_000,
                false,
            ),
        TaskType::CustomAction | TaskType::Other(_) => chain.push(
            "execute_custom",
            task.params.clone(),
            CUSTOM_STEP_TIMEOUT_MS,
            true,
        ),
    };
    steps.steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendPreference;
    use crate::health::HealthTracker;

    fn planner_with(healthy: &[BackendId]) -> Planner {
        let tracker = Arc::new(HealthTracker::new());
        for b in BackendId::ALL {
            tracker.set(b, healthy.contains(&b));
        }
        Planner::new(Arc::new(Router::new(tracker, BackendPreference::Auto)))
    }

    fn task_with(task_type: TaskType, params: &[(&str, &str)]) -> Task {
        let params = params
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();
        Task::new(task_type, params)
    }

    #[test]
    fn export_on_lux_estimates_sixty_five_seconds() {
        // Export template timeouts total 65000ms; lux multiplier is 1.0.
        let planner = planner_with(&[BackendId::Lux]);
        let task = task_with(TaskType::ExportHtml, &[("project_id", "p-1")]);

        let plan = planner.plan(&task).unwrap();
        assert_eq!(plan.routing.primary, BackendId::Lux);
        let total_ms: u64 = plan.steps.iter().map(|s| s.timeout_ms.unwrap()).sum();
        assert_eq!(total_ms, 65_000);
        assert_eq!(plan.estimated_duration_secs, 65);
    }

    #[test]
    fn api_halves_and_local_doubles_the_estimate() {
        let task = task_with(TaskType::ExportHtml, &[("project_id", "p-1")]);

        let api_plan = planner_with(&[BackendId::Api]).plan(&task).unwrap();
        // Api does not support complex exports of figma, but html is moderate.
        assert_eq!(api_plan.estimated_duration_secs, 33); // ceil(32.5)

        let local_plan = planner_with(&[BackendId::AgentBrowser]).plan(&task).unwrap();
        assert_eq!(local_plan.estimated_duration_secs, 130);
    }

    #[test]
    fn templates_substitute_task_params() {
        let planner = planner_with(&[BackendId::Lux]);
        let task = task_with(TaskType::Generate, &[("prompt", "landing page")]);

        let plan = planner.plan(&task).unwrap();
        let submit = plan
            .steps
            .iter()
            .find(|s| s.action == "submit_prompt")
            .unwrap();
        assert_eq!(submit.params["prompt"], json!("landing page"));
        // Linear chain: step 2 depends on step 1.
        assert_eq!(submit.depends_on, vec!["step-1".to_string()]);
    }

    #[test]
    fn unknown_types_get_one_generic_retryable_step() {
        let planner = planner_with(&[BackendId::Lux]);
        let task = task_with(TaskType::Other("weird_op".into()), &[("x", "y")]);

        let plan = planner.plan(&task).unwrap();
        assert_eq!(plan.steps.len(), 1);
        let step = &plan.steps[0];
        assert_eq!(step.action, "execute_custom");
        assert!(step.retryable);
        assert_eq!(step.timeout_ms, Some(60_000));
        assert_eq!(plan.complexity, TaskComplexity::Complex);
    }
}
