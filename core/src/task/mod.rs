//! Task model: the unit of requested work against the Aura.build platform.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use crate::capability::BackendId;

/// Closed enumeration of supported operations. Unrecognized wire strings are
/// preserved in `Other` and classified as complex by the capability registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskType {
    CreateProject,
    Generate,
    SendPrompt,
    ExportHtml,
    ExportFigma,
    ApplyTemplate,
    GetProject,
    ListProjects,
    Screenshot,
    VisualVerify,
    CustomAction,
    Other(String),
}

impl TaskType {
    pub fn as_str(&self) -> &str {
        match self {
            TaskType::CreateProject => "create_project",
            TaskType::Generate => "generate",
            TaskType::SendPrompt => "send_prompt",
            TaskType::ExportHtml => "export_html",
            TaskType::ExportFigma => "export_figma",
            TaskType::ApplyTemplate => "apply_template",
            TaskType::GetProject => "get_project",
            TaskType::ListProjects => "list_projects",
            TaskType::Screenshot => "screenshot",
            TaskType::VisualVerify => "visual_verify",
            TaskType::CustomAction => "custom_action",
            TaskType::Other(s) => s,
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TaskType {
    fn from_wire(s: &str) -> Self {
        match s {
            "create_project" => TaskType::CreateProject,
            "generate" => TaskType::Generate,
            "send_prompt" => TaskType::SendPrompt,
            "export_html" => TaskType::ExportHtml,
            "export_figma" => TaskType::ExportFigma,
            "apply_template" => TaskType::ApplyTemplate,
            "get_project" => TaskType::GetProject,
            "list_projects" => TaskType::ListProjects,
            "screenshot" => TaskType::Screenshot,
            "visual_verify" => TaskType::VisualVerify,
            "custom_action" => TaskType::CustomAction,
            other => TaskType::Other(other.to_string()),
        }
    }
}

impl FromStr for TaskType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TaskType::from_wire(s))
    }
}

impl Serialize for TaskType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(TaskType::from_wire(&s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Html,
    Css,
    Js,
    Figma,
    Image,
    Json,
}

/// Typed file/byte output attached to a task result. Either inline content or
/// a URL the caller can fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Outcome reported by a capability provider. A `success: false` result is a
/// logical failure, not an execution error; the orchestrator passes it through
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub screenshots: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
}

impl TaskResult {
    pub fn ok(data: Option<Value>) -> Self {
        Self {
            success: true,
            data,
            artifacts: Vec::new(),
            screenshots: Vec::new(),
            logs: Vec::new(),
        }
    }

    pub fn failed(log: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            artifacts: Vec::new(),
            screenshots: Vec::new(),
            logs: vec![log.into()],
        }
    }
}

/// A unit of requested work. Created by a caller, mutated by the orchestrator
/// as it progresses; never persisted beyond the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(default)]
    pub params: HashMap<String, Value>,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TaskResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_used: Option<BackendId>,
}

impl Task {
    pub fn new(task_type: TaskType, params: HashMap<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_type,
            params,
            status: TaskStatus::Pending,
            result: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            backend_used: None,
        }
    }

    /// String param accessor; most step templates substitute from these.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_str())
    }
}
