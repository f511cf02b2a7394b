//! HTTP route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use aura_core::api::{BackendId, Task, TaskType};

use crate::http::{models::*, state::AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/health/backends", get(backends_health_handler))
        .route("/task", post(task_handler))
        .route("/task/plan", post(plan_handler))
        .route("/generate", post(generate_handler))
        .route("/export/:project_id", post(export_handler))
        .route("/docs", get(docs_handler))
        .with_state(state)
}

/// GET /health - process liveness plus a config summary.
async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    state.count_request("/health");
    let stats = state.stats.read().expect("stats lock poisoned");
    Json(json!({
        "status": "ok",
        "session_id": state.session_id,
        "started_at": stats.start_time.to_rfc3339(),
        "requests_total": stats.requests_total,
        "preferred_backend": state.ctx.cfg().preferred_backend,
    }))
}

/// GET /health/backends - refreshed per-backend health map.
async fn backends_health_handler(State(state): State<AppState>) -> Json<Value> {
    state.count_request("/health/backends");
    let map = state
        .orchestrator
        .health()
        .refresh_all(state.orchestrator.registry())
        .await;

    let backends: Value = BackendId::ALL
        .into_iter()
        .map(|b| {
            (
                b.as_str().to_string(),
                json!({
                    "healthy": map.get(&b).copied().unwrap_or(false),
                    "configured": state.orchestrator.registry().contains(b),
                }),
            )
        })
        .collect::<serde_json::Map<String, Value>>()
        .into();
    Json(json!({ "backends": backends }))
}

async fn run_task(
    state: &AppState,
    task_type: TaskType,
    params: std::collections::HashMap<String, Value>,
) -> Result<(StatusCode, Json<TaskResponse>), HttpServerError> {
    let mut task = Task::new(task_type, params);
    match state.orchestrator.execute(&mut task).await {
        Ok(result) => {
            // 200 only when the backend reported logical success.
            let status = if result.success {
                StatusCode::OK
            } else {
                state.count_error();
                StatusCode::INTERNAL_SERVER_ERROR
            };
            Ok((
                status,
                Json(TaskResponse {
                    success: result.success,
                    task_id: Some(task.id),
                    backend: task.backend_used.map(|b| b.as_str().to_string()),
                    data: Some(serde_json::to_value(&result).unwrap_or(Value::Null)),
                    error: task.error,
                }),
            ))
        }
        Err(e) => {
            state.count_error();
            Err(HttpServerError::Execution(e.to_string()))
        }
    }
}

/// POST /task - execute a typed task with failover.
async fn task_handler(
    State(state): State<AppState>,
    Json(req): Json<TaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), HttpServerError> {
    state.count_request("/task");
    let task_type: TaskType = req
        .task_type
        .parse()
        .map_err(|_| HttpServerError::BadRequest("invalid task type".to_string()))?;
    run_task(&state, task_type, req.params).await
}

/// POST /task/plan - dry-run expansion; never touches a backend.
async fn plan_handler(
    State(state): State<AppState>,
    Json(req): Json<TaskRequest>,
) -> Result<Json<Value>, HttpServerError> {
    state.count_request("/task/plan");
    let task_type: TaskType = req
        .task_type
        .parse()
        .map_err(|_| HttpServerError::BadRequest("invalid task type".to_string()))?;
    let task = Task::new(task_type, req.params);

    match state.orchestrator.plan(&task) {
        Ok(plan) => Ok(Json(json!({ "success": true, "plan": plan }))),
        Err(e) => {
            state.count_error();
            Err(HttpServerError::Execution(e.to_string()))
        }
    }
}

/// POST /generate - convenience wrapper for a generate task.
async fn generate_handler(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), HttpServerError> {
    state.count_request("/generate");
    let mut params = std::collections::HashMap::from([("prompt".to_string(), json!(req.prompt))]);
    if let Some(name) = req.name {
        params.insert("name".to_string(), json!(name));
    }
    run_task(&state, TaskType::Generate, params).await
}

/// POST /export/:project_id - convenience wrapper for an export task.
async fn export_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(req): Json<ExportRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), HttpServerError> {
    state.count_request("/export");
    let task_type = match req.format.as_str() {
        "html" => TaskType::ExportHtml,
        "figma" => TaskType::ExportFigma,
        other => {
            return Err(HttpServerError::BadRequest(format!(
                "unknown export format: {other}"
            )))
        }
    };
    let params =
        std::collections::HashMap::from([("project_id".to_string(), json!(project_id))]);
    run_task(&state, task_type, params).await
}

/// GET /docs - static API description.
async fn docs_handler() -> Json<Value> {
    Json(json!({
        "name": "aura-agent",
        "endpoints": {
            "GET /health": "process liveness and config summary",
            "GET /health/backends": "refreshed per-backend health map",
            "POST /task": "{type, params} - execute a task with failover",
            "POST /task/plan": "{type, params} - dry-run execution plan",
            "POST /generate": "{prompt, name?} - generate a site/app",
            "POST /export/:projectId": "{format} - export html or figma",
        },
    }))
}
