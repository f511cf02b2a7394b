//! Command handlers: build the orchestrator from config, run one task, and
//! map outcomes to exit codes.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use aura_core::api::{
    AgentContext, BackendId, CliError, HealthTracker, Orchestrator, Task, TaskType,
};
use aura_plugins::build_registry;

use super::cli::{ExecuteArgs, ExportArgs, GenerateArgs, PromptArgs, TemplateArgs};

/// Wire an orchestrator: construct providers, seed initial health from
/// construction outcomes.
pub fn build_orchestrator(ctx: &AgentContext) -> Orchestrator {
    let (registry, initial_health) = build_registry(ctx.cfg());
    let health = Arc::new(HealthTracker::new());
    for (backend, healthy) in initial_health {
        health.set(backend, healthy);
    }
    ctx.orchestrator(registry, health)
}

/// Run one task to completion and print the result. Exit 0 on success, 1 on
/// a failed task.
async fn run_task(
    ctx: &AgentContext,
    task_type: TaskType,
    params: HashMap<String, Value>,
) -> Result<i32, CliError> {
    let orchestrator = build_orchestrator(ctx);
    let mut task = Task::new(task_type, params);

    let result = orchestrator.execute(&mut task).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "task_id": task.id,
            "backend": task.backend_used,
            "result": result,
        }))?
    );
    Ok(if result.success { 0 } else { 1 })
}

pub async fn handle_generate(ctx: &AgentContext, args: GenerateArgs) -> Result<i32, CliError> {
    let mut params = HashMap::from([("prompt".to_string(), json!(args.prompt))]);
    if let Some(name) = args.name {
        params.insert("name".to_string(), json!(name));
    }
    run_task(ctx, TaskType::Generate, params).await
}

pub async fn handle_export(ctx: &AgentContext, args: ExportArgs) -> Result<i32, CliError> {
    let task_type = match args.format.as_str() {
        "html" => TaskType::ExportHtml,
        "figma" => TaskType::ExportFigma,
        other => {
            return Err(CliError::Command(format!(
                "unknown export format: {other} (expected html or figma)"
            )))
        }
    };
    let params = HashMap::from([("project_id".to_string(), json!(args.project_id))]);
    run_task(ctx, task_type, params).await
}

pub async fn handle_create(ctx: &AgentContext, name: String) -> Result<i32, CliError> {
    let params = HashMap::from([("name".to_string(), json!(name))]);
    run_task(ctx, TaskType::CreateProject, params).await
}

pub async fn handle_prompt(ctx: &AgentContext, args: PromptArgs) -> Result<i32, CliError> {
    let params = HashMap::from([
        ("project_id".to_string(), json!(args.project_id)),
        ("prompt".to_string(), json!(args.text)),
    ]);
    run_task(ctx, TaskType::SendPrompt, params).await
}

pub async fn handle_template(ctx: &AgentContext, args: TemplateArgs) -> Result<i32, CliError> {
    let params = HashMap::from([
        ("project_id".to_string(), json!(args.project_id)),
        ("template".to_string(), json!(args.template)),
    ]);
    run_task(ctx, TaskType::ApplyTemplate, params).await
}

pub async fn handle_execute(ctx: &AgentContext, args: ExecuteArgs) -> Result<i32, CliError> {
    let task_type: TaskType = args
        .task_type
        .parse()
        .map_err(|_| CliError::Command("invalid task type".to_string()))?;
    let params: HashMap<String, Value> = match args.params.as_deref() {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| CliError::Command(format!("--params must be a JSON object: {e}")))?,
        None => HashMap::new(),
    };

    if args.dry_run {
        let orchestrator = build_orchestrator(ctx);
        let task = Task::new(task_type, params);
        let plan = orchestrator.plan(&task)?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(0);
    }

    run_task(ctx, task_type, params).await
}

pub async fn handle_health(ctx: &AgentContext) -> Result<i32, CliError> {
    let orchestrator = build_orchestrator(ctx);
    let map = orchestrator
        .health()
        .refresh_all(orchestrator.registry())
        .await;

    println!("{:<14} {:<6} configured", "backend", "status");
    for backend in BackendId::ALL {
        let status = if map.get(&backend).copied().unwrap_or(false) {
            "up"
        } else {
            "down"
        };
        let configured = orchestrator.registry().contains(backend);
        println!("{:<14} {:<6} {}", backend.as_str(), status, configured);
    }
    Ok(0)
}

/// Stream every agent event as JSON lines until interrupted. Useful next to
/// a running `serve` in the same process tree, or for auditing a long task.
pub async fn handle_intercept(ctx: &AgentContext) -> Result<i32, CliError> {
    let mut rx = ctx.events().subscribe();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let mut line = serde_json::to_string(&event)?;
                    line.push('\n');
                    stdout.write_all(line.as_bytes()).await?;
                    stdout.flush().await?;
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!("event stream lagged, {missed} events missed");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(0)
}

/// Minimal REPL: each non-command line runs as a generate task.
pub async fn handle_interactive(ctx: &AgentContext) -> Result<i32, CliError> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    println!("aura-agent interactive: type a prompt, 'health', or 'quit'");
    loop {
        print!("aura> ");
        use std::io::Write;
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" => break,
            "health" => {
                handle_health(ctx).await?;
            }
            prompt => {
                let params = HashMap::from([("prompt".to_string(), json!(prompt))]);
                match run_task(ctx, TaskType::Generate, params).await {
                    Ok(_) => {}
                    Err(e) => eprintln!("{e}"),
                }
            }
        }
    }
    Ok(0)
}
