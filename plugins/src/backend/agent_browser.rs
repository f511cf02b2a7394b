//! Local CLI browser driver: the conservative fallback that needs no remote
//! service, only a locally installed binary. Slowest, but always available.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use aura_core::api::{BackendId, BinaryConfig, CapabilityProvider, Task, TaskResult};

#[derive(Debug, Deserialize)]
struct DriverOutcome {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    logs: Vec<String>,
}

pub struct AgentBrowserProvider {
    binary: String,
    headless: bool,
    timeout_ms: u64,
}

impl AgentBrowserProvider {
    pub fn new(cfg: &BinaryConfig, headless: bool, timeout_ms: u64) -> Result<Self> {
        if cfg.binary.trim().is_empty() {
            bail!("agent-browser backend: no binary configured");
        }
        Ok(Self {
            binary: cfg.binary.trim().to_string(),
            headless,
            timeout_ms,
        })
    }
}

#[async_trait]
impl CapabilityProvider for AgentBrowserProvider {
    fn id(&self) -> BackendId {
        BackendId::AgentBrowser
    }

    async fn health_check(&self) -> bool {
        let probe = Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match tokio::time::timeout(Duration::from_secs(10), probe).await {
            Ok(Ok(status)) => status.success(),
            _ => false,
        }
    }

    async fn execute_task(&self, task: &Task) -> Result<TaskResult> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("exec").arg("--task").arg("-");
        cmd.arg(if self.headless { "--headless" } else { "--headed" });
        // A timed-out attempt must not leave the driver process running.
        cmd.kill_on_drop(true);

        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn {}", self.binary))?;

        let payload = serde_json::to_vec(task)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload).await?;
            stdin.shutdown().await?;
        }

        let output = tokio::time::timeout(
            Duration::from_millis(self.timeout_ms),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| anyhow!("agent-browser timed out after {}ms", self.timeout_ms))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "agent-browser exited with {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let outcome: DriverOutcome = serde_json::from_str(text.trim())
            .map_err(|e| anyhow!("failed to decode agent-browser outcome: {e}"))?;

        tracing::debug!(task = %task.id, success = outcome.success, "agent-browser finished");
        Ok(TaskResult {
            success: outcome.success,
            data: outcome.data,
            artifacts: Vec::new(),
            screenshots: Vec::new(),
            logs: outcome.logs,
        })
    }
}
