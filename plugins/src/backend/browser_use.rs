//! browser-use vision agent, spawned as a subprocess. The task goes in as
//! JSON on stdin; the agent prints a JSON outcome as its last stdout line.

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
struct AgentOutcome {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    screenshots: Vec<String>,
    #[serde(default)]
    logs: Vec<String>,
}

pub struct BrowserUseProvider {
    binary: String,
    headless: bool,
    timeout_ms: u64,
}

impl BrowserUseProvider {
    pub fn new(cfg: &BinaryConfig, headless: bool, timeout_ms: u64) -> Result<Self> {
        if cfg.binary.trim().is_empty() {
            bail!("browser-use backend: no binary configured");
        }
        Ok(Self {
            binary: cfg.binary.trim().to_string(),
            headless,
            timeout_ms,
        })
    }
}

#[async_trait]
impl CapabilityProvider for BrowserUseProvider {
    fn id(&self) -> BackendId {
        BackendId::BrowserUse
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
        cmd.arg("run").arg("--json");
        if self.headless {
            cmd.arg("--headless");
        }
        // A timed-out attempt must not leave the agent process running.
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
        .map_err(|_| anyhow!("browser-use timed out after {}ms", self.timeout_ms))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "browser-use exited with {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ));
        }

        parse_outcome(&output.stdout, task)
    }
}

fn parse_outcome(stdout: &[u8], task: &Task) -> Result<TaskResult> {
    let text = String::from_utf8_lossy(stdout);
    let last_line = text
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| anyhow!("browser-use produced no output"))?;
    let outcome: AgentOutcome = serde_json::from_str(last_line)
        .map_err(|e| anyhow!("failed to decode browser-use outcome: {e}"))?;

    tracing::debug!(task = %task.id, success = outcome.success, "browser-use finished");
    Ok(TaskResult {
        success: outcome.success,
        data: outcome.data,
        artifacts: Vec::new(),
        screenshots: outcome.screenshots,
        logs: outcome.logs,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use aura_core::api::TaskType;

    #[test]
    fn construction_requires_binary() {
        let cfg = BinaryConfig { binary: "  ".into() };
        assert!(BrowserUseProvider::new(&cfg, true, 5_000).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timed_out_agent_process_is_killed() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let pid_path = dir.path().join("pid");
        let script = dir.path().join("slow-agent");
        std::fs::write(
            &script,
            format!("#!/bin/sh\necho $$ > {}\nsleep 30\n", pid_path.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let cfg = BinaryConfig {
            binary: script.to_string_lossy().to_string(),
        };
        let provider = BrowserUseProvider::new(&cfg, true, 200).unwrap();
        let task = Task::new(TaskType::CustomAction, HashMap::new());

        let err = provider.execute_task(&task).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));

        // The kill signal is delivered when the dropped future releases the
        // child; give it a moment, then the process must be gone.
        tokio::time::sleep(Duration::from_millis(200)).await;
        let pid = std::fs::read_to_string(&pid_path).unwrap().trim().to_string();
        assert!(!std::path::Path::new(&format!("/proc/{pid}")).exists());
    }

    #[test]
    fn outcome_is_parsed_from_last_stdout_line() {
        let task = Task::new(TaskType::CustomAction, HashMap::new());
        let stdout = b"progress: opening page\n{\"success\":true,\"data\":{\"done\":1}}\n";

        let result = parse_outcome(stdout, &task).unwrap();
        assert!(result.success);
        assert_eq!(result.data.unwrap()["done"], 1);

        assert!(parse_outcome(b"", &task).is_err());
        assert!(parse_outcome(b"not json\n", &task).is_err());
    }
}
