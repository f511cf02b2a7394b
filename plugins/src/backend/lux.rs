//! Lux vision/LLM browser agent, driven over its local HTTP control API.
//! Lux receives the whole task and reports a structured outcome, including
//! any screenshots it captured along the way.

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use aura_core::api::{BackendId, CapabilityProvider, LuxConfig, Task, TaskResult};

#[derive(Debug, Deserialize)]
struct LuxOutcome {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    screenshots: Vec<String>,
    #[serde(default)]
    logs: Vec<String>,
}

pub struct LuxProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LuxProvider {
    pub fn new(cfg: &LuxConfig, timeout_ms: u64) -> Result<Self> {
        let Some(api_key) = cfg.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
            bail!("lux backend: no api key configured");
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms.max(1_000)))
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
        })
    }
}

#[async_trait]
impl CapabilityProvider for LuxProvider {
    fn id(&self) -> BackendId {
        BackendId::Lux
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/v1/health", self.base_url))
            .header("x-api-key", &self.api_key)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn execute_task(&self, task: &Task) -> Result<TaskResult> {
        let resp = self
            .client
            .post(format!("{}/v1/tasks", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(task)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("lux agent returned {status}: {body}"));
        }

        let outcome: LuxOutcome = resp
            .json()
            .await
            .map_err(|e| anyhow!("failed to decode lux outcome: {e}"))?;

        tracing::debug!(
            task = %task.id,
            success = outcome.success,
            screenshots = outcome.screenshots.len(),
            "lux task finished"
        );
        Ok(TaskResult {
            success: outcome.success,
            data: outcome.data,
            artifacts: Vec::new(),
            screenshots: outcome.screenshots,
            logs: outcome.logs,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use aura_core::api::TaskType;

    #[test]
    fn construction_requires_api_key() {
        let cfg = LuxConfig {
            base_url: "http://127.0.0.1:7310".into(),
            api_key: None,
        };
        assert!(LuxProvider::new(&cfg, 5_000).is_err());
    }

    #[tokio::test]
    async fn logical_failure_is_returned_not_thrown() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/tasks")
            .match_header("x-api-key", "lux-key")
            .with_status(200)
            .with_body(json!({ "success": false, "logs": ["element not found"] }).to_string())
            .create_async()
            .await;

        let cfg = LuxConfig {
            base_url: server.url(),
            api_key: Some("lux-key".into()),
        };
        let provider = LuxProvider::new(&cfg, 5_000).unwrap();
        let task = Task::new(TaskType::CustomAction, HashMap::new());

        let result = provider.execute_task(&task).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.logs, vec!["element not found".to_string()]);
    }
}
