//! Self-hosted steel browser API: create a session, run the task as an
//! automation script in it, release the session.

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use aura_core::api::{BackendId, CapabilityProvider, SteelConfig, Task, TaskResult};

#[derive(Debug, Deserialize)]
struct SteelSession {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SteelRunOutcome {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    logs: Vec<String>,
}

pub struct SteelProvider {
    client: reqwest::Client,
    base_url: String,
    headless: bool,
}

impl SteelProvider {
    pub fn new(cfg: &SteelConfig, headless: bool, timeout_ms: u64) -> Result<Self> {
        if cfg.base_url.trim().is_empty() {
            bail!("steel backend: no base url configured");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms.max(1_000)))
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            headless,
        })
    }

    async fn release_session(&self, session_id: &str) {
        // Best effort: a leaked session times out server-side anyway.
        let url = format!("{}/v1/sessions/{session_id}", self.base_url);
        if let Err(e) = self.client.delete(&url).send().await {
            tracing::debug!(session = session_id, "failed to release steel session: {e}");
        }
    }
}

#[async_trait]
impl CapabilityProvider for SteelProvider {
    fn id(&self) -> BackendId {
        BackendId::Steel
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.base_url))
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
            .post(format!("{}/v1/sessions", self.base_url))
            .json(&serde_json::json!({ "headless": self.headless }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(anyhow!("steel session create failed: {}", resp.status()));
        }
        let session: SteelSession = resp
            .json()
            .await
            .map_err(|e| anyhow!("failed to decode steel session: {e}"))?;

        let run = self
            .client
            .post(format!(
                "{}/v1/sessions/{}/automate",
                self.base_url, session.id
            ))
            .json(task)
            .send()
            .await;

        let outcome = match run {
            Ok(resp) if resp.status().is_success() => resp
                .json::<SteelRunOutcome>()
                .await
                .map_err(|e| anyhow!("failed to decode steel outcome: {e}")),
            Ok(resp) => Err(anyhow!("steel automate failed: {}", resp.status())),
            Err(e) => Err(e.into()),
        };

        self.release_session(&session.id).await;
        let outcome = outcome?;

        tracing::debug!(task = %task.id, success = outcome.success, "steel run finished");
        Ok(TaskResult {
            success: outcome.success,
            data: outcome.data,
            artifacts: Vec::new(),
            screenshots: Vec::new(),
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
    fn construction_requires_base_url() {
        assert!(SteelProvider::new(&SteelConfig::default(), true, 5_000).is_err());
    }

    #[tokio::test]
    async fn session_is_released_after_a_run() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/sessions")
            .with_status(200)
            .with_body(json!({ "id": "s-1" }).to_string())
            .create_async()
            .await;
        server
            .mock("POST", "/v1/sessions/s-1/automate")
            .with_status(200)
            .with_body(json!({ "success": true, "data": { "ok": 1 } }).to_string())
            .create_async()
            .await;
        let release = server
            .mock("DELETE", "/v1/sessions/s-1")
            .with_status(204)
            .create_async()
            .await;

        let cfg = SteelConfig {
            base_url: server.url(),
        };
        let provider = SteelProvider::new(&cfg, true, 5_000).unwrap();
        let task = Task::new(TaskType::ExportHtml, HashMap::new());

        let result = provider.execute_task(&task).await.unwrap();
        assert!(result.success);
        release.assert_async().await;
    }
}
