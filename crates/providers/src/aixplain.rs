//! aiXplain agent platform client.
//!
//! Agents are looked up by id (`GET /sdk/agents/{id}`) and run by posting a
//! query (`POST /sdk/agents/{id}/run`). Runs are asynchronous on the platform
//! side: the run call usually answers with a poll URL, which is fetched until
//! the result reports `completed`.
//!
//! No overall deadline is applied here; callers bound `run` themselves.

use async_trait::async_trait;
use navigator_config::AgentConfig;
use navigator_core::agent::{Agent, AgentOutput, AgentRegistry};
use navigator_core::error::AgentError;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

const API_KEY_HEADER: &str = "x-api-key";

/// Looks up agents on the platform.
pub struct AixplainRegistry {
    base_url: String,
    api_key: String,
    poll_interval: Duration,
    client: reqwest::Client,
}

impl AixplainRegistry {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            poll_interval: Duration::from_secs(1),
            client,
        }
    }

    /// Build a registry from the `[agent]` config section.
    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(&config.base_url, config.api_key.clone().unwrap_or_default())
            .with_poll_interval(config.poll_interval())
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

#[derive(Debug, Deserialize)]
struct AgentInfo {
    id: String,
    #[serde(default)]
    name: String,
}

#[async_trait]
impl AgentRegistry for AixplainRegistry {
    async fn get(&self, agent_id: &str) -> Result<Arc<dyn Agent>, AgentError> {
        let init_err = |reason: String| AgentError::Init {
            agent_id: agent_id.to_string(),
            reason,
        };

        if agent_id.trim().is_empty() {
            return Err(init_err("no agent id configured".into()));
        }
        if self.api_key.is_empty() {
            return Err(init_err(
                "no API key configured (set AIXPLAIN_API_KEY)".into(),
            ));
        }

        let url = format!("{}/sdk/agents/{}", self.base_url, agent_id);
        debug!(agent_id, "Fetching agent metadata");

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| init_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(init_err(format!("platform returned {status}: {body}")));
        }

        let info: AgentInfo = response
            .json()
            .await
            .map_err(|e| init_err(format!("failed to parse agent metadata: {e}")))?;

        let name = if info.name.is_empty() {
            info.id.clone()
        } else {
            info.name
        };

        Ok(Arc::new(AixplainAgent {
            id: info.id,
            name,
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            poll_interval: self.poll_interval,
            client: self.client.clone(),
        }))
    }
}

/// A resolved platform agent.
pub struct AixplainAgent {
    id: String,
    name: String,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
    client: reqwest::Client,
}

/// The platform's run/poll envelope. Both the run reply and each poll reply
/// use this shape; which fields are present depends on progress.
#[derive(Debug, Default, Deserialize)]
struct RunEnvelope {
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    data: serde_json::Value,
}

impl RunEnvelope {
    fn poll_url(&self) -> Option<&str> {
        self.data
            .as_str()
            .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
    }

    fn failure(&self) -> Option<String> {
        let failed = self
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("failed"));

        match &self.error {
            Some(serde_json::Value::String(msg)) if !msg.is_empty() => Some(msg.clone()),
            Some(serde_json::Value::String(_) | serde_json::Value::Null) | None => {
                failed.then(|| "agent run failed".to_string())
            }
            Some(other) => Some(other.to_string()),
        }
    }

    /// Resolve a finished envelope into an answer.
    fn into_output(self) -> Result<AgentOutput, AgentError> {
        if let Some(reason) = self.failure() {
            return Err(AgentError::Run(reason));
        }

        if let Some(text) = self.data.get("output").and_then(|v| v.as_str()) {
            return Ok(AgentOutput::Text(text.to_string()));
        }
        Ok(AgentOutput::Raw(self.data))
    }
}

impl AixplainAgent {
    pub fn id(&self) -> &str {
        &self.id
    }

    async fn fetch(&self, request: reqwest::RequestBuilder) -> Result<RunEnvelope, AgentError> {
        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| AgentError::Run(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Agent platform returned error");
            return Err(AgentError::Run(format!("platform returned {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| AgentError::Run(format!("failed to parse agent response: {e}")))
    }
}

#[async_trait]
impl Agent for AixplainAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, prompt: &str) -> Result<AgentOutput, AgentError> {
        let url = format!("{}/sdk/agents/{}/run", self.base_url, self.id);
        let body = serde_json::json!({
            "query": prompt,
            "outputFormat": "markdown",
        });

        debug!(agent_id = %self.id, prompt_len = prompt.len(), "Starting agent run");
        let mut envelope = self.fetch(self.client.post(&url).json(&body)).await?;

        if envelope.completed {
            return envelope.into_output();
        }

        let Some(poll_url) = envelope.poll_url().map(str::to_string) else {
            if envelope.failure().is_some() {
                return envelope.into_output();
            }
            return Err(AgentError::Run(
                "run response carried neither a result nor a poll URL".into(),
            ));
        };

        let mut polls = 0usize;
        loop {
            tokio::time::sleep(self.poll_interval).await;
            polls += 1;
            envelope = self.fetch(self.client.get(&poll_url)).await?;
            trace!(agent_id = %self.id, polls, completed = envelope.completed, "Polled agent run");

            if envelope.completed || envelope.failure().is_some() {
                debug!(agent_id = %self.id, polls, "Agent run finished");
                return envelope.into_output();
            }
        }
    }
}
