//! Agent gateway: owns the process-wide agent handle.
//!
//! The handle is acquired lazily on first use and cached for the life of the
//! process. Acquisition is single-flight: concurrent first callers wait on
//! one attempt and all observe the same handle. A failed attempt is not
//! cached, so the next caller tries again.

use std::sync::Arc;
use std::time::Duration;

use navigator_config::AgentConfig;
use navigator_core::agent::{Agent, AgentRegistry};
use navigator_core::error::AgentError;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

pub struct AgentGateway {
    registry: Arc<dyn AgentRegistry>,
    agent_id: String,
    run_timeout: Duration,
    handle: OnceCell<Arc<dyn Agent>>,
}

impl AgentGateway {
    pub fn new(
        registry: Arc<dyn AgentRegistry>,
        agent_id: impl Into<String>,
        run_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            agent_id: agent_id.into(),
            run_timeout,
            handle: OnceCell::new(),
        }
    }

    /// Build a gateway for the agent named in the `[agent]` config section.
    pub fn from_config(registry: Arc<dyn AgentRegistry>, config: &AgentConfig) -> Self {
        Self::new(registry, config.agent_id.clone(), config.run_timeout())
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Whether a handle has been acquired yet.
    pub fn is_initialized(&self) -> bool {
        self.handle.initialized()
    }

    /// The cached agent handle, acquiring it on first use.
    pub async fn get_agent(&self) -> Result<Arc<dyn Agent>, AgentError> {
        self.handle
            .get_or_try_init(|| async {
                match self.registry.get(&self.agent_id).await {
                    Ok(agent) => {
                        info!(agent_id = %self.agent_id, name = agent.name(), "Retrieved agent");
                        Ok(agent)
                    }
                    Err(e) => {
                        error!(agent_id = %self.agent_id, error = %e, "Failed to retrieve agent");
                        Err(e)
                    }
                }
            })
            .await
            .cloned()
    }

    /// Run `prompt` on `agent` and return the answer text.
    pub async fn run_agent(&self, agent: &dyn Agent, prompt: &str) -> Result<String, AgentError> {
        debug!(agent = agent.name(), prompt_len = prompt.len(), "Dispatching prompt");
        let output = tokio::time::timeout(self.run_timeout, agent.run(prompt))
            .await
            .map_err(|_| AgentError::Timeout {
                secs: self.run_timeout.as_secs(),
            })??;
        Ok(output.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockRegistry, RecordingAgent};

    fn gateway(registry: Arc<MockRegistry>) -> AgentGateway {
        AgentGateway::new(registry, "policy-agent", Duration::from_secs(5))
    }

    #[tokio::test]
    async fn caches_handle_after_first_success() {
        let registry = Arc::new(MockRegistry::new(Arc::new(RecordingAgent::new("ok"))));
        let gw = gateway(registry.clone());

        assert!(!gw.is_initialized());
        let first = gw.get_agent().await.unwrap();
        let second = gw.get_agent().await.unwrap();

        assert!(gw.is_initialized());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.attempts(), 1);
    }

    #[tokio::test]
    async fn failed_init_is_retried_on_next_call() {
        let registry = Arc::new(MockRegistry::failing_first(
            Arc::new(RecordingAgent::new("ok")),
            1,
        ));
        let gw = gateway(registry.clone());

        let err = gw.get_agent().await.err().unwrap();
        assert!(matches!(err, AgentError::Init { .. }));
        assert!(!gw.is_initialized());

        assert!(gw.get_agent().await.is_ok());
        assert_eq!(registry.attempts(), 2);
    }

    #[tokio::test]
    async fn concurrent_first_callers_share_one_init() {
        let registry = Arc::new(
            MockRegistry::new(Arc::new(RecordingAgent::new("ok")))
                .with_delay(Duration::from_millis(50)),
        );
        let gw = Arc::new(gateway(registry.clone()));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let gw = gw.clone();
                tokio::spawn(async move { gw.get_agent().await })
            })
            .collect();

        let mut handles = Vec::new();
        for task in tasks {
            handles.push(task.await.unwrap().ok().unwrap());
        }

        assert_eq!(registry.attempts(), 1);
        assert!(handles.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn run_agent_returns_answer_text() {
        let agent = Arc::new(RecordingAgent::new("The answer"));
        let gw = gateway(Arc::new(MockRegistry::new(agent.clone())));

        let handle = gw.get_agent().await.unwrap();
        let answer = gw.run_agent(handle.as_ref(), "prompt").await.unwrap();

        assert_eq!(answer, "The answer");
        assert_eq!(agent.prompts(), vec!["prompt".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_agent_times_out() {
        let agent = Arc::new(RecordingAgent::slow("late", Duration::from_secs(60)));
        let gw = AgentGateway::new(
            Arc::new(MockRegistry::new(agent.clone())),
            "policy-agent",
            Duration::from_secs(2),
        );

        let handle = gw.get_agent().await.unwrap();
        let err = gw.run_agent(handle.as_ref(), "prompt").await.unwrap_err();
        assert!(matches!(err, AgentError::Timeout { secs: 2 }));
    }
}
