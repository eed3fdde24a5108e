//! Shared test helpers for gateway and query tests.

use async_trait::async_trait;
use navigator_core::agent::{Agent, AgentOutput, AgentRegistry};
use navigator_core::error::AgentError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// An agent that returns a fixed answer and records every prompt it receives.
pub struct RecordingAgent {
    answer: String,
    delay: Duration,
    prompts: Mutex<Vec<String>>,
}

impl RecordingAgent {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering.
    pub fn slow(answer: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(answer)
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for RecordingAgent {
    fn name(&self) -> &str {
        "recording_mock"
    }

    async fn run(&self, prompt: &str) -> Result<AgentOutput, AgentError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(AgentOutput::Text(self.answer.clone()))
    }
}

/// A registry handing out one shared agent, optionally failing the first
/// `failures` lookups. Counts every lookup attempt.
pub struct MockRegistry {
    agent: Arc<RecordingAgent>,
    failures: AtomicUsize,
    attempts: AtomicUsize,
    delay: Duration,
}

impl MockRegistry {
    pub fn new(agent: Arc<RecordingAgent>) -> Self {
        Self {
            agent,
            failures: AtomicUsize::new(0),
            attempts: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn failing_first(agent: Arc<RecordingAgent>, failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            ..Self::new(agent)
        }
    }

    /// Sleep inside each lookup, widening the window for racing callers.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentRegistry for MockRegistry {
    async fn get(&self, agent_id: &str) -> Result<Arc<dyn Agent>, AgentError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(AgentError::Init {
                agent_id: agent_id.to_string(),
                reason: "registry unavailable".into(),
            });
        }

        Ok(self.agent.clone())
    }
}
