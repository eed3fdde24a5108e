//! Agent traits: the abstraction over the hosted conversational agent.
//!
//! The agent is opaque: given a composed prompt it returns an answer. How it
//! reasons or retrieves is its own business.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// What an agent run produced.
///
/// Remote agents do not always answer in the expected shape, so the ambiguity
/// is resolved once at the client boundary: either a plain text answer or the
/// raw payload it came in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AgentOutput {
    Text(String),
    Raw(serde_json::Value),
}

impl AgentOutput {
    /// The answer as display text. Raw payloads render as JSON, except bare
    /// strings which render unquoted.
    pub fn into_text(self) -> String {
        match self {
            AgentOutput::Text(text) => text,
            AgentOutput::Raw(serde_json::Value::String(text)) => text,
            AgentOutput::Raw(value) => value.to_string(),
        }
    }
}

/// A handle to a live agent.
#[async_trait]
pub trait Agent: Send + Sync {
    /// A human-readable name for this agent.
    fn name(&self) -> &str;

    /// Send a composed prompt and wait for the answer.
    async fn run(&self, prompt: &str) -> Result<AgentOutput, AgentError>;
}

/// Where agent handles come from.
#[async_trait]
pub trait AgentRegistry: Send + Sync {
    /// Acquire the agent registered under `agent_id`.
    async fn get(&self, agent_id: &str) -> Result<Arc<dyn Agent>, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_output_passes_through() {
        let out = AgentOutput::Text("**Answer**".into());
        assert_eq!(out.into_text(), "**Answer**");
    }

    #[test]
    fn raw_string_is_unquoted() {
        let out = AgentOutput::Raw(serde_json::json!("plain"));
        assert_eq!(out.into_text(), "plain");
    }

    #[test]
    fn raw_object_renders_as_json() {
        let out = AgentOutput::Raw(serde_json::json!({"steps": []}));
        assert_eq!(out.into_text(), r#"{"steps":[]}"#);
    }
}
