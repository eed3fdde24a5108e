//! One question, end to end.

use navigator_core::error::{Error, Result};
use navigator_core::message::Message;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classify::is_out_of_domain;
use crate::compose::{
    add_context_to_query, build_conversation_context, compose_agent_query, compose_user_display,
};
use crate::gateway::AgentGateway;

/// A question as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub question: String,

    #[serde(default)]
    pub url: Option<String>,

    /// The conversation so far; the last element is the current turn.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }
}

/// The agent's answer plus what the client needs to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub response: String,
    pub user_display: String,
    pub is_out_of_domain: bool,
}

/// Validate, compose, run, and classify one question.
///
/// An empty question is rejected before the agent is touched.
pub async fn answer(gateway: &AgentGateway, request: &QueryRequest) -> Result<QueryAnswer> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(Error::Validation("Question is required".into()));
    }
    let url = request.url.as_deref().map(str::trim);

    let agent = gateway.get_agent().await?;

    let user_display = compose_user_display(question, url);
    let context = build_conversation_context(&request.messages);
    let prompt = add_context_to_query(&compose_agent_query(question, url), &context);

    let response = gateway.run_agent(agent.as_ref(), &prompt).await?;
    let is_out_of_domain = is_out_of_domain(&response);

    info!(
        history = request.messages.len(),
        has_url = url.is_some_and(|u| !u.is_empty()),
        is_out_of_domain,
        "Query answered"
    );

    Ok(QueryAnswer {
        response,
        user_display,
        is_out_of_domain,
    })
}
