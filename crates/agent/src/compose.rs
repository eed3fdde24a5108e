//! Prompt composition.
//!
//! Pure functions, no state. The agent prompt is built in two layers: the
//! URL layer wraps the bare question, then the history layer wraps that.
//! The text echoed back to the user only ever gets the URL layer.

use navigator_core::message::Message;

fn non_blank(url: Option<&str>) -> Option<&str> {
    url.filter(|u| !u.trim().is_empty())
}

/// The question as sent to the agent, with the source URL when one is given.
///
/// `question` is expected to be trimmed already.
pub fn compose_agent_query(question: &str, url: Option<&str>) -> String {
    match non_blank(url) {
        Some(url) => format!("URL: {url}\n\nQuestion: {question}"),
        None => question.to_string(),
    }
}

/// The question as shown back to the user.
pub fn compose_user_display(question: &str, url: Option<&str>) -> String {
    match non_blank(url) {
        Some(url) => format!("{question}\n\n🔗 URL: {url}"),
        None => question.to_string(),
    }
}

/// Prior turns rendered as `User: ...` / `Assistant: ...` blocks separated by
/// blank lines.
///
/// The last message is the current turn and is left out; with fewer than two
/// messages there is no prior context and the result is empty.
pub fn build_conversation_context(messages: &[Message]) -> String {
    let Some((_current, prior)) = messages.split_last() else {
        return String::new();
    };

    prior
        .iter()
        .map(|m| format!("{}: {}", m.role.label(), m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Prefix `query` with the conversation so far, if there is any.
pub fn add_context_to_query(query: &str, context: &str) -> String {
    if context.is_empty() {
        query.to_string()
    } else {
        format!("Previous conversation:\n{context}\n\nCurrent question: {query}")
    }
}
