//! The query path of Navigator.
//!
//! A user question travels through four stages:
//!
//! 1. **Compose** the agent prompt: optional source URL first, then prior
//!    conversation turns ([`compose`])
//! 2. **Acquire** the process-wide agent handle ([`gateway`])
//! 3. **Run** the prompt against the hosted agent, bounded by a timeout
//! 4. **Classify** the answer as in- or out-of-domain ([`classify`])
//!
//! [`query::answer`] runs the whole path for one request.

pub mod classify;
pub mod compose;
pub mod gateway;
pub mod query;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use classify::is_out_of_domain;
pub use gateway::AgentGateway;
pub use query::{QueryAnswer, QueryRequest};
