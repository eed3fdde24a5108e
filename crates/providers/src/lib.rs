//! Hosted agent clients for Navigator.
//!
//! All clients implement the `navigator_core::AgentRegistry` and
//! `navigator_core::Agent` traits.

pub mod aixplain;

pub use aixplain::{AixplainAgent, AixplainRegistry};
