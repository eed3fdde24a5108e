//! # Navigator Core
//!
//! Domain types, traits, and error definitions for the Navigator assistant
//! backend. This crate has **no I/O**; it defines the domain model that the
//! other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here. Implementations live in their
//! respective crates:
//! - [`Agent`] / [`AgentRegistry`]: the hosted conversational agent
//!   (`navigator-providers`)
//! - [`SessionStore`]: session persistence (`navigator-sessions`)
//!
//! Handlers and tests can swap in mock implementations freely.

pub mod agent;
pub mod error;
pub mod message;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use agent::{Agent, AgentOutput, AgentRegistry};
pub use error::{AgentError, Error, Result, StoreError};
pub use message::{Message, Role};
pub use session::{Session, SessionId, SessionStore};
