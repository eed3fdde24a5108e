//! Session storage implementations for Navigator.

pub mod file_store;

pub use file_store::FileSessionStore;
