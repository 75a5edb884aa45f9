//! Agent Validation Hub REST API contract types and validation
//!
//! This crate defines the resource types exchanged with the hub's REST
//! service. They are shared between the local mock, the REST client and the
//! CLI views. Progress values are normalized to a single percentage unit at
//! the serde boundary, see [`progress`].

pub mod error;
pub mod job;
pub mod progress;
pub mod types;
pub mod validation;

pub use error::*;
pub use job::*;
pub use progress::Progress;
pub use types::*;
