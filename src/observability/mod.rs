//! Observability
//!
//! Structured logging side channel. Read-only with respect to the
//! entity store; never affects the outcome of an operation.

mod logger;

pub use logger::{Logger, Severity};
