//! registra - permission-scoped academic records core
//!
//! Tracks students, courses, grades and dropout risk factors with
//! role-based program scoping and an append-only audit trail.

pub mod audit;
pub mod auth;
pub mod config;
pub mod import;
pub mod model;
pub mod observability;
pub mod report;
pub mod service;
pub mod store;

pub use config::RegistraConfig;
pub use service::Core;
