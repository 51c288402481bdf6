//! Matching and application-lifecycle engine for a hiring marketplace.
//!
//! The pure components (scoring, ranking, lifecycle transitions, trust
//! aggregation) live under [`workflows`]; the services next to them wire those
//! components to async collaborator traits and expose them over HTTP.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
