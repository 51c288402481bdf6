//! Reputation aggregates built from post-engagement evaluations.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
mod stats;


pub use domain::{EvaluationRecord, Rating, RatingError, TrustLevel, TrustStats};
pub use repository::EvaluationRepository;
pub use router::trust_router;
pub use service::TrustService;
pub use stats::{compute_stats, trust_level};
