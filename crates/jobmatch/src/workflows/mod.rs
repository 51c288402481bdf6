pub mod applications;
mod identity;
pub mod matching;
mod repository;
pub mod trust;

pub use identity::{ApplicationId, PostingId, UserId};
pub use repository::RepositoryError;
