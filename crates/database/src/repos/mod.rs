//! Database repository implementations

pub mod account_repository;
pub mod micropost_repository;
pub mod relationship_repository;

pub use account_repository::AccountRepository;
pub use micropost_repository::MicropostRepository;
pub use relationship_repository::RelationshipRepository;
