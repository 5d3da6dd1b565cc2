//! Row entities for the persistence layer

pub mod account;
pub mod micropost;
pub mod relationship;

pub use account::{Account, AccountChanges, NewAccountRecord};
pub use micropost::{Micropost, NewMicropost};
pub use relationship::Relationship;
