//! Shared types and result types for the persistence layer

pub mod errors;

pub use errors::{AccountError, DatabaseError, FieldError, FollowError, MicropostError};

// Common result types
pub type DatabaseResult<T> = Result<T, DatabaseError>;
pub type AccountResult<T> = Result<T, AccountError>;
pub type FollowResult<T> = Result<T, FollowError>;
pub type MicropostResult<T> = Result<T, MicropostError>;
