//! REST API modules.

pub mod actor;
pub mod error;
pub mod health;
pub mod incidents;

pub use error::ApiError;
