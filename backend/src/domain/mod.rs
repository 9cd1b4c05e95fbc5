//! Domain layer: entities, ports, and incident lifecycle handlers.

pub mod error;
pub mod incident;
pub mod incidents;
pub mod patch;
pub mod ports;
pub mod user;

pub use error::{DomainError, ErrorCode, FieldError};
pub use incident::{Comment, Incident, IncidentPriority, IncidentStatus};
pub use patch::Patch;
pub use user::{Actor, User, UserKind};
