//! Incident lifecycle commands, queries, and their handlers.
//!
//! Each operation is a typed request dispatched through
//! [`crate::dispatch::Dispatcher`]. Handlers open one unit of work per
//! request and call `save_changes` exactly once, after composing every
//! mutation the operation needs.

mod comment;
mod create;
mod delete;
mod get_by_id;
mod list;
mod requests;
mod update;
mod validate;
mod views;


pub use comment::AddCommentHandler;
pub use create::CreateIncidentHandler;
pub use delete::DeleteIncidentHandler;
pub use get_by_id::GetIncidentByIdHandler;
pub use list::ListIncidentsHandler;
pub use requests::{
    AddComment, CreateIncident, DeleteIncident, GetIncidentById, ListIncidents, UpdateIncident,
};
pub use update::UpdateIncidentHandler;
pub use validate::{AddCommentValidator, CreateIncidentValidator};
pub use views::{CommentView, IncidentView, UserView};

use super::DomainError;
use super::ports::{CommitError, RepositoryError};

/// Persistence read/stage failures are not the caller's fault; surface them
/// as retry-eligible conflicts.
pub(crate) fn repository_error(error: RepositoryError) -> DomainError {
    DomainError::conflict(error.to_string())
}

/// Commit failures likewise map to the retry-eligible category.
pub(crate) fn commit_error(error: CommitError) -> DomainError {
    DomainError::conflict(error.to_string())
}
