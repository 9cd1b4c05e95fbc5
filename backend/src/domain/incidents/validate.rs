//! Validators for incident lifecycle requests.
//!
//! Validators run inside the dispatch pipeline's validation stage: every
//! registered validator for a request executes to completion and the field
//! errors concatenate, so a caller sees all violations at once. They may
//! read through a unit of work but never write.

use std::sync::Arc;

use async_trait::async_trait;

use crate::dispatch::Validator;
use crate::domain::FieldError;
use crate::domain::ports::{Repository, UnitOfWork, UnitOfWorkFactory};

use super::requests::{AddComment, CreateIncident};

fn require_text(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, format!("{field} must not be empty")));
    }
}

/// Synchronous field checks for incident creation.
pub struct CreateIncidentValidator;

#[async_trait]
impl Validator<CreateIncident> for CreateIncidentValidator {
    async fn validate(&self, request: &CreateIncident) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "title", &request.title);
        require_text(&mut errors, "description", &request.description);
        require_text(&mut errors, "category", &request.category);
        errors
    }
}

/// Field and cross-reference checks for comment creation.
///
/// The author check reads through a unit of work; it is the asynchronous
/// half of the validation contract.
pub struct AddCommentValidator<F> {
    uow_factory: Arc<F>,
}

impl<F> AddCommentValidator<F> {
    /// Validator over the given unit-of-work factory.
    pub fn new(uow_factory: Arc<F>) -> Self {
        Self { uow_factory }
    }
}

#[async_trait]
impl<F> Validator<AddComment> for AddCommentValidator<F>
where
    F: UnitOfWorkFactory + 'static,
{
    async fn validate(&self, request: &AddComment) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "content", &request.content);

        let uow = self.uow_factory.begin();
        match uow.users().get_by_id(request.actor.id, &[]).await {
            Ok(Some(_)) => {}
            Ok(None) => errors.push(FieldError::new("author", "author user does not exist")),
            // Store trouble is not the caller's input problem; let the
            // handler surface it as a conflict instead of a field error.
            Err(_) => {}
        }
        errors
    }
}
