//! Add-comment command handler.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::instrument;
use uuid::Uuid;

use crate::dispatch::Handler;
use crate::domain::DomainError;
use crate::domain::incident::Comment;
use crate::domain::ports::{Repository, UnitOfWork, UnitOfWorkFactory};

use super::requests::AddComment;
use super::views::CommentView;
use super::{commit_error, repository_error};

/// Appends a comment to an incident's collection.
///
/// Stamps the author from the actor and `created_at` from the clock. Never
/// touches the incident's status or `updated_at`.
pub struct AddCommentHandler<F> {
    uow_factory: Arc<F>,
    clock: Arc<dyn Clock>,
}

impl<F> AddCommentHandler<F> {
    /// Handler over the given unit-of-work factory and clock.
    pub fn new(uow_factory: Arc<F>, clock: Arc<dyn Clock>) -> Self {
        Self { uow_factory, clock }
    }
}

#[async_trait]
impl<F> Handler<AddComment> for AddCommentHandler<F>
where
    F: UnitOfWorkFactory + 'static,
{
    #[instrument(skip_all, fields(incident = %request.incident_id, actor = %request.actor.id))]
    async fn handle(&self, request: AddComment) -> Result<CommentView, DomainError> {
        let uow = self.uow_factory.begin();

        let incident = uow
            .incidents()
            .get_by_id(request.incident_id, &[])
            .await
            .map_err(repository_error)?
            .ok_or_else(|| {
                DomainError::not_found(format!("incident {} not found", request.incident_id))
            })?;

        let author = uow
            .users()
            .get_by_id(request.actor.id, &[])
            .await
            .map_err(repository_error)?
            .ok_or_else(|| DomainError::not_found(format!("user {} not found", request.actor.id)))?;

        let comment = Comment {
            id: Uuid::new_v4(),
            content: request.content,
            author,
            incident_id: incident.id,
            created_at: self.clock.utc(),
        };

        let stored = uow
            .comments()
            .add(comment)
            .await
            .map_err(repository_error)?;
        uow.save_changes().await.map_err(commit_error)?;

        Ok(CommentView::from_entity(&stored))
    }
}
