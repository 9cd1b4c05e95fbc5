//! Delete-incident command handler.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::dispatch::Handler;
use crate::domain::DomainError;
use crate::domain::ports::{Repository, UnitOfWork, UnitOfWorkFactory};

use super::requests::DeleteIncident;
use super::{commit_error, repository_error};

/// Removes an incident. Repeat deletes of the same id report NotFound
/// rather than succeeding silently.
pub struct DeleteIncidentHandler<F> {
    uow_factory: Arc<F>,
}

impl<F> DeleteIncidentHandler<F> {
    /// Handler over the given unit-of-work factory.
    pub fn new(uow_factory: Arc<F>) -> Self {
        Self { uow_factory }
    }
}

#[async_trait]
impl<F> Handler<DeleteIncident> for DeleteIncidentHandler<F>
where
    F: UnitOfWorkFactory + 'static,
{
    #[instrument(skip_all, fields(incident = %request.id))]
    async fn handle(&self, request: DeleteIncident) -> Result<(), DomainError> {
        let uow = self.uow_factory.begin();

        let incident = uow
            .incidents()
            .get_by_id(request.id, &[])
            .await
            .map_err(repository_error)?
            .ok_or_else(|| DomainError::not_found(format!("incident {} not found", request.id)))?;

        uow.incidents()
            .remove(&incident)
            .await
            .map_err(repository_error)?;
        uow.save_changes().await.map_err(commit_error)?;
        Ok(())
    }
}
