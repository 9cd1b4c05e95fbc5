//! Get-incident-by-id query handler.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::dispatch::Handler;
use crate::domain::DomainError;
use crate::domain::ports::{Relation, Repository, UnitOfWork, UnitOfWorkFactory};

use super::repository_error;
use super::requests::GetIncidentById;
use super::views::IncidentView;

/// Read-only lookup of one incident with its related users and comments.
pub struct GetIncidentByIdHandler<F> {
    uow_factory: Arc<F>,
}

impl<F> GetIncidentByIdHandler<F> {
    /// Handler over the given unit-of-work factory.
    pub fn new(uow_factory: Arc<F>) -> Self {
        Self { uow_factory }
    }
}

#[async_trait]
impl<F> Handler<GetIncidentById> for GetIncidentByIdHandler<F>
where
    F: UnitOfWorkFactory + 'static,
{
    #[instrument(skip_all, fields(incident = %request.id))]
    async fn handle(&self, request: GetIncidentById) -> Result<IncidentView, DomainError> {
        let uow = self.uow_factory.begin();

        let incident = uow
            .incidents()
            .get_by_id(
                request.id,
                &[Relation::CreatedBy, Relation::AssignedTo, Relation::Comments],
            )
            .await
            .map_err(repository_error)?
            .ok_or_else(|| DomainError::not_found(format!("incident {} not found", request.id)))?;

        Ok(IncidentView::from_entity(&incident))
    }
}
