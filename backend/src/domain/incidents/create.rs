//! Create-incident command handler.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::instrument;
use uuid::Uuid;

use crate::dispatch::Handler;
use crate::domain::DomainError;
use crate::domain::incident::{Incident, IncidentStatus};
use crate::domain::ports::{Repository, UnitOfWork, UnitOfWorkFactory};

use super::requests::CreateIncident;
use super::views::IncidentView;
use super::{commit_error, repository_error};

/// Files a new incident on behalf of the authenticated actor.
///
/// The server stamps id, both timestamps, `created_by`, and forces the
/// initial status to `Open` regardless of what the caller sent.
pub struct CreateIncidentHandler<F> {
    uow_factory: Arc<F>,
    clock: Arc<dyn Clock>,
}

impl<F> CreateIncidentHandler<F> {
    /// Handler over the given unit-of-work factory and clock.
    pub fn new(uow_factory: Arc<F>, clock: Arc<dyn Clock>) -> Self {
        Self { uow_factory, clock }
    }
}

#[async_trait]
impl<F> Handler<CreateIncident> for CreateIncidentHandler<F>
where
    F: UnitOfWorkFactory + 'static,
{
    #[instrument(skip_all, fields(actor = %request.actor.id))]
    async fn handle(&self, request: CreateIncident) -> Result<IncidentView, DomainError> {
        let uow = self.uow_factory.begin();

        let creator = uow
            .users()
            .get_by_id(request.actor.id, &[])
            .await
            .map_err(repository_error)?
            .ok_or_else(|| DomainError::not_found(format!("user {} not found", request.actor.id)))?;

        let now = self.clock.utc();
        let incident = Incident {
            id: Uuid::new_v4(),
            title: request.title,
            description: request.description,
            status: IncidentStatus::Open,
            priority: request.priority,
            category: request.category,
            created_at: now,
            updated_at: now,
            created_by: creator,
            assigned_to: None,
            comments: Vec::new(),
        };

        let stored = uow
            .incidents()
            .add(incident)
            .await
            .map_err(repository_error)?;
        uow.save_changes().await.map_err(commit_error)?;

        Ok(IncidentView::from_entity(&stored))
    }
}
