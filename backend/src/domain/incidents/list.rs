//! List-incidents query handler.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use paging::PagedResult;

use crate::dispatch::Handler;
use crate::domain::DomainError;
use crate::domain::ports::{Relation, Repository, UnitOfWork, UnitOfWorkFactory};

use super::repository_error;
use super::requests::ListIncidents;
use super::views::IncidentView;

/// Read-only paged listing, projected at the data-access boundary so the
/// store never materialises full aggregates just to produce a page of DTOs.
pub struct ListIncidentsHandler<F> {
    uow_factory: Arc<F>,
}

impl<F> ListIncidentsHandler<F> {
    /// Handler over the given unit-of-work factory.
    pub fn new(uow_factory: Arc<F>) -> Self {
        Self { uow_factory }
    }
}

#[async_trait]
impl<F> Handler<ListIncidents> for ListIncidentsHandler<F>
where
    F: UnitOfWorkFactory + 'static,
{
    #[instrument(skip_all, fields(page = request.page.page_number(), size = request.page.page_size()))]
    async fn handle(&self, request: ListIncidents) -> Result<PagedResult<IncidentView>, DomainError> {
        let uow = self.uow_factory.begin();

        let items = uow
            .incidents()
            .get_all_projected_paged(
                IncidentView::from_entity,
                request.page,
                &[Relation::CreatedBy, Relation::AssignedTo],
            )
            .await
            .map_err(repository_error)?;
        let total_count = uow.incidents().count().await.map_err(repository_error)?;

        Ok(PagedResult::new(items, request.page, total_count))
    }
}
