//! Server composition: pipeline wiring and runtime configuration.

pub mod config;

use std::future::Future;
use std::sync::Arc;

use mockable::Clock;
use tracing::warn;

use crate::api::health::HealthState;
use crate::dispatch::{Dispatcher, RegistryError};
use crate::domain::incidents::{
    AddComment, AddCommentHandler, AddCommentValidator, CreateIncident, CreateIncidentHandler,
    CreateIncidentValidator, DeleteIncident, DeleteIncidentHandler, GetIncidentById,
    GetIncidentByIdHandler, ListIncidents, ListIncidentsHandler, UpdateIncident,
    UpdateIncidentHandler,
};
use crate::domain::ports::UnitOfWorkFactory;

/// Wire the full dispatch pipeline over the given persistence factory.
///
/// Every lifecycle request type is marked required, so a missing
/// registration fails here at startup rather than on the first matching
/// request.
pub fn build_dispatcher<F>(
    uow_factory: Arc<F>,
    clock: Arc<dyn Clock>,
) -> Result<Dispatcher, RegistryError>
where
    F: UnitOfWorkFactory + 'static,
{
    Dispatcher::builder()
        .handler::<CreateIncident>(CreateIncidentHandler::new(uow_factory.clone(), clock.clone()))
        .handler::<UpdateIncident>(UpdateIncidentHandler::new(uow_factory.clone(), clock.clone()))
        .handler::<DeleteIncident>(DeleteIncidentHandler::new(uow_factory.clone()))
        .handler::<GetIncidentById>(GetIncidentByIdHandler::new(uow_factory.clone()))
        .handler::<ListIncidents>(ListIncidentsHandler::new(uow_factory.clone()))
        .handler::<AddComment>(AddCommentHandler::new(uow_factory.clone(), clock))
        .validator::<CreateIncident>(CreateIncidentValidator)
        .validator::<AddComment>(AddCommentValidator::new(uow_factory))
        .require::<CreateIncident>()
        .require::<UpdateIncident>()
        .require::<DeleteIncident>()
        .require::<GetIncidentById>()
        .require::<ListIncidents>()
        .require::<AddComment>()
        .build()
}

/// Fail liveness probes once the shutdown signal fires, so orchestrators
/// stop routing traffic while in-flight requests drain.
pub async fn drain_on_shutdown(
    signal: impl Future<Output = std::io::Result<()>>,
    health: &HealthState,
) {
    match signal.await {
        Ok(()) => health.mark_unhealthy(),
        Err(e) => warn!(error = %e, "shutdown signal listener failed"),
    }
}
