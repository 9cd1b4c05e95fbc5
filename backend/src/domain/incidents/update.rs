//! Update-incident command handler: patch semantics, the status state
//! machine, and the attendant-only authorization guard.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::instrument;

use crate::dispatch::Handler;
use crate::domain::patch::Patch;
use crate::domain::ports::{Repository, UnitOfWork, UnitOfWorkFactory};
use crate::domain::{DomainError, FieldError};

use super::requests::UpdateIncident;
use super::views::IncidentView;
use super::{commit_error, repository_error};

/// Applies a patch to an existing incident.
///
/// Field semantics follow the original system: a text field that is absent
/// *or* blank leaves the stored value alone, while `assigned_user_id`
/// distinguishes an omitted field from an explicit null that unassigns.
/// That asymmetry is a documented compatibility quirk, likely a latent bug
/// in the original rather than intended behaviour.
pub struct UpdateIncidentHandler<F> {
    uow_factory: Arc<F>,
    clock: Arc<dyn Clock>,
}

impl<F> UpdateIncidentHandler<F> {
    /// Handler over the given unit-of-work factory and clock.
    pub fn new(uow_factory: Arc<F>, clock: Arc<dyn Clock>) -> Self {
        Self { uow_factory, clock }
    }
}

/// Blank text means "no change" for patch text fields.
fn apply_text(target: &mut String, value: Option<String>) {
    if let Some(text) = value
        && !text.trim().is_empty()
    {
        *target = text;
    }
}

#[async_trait]
impl<F> Handler<UpdateIncident> for UpdateIncidentHandler<F>
where
    F: UnitOfWorkFactory + 'static,
{
    #[instrument(skip_all, fields(incident = %request.id, actor = %request.actor.id))]
    async fn handle(&self, request: UpdateIncident) -> Result<IncidentView, DomainError> {
        let uow = self.uow_factory.begin();

        let mut incident = uow
            .incidents()
            .get_by_id(request.id, &[])
            .await
            .map_err(repository_error)?
            .ok_or_else(|| DomainError::not_found(format!("incident {} not found", request.id)))?;

        // Authorization is enforced here, not just in presentation: a
        // requester touching status or assignment is rejected before any
        // mutation is staged.
        let wants_triage = request.status.is_some() || !request.assigned_user_id.is_missing();
        if wants_triage && !request.actor.kind.is_attendant() {
            return Err(DomainError::not_authorized(
                "only attendants may change status or assignment",
            ));
        }

        if let Some(next) = request.status {
            if !incident.status.can_transition_to(next) {
                return Err(DomainError::validation(vec![FieldError::new(
                    "status",
                    format!(
                        "cannot transition from {} to {}",
                        incident.status.label(),
                        next.label()
                    ),
                )]));
            }
            incident.status = next;
        }

        match request.assigned_user_id {
            Patch::Missing => {}
            Patch::Null => incident.assigned_to = None,
            Patch::Value(user_id) => {
                let assignee = uow
                    .users()
                    .get_by_id(user_id, &[])
                    .await
                    .map_err(repository_error)?
                    .ok_or_else(|| DomainError::not_found(format!("user {user_id} not found")))?;
                incident.assigned_to = Some(assignee);
            }
        }

        apply_text(&mut incident.title, request.title);
        apply_text(&mut incident.description, request.description);
        if let Some(priority) = request.priority {
            incident.priority = priority;
        }

        // `updated_at >= created_at` must hold even under a skewed clock.
        incident.updated_at = self.clock.utc().max(incident.created_at);

        uow.incidents()
            .update(incident.clone())
            .await
            .map_err(repository_error)?;
        uow.save_changes().await.map_err(commit_error)?;

        Ok(IncidentView::from_entity(&incident))
    }
}
