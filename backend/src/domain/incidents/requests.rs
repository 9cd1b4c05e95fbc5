//! Request DTOs for the incident lifecycle.
//!
//! The actor field on mutating requests is stamped from the identity
//! collaborator by the transport layer, never taken from the request body.

use uuid::Uuid;

use paging::{PageRequest, PagedResult};

use crate::dispatch::Request;
use crate::domain::incident::{IncidentPriority, IncidentStatus};
use crate::domain::patch::Patch;
use crate::domain::user::Actor;

use super::views::{CommentView, IncidentView};

/// File a new incident. Id, timestamps, status, and creator are
/// server-stamped; any client-supplied values for them are ignored upstream.
#[derive(Debug, Clone)]
pub struct CreateIncident {
    pub actor: Actor,
    pub title: String,
    pub description: String,
    pub priority: IncidentPriority,
    pub category: String,
}

impl Request for CreateIncident {
    type Response = IncidentView;
    const NAME: &'static str = "incidents.create";
}

/// Patch an existing incident. Every field is independently optional.
///
/// Text fields treat both "absent" and "blank" as no change; the nullable
/// `assigned_user_id` distinguishes an explicit null ("unassign") from an
/// omitted field. The asymmetry is deliberate; see the update handler.
#[derive(Debug, Clone)]
pub struct UpdateIncident {
    pub actor: Actor,
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<IncidentStatus>,
    pub priority: Option<IncidentPriority>,
    pub assigned_user_id: Patch<Uuid>,
}

impl Request for UpdateIncident {
    type Response = IncidentView;
    const NAME: &'static str = "incidents.update";
}

/// Remove an incident. Deleting an already-deleted incident is NotFound,
/// not success.
#[derive(Debug, Clone)]
pub struct DeleteIncident {
    pub actor: Actor,
    pub id: Uuid,
}

impl Request for DeleteIncident {
    type Response = ();
    const NAME: &'static str = "incidents.delete";
}

/// Fetch one incident with creator, assignee, and comments.
#[derive(Debug, Clone)]
pub struct GetIncidentById {
    pub id: Uuid,
}

impl Request for GetIncidentById {
    type Response = IncidentView;
    const NAME: &'static str = "incidents.get_by_id";
}

/// Fetch one page of incidents, projected at the data-access boundary.
#[derive(Debug, Clone)]
pub struct ListIncidents {
    pub page: PageRequest,
}

impl Request for ListIncidents {
    type Response = PagedResult<IncidentView>;
    const NAME: &'static str = "incidents.list";
}

/// Append a comment to an incident. Author and timestamp are server-stamped.
#[derive(Debug, Clone)]
pub struct AddComment {
    pub actor: Actor,
    pub incident_id: Uuid,
    pub content: String,
}

impl Request for AddComment {
    type Response = CommentView;
    const NAME: &'static str = "incidents.add_comment";
}
