//! Incident API handlers.
//!
//! Thin translation layer: each handler maps its HTTP shape onto a typed
//! request, dispatches it, and serialises the result. Server-stamped fields
//! (id, timestamps, creator, initial status) are absent from the request
//! DTOs, so client-supplied values for them are ignored by construction.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use paging::{DEFAULT_PAGE_SIZE, PageRequest, PagedResult};

use crate::dispatch::Dispatcher;
use crate::domain::incident::{IncidentPriority, IncidentStatus};
use crate::domain::incidents::{
    AddComment, CommentView, CreateIncident, DeleteIncident, GetIncidentById, IncidentView,
    ListIncidents, UpdateIncident,
};
use crate::domain::patch::Patch;
use crate::domain::user::Actor;
use crate::domain::{DomainError, FieldError};

use super::error::ApiError;

/// Body for filing an incident.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncidentBody {
    pub title: String,
    pub description: String,
    pub priority: IncidentPriority,
    pub category: String,
}

/// Body for patching an incident. Absent fields leave stored values alone;
/// `assignedUserId: null` explicitly unassigns.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIncidentBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<IncidentStatus>,
    pub priority: Option<IncidentPriority>,
    #[serde(default, deserialize_with = "Patch::deserialize")]
    #[schema(value_type = Option<Uuid>)]
    pub assigned_user_id: Patch<Uuid>,
}

/// Body for appending a comment.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentBody {
    pub content: String,
}

/// Query string for the paged listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_page_number")]
    pub page_number: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

const fn default_page_number() -> u32 {
    1
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn page_request(query: &ListQuery) -> Result<PageRequest, ApiError> {
    PageRequest::new(query.page_number, query.page_size).map_err(|err| {
        ApiError::from(DomainError::validation(vec![FieldError::new(
            "pageNumber",
            err.to_string(),
        )]))
    })
}

/// File a new incident.
#[utoipa::path(
    post,
    path = "/api/incidents",
    request_body = CreateIncidentBody,
    responses(
        (status = 201, description = "Incident created", body = IncidentView),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 403, description = "Missing actor identity", body = ApiError)
    ),
    tags = ["incidents"],
    operation_id = "createIncident"
)]
#[post("/api/incidents")]
pub async fn create(
    actor: Actor,
    body: web::Json<CreateIncidentBody>,
    dispatcher: web::Data<Dispatcher>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let view = dispatcher
        .dispatch(CreateIncident {
            actor,
            title: body.title,
            description: body.description,
            priority: body.priority,
            category: body.category,
        })
        .await?;
    Ok(HttpResponse::Created().json(view))
}

/// List incidents, one page at a time.
#[utoipa::path(
    get,
    path = "/api/incidents",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of incidents", body = PagedResult<IncidentView>),
        (status = 400, description = "Invalid paging parameters", body = ApiError)
    ),
    tags = ["incidents"],
    operation_id = "listIncidents"
)]
#[get("/api/incidents")]
pub async fn list(
    query: web::Query<ListQuery>,
    dispatcher: web::Data<Dispatcher>,
) -> Result<web::Json<PagedResult<IncidentView>>, ApiError> {
    let page = page_request(&query)?;
    let result = dispatcher.dispatch(ListIncidents { page }).await?;
    Ok(web::Json(result))
}

/// Fetch one incident with creator, assignee, and comments.
#[utoipa::path(
    get,
    path = "/api/incidents/{id}",
    params(("id" = Uuid, Path, description = "Incident id")),
    responses(
        (status = 200, description = "Incident", body = IncidentView),
        (status = 404, description = "Unknown incident", body = ApiError)
    ),
    tags = ["incidents"],
    operation_id = "getIncidentById"
)]
#[get("/api/incidents/{id}")]
pub async fn get_by_id(
    id: web::Path<Uuid>,
    dispatcher: web::Data<Dispatcher>,
) -> Result<web::Json<IncidentView>, ApiError> {
    let view = dispatcher
        .dispatch(GetIncidentById { id: id.into_inner() })
        .await?;
    Ok(web::Json(view))
}

/// Patch an incident.
#[utoipa::path(
    put,
    path = "/api/incidents/{id}",
    params(("id" = Uuid, Path, description = "Incident id")),
    request_body = UpdateIncidentBody,
    responses(
        (status = 200, description = "Updated incident", body = IncidentView),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 403, description = "Actor lacks the triage capability", body = ApiError),
        (status = 404, description = "Unknown incident or assignee", body = ApiError)
    ),
    tags = ["incidents"],
    operation_id = "updateIncident"
)]
#[put("/api/incidents/{id}")]
pub async fn update(
    actor: Actor,
    id: web::Path<Uuid>,
    body: web::Json<UpdateIncidentBody>,
    dispatcher: web::Data<Dispatcher>,
) -> Result<web::Json<IncidentView>, ApiError> {
    let body = body.into_inner();
    let view = dispatcher
        .dispatch(UpdateIncident {
            actor,
            id: id.into_inner(),
            title: body.title,
            description: body.description,
            status: body.status,
            priority: body.priority,
            assigned_user_id: body.assigned_user_id,
        })
        .await?;
    Ok(web::Json(view))
}

/// Delete an incident.
#[utoipa::path(
    delete,
    path = "/api/incidents/{id}",
    params(("id" = Uuid, Path, description = "Incident id")),
    responses(
        (status = 204, description = "Incident removed"),
        (status = 404, description = "Unknown incident", body = ApiError)
    ),
    tags = ["incidents"],
    operation_id = "deleteIncident"
)]
#[delete("/api/incidents/{id}")]
pub async fn remove(
    actor: Actor,
    id: web::Path<Uuid>,
    dispatcher: web::Data<Dispatcher>,
) -> Result<HttpResponse, ApiError> {
    dispatcher
        .dispatch(DeleteIncident {
            actor,
            id: id.into_inner(),
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Append a comment to an incident.
#[utoipa::path(
    post,
    path = "/api/incidents/{id}/comments",
    params(("id" = Uuid, Path, description = "Incident id")),
    request_body = AddCommentBody,
    responses(
        (status = 201, description = "Comment appended", body = CommentView),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Unknown incident", body = ApiError)
    ),
    tags = ["incidents"],
    operation_id = "addComment"
)]
#[post("/api/incidents/{id}/comments")]
pub async fn add_comment(
    actor: Actor,
    id: web::Path<Uuid>,
    body: web::Json<AddCommentBody>,
    dispatcher: web::Data<Dispatcher>,
) -> Result<HttpResponse, ApiError> {
    let view = dispatcher
        .dispatch(AddComment {
            actor,
            incident_id: id.into_inner(),
            content: body.into_inner().content,
        })
        .await?;
    Ok(HttpResponse::Created().json(view))
}
