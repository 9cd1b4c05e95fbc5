//! OpenAPI document aggregation.

use utoipa::OpenApi;

/// OpenAPI description of the incident manager's HTTP surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::incidents::create,
        crate::api::incidents::list,
        crate::api::incidents::get_by_id,
        crate::api::incidents::update,
        crate::api::incidents::remove,
        crate::api::incidents::add_comment,
        crate::api::health::ready,
        crate::api::health::live,
    ),
    components(schemas(
        crate::api::error::ApiError,
        crate::api::incidents::CreateIncidentBody,
        crate::api::incidents::UpdateIncidentBody,
        crate::api::incidents::AddCommentBody,
        crate::domain::incidents::IncidentView,
        crate::domain::incidents::CommentView,
        crate::domain::incidents::UserView,
        crate::domain::IncidentStatus,
        crate::domain::IncidentPriority,
        crate::domain::ErrorCode,
        crate::domain::FieldError,
    )),
    tags(
        (name = "incidents", description = "Incident lifecycle operations"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;
