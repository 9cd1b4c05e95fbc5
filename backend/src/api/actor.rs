//! Per-request actor resolution.
//!
//! Token issuance and verification belong to the identity collaborator in
//! front of this service. By the time a request reaches these handlers the
//! gateway has resolved the caller into two trusted headers; this extractor
//! only consumes `{id, kind}`.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{Ready, err, ok};
use uuid::Uuid;

use crate::domain::user::{Actor, UserKind};
use crate::domain::DomainError;

use super::error::ApiError;

/// Header carrying the authenticated user's id.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the authenticated user's kind (`requester`/`attendant`).
pub const ACTOR_KIND_HEADER: &str = "x-actor-kind";

fn parse_actor(req: &HttpRequest) -> Result<Actor, ApiError> {
    let unauthorized = || ApiError::from(DomainError::not_authorized("missing actor identity"));

    let id = req
        .headers()
        .get(ACTOR_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or_else(unauthorized)?;

    let kind = match req
        .headers()
        .get(ACTOR_KIND_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some("requester") => UserKind::Requester,
        Some("attendant") => UserKind::Attendant,
        _ => return Err(unauthorized()),
    };

    Ok(Actor { id, kind })
}

impl FromRequest for Actor {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match parse_actor(req) {
            Ok(actor) => ok(actor),
            Err(error) => err(error),
        }
    }
}
