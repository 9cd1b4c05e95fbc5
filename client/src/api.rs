//! Transport port for the incident service.
//!
//! The synchronizer talks to this trait, never to HTTP directly; tests
//! substitute scripted implementations to control timing and failures.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use paging::{PageRequest, PagedResult};

use crate::model::{ApiErrorBody, Comment, Incident, IncidentPriority, IncidentStatus};

/// Why a transport call failed.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Request never produced a usable response: DNS, connect, timeout.
    #[error("network error: {0}")]
    Network(String),
    /// The service answered with an error envelope.
    #[error("{}", .0.message)]
    Api(ApiErrorBody),
    /// The response body did not parse as the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Payload for filing a new incident.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncident {
    pub title: String,
    pub description: String,
    pub priority: IncidentPriority,
    pub category: String,
}

/// Assignment change carried by an update.
///
/// `Keep` is omitted from the JSON body entirely; `Clear` serialises as an
/// explicit `null`. The distinction is load-bearing: the service treats an
/// absent field as "no change" and `null` as "unassign".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Assign {
    #[default]
    Keep,
    Clear,
    To(Uuid),
}

impl Assign {
    #[must_use]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            // Keep is handled by skip_serializing_if; serialising it anyway
            // would silently unassign, so fail loudly instead.
            Self::Keep => Err(serde::ser::Error::custom(
                "Assign::Keep must be skipped, not serialised",
            )),
            Self::Clear => serializer.serialize_none(),
            Self::To(id) => serializer.serialize_some(id),
        }
    }
}

/// Payload for patching an incident. Unset fields leave server state alone.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IncidentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<IncidentPriority>,
    #[serde(
        skip_serializing_if = "Assign::is_keep",
        serialize_with = "Assign::serialize"
    )]
    pub assigned_user_id: Assign,
}

/// Typed access to the incident service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IncidentApi: Send + Sync {
    /// Fetch one page of incidents in server order.
    async fn list(&self, page: PageRequest) -> Result<PagedResult<Incident>, TransportError>;

    /// Fetch one incident; `Ok(None)` when the service reports it missing.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Incident>, TransportError>;

    /// File a new incident and return the server-stamped record.
    async fn create(&self, new: NewIncident) -> Result<Incident, TransportError>;

    /// Patch an incident and return its post-update state.
    async fn update(&self, id: Uuid, changes: IncidentChanges)
    -> Result<Incident, TransportError>;

    /// Delete an incident.
    async fn delete(&self, id: Uuid) -> Result<(), TransportError>;

    /// Append a comment and return the stored record.
    async fn add_comment(
        &self,
        incident_id: Uuid,
        content: String,
    ) -> Result<Comment, TransportError>;
}
