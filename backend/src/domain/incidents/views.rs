//! Response views and their entity mappings.
//!
//! Each mapping is an explicit, exhaustive field list; nothing is inferred.
//! Transport adapters serialize these shapes verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::incident::{Comment, Incident, IncidentPriority, IncidentStatus};
use crate::domain::user::{User, UserKind};

/// User reference as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub kind: UserKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserView {
    /// Entity → view mapping: id, name, email, kind, avatar.
    #[must_use]
    pub fn from_entity(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            kind: user.kind,
            avatar: user.avatar.clone(),
        }
    }
}

/// Comment as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub author: UserView,
    pub incident_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl CommentView {
    /// Entity → view mapping: id, content, author, incident id, created at.
    #[must_use]
    pub fn from_entity(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content.clone(),
            author: UserView::from_entity(&comment.author),
            incident_id: comment.incident_id,
            created_at: comment.created_at,
        }
    }
}

/// Incident as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: IncidentStatus,
    pub priority: IncidentPriority,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: UserView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserView>,
    #[serde(default)]
    pub comments: Vec<CommentView>,
}

impl IncidentView {
    /// Entity → view mapping, exhaustive over every aggregate field.
    ///
    /// Plain `fn` so repositories can take it as the projection applied at
    /// the data-access boundary.
    #[must_use]
    pub fn from_entity(incident: &Incident) -> Self {
        Self {
            id: incident.id,
            title: incident.title.clone(),
            description: incident.description.clone(),
            status: incident.status,
            priority: incident.priority,
            category: incident.category.clone(),
            created_at: incident.created_at,
            updated_at: incident.updated_at,
            created_by: UserView::from_entity(&incident.created_by),
            assigned_to: incident.assigned_to.as_ref().map(UserView::from_entity),
            comments: incident.comments.iter().map(CommentView::from_entity).collect(),
        }
    }
}
