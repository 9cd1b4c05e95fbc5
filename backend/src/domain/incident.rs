//! Incident aggregate root, its comments, and the status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ports::Entity;
use super::user::User;

/// Lifecycle status of an incident.
///
/// `Resolved` and `Cancelled` are terminal: no update may move an incident
/// out of them. Every incident starts as `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum IncidentStatus {
    Open,
    InProgress,
    Pending,
    Resolved,
    Cancelled,
}

impl IncidentStatus {
    /// Whether the status permits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Cancelled)
    }

    /// Whether the update handler may move an incident from `self` to `next`.
    ///
    /// Re-asserting the current status is always allowed; it is a no-op, not
    /// a transition. Open incidents may move anywhere; in-progress and
    /// pending incidents may move anywhere except back to `Open`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        if matches!(
            (self, next),
            (Self::Open, Self::Open)
                | (Self::InProgress, Self::InProgress)
                | (Self::Pending, Self::Pending)
                | (Self::Resolved, Self::Resolved)
                | (Self::Cancelled, Self::Cancelled)
        ) {
            return true;
        }
        match self {
            Self::Open => true,
            Self::InProgress | Self::Pending => !matches!(next, Self::Open),
            Self::Resolved | Self::Cancelled => false,
        }
    }

    /// Human-readable status label used in error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in progress",
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Urgency classification supplied by the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum IncidentPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// Comment appended to an incident. Append-only; owned by its incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub author: User,
    pub incident_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Entity for Comment {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Incident ticket aggregate root.
///
/// ## Invariants
/// - `updated_at >= created_at`.
/// - `created_by` is set at creation and never changes.
/// - `assigned_to` only changes through an attendant's update.
/// - `status` only changes along [`IncidentStatus::can_transition_to`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incident {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: IncidentStatus,
    pub priority: IncidentPriority,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: User,
    pub assigned_to: Option<User>,
    pub comments: Vec<Comment>,
}

impl Entity for Incident {
    fn id(&self) -> Uuid {
        self.id
    }
}
