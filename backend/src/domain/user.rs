//! User references and the per-request actor.
//!
//! Identity issuance happens outside this crate; the domain only consumes a
//! resolved `{id, kind}` pair and the immutable user value it refers to.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ports::Entity;

/// Capability class fixed per user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum UserKind {
    /// Files incidents and comments on them.
    Requester,
    /// Triages incidents: may change status and assignment.
    Attendant,
}

impl UserKind {
    /// Whether this kind carries the triage capability.
    #[must_use]
    pub const fn is_attendant(self) -> bool {
        matches!(self, Self::Attendant)
    }
}

/// Immutable user value consumed by the incident aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub kind: UserKind,
    pub avatar: Option<String>,
}

impl Entity for User {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// The authenticated caller of one inbound request.
///
/// Resolved by the identity collaborator before dispatch; the domain treats
/// it as already authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub kind: UserKind,
}

impl Actor {
    /// Actor acting on behalf of the given user record.
    #[must_use]
    pub const fn of(user: &User) -> Self {
        Self {
            id: user.id,
            kind: user.kind,
        }
    }
}
