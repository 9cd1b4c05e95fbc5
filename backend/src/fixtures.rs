//! Shared test fixtures for entities and stores.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::incident::{Incident, IncidentPriority, IncidentStatus};
use crate::domain::user::{User, UserKind};
use crate::outbound::memory::{MemoryStore, MemoryUnitOfWorkFactory};

/// Fixed timestamp so assertions stay deterministic.
pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("valid timestamp")
}

pub fn requester(name: &str) -> User {
    User {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        email: format!("{}@example.test", name.to_lowercase()),
        kind: UserKind::Requester,
        avatar: None,
    }
}

pub fn attendant(name: &str) -> User {
    User {
        kind: UserKind::Attendant,
        ..requester(name)
    }
}

pub fn incident(created_by: &User, title: &str) -> Incident {
    Incident {
        id: Uuid::new_v4(),
        title: title.to_owned(),
        description: format!("{title} description"),
        status: IncidentStatus::Open,
        priority: IncidentPriority::Medium,
        category: "Hardware".to_owned(),
        created_at: fixture_time(),
        updated_at: fixture_time(),
        created_by: created_by.clone(),
        assigned_to: None,
        comments: Vec::new(),
    }
}

/// Factory over a store seeded with the given users.
pub fn seeded_factory(users: &[User]) -> MemoryUnitOfWorkFactory {
    let store = MemoryStore::new();
    store.seed_users(users.iter().cloned());
    MemoryUnitOfWorkFactory::new(store)
}
