//! Insertion-ordered incident collection.
//!
//! The list mirrors server pagination order, so position matters: newly
//! created incidents go to the front, fetched pages append, and updates
//! replace in place without moving. Lookups and replacements are by id.

use std::collections::HashMap;

use uuid::Uuid;

use crate::model::Incident;

/// Incidents in display order with O(1) lookup by id.
#[derive(Debug, Clone, Default)]
pub struct IncidentList {
    order: Vec<Uuid>,
    by_id: HashMap<Uuid, Incident>,
}

impl IncidentList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: Uuid) -> bool {
        self.by_id.contains_key(&id)
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Incident> {
        self.by_id.get(&id)
    }

    /// Insert at the front. An incident already present is replaced in its
    /// current position instead of moving.
    pub fn prepend(&mut self, incident: Incident) {
        let id = incident.id;
        if self.by_id.insert(id, incident).is_none() {
            self.order.insert(0, id);
        }
    }

    /// Append unless the id is already present; a present id is replaced in
    /// place. Page fetches overlap when the list shifted between requests.
    pub fn append(&mut self, incident: Incident) {
        let id = incident.id;
        if self.by_id.insert(id, incident).is_none() {
            self.order.push(id);
        }
    }

    /// Replace an existing incident, keeping its position. Returns false if
    /// the id is not present.
    pub fn replace(&mut self, incident: Incident) -> bool {
        let id = incident.id;
        if self.by_id.contains_key(&id) {
            self.by_id.insert(id, incident);
            true
        } else {
            false
        }
    }

    /// Mutable access to one incident, for in-place edits such as appending
    /// a comment.
    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Incident> {
        self.by_id.get_mut(&id)
    }

    /// Remove by id. Returns false if the id is not present.
    pub fn remove(&mut self, id: Uuid) -> bool {
        if self.by_id.remove(&id).is_some() {
            self.order.retain(|entry| *entry != id);
            true
        } else {
            false
        }
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.order.clear();
        self.by_id.clear();
    }

    /// Incidents in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Incident> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }
}
