//! Paginated incident list synchronizer.
//!
//! Keeps one locally ordered incident list in step with the service:
//! filter changes and refreshes reload from page one, `load_more` walks
//! forward, and successful mutations are reflected in place without a
//! refetch. Responses from a superseded filter are discarded, so the most
//! recently requested filter always wins regardless of arrival order.
//!
//! All methods take `&self`; state lives behind a mutex that is never held
//! across an await, so calls may overlap freely.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;
use uuid::Uuid;

use paging::PageRequest;

use crate::api::{IncidentApi, IncidentChanges, NewIncident, TransportError};
use crate::filter::Filter;
use crate::model::{Comment, Incident};
use crate::ordered::IncidentList;

#[cfg(test)]
mod tests;

/// Where the list stands relative to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing fetched yet.
    Idle,
    /// A full reload is in flight.
    Loading,
    /// Last fetch succeeded.
    Loaded,
    /// Last fetch failed; previously fetched items are retained.
    Failed,
}

/// Outcome of a mutation, in one uniform shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReport<T> {
    pub success: bool,
    pub value: Option<T>,
    pub error: Option<String>,
}

impl<T> MutationReport<T> {
    fn succeeded(value: T) -> Self {
        Self {
            success: true,
            value: Some(value),
            error: None,
        }
    }

    fn failed(error: &TransportError) -> Self {
        Self {
            success: false,
            value: None,
            error: Some(error.to_string()),
        }
    }
}

/// Read-only view of the synchronizer for rendering.
#[derive(Debug, Clone)]
pub struct ListSnapshot {
    /// Fetched incidents that satisfy the active filter, in display order.
    pub items: Vec<Incident>,
    pub phase: Phase,
    pub error: Option<String>,
    /// Whether the service holds pages beyond the last one fetched.
    pub has_more: bool,
    pub filter: Filter,
}

struct SyncState {
    filter: Filter,
    items: IncidentList,
    phase: Phase,
    error: Option<String>,
    /// Highest page fetched for the active filter; zero before the first load.
    current_page: u32,
    total_pages: u32,
    /// Bumped on every reload; in-flight responses from an older generation
    /// are discarded on arrival.
    generation: u64,
    loading_more: bool,
}

/// Synchronizes a local incident list with the service.
pub struct ListSynchronizer {
    api: Arc<dyn IncidentApi>,
    first_page: PageRequest,
    state: Mutex<SyncState>,
}

impl ListSynchronizer {
    /// A zero `page_size` falls back to the default page size.
    #[must_use]
    pub fn new(api: Arc<dyn IncidentApi>, page_size: u32) -> Self {
        let first_page = PageRequest::new(1, page_size).unwrap_or_else(|_| PageRequest::first());
        Self {
            api,
            first_page,
            state: Mutex::new(SyncState {
                filter: Filter::default(),
                items: IncidentList::new(),
                phase: Phase::Idle,
                error: None,
                current_page: 0,
                total_pages: 0,
                generation: 0,
                loading_more: false,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current list state for rendering. Filter evaluation happens here, so
    /// an incident mutated out of the active filter disappears from view
    /// while staying in the fetched set.
    #[must_use]
    pub fn snapshot(&self) -> ListSnapshot {
        let state = self.state();
        ListSnapshot {
            items: state
                .items
                .iter()
                .filter(|incident| state.filter.matches(incident))
                .cloned()
                .collect(),
            phase: state.phase,
            error: state.error.clone(),
            has_more: state.current_page < state.total_pages,
            filter: state.filter.clone(),
        }
    }

    /// Apply a new filter and reload from page one. If another reload is in
    /// flight its response will be discarded when it arrives.
    pub async fn set_filters(&self, filter: Filter) {
        self.reload(Some(filter)).await;
    }

    /// Reload page one under the current filter.
    pub async fn refresh(&self) {
        self.reload(None).await;
    }

    async fn reload(&self, filter: Option<Filter>) {
        let generation = {
            let mut state = self.state();
            state.generation += 1;
            if let Some(filter) = filter {
                state.filter = filter;
            }
            state.phase = Phase::Loading;
            state.generation
        };

        let result = self.api.list(self.first_page).await;

        let mut state = self.state();
        if state.generation != generation {
            debug!(generation, "discarding superseded page");
            return;
        }
        match result {
            Ok(page) => {
                state.items.clear();
                state.current_page = page.current_page;
                state.total_pages = page.total_pages;
                for incident in page.items {
                    state.items.append(incident);
                }
                state.phase = Phase::Loaded;
                state.error = None;
            }
            Err(err) => {
                state.phase = Phase::Failed;
                state.error = Some(err.to_string());
            }
        }
    }

    /// Fetch the next page and append it. A no-op while another fetch is in
    /// flight, before the first load, and once every page has been fetched.
    pub async fn load_more(&self) {
        let (generation, next) = {
            let mut state = self.state();
            if state.phase == Phase::Loading || state.loading_more {
                return;
            }
            if state.current_page == 0 || state.current_page >= state.total_pages {
                return;
            }
            state.loading_more = true;
            let next = PageRequest::new(state.current_page + 1, self.first_page.page_size())
                .unwrap_or_else(|_| self.first_page.next());
            (state.generation, next)
        };

        let result = self.api.list(next).await;

        let mut state = self.state();
        state.loading_more = false;
        if state.generation != generation {
            debug!(generation, "discarding superseded page");
            return;
        }
        match result {
            Ok(page) => {
                state.current_page = page.current_page;
                state.total_pages = page.total_pages;
                for incident in page.items {
                    state.items.append(incident);
                }
                state.phase = Phase::Loaded;
                state.error = None;
            }
            Err(err) => {
                state.phase = Phase::Failed;
                state.error = Some(err.to_string());
            }
        }
    }

    /// File a new incident; on success it is prepended to the list.
    pub async fn create(&self, new: NewIncident) -> MutationReport<Incident> {
        match self.api.create(new).await {
            Ok(incident) => {
                self.state().items.prepend(incident.clone());
                MutationReport::succeeded(incident)
            }
            Err(err) => MutationReport::failed(&err),
        }
    }

    /// Patch an incident; on success the stored copy is replaced in place.
    pub async fn update(&self, id: Uuid, changes: IncidentChanges) -> MutationReport<Incident> {
        match self.api.update(id, changes).await {
            Ok(incident) => {
                self.state().items.replace(incident.clone());
                MutationReport::succeeded(incident)
            }
            Err(err) => MutationReport::failed(&err),
        }
    }

    /// Delete an incident; on success it is dropped from the list.
    pub async fn remove(&self, id: Uuid) -> MutationReport<()> {
        match self.api.delete(id).await {
            Ok(()) => {
                self.state().items.remove(id);
                MutationReport::succeeded(())
            }
            Err(err) => MutationReport::failed(&err),
        }
    }

    /// Append a comment; on success it lands inside the listed incident.
    pub async fn add_comment(&self, incident_id: Uuid, content: String) -> MutationReport<Comment> {
        match self.api.add_comment(incident_id, content).await {
            Ok(comment) => {
                let mut state = self.state();
                if let Some(incident) = state.items.get_mut(incident_id) {
                    incident.comments.push(comment.clone());
                }
                MutationReport::succeeded(comment)
            }
            Err(err) => MutationReport::failed(&err),
        }
    }

    /// Fetch one incident with full detail. A listed copy is refreshed in
    /// place; `Ok(None)` means the service no longer knows the id.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Incident>, TransportError> {
        let fetched = self.api.get_by_id(id).await?;
        if let Some(incident) = &fetched {
            self.state().items.replace(incident.clone());
        }
        Ok(fetched)
    }
}
