//! In-memory persistence adapter.
//!
//! Implements the repository and unit-of-work ports over a shared
//! process-local store. Mutations stage inside the unit of work and apply
//! under a single store lock at `save_changes`: the staged batch is replayed
//! against a scratch copy of the state first, so a failing operation leaves
//! the committed state untouched. Reads observe committed state; staged
//! writes become visible only after commit.
//!
//! Comments are owned by their incident: the comment repository stages
//! against the comment collection embedded in the owning aggregate.

use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use paging::PageRequest;

use crate::domain::incident::{Comment, Incident};
use crate::domain::ports::{
    CommitError, Entity, Relation, Repository, RepositoryError, UnitOfWork, UnitOfWorkFactory,
    UserRepository,
};
use crate::domain::user::User;


/// Committed store state. Vectors keep insertion order, which is the stable
/// collection order paged reads expose.
#[derive(Debug, Default, Clone)]
struct StoreState {
    incidents: Vec<Incident>,
    users: Vec<User>,
}

/// Shared in-memory store behind every unit of work.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert users directly, bypassing unit-of-work staging. Wiring and
    /// tests use this to provision the identity collaborator's view.
    pub fn seed_users(&self, users: impl IntoIterator<Item = User>) {
        if let Ok(mut state) = self.state.write() {
            state.users.extend(users);
        }
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T, RepositoryError> {
        self.state
            .read()
            .map(|state| f(&state))
            .map_err(|_| RepositoryError::connection("store lock poisoned"))
    }
}

/// One staged mutation awaiting commit.
#[derive(Debug, Clone)]
enum StagedOp {
    AddIncident(Incident),
    UpdateIncident(Incident),
    RemoveIncident(Uuid),
    AddUser(User),
    UpdateUser(User),
    RemoveUser(Uuid),
    AddComment(Comment),
    UpdateComment(Comment),
    RemoveComment(Uuid),
}

impl StagedOp {
    /// Replay this operation against a scratch copy of the state.
    fn apply(self, state: &mut StoreState) -> Result<(), CommitError> {
        match self {
            Self::AddIncident(incident) => {
                state.incidents.push(incident);
                Ok(())
            }
            Self::UpdateIncident(incident) => {
                let slot = state
                    .incidents
                    .iter_mut()
                    .find(|stored| stored.id == incident.id)
                    .ok_or_else(|| {
                        CommitError::transient(format!("incident {} vanished before commit", incident.id))
                    })?;
                *slot = incident;
                Ok(())
            }
            Self::RemoveIncident(id) => {
                let before = state.incidents.len();
                state.incidents.retain(|stored| stored.id != id);
                if state.incidents.len() == before {
                    return Err(CommitError::transient(format!(
                        "incident {id} vanished before commit"
                    )));
                }
                Ok(())
            }
            Self::AddUser(user) => {
                state.users.push(user);
                Ok(())
            }
            Self::UpdateUser(user) => {
                let slot = state
                    .users
                    .iter_mut()
                    .find(|stored| stored.id == user.id)
                    .ok_or_else(|| {
                        CommitError::transient(format!("user {} vanished before commit", user.id))
                    })?;
                *slot = user;
                Ok(())
            }
            Self::RemoveUser(id) => {
                let before = state.users.len();
                state.users.retain(|stored| stored.id != id);
                if state.users.len() == before {
                    return Err(CommitError::transient(format!("user {id} vanished before commit")));
                }
                Ok(())
            }
            Self::AddComment(comment) => {
                let incident = state
                    .incidents
                    .iter_mut()
                    .find(|stored| stored.id == comment.incident_id)
                    .ok_or_else(|| {
                        CommitError::transient(format!(
                            "incident {} vanished before commit",
                            comment.incident_id
                        ))
                    })?;
                incident.comments.push(comment);
                Ok(())
            }
            Self::UpdateComment(comment) => {
                let incident = state
                    .incidents
                    .iter_mut()
                    .find(|stored| stored.id == comment.incident_id)
                    .ok_or_else(|| {
                        CommitError::transient(format!(
                            "incident {} vanished before commit",
                            comment.incident_id
                        ))
                    })?;
                let slot = incident
                    .comments
                    .iter_mut()
                    .find(|stored| stored.id == comment.id)
                    .ok_or_else(|| {
                        CommitError::transient(format!("comment {} vanished before commit", comment.id))
                    })?;
                *slot = comment;
                Ok(())
            }
            Self::RemoveComment(id) => {
                for incident in &mut state.incidents {
                    let before = incident.comments.len();
                    incident.comments.retain(|stored| stored.id != id);
                    if incident.comments.len() != before {
                        return Ok(());
                    }
                }
                Err(CommitError::transient(format!(
                    "comment {id} vanished before commit"
                )))
            }
        }
    }
}

/// State shared between a unit of work and its repositories.
#[derive(Debug)]
struct UowShared {
    store: MemoryStore,
    staged: Mutex<Vec<StagedOp>>,
}

impl UowShared {
    fn stage(&self, op: StagedOp) -> Result<(), RepositoryError> {
        self.staged
            .lock()
            .map(|mut ops| ops.push(op))
            .map_err(|_| RepositoryError::query("staging buffer poisoned"))
    }
}

fn page_slice<E: Clone>(items: &[E], page: PageRequest) -> Vec<E> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    items
        .iter()
        .skip(offset)
        .take(page.page_size() as usize)
        .cloned()
        .collect()
}

/// Incident repository over the shared store.
#[derive(Debug, Clone)]
pub struct MemoryIncidentRepository {
    shared: Arc<UowShared>,
}

#[async_trait]
impl Repository<Incident> for MemoryIncidentRepository {
    async fn get_by_id(
        &self,
        id: Uuid,
        _eager: &[Relation],
    ) -> Result<Option<Incident>, RepositoryError> {
        self.shared
            .store
            .read(|state| state.incidents.iter().find(|i| i.id == id).cloned())
    }

    async fn get_all_paged(
        &self,
        page: PageRequest,
        _eager: &[Relation],
    ) -> Result<Vec<Incident>, RepositoryError> {
        self.shared
            .store
            .read(|state| page_slice(&state.incidents, page))
    }

    async fn get_all_projected_paged<P>(
        &self,
        projection: for<'a> fn(&'a Incident) -> P,
        page: PageRequest,
        _eager: &[Relation],
    ) -> Result<Vec<P>, RepositoryError>
    where
        P: Send + 'static,
    {
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        self.shared.store.read(|state| {
            state
                .incidents
                .iter()
                .skip(offset)
                .take(page.page_size() as usize)
                .map(projection)
                .collect()
        })
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        self.shared
            .store
            .read(|state| state.incidents.len() as u64)
    }

    async fn add(&self, entity: Incident) -> Result<Incident, RepositoryError> {
        self.shared.stage(StagedOp::AddIncident(entity.clone()))?;
        Ok(entity)
    }

    async fn update(&self, entity: Incident) -> Result<(), RepositoryError> {
        self.shared.stage(StagedOp::UpdateIncident(entity))
    }

    async fn remove(&self, entity: &Incident) -> Result<(), RepositoryError> {
        self.shared.stage(StagedOp::RemoveIncident(entity.id()))
    }
}

/// User repository over the shared store.
#[derive(Debug, Clone)]
pub struct MemoryUserRepository {
    shared: Arc<UowShared>,
}

#[async_trait]
impl Repository<User> for MemoryUserRepository {
    async fn get_by_id(
        &self,
        id: Uuid,
        _eager: &[Relation],
    ) -> Result<Option<User>, RepositoryError> {
        self.shared
            .store
            .read(|state| state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_all_paged(
        &self,
        page: PageRequest,
        _eager: &[Relation],
    ) -> Result<Vec<User>, RepositoryError> {
        self.shared.store.read(|state| page_slice(&state.users, page))
    }

    async fn get_all_projected_paged<P>(
        &self,
        projection: for<'a> fn(&'a User) -> P,
        page: PageRequest,
        _eager: &[Relation],
    ) -> Result<Vec<P>, RepositoryError>
    where
        P: Send + 'static,
    {
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        self.shared.store.read(|state| {
            state
                .users
                .iter()
                .skip(offset)
                .take(page.page_size() as usize)
                .map(projection)
                .collect()
        })
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        self.shared.store.read(|state| state.users.len() as u64)
    }

    async fn add(&self, entity: User) -> Result<User, RepositoryError> {
        self.shared.stage(StagedOp::AddUser(entity.clone()))?;
        Ok(entity)
    }

    async fn update(&self, entity: User) -> Result<(), RepositoryError> {
        self.shared.stage(StagedOp::UpdateUser(entity))
    }

    async fn remove(&self, entity: &User) -> Result<(), RepositoryError> {
        self.shared.stage(StagedOp::RemoveUser(entity.id()))
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.shared.store.read(|state| {
            state
                .users
                .iter()
                .find(|u| u.email.eq_ignore_ascii_case(email))
                .cloned()
        })
    }
}

/// Comment repository over the comment collections embedded in incidents.
#[derive(Debug, Clone)]
pub struct MemoryCommentRepository {
    shared: Arc<UowShared>,
}

impl MemoryCommentRepository {
    fn all_comments(state: &StoreState) -> Vec<Comment> {
        state
            .incidents
            .iter()
            .flat_map(|incident| incident.comments.iter().cloned())
            .collect()
    }
}

#[async_trait]
impl Repository<Comment> for MemoryCommentRepository {
    async fn get_by_id(
        &self,
        id: Uuid,
        _eager: &[Relation],
    ) -> Result<Option<Comment>, RepositoryError> {
        self.shared.store.read(|state| {
            state
                .incidents
                .iter()
                .flat_map(|incident| incident.comments.iter())
                .find(|c| c.id == id)
                .cloned()
        })
    }

    async fn get_all_paged(
        &self,
        page: PageRequest,
        _eager: &[Relation],
    ) -> Result<Vec<Comment>, RepositoryError> {
        self.shared
            .store
            .read(|state| page_slice(&Self::all_comments(state), page))
    }

    async fn get_all_projected_paged<P>(
        &self,
        projection: for<'a> fn(&'a Comment) -> P,
        page: PageRequest,
        _eager: &[Relation],
    ) -> Result<Vec<P>, RepositoryError>
    where
        P: Send + 'static,
    {
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        self.shared.store.read(|state| {
            Self::all_comments(state)
                .iter()
                .skip(offset)
                .take(page.page_size() as usize)
                .map(projection)
                .collect()
        })
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        self.shared
            .store
            .read(|state| Self::all_comments(state).len() as u64)
    }

    async fn add(&self, entity: Comment) -> Result<Comment, RepositoryError> {
        self.shared.stage(StagedOp::AddComment(entity.clone()))?;
        Ok(entity)
    }

    async fn update(&self, entity: Comment) -> Result<(), RepositoryError> {
        self.shared.stage(StagedOp::UpdateComment(entity))
    }

    async fn remove(&self, entity: &Comment) -> Result<(), RepositoryError> {
        self.shared.stage(StagedOp::RemoveComment(entity.id()))
    }
}

/// Request-scoped unit of work over the shared store.
#[derive(Debug)]
pub struct MemoryUnitOfWork {
    shared: Arc<UowShared>,
    incidents: MemoryIncidentRepository,
    users: MemoryUserRepository,
    comments: MemoryCommentRepository,
}

impl MemoryUnitOfWork {
    /// Begin a fresh unit of work against the given store.
    #[must_use]
    pub fn new(store: MemoryStore) -> Self {
        let shared = Arc::new(UowShared {
            store,
            staged: Mutex::new(Vec::new()),
        });
        Self {
            incidents: MemoryIncidentRepository {
                shared: shared.clone(),
            },
            users: MemoryUserRepository {
                shared: shared.clone(),
            },
            comments: MemoryCommentRepository {
                shared: shared.clone(),
            },
            shared,
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    type Incidents = MemoryIncidentRepository;
    type Users = MemoryUserRepository;
    type Comments = MemoryCommentRepository;

    fn incidents(&self) -> &Self::Incidents {
        &self.incidents
    }

    fn users(&self) -> &Self::Users {
        &self.users
    }

    fn comments(&self) -> &Self::Comments {
        &self.comments
    }

    #[instrument(skip(self), fields(ops))]
    async fn save_changes(&self) -> Result<(), CommitError> {
        let ops = {
            let mut staged = self
                .shared
                .staged
                .lock()
                .map_err(|_| CommitError::connection("staging buffer poisoned"))?;
            std::mem::take(&mut *staged)
        };
        tracing::Span::current().record("ops", ops.len());
        if ops.is_empty() {
            return Ok(());
        }

        let mut state = self
            .shared
            .store
            .state
            .write()
            .map_err(|_| CommitError::connection("store lock poisoned"))?;

        // Replay against a scratch copy so a mid-batch failure cannot leave
        // a partial commit behind.
        let mut scratch = state.clone();
        for op in ops {
            op.apply(&mut scratch)?;
        }
        *state = scratch;
        Ok(())
    }
}

/// Factory producing one [`MemoryUnitOfWork`] per inbound request.
#[derive(Debug, Clone, Default)]
pub struct MemoryUnitOfWorkFactory {
    store: MemoryStore,
}

impl MemoryUnitOfWorkFactory {
    /// Factory over the given store.
    #[must_use]
    pub const fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// The underlying store, for seeding.
    #[must_use]
    pub const fn store(&self) -> &MemoryStore {
        &self.store
    }
}

impl UnitOfWorkFactory for MemoryUnitOfWorkFactory {
    type Uow = MemoryUnitOfWork;

    fn begin(&self) -> Self::Uow {
        MemoryUnitOfWork::new(self.store.clone())
    }
}
