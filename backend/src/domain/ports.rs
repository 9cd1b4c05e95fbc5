//! Domain ports defining the edges of the hexagon.
//!
//! The persistence collaborator is consumed through two ports: a per-aggregate
//! [`Repository`] and the [`UnitOfWork`] that groups repositories behind one
//! atomic commit boundary. Adapters map their failures into the typed errors
//! here instead of returning `anyhow::Result`.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use paging::PageRequest;

use super::incident::{Comment, Incident};
use super::user::User;

/// Anything storable behind a [`Repository`].
pub trait Entity: Clone + Send + Sync + 'static {
    /// Stable identifier of this entity.
    fn id(&self) -> Uuid;
}

/// Related data a read may ask the adapter to load eagerly.
///
/// Hints are advisory for adapters that materialise aggregates whole (the
/// in-memory adapter does); adapters backed by a real store use them to
/// avoid N+1 loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    CreatedBy,
    AssignedTo,
    Comments,
    Author,
}

/// Failures surfaced by repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Store connectivity failed.
    #[error("repository connection failed: {message}")]
    Connection { message: String },
    /// Query or staged mutation failed during execution.
    #[error("repository query failed: {message}")]
    Query { message: String },
}

impl RepositoryError {
    /// Helper for connection-oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Failures surfaced when committing a unit of work.
///
/// Commits are last-write-wins: no optimistic-concurrency token is enforced,
/// so two concurrent updates to the same incident race silently. Accepted
/// for now; a revision column on the aggregate is the known fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// The commit failed for a transient reason; the caller may retry.
    #[error("commit failed: {message}")]
    Transient { message: String },
    /// Store connectivity was lost mid-commit.
    #[error("commit connection failed: {message}")]
    Connection { message: String },
}

impl CommitError {
    /// Helper for transient commit failures.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    /// Helper for connection loss during commit.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }
}

/// Per-aggregate data access port.
///
/// Mutating methods (`add`, `update`, `remove`) stage work against the
/// owning [`UnitOfWork`]; nothing becomes visible to other units of work
/// until `save_changes` commits. Reads must never mutate stored state, even
/// as a side effect of eager loading.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Fetch one entity by id, or `None` when absent.
    async fn get_by_id(&self, id: Uuid, eager: &[Relation])
    -> Result<Option<E>, RepositoryError>;

    /// Fetch one page of entities in stable collection order.
    async fn get_all_paged(
        &self,
        page: PageRequest,
        eager: &[Relation],
    ) -> Result<Vec<E>, RepositoryError>;

    /// Fetch one page projected at the data-access boundary.
    ///
    /// Exists so list reads never materialise full aggregates when only a
    /// DTO shape is needed.
    async fn get_all_projected_paged<P>(
        &self,
        projection: for<'a> fn(&'a E) -> P,
        page: PageRequest,
        eager: &[Relation],
    ) -> Result<Vec<P>, RepositoryError>
    where
        P: Send + 'static;

    /// Total number of stored entities.
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Stage an insert, echoing the entity as it will be persisted.
    async fn add(&self, entity: E) -> Result<E, RepositoryError>;

    /// Stage a full-entity update.
    async fn update(&self, entity: E) -> Result<(), RepositoryError>;

    /// Stage a removal.
    async fn remove(&self, entity: &E) -> Result<(), RepositoryError>;
}

/// User repository with the lookups the lifecycle handlers need beyond CRUD.
#[async_trait]
pub trait UserRepository: Repository<User> {
    /// Fetch a user by email, or `None` when absent.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
}

/// Transactional boundary coordinating the aggregate repositories.
///
/// One unit of work serves exactly one inbound request. All mutations staged
/// through its repositories commit atomically at `save_changes`: either all
/// persist or none do. Handlers composing several writes call
/// `save_changes` once, at the end.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Incident repository implementation.
    type Incidents: Repository<Incident>;
    /// User repository implementation.
    type Users: UserRepository;
    /// Comment repository implementation.
    type Comments: Repository<Comment>;

    /// Incident aggregate access.
    fn incidents(&self) -> &Self::Incidents;

    /// User aggregate access.
    fn users(&self) -> &Self::Users;

    /// Comment aggregate access.
    fn comments(&self) -> &Self::Comments;

    /// Commit every staged mutation atomically.
    async fn save_changes(&self) -> Result<(), CommitError>;
}

/// Creates one [`UnitOfWork`] per inbound request.
pub trait UnitOfWorkFactory: Send + Sync {
    /// Unit of work implementation this factory produces.
    type Uow: UnitOfWork;

    /// Begin a fresh request-scoped unit of work.
    fn begin(&self) -> Self::Uow;
}
