//! Incident manager client library.
//!
//! Wraps the incident HTTP API behind a typed transport port and keeps a
//! local, paginated incident list in step with server state. The list
//! synchronizer owns ordering, de-duplication, and filter evaluation so
//! user interfaces only render what [`sync::ListSynchronizer::snapshot`]
//! hands them.

pub mod api;
pub mod auth;
pub mod filter;
pub mod http;
pub mod model;
pub mod ordered;
pub mod sync;

pub use api::{IncidentApi, TransportError};
pub use filter::Filter;
pub use model::{Comment, Incident, IncidentPriority, IncidentStatus, UserKind, UserRef};
pub use sync::{ListSnapshot, ListSynchronizer, MutationReport};
