//! Incident manager backend library.
//!
//! The crate is organised hexagonally: `domain` holds the entities, ports,
//! and lifecycle handlers; `dispatch` is the typed command/query pipeline;
//! `outbound` hosts driven adapters; `api` is the thin actix-web surface.

pub mod api;
pub mod dispatch;
pub mod doc;
pub mod domain;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by docs tooling.
pub use doc::ApiDoc;

#[cfg(test)]
pub(crate) mod fixtures;
