//! Typed command/query dispatch pipeline.
//!
//! Every inbound request is a typed value routed to exactly one handler.
//! Dispatch runs two phases: the validation stage (every registered
//! validator for the request's tag, errors concatenated), then the handler.
//! A request tag with no validators passes vacuously. Registration problems
//! (duplicate handlers, or a required tag left unregistered) surface when
//! the dispatcher is built, not at call time.
//!
//! The dispatcher itself is stateless and safe to share across concurrent
//! requests.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::domain::{DomainError, FieldError};


/// A dispatchable request carrying its declared result type.
pub trait Request: Send + 'static {
    /// Result produced by the request's handler.
    type Response: Send + 'static;

    /// Stable tag naming the request in logs and registry errors.
    const NAME: &'static str;
}

/// Executes one request type.
#[async_trait]
pub trait Handler<R: Request>: Send + Sync {
    /// Run the request to completion.
    async fn handle(&self, request: R) -> Result<R::Response, DomainError>;
}

/// Cross-cutting validation for one request type.
///
/// Validators are pure with respect to stored state: they may read through a
/// unit of work (e.g. cross-reference checks) but never write. All
/// validators for a tag run to completion so the caller sees every
/// violation at once.
#[async_trait]
pub trait Validator<R: Request>: Send + Sync {
    /// Return every field-level violation in the request.
    async fn validate(&self, request: &R) -> Vec<FieldError>;
}

/// Registration problems detected while building a [`Dispatcher`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two handlers were registered for the same request tag.
    #[error("duplicate handler registered for {name}")]
    DuplicateHandler { name: &'static str },
    /// A request tag marked as required has no handler.
    #[error("no handler registered for {name}")]
    MissingHandler { name: &'static str },
}

type BoxedAny = Box<dyn Any + Send + Sync>;

struct HandlerSlot {
    name: &'static str,
    // Holds an `Arc<dyn Handler<R>>`; downcast on dispatch.
    handler: BoxedAny,
}

struct ValidatorSlot {
    // Holds a `Vec<Arc<dyn Validator<R>>>`.
    validators: BoxedAny,
}

/// Builder collecting handler and validator registrations.
#[derive(Default)]
pub struct DispatcherBuilder {
    handlers: HashMap<TypeId, HandlerSlot>,
    validators: HashMap<TypeId, ValidatorSlot>,
    required: Vec<(TypeId, &'static str)>,
    duplicate: Option<&'static str>,
}

impl DispatcherBuilder {
    /// Register the handler for request type `R`.
    ///
    /// Registering a second handler for the same type makes `build` fail.
    #[must_use]
    pub fn handler<R: Request>(mut self, handler: impl Handler<R> + 'static) -> Self {
        let type_id = TypeId::of::<R>();
        if self.handlers.contains_key(&type_id) {
            self.duplicate.get_or_insert(R::NAME);
            return self;
        }
        let erased: Arc<dyn Handler<R>> = Arc::new(handler);
        self.handlers.insert(
            type_id,
            HandlerSlot {
                name: R::NAME,
                handler: Box::new(erased),
            },
        );
        self
    }

    /// Register an additional validator for request type `R`.
    #[must_use]
    pub fn validator<R: Request>(mut self, validator: impl Validator<R> + 'static) -> Self {
        let erased: Arc<dyn Validator<R>> = Arc::new(validator);
        let slot = self
            .validators
            .entry(TypeId::of::<R>())
            .or_insert_with(|| ValidatorSlot {
                validators: Box::new(Vec::<Arc<dyn Validator<R>>>::new()),
            });
        if let Some(list) = slot.validators.downcast_mut::<Vec<Arc<dyn Validator<R>>>>() {
            list.push(erased);
        }
        self
    }

    /// Declare that request type `R` must have a handler by build time.
    ///
    /// The composition root lists every request type it exposes so a missing
    /// registration is a startup error rather than a runtime surprise.
    #[must_use]
    pub fn require<R: Request>(mut self) -> Self {
        self.required.push((TypeId::of::<R>(), R::NAME));
        self
    }

    /// Finalise the registry.
    pub fn build(self) -> Result<Dispatcher, RegistryError> {
        if let Some(name) = self.duplicate {
            return Err(RegistryError::DuplicateHandler { name });
        }
        for &(type_id, name) in &self.required {
            if !self.handlers.contains_key(&type_id) {
                return Err(RegistryError::MissingHandler { name });
            }
        }
        Ok(Dispatcher {
            handlers: self.handlers,
            validators: self.validators,
        })
    }
}

/// Routes typed requests through validation to their single handler.
pub struct Dispatcher {
    handlers: HashMap<TypeId, HandlerSlot>,
    validators: HashMap<TypeId, ValidatorSlot>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.handlers.len())
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl Dispatcher {
    /// Start building a dispatcher.
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Dispatch a request: validation stage first, then the handler.
    ///
    /// When any validator reports errors the handler never executes and the
    /// returned error enumerates every violation, not just the first.
    pub async fn dispatch<R: Request>(&self, request: R) -> Result<R::Response, DomainError> {
        let errors = self.run_validators(&request).await;
        if !errors.is_empty() {
            debug!(request = R::NAME, violations = errors.len(), "validation failed");
            return Err(DomainError::validation(errors));
        }

        let slot = self
            .handlers
            .get(&TypeId::of::<R>())
            .ok_or_else(|| DomainError::internal(format!("no handler wired for {}", R::NAME)))?;
        let handler = slot
            .handler
            .downcast_ref::<Arc<dyn Handler<R>>>()
            .ok_or_else(|| {
                DomainError::internal(format!("handler registered under wrong type for {}", slot.name))
            })?;
        handler.handle(request).await
    }

    async fn run_validators<R: Request>(&self, request: &R) -> Vec<FieldError> {
        let Some(slot) = self.validators.get(&TypeId::of::<R>()) else {
            return Vec::new();
        };
        let Some(list) = slot.validators.downcast_ref::<Vec<Arc<dyn Validator<R>>>>() else {
            return Vec::new();
        };
        let mut errors = Vec::new();
        for validator in list {
            errors.extend(validator.validate(request).await);
        }
        errors
    }
}
