//! Controller combination
//!
//! Mounts every controller fragment on one router and appends the default
//! error middlewares as catch-alls behind all controller-specific ones.

use crate::config::CombineOptions;
use crate::controller::{Controller, RouteTable, mount_router};
use crate::error::Result;
use crate::exception::{DefaultHttpErrorMiddleware, DefaultValidationErrorMiddleware, ErrorLayer};
use crate::metadata::MetadataStore;
use axum::Router;
use std::any::type_name;
use std::sync::Arc;

/// A controller instance that can produce its router fragment.
pub trait Mountable {
    fn name(&self) -> &'static str;

    /// Build the fragment, registering its routes in `routes`.
    fn generate(&self, store: &MetadataStore, routes: &mut RouteTable) -> Result<Router>;
}

impl<C: Controller> Mountable for Arc<C> {
    fn name(&self) -> &'static str {
        type_name::<C>()
    }

    fn generate(&self, store: &MetadataStore, routes: &mut RouteTable) -> Result<Router> {
        mount_router(store, self.clone(), routes)
    }
}

/// Ordered collection of controller instances to mount.
#[derive(Default)]
pub struct ControllerSet {
    controllers: Vec<Box<dyn Mountable>>,
}

impl ControllerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<C: Controller>(mut self, controller: Arc<C>) -> Self {
        self.controllers.push(Box::new(controller));
        self
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

/// Mount `controllers` in order and append the enabled default error
/// middlewares.
///
/// Routes clashing across controllers are rejected before anything is
/// merged.
pub fn combine_controllers(
    store: &MetadataStore,
    controllers: ControllerSet,
    options: &CombineOptions,
) -> Result<Router> {
    let mut routes = RouteTable::new();
    let mut router = Router::new();
    for controller in &controllers.controllers {
        tracing::debug!("Mounting controller {}", controller.name());
        router = router.merge(controller.generate(store, &mut routes)?);
    }

    if !options.skip_default_validation_error_middleware {
        router = router.layer(ErrorLayer::new(Arc::new(DefaultValidationErrorMiddleware)));
        tracing::info!("Default validation error middleware installed");
    }
    if !options.skip_default_http_error_middleware {
        router = router.layer(ErrorLayer::new(Arc::new(DefaultHttpErrorMiddleware)));
        tracing::info!("Default HTTP error middleware installed");
    }

    Ok(router)
}
