//! # Routewire
//!
//! Declarative controller metadata compiled into [`axum`] routers.
//!
//! Controllers describe their routes, middlewares, validation schemas and
//! parameter bindings once, in a [`MetadataStore`]. Routewire turns that
//! description into a working router:
//!
//! - **Router Generator** ([`generate_router`]): one router fragment per
//!   controller, nested under its base url.
//! - **Controller Combiner** ([`combine_controllers`]): merges fragments and
//!   appends the default error middlewares.
//! - **Request Handler Factory** ([`RequestHandler`]): orders call arguments,
//!   invokes the controller method and turns its [`Reply`] into a response.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use routewire::prelude::*;
//!
//! struct TodoController;
//!
//! impl TodoController {
//!     async fn create(self: Arc<Self>, args: Arguments) -> Result<Reply, RouteError> {
//!         let todo: serde_json::Value = args.body()?;
//!         Ok(HttpResponse::created(todo).into())
//!     }
//! }
//!
//! impl Controller for TodoController {
//!     fn register(store: &mut MetadataStore) -> routewire::Result<()> {
//!         store
//!             .register_class::<Self>(ClassMetadata::new("/todos"))
//!             .register_method(
//!                 MethodMetadata::post("create", "/", Self::create).bind(ParamKind::Body, 0),
//!             );
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut store = MetadataStore::new();
//!     TodoController::register(&mut store).unwrap();
//!
//!     let controllers = ControllerSet::new().add(Arc::new(TodoController));
//!     let app = combine_controllers(&store, controllers, &CombineOptions::default()).unwrap();
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod combine;
pub mod common;
pub mod config;
pub mod controller;
pub mod error;
pub mod exception;
pub mod handler;
pub mod metadata;
pub mod middleware;
pub mod validation;

// Re-export core types
pub use combine::{ControllerSet, Mountable, combine_controllers};
pub use common::{HttpResponse, Reply};
pub use config::{CombineOptions, ConfigService};
pub use controller::{Controller, RouteTable, generate_router};
pub use error::{Result, RoutewireError};
pub use exception::{ErrorMiddleware, ErrorOutcome, RouteError};
pub use handler::{Arguments, RequestHandler};
pub use metadata::{ClassMetadata, HttpMethod, MetadataStore, MethodMetadata, ParamKind, ParamsIndex};
pub use middleware::{Middleware, Next};
pub use validation::{Validation, ValidationOptions, ValidationSchema, generate_validation_middleware};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use routewire::prelude::*;
/// ```
pub mod prelude {
    pub use crate::combine::{ControllerSet, combine_controllers};
    pub use crate::common::{HttpResponse, Reply};
    pub use crate::config::{CombineOptions, ConfigService};
    pub use crate::controller::{Controller, generate_router};
    pub use crate::error::RoutewireError;
    pub use crate::exception::{
        DefaultHttpErrorMiddleware, DefaultValidationErrorMiddleware, ErrorContext,
        ErrorMiddleware, ErrorOutcome, RouteError, error_fn,
    };
    pub use crate::handler::{Argument, ArgumentKind, Arguments, UploadedFile};
    pub use crate::metadata::{
        ClassMetadata, HttpMethod, MetadataStore, MethodMetadata, ParamKind, ParamsIndex,
    };
    pub use crate::middleware::{Middleware, MiddlewareResult, Next, RequestLogger, from_fn};
    pub use crate::validation::{Validation, ValidationOptions, ValidationSchema};
    pub use async_trait::async_trait;
    pub use axum::{
        Router,
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    pub use serde_json::json;
    pub use std::sync::Arc;
}
