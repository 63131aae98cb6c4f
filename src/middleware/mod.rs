use crate::exception::RouteError;
use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};
use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

mod layer;
pub mod logging;

pub use layer::{MiddlewareLayer, MiddlewareService};
pub use logging::RequestLogger;

/// Standard return type for middlewares.
///
/// An `Err` skips the rest of the chain and travels outward as a pending
/// error to the error middlewares.
pub type MiddlewareResult = Result<Response, RouteError>;

/// Represents the rest of the chain: later middlewares and the handler.
pub struct Next {
    run: Box<dyn FnOnce(Request<Body>) -> BoxFuture<'static, Response> + Send>,
}

impl Next {
    /// Create a new Next handler
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Request<Body>) -> BoxFuture<'static, Response> + Send + 'static,
    {
        Self { run: Box::new(f) }
    }

    /// Execute the rest of the chain
    pub async fn run(self, request: Request<Body>) -> Response {
        (self.run)(request).await
    }
}

/// The Middleware trait
///
/// Middlewares can inspect/modify the request before it reaches the handler,
/// short-circuit with their own response, or inspect/modify the response
/// after the handler returns.
///
/// # Example
/// ```
/// use routewire::middleware::{Middleware, MiddlewareResult, Next};
/// use routewire::async_trait;
/// use axum::{body::Body, http::Request};
///
/// struct Stamp;
///
/// #[async_trait]
/// impl Middleware for Stamp {
///     async fn handle(&self, request: Request<Body>, next: Next) -> MiddlewareResult {
///         let mut response = next.run(request).await;
///         response.headers_mut().insert("x-stamp", "1".parse().unwrap());
///         Ok(response)
///     }
/// }
/// ```
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn handle(&self, request: Request<Body>, next: Next) -> MiddlewareResult;
}

pub struct FnMiddleware<F>(F);

#[async_trait]
impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(Request<Body>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MiddlewareResult> + Send + 'static,
{
    async fn handle(&self, request: Request<Body>, next: Next) -> MiddlewareResult {
        (self.0)(request, next).await
    }
}

/// Build a middleware from an async closure.
pub fn from_fn<F, Fut>(f: F) -> Arc<dyn Middleware>
where
    F: Fn(Request<Body>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MiddlewareResult> + Send + 'static,
{
    Arc::new(FnMiddleware(f))
}
