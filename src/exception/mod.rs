//! Request-time errors and the error-middleware pipeline
//!
//! A handler or middleware failure never writes a response directly. It is
//! turned into a *pending error*: a placeholder response carrying the
//! [`RouteError`] as an extension. Every [`ErrorLayer`] on the way out gets a
//! chance to answer it or forward it, innermost first.

use crate::validation::ValidationError;
use async_trait::async_trait;
use axum::{
    http::{HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

pub mod http;
mod layer;
pub mod validation;

pub use http::DefaultHttpErrorMiddleware;
pub use layer::{ErrorLayer, ErrorService};
pub use validation::DefaultValidationErrorMiddleware;

/// Error raised while serving a request.
#[derive(Debug, Clone, Error)]
pub enum RouteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error("{0}")]
    Handler(Arc<anyhow::Error>),
}

impl RouteError {
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        RouteError::Http {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::http(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::http(StatusCode::NOT_FOUND, message)
    }

    /// Wrap an arbitrary failure of controller code.
    pub fn handler(error: impl Into<anyhow::Error>) -> Self {
        RouteError::Handler(Arc::new(error.into()))
    }

    pub(crate) fn panicked(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "handler panicked".to_string());
        Self::handler(anyhow::anyhow!("handler panicked: {message}"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RouteError::Validation(_) => StatusCode::BAD_REQUEST,
            RouteError::Http { status, .. } => *status,
            RouteError::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for RouteError {
    fn from(error: anyhow::Error) -> Self {
        RouteError::Handler(Arc::new(error))
    }
}

/// Response extension marking a response as an unhandled error.
#[derive(Debug, Clone)]
pub struct PendingError(pub RouteError);

impl PendingError {
    pub fn of(response: &Response) -> Option<&RouteError> {
        response.extensions().get::<PendingError>().map(|p| &p.0)
    }
}

/// A pending error that reaches the client unhandled becomes a plain-text
/// response with the error's status.
impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = self.status();
        let reason = status.canonical_reason().unwrap_or("Error");
        let mut response = (status, reason).into_response();
        response.extensions_mut().insert(PendingError(self));
        response
    }
}

/// The request an error happened on.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl ErrorContext {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
        }
    }
}

/// What an error middleware decided to do with an error.
pub enum ErrorOutcome {
    /// Answer the request; outer error middlewares are skipped.
    Respond(Response),
    /// Pass the (possibly replaced) error to the next error middleware.
    Forward(RouteError),
}

/// Error-handling middleware, run when a pending error travels past it.
#[async_trait]
pub trait ErrorMiddleware: Send + Sync + 'static {
    async fn handle(&self, error: RouteError, context: &ErrorContext) -> ErrorOutcome;
}

pub struct FnErrorMiddleware<F>(F);

#[async_trait]
impl<F, Fut> ErrorMiddleware for FnErrorMiddleware<F>
where
    F: Fn(RouteError, ErrorContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ErrorOutcome> + Send + 'static,
{
    async fn handle(&self, error: RouteError, context: &ErrorContext) -> ErrorOutcome {
        (self.0)(error, context.clone()).await
    }
}

/// Build an error middleware from an async closure.
pub fn error_fn<F, Fut>(f: F) -> Arc<dyn ErrorMiddleware>
where
    F: Fn(RouteError, ErrorContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ErrorOutcome> + Send + 'static,
{
    Arc::new(FnErrorMiddleware(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(RouteError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            RouteError::handler(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unhandled_error_response_carries_the_error() {
        let response = RouteError::http(StatusCode::IM_A_TEAPOT, "short and stout").into_response();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        let pending = PendingError::of(&response).unwrap();
        assert_eq!(pending.to_string(), "short and stout");
    }

    #[test]
    fn panic_payloads_become_messages() {
        let err = RouteError::panicked(Box::new("kaboom"));
        assert_eq!(err.to_string(), "handler panicked: kaboom");
        let err = RouteError::panicked(Box::new(String::from("owned")));
        assert_eq!(err.to_string(), "handler panicked: owned");
    }
}
