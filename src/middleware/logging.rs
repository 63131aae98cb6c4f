use crate::exception::PendingError;
use crate::middleware::{Middleware, MiddlewareResult, Next};
use async_trait::async_trait;
use axum::{body::Body, http::Request};
use std::time::Instant;

/// Logs every request and its outcome with elapsed time.
///
/// Pending errors are reported at `warn` and left on the response for the
/// error middlewares.
#[derive(Debug, Clone, Default)]
pub struct RequestLogger;

#[async_trait]
impl Middleware for RequestLogger {
    async fn handle(&self, request: Request<Body>, next: Next) -> MiddlewareResult {
        let method = request.method().clone();
        let path = request.uri().path().to_owned();
        let started = Instant::now();
        tracing::info!(%method, %path, "--> request");

        let response = next.run(request).await;
        let elapsed = started.elapsed();
        match PendingError::of(&response) {
            Some(error) => tracing::warn!(%method, %path, ?elapsed, %error, "<-- pending error"),
            None => tracing::info!(%method, %path, status = %response.status(), ?elapsed, "<-- response"),
        }
        Ok(response)
    }
}
