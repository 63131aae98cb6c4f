use super::{ErrorContext, ErrorMiddleware, ErrorOutcome, PendingError};
use axum::{body::Body, http::Request, response::{IntoResponse, Response}};
use futures_util::future::BoxFuture;
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

/// Tower layer running one [`ErrorMiddleware`] on pending errors coming out
/// of the wrapped service.
#[derive(Clone)]
pub struct ErrorLayer {
    handler: Arc<dyn ErrorMiddleware>,
}

impl ErrorLayer {
    pub fn new(handler: Arc<dyn ErrorMiddleware>) -> Self {
        Self { handler }
    }
}

impl<S> Layer<S> for ErrorLayer {
    type Service = ErrorService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ErrorService {
            inner,
            handler: self.handler.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ErrorService<S> {
    inner: S,
    handler: Arc<dyn ErrorMiddleware>,
}

impl<S> Service<Request<Body>> for ErrorService<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let handler = self.handler.clone();
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);
        let context = ErrorContext::from_request(&request);

        Box::pin(async move {
            let mut response = match inner.oneshot(request).await {
                Ok(response) => response,
                Err(never) => match never {},
            };
            let Some(PendingError(error)) = response.extensions_mut().remove::<PendingError>()
            else {
                return Ok(response);
            };
            Ok(match handler.handle(error, &context).await {
                ErrorOutcome::Respond(response) => response,
                ErrorOutcome::Forward(error) => error.into_response(),
            })
        })
    }
}
