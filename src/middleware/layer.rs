use crate::middleware::{Middleware, Next};
use axum::{body::Body, http::Request, response::{IntoResponse, Response}};
use futures_util::future::BoxFuture;
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

/// Tower Layer running one [`Middleware`] in front of the wrapped service.
#[derive(Clone)]
pub struct MiddlewareLayer {
    middleware: Arc<dyn Middleware>,
}

impl MiddlewareLayer {
    pub fn new(middleware: Arc<dyn Middleware>) -> Self {
        Self { middleware }
    }
}

impl<S> Layer<S> for MiddlewareLayer {
    type Service = MiddlewareService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MiddlewareService {
            inner,
            middleware: self.middleware.clone(),
        }
    }
}

#[derive(Clone)]
pub struct MiddlewareService<S> {
    inner: S,
    middleware: Arc<dyn Middleware>,
}

impl<S> Service<Request<Body>> for MiddlewareService<S>
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
        let middleware = self.middleware.clone();
        // The ready service goes to this request, a fresh clone stays behind.
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let next = Next::new(move |request| {
                Box::pin(async move {
                    match inner.oneshot(request).await {
                        Ok(response) => response,
                        Err(never) => match never {},
                    }
                })
            });
            Ok(match middleware.handle(request, next).await {
                Ok(response) => response,
                Err(error) => error.into_response(),
            })
        })
    }
}
