//! Request handler factory
//!
//! Turns one controller method into an axum handler: extracts the bound
//! request facets in plan order, calls the method, and translates its
//! [`Reply`] into a response. Failures are never answered here; they become
//! pending errors for the error-middleware chain.

mod arguments;
pub(crate) mod payload;
mod plan;

pub use arguments::{
    Argument, ArgumentKind, Arguments, NextHandle, PathParams, QueryParams, RequestContext,
    ResponseHandle, UploadedFile,
};
pub use payload::BODY_LIMIT;
pub use plan::{ExtractionPlan, NEXT_WEIGHT, REQUEST_WEIGHT, RESPONSE_WEIGHT};

use crate::common::Reply;
use crate::error::Result;
use crate::exception::RouteError;
use crate::metadata::{HandlerFn, ParamsIndex};
use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Generated request handler for one controller method.
pub struct RequestHandler<C> {
    controller: Arc<C>,
    method: HandlerFn<C>,
    plan: Arc<ExtractionPlan>,
}

impl<C> Clone for RequestHandler<C> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            method: self.method.clone(),
            plan: self.plan.clone(),
        }
    }
}

impl<C: Send + Sync + 'static> RequestHandler<C> {
    /// Compile the argument plan for `params`; overlapping weights fail here.
    pub fn new(controller: Arc<C>, method: HandlerFn<C>, params: &ParamsIndex) -> Result<Self> {
        Ok(Self {
            controller,
            method,
            plan: Arc::new(ExtractionPlan::compile(params)?),
        })
    }

    pub fn plan(&self) -> &ExtractionPlan {
        &self.plan
    }

    /// Serve one request. Errors come back as pending-error responses.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(error) => error.into_response(),
        }
    }

    async fn dispatch(&self, request: Request<Body>) -> std::result::Result<Response, RouteError> {
        let (args, response_handle, next) = self.extract(request).await?;

        // The call itself is inside the guard so a panic while building the
        // future is caught as well.
        let method = self.method.clone();
        let controller = self.controller.clone();
        let invocation = async move { method(controller, args).await };
        let outcome = AssertUnwindSafe(invocation).catch_unwind().await;
        let reply = match outcome {
            Ok(reply) => reply,
            Err(panic) => Err(RouteError::panicked(panic)),
        };

        if let Some(error) = next.forwarded() {
            return Err(error);
        }
        let reply: Reply = reply?;
        let mut response = reply.into_response();
        response.headers_mut().extend(response_handle.take_headers());
        Ok(response)
    }

    async fn extract(
        &self,
        request: Request<Body>,
    ) -> std::result::Result<(Arguments, ResponseHandle, NextHandle), RouteError> {
        let (mut parts, body) = request.into_parts();

        let mut decoded = if self.plan.needs_payload() {
            let bytes = payload::read_bytes(body).await?;
            Some(payload::parse(&parts.headers, bytes).await?)
        } else {
            None
        };
        let params = if self.plan.needs(ArgumentKind::Params) {
            payload::path_params(&mut parts).await
        } else {
            Default::default()
        };
        let mut query = if self.plan.needs(ArgumentKind::Query) {
            Some(QueryParams::new(parts.uri.clone(), payload::query_params(&parts.uri)?))
        } else {
            None
        };

        let response_handle = ResponseHandle::default();
        let next = NextHandle::default();
        let mut request = Some(RequestContext::new(parts));
        let mut params = Some(PathParams(params));

        let mut values = Vec::with_capacity(self.plan.slots().len());
        for kind in self.plan.slots() {
            let value = match kind {
                ArgumentKind::Request => request.take().map(Argument::Request),
                ArgumentKind::Response => Some(Argument::Response(response_handle.clone())),
                ArgumentKind::Next => Some(Argument::Next(next.clone())),
                ArgumentKind::Params => params.take().map(Argument::Params),
                ArgumentKind::Query => query.take().map(Argument::Query),
                ArgumentKind::Body => decoded
                    .as_mut()
                    .map(|payload| Argument::Body(std::mem::take(&mut payload.body))),
                ArgumentKind::File => decoded
                    .as_ref()
                    .map(|payload| Argument::File(payload.files.first().cloned())),
                ArgumentKind::Files => decoded
                    .as_ref()
                    .map(|payload| Argument::Files(payload.files.clone())),
            };
            if let Some(value) = value {
                values.push(value);
            }
        }

        Ok((Arguments::new(values), response_handle, next))
    }
}
