//! Controller metadata
//!
//! Routing information is declared explicitly: every controller registers one
//! [`ClassMetadata`] and any number of [`MethodMetadata`] entries in a
//! [`MetadataStore`]. The router generator only ever reads it.

mod params;
mod store;
mod verb;

pub use params::{ParamKind, ParamsIndex};
pub use store::MetadataStore;
pub use verb::HttpMethod;

use crate::common::Reply;
use crate::error::Result;
use crate::exception::{ErrorMiddleware, RouteError};
use crate::handler::Arguments;
use crate::middleware::Middleware;
use crate::validation::Validation;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A controller method, stored type-erased so it can be invoked per request.
pub type HandlerFn<C> =
    Arc<dyn Fn(Arc<C>, Arguments) -> BoxFuture<'static, std::result::Result<Reply, RouteError>> + Send + Sync>;

/// Metadata attached to a controller type.
#[derive(Clone)]
pub struct ClassMetadata {
    pub base_url: String,
    pub middlewares: Vec<Arc<dyn Middleware>>,
    pub error_middlewares: Vec<Arc<dyn ErrorMiddleware>>,
    pub validation: Option<Validation>,
}

impl ClassMetadata {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            middlewares: Vec::new(),
            error_middlewares: Vec::new(),
            validation: None,
        }
    }

    pub fn middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn error_middleware(mut self, middleware: Arc<dyn ErrorMiddleware>) -> Self {
        self.error_middlewares.push(middleware);
        self
    }

    pub fn validate(mut self, validation: Validation) -> Self {
        self.validation = Some(validation);
        self
    }
}

impl fmt::Debug for ClassMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMetadata")
            .field("base_url", &self.base_url)
            .field("middlewares", &self.middlewares.len())
            .field("error_middlewares", &self.error_middlewares.len())
            .field("validation", &self.validation.is_some())
            .finish()
    }
}

/// Metadata attached to one routed method of controller `C`.
pub struct MethodMetadata<C> {
    pub method_name: String,
    pub method: HttpMethod,
    pub path: String,
    pub middlewares: Vec<Arc<dyn Middleware>>,
    pub error_middlewares: Vec<Arc<dyn ErrorMiddleware>>,
    pub validation: Option<Validation>,
    pub params: ParamsIndex,
    pub handler: HandlerFn<C>,
}

impl<C: Send + Sync + 'static> MethodMetadata<C> {
    pub fn new<F, Fut>(
        method_name: impl Into<String>,
        method: HttpMethod,
        path: impl Into<String>,
        handler: F,
    ) -> Self
    where
        F: Fn(Arc<C>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Reply, RouteError>> + Send + 'static,
    {
        Self {
            method_name: method_name.into(),
            method,
            path: path.into(),
            middlewares: Vec::new(),
            error_middlewares: Vec::new(),
            validation: None,
            params: ParamsIndex::new(),
            handler: Arc::new(move |controller, args| handler(controller, args).boxed()),
        }
    }

    /// Like [`MethodMetadata::new`], with the verb given by name.
    pub fn parse<F, Fut>(
        method_name: impl Into<String>,
        verb: &str,
        path: impl Into<String>,
        handler: F,
    ) -> Result<Self>
    where
        F: Fn(Arc<C>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Reply, RouteError>> + Send + 'static,
    {
        Ok(Self::new(method_name, HttpMethod::parse(verb)?, path, handler))
    }

    pub fn get<F, Fut>(method_name: impl Into<String>, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arc<C>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Reply, RouteError>> + Send + 'static,
    {
        Self::new(method_name, HttpMethod::Get, path, handler)
    }

    pub fn post<F, Fut>(method_name: impl Into<String>, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arc<C>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Reply, RouteError>> + Send + 'static,
    {
        Self::new(method_name, HttpMethod::Post, path, handler)
    }

    pub fn put<F, Fut>(method_name: impl Into<String>, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arc<C>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Reply, RouteError>> + Send + 'static,
    {
        Self::new(method_name, HttpMethod::Put, path, handler)
    }

    pub fn patch<F, Fut>(method_name: impl Into<String>, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arc<C>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Reply, RouteError>> + Send + 'static,
    {
        Self::new(method_name, HttpMethod::Patch, path, handler)
    }

    pub fn delete<F, Fut>(method_name: impl Into<String>, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arc<C>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Reply, RouteError>> + Send + 'static,
    {
        Self::new(method_name, HttpMethod::Delete, path, handler)
    }

    pub fn middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn error_middleware(mut self, middleware: Arc<dyn ErrorMiddleware>) -> Self {
        self.error_middlewares.push(middleware);
        self
    }

    pub fn validate(mut self, validation: Validation) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Bind a request facet to argument position `weight`.
    pub fn bind(mut self, kind: ParamKind, weight: u32) -> Self {
        self.params = self.params.bind(kind, weight);
        self
    }
}

impl<C> fmt::Debug for MethodMetadata<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodMetadata")
            .field("method_name", &self.method_name)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("middlewares", &self.middlewares.len())
            .field("error_middlewares", &self.error_middlewares.len())
            .field("validation", &self.validation.is_some())
            .field("params", &self.params)
            .finish()
    }
}
