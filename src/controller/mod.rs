//! Router generation
//!
//! [`generate_router`] reads one controller's metadata and builds its router
//! fragment:
//!
//! ```text
//! base_url
//! └── [class validation] [class middlewares...]
//!     ├── VERB path: [validation] [middlewares...] handler [error middlewares...]
//!     └── ...
//!     [class error middlewares...]
//! ```

use crate::error::{Result, RoutewireError};
use crate::exception::ErrorLayer;
use crate::handler::RequestHandler;
use crate::metadata::{MetadataStore, MethodMetadata};
use crate::middleware::{Middleware, MiddlewareLayer};
use crate::validation::{Validation, generate_validation_middleware};
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::routing::MethodRouter;
use std::any::type_name;
use std::sync::Arc;

mod routes;

pub use routes::RouteTable;

/// A type whose methods are routed.
///
/// Implementors describe themselves once by registering class and method
/// metadata; the router is then built from a shared instance.
///
/// # Example
/// ```
/// use routewire::prelude::*;
///
/// struct HealthController;
///
/// impl HealthController {
///     async fn check(self: Arc<Self>, _args: Arguments) -> Result<Reply, RouteError> {
///         Ok(Reply::from(json!({ "status": "up" })))
///     }
/// }
///
/// impl Controller for HealthController {
///     fn register(store: &mut MetadataStore) -> routewire::Result<()> {
///         store
///             .register_class::<Self>(ClassMetadata::new("/health"))
///             .register_method(MethodMetadata::get("check", "/", Self::check));
///         Ok(())
///     }
/// }
///
/// let mut store = MetadataStore::new();
/// HealthController::register(&mut store).unwrap();
/// let router = generate_router(&store, Arc::new(HealthController)).unwrap();
/// # let _: Router = router;
/// ```
pub trait Controller: Send + Sync + Sized + 'static {
    /// Register class and method metadata for this controller.
    fn register(store: &mut MetadataStore) -> Result<()>;
}

/// Build the router fragment of `controller`, nested under its base url.
pub fn generate_router<C>(store: &MetadataStore, controller: Arc<C>) -> Result<Router>
where
    C: Send + Sync + 'static,
{
    mount_router(store, controller, &mut RouteTable::new())
}

/// Like [`generate_router`], checking every mapped route against `routes`
/// so fragments mounted on one router cannot clash.
pub(crate) fn mount_router<C>(
    store: &MetadataStore,
    controller: Arc<C>,
    routes: &mut RouteTable,
) -> Result<Router>
where
    C: Send + Sync + 'static,
{
    let controller_name = type_name::<C>();
    let class = store.class_metadata::<C>()?;
    let methods = store.method_metadata::<C>()?;
    let base_url = normalize_base_url(&class.base_url)?;

    let mut router = Router::new();
    for method in methods {
        let path = normalize_route_path(&method.path)?;
        let full_path = join_paths(&base_url, &path);
        routes.insert(method.method, &full_path, controller_name)?;

        let route = route_chain(controller.clone(), &method)?;
        router = router.route(&path, route);
        tracing::debug!(
            "Mapped {{{} {}}} to {}::{}",
            method.method,
            full_path,
            controller_name,
            method.method_name
        );
    }

    for middleware in class.middlewares.iter().rev() {
        router = router.layer(MiddlewareLayer::new(middleware.clone()));
    }
    if let Some(validation) = &class.validation {
        router = router.layer(validation_layer(validation)?);
    }
    for error_middleware in &class.error_middlewares {
        router = router.layer(ErrorLayer::new(error_middleware.clone()));
    }

    if base_url == "/" {
        Ok(router)
    } else {
        Ok(Router::new().nest(&base_url, router))
    }
}

/// `[validation] [middlewares...] handler [error middlewares...]` for one method.
fn route_chain<C>(controller: Arc<C>, method: &MethodMetadata<C>) -> Result<MethodRouter>
where
    C: Send + Sync + 'static,
{
    let handler = RequestHandler::new(controller, method.handler.clone(), &method.params)?;
    let mut route = method.method.method_router(move |request: Request<Body>| {
        let handler = handler.clone();
        async move { handler.handle(request).await }
    });

    // Layers added last run first.
    for middleware in method.middlewares.iter().rev() {
        route = route.layer(MiddlewareLayer::new(middleware.clone()));
    }
    if let Some(validation) = &method.validation {
        route = route.layer(validation_layer(validation)?);
    }
    for error_middleware in &method.error_middlewares {
        route = route.layer(ErrorLayer::new(error_middleware.clone()));
    }
    Ok(route)
}

fn validation_layer(validation: &Validation) -> Result<MiddlewareLayer> {
    let middleware: Arc<dyn Middleware> = generate_validation_middleware(validation)?;
    Ok(MiddlewareLayer::new(middleware))
}

fn normalize_base_url(base_url: &str) -> Result<String> {
    if !base_url.starts_with('/') {
        return Err(RoutewireError::InvalidPath {
            path: base_url.to_string(),
            reason: "base url must start with '/'".to_string(),
        });
    }
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok("/".to_string());
    }
    let translated = translate_segments(trimmed);
    if translated.split('/').any(|segment| segment.starts_with("{*")) {
        return Err(RoutewireError::InvalidPath {
            path: base_url.to_string(),
            reason: "base url cannot contain a wildcard".to_string(),
        });
    }
    check_segments(base_url, &translated)?;
    Ok(translated)
}

fn normalize_route_path(path: &str) -> Result<String> {
    if !path.starts_with('/') {
        return Err(RoutewireError::InvalidPath {
            path: path.to_string(),
            reason: "route path must start with '/'".to_string(),
        });
    }
    let translated = translate_segments(path);
    check_segments(path, &translated)?;
    Ok(translated)
}

/// Rewrite Express-style `:name` segments to `{name}`, `*name` to
/// `{*name}` and a bare `*` to `{*wildcard}`.
fn translate_segments(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':') {
                format!("{{{name}}}")
            } else if segment == "*" {
                "{*wildcard}".to_string()
            } else if let Some(name) = segment.strip_prefix('*') {
                format!("{{*{name}}}")
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Captures need a name and a wildcard may only end the path.
fn check_segments(original: &str, translated: &str) -> Result<()> {
    let segments: Vec<&str> = translated.split('/').collect();
    let last = segments.len() - 1;
    for (position, segment) in segments.iter().enumerate() {
        let reason = if *segment == "{}" || *segment == "{*}" {
            "parameter name must not be empty"
        } else if segment.starts_with("{*") && position != last {
            "wildcard must be the last segment"
        } else {
            continue;
        };
        return Err(RoutewireError::InvalidPath {
            path: original.to_string(),
            reason: reason.to_string(),
        });
    }
    Ok(())
}

fn join_paths(base_url: &str, path: &str) -> String {
    match (base_url, path) {
        ("/", path) => path.to_string(),
        (base, "/") => base.to_string(),
        (base, path) => format!("{base}{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn express_segments_are_translated() {
        assert_eq!(normalize_route_path("/:id").unwrap(), "/{id}");
        assert_eq!(
            normalize_route_path("/:owner/files/*").unwrap(),
            "/{owner}/files/{*wildcard}"
        );
        assert_eq!(normalize_route_path("/{id}").unwrap(), "/{id}");
    }

    #[test]
    fn base_urls_are_normalized() {
        assert_eq!(normalize_base_url("/todos/").unwrap(), "/todos");
        assert_eq!(normalize_base_url("/").unwrap(), "/");
        assert_eq!(normalize_base_url("/users/:id").unwrap(), "/users/{id}");
    }

    #[test]
    fn relative_paths_are_rejected() {
        assert!(matches!(
            normalize_base_url("todos"),
            Err(RoutewireError::InvalidPath { .. })
        ));
        assert!(matches!(
            normalize_route_path("list"),
            Err(RoutewireError::InvalidPath { .. })
        ));
    }

    #[test]
    fn wildcards_must_end_the_path() {
        assert_eq!(normalize_route_path("/files/*rest").unwrap(), "/files/{*rest}");
        let err = normalize_route_path("/files/*/meta").unwrap_err();
        assert!(matches!(
            err,
            RoutewireError::InvalidPath { ref reason, .. } if reason == "wildcard must be the last segment"
        ));
        assert!(matches!(
            normalize_base_url("/assets/*"),
            Err(RoutewireError::InvalidPath { .. })
        ));
    }

    #[test]
    fn unnamed_captures_are_rejected() {
        assert!(matches!(
            normalize_route_path("/items/:"),
            Err(RoutewireError::InvalidPath { ref reason, .. }) if reason == "parameter name must not be empty"
        ));
    }

    #[test]
    fn joined_paths_for_logging() {
        assert_eq!(join_paths("/", "/ping"), "/ping");
        assert_eq!(join_paths("/todos", "/"), "/todos");
        assert_eq!(join_paths("/todos", "/{id}"), "/todos/{id}");
    }
}
