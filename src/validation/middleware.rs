use super::{Segment, ValidationError, ValidationOptions};
use crate::exception::RouteError;
use crate::handler::payload;
use crate::middleware::{Middleware, Next};
use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};
use jsonschema::Validator;
use serde_json::Value;

/// Checks path parameters, query and body against compiled schemas before
/// the request goes any further. Failures become [`RouteError::Validation`].
pub struct ValidationMiddleware {
    validators: Vec<(Segment, Validator)>,
    options: ValidationOptions,
}

impl ValidationMiddleware {
    pub(crate) fn new(validators: Vec<(Segment, Validator)>, options: ValidationOptions) -> Self {
        Self {
            validators,
            options,
        }
    }

    fn check(&self, segment: Segment, validator: &Validator, instance: &Value) -> Result<(), ValidationError> {
        let mut messages = Vec::new();
        for error in validator.iter_errors(instance) {
            messages.push(error.to_string());
            if self.options.abort_early {
                break;
            }
        }
        if messages.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { segment, messages })
        }
    }
}

#[async_trait]
impl Middleware for ValidationMiddleware {
    async fn handle(&self, request: Request<Body>, next: Next) -> Result<Response, RouteError> {
        let (mut parts, body) = request.into_parts();
        let needs_body = self
            .validators
            .iter()
            .any(|(segment, _)| *segment == Segment::Body);
        let (body, bytes) = if needs_body {
            let bytes = payload::read_bytes(body).await?;
            (Body::from(bytes.clone()), Some(bytes))
        } else {
            (body, None)
        };

        for (segment, validator) in &self.validators {
            let instance = match segment {
                Segment::Params => payload::params_value(&payload::path_params(&mut parts).await),
                Segment::Query => payload::params_value(&payload::query_params(&parts.uri)?),
                Segment::Body => match &bytes {
                    Some(bytes) => payload::parse(&parts.headers, bytes.clone()).await?.body,
                    None => Value::Null,
                },
            };
            self.check(*segment, validator, &instance)?;
        }

        Ok(next.run(Request::from_parts(parts, body)).await)
    }
}

#[cfg(test)]
mod tests {
    use crate::exception::{PendingError, RouteError};
    use crate::middleware::MiddlewareLayer;
    use crate::validation::{Segment, Validation, ValidationOptions, ValidationSchema, generate_validation_middleware};
    use axum::{Router, body::Body, http::{Request, StatusCode}, routing::post};
    use serde_json::json;
    use tower::ServiceExt;

    fn app(validation: Validation) -> Router {
        let middleware = generate_validation_middleware(&validation).unwrap();
        Router::new()
            .route("/items/{id}", post(|body: String| async move { body }))
            .layer(MiddlewareLayer::new(middleware))
    }

    fn schema() -> ValidationSchema {
        ValidationSchema::new()
            .params(json!({
                "type": "object",
                "properties": { "id": { "type": "string", "pattern": "^[0-9]+$" } }
            }))
            .body(json!({
                "type": "object",
                "required": ["title", "done"],
                "properties": {
                    "title": { "type": "string" },
                    "done": { "type": "boolean" }
                }
            }))
    }

    fn request(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_requests_pass_with_body_intact() {
        let response = app(Validation::new(schema()))
            .oneshot(request("/items/7", r#"{"title":"milk","done":false}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"title":"milk","done":false}"#);
    }

    #[tokio::test]
    async fn params_are_checked_before_body() {
        let response = app(Validation::new(schema()))
            .oneshot(request("/items/abc", "{}"))
            .await
            .unwrap();
        let Some(RouteError::Validation(err)) = PendingError::of(&response) else {
            panic!("expected a validation error");
        };
        assert_eq!(err.segment, Segment::Params);
    }

    #[tokio::test]
    async fn abort_early_controls_how_many_failures_are_reported() {
        let response = app(Validation::new(schema()))
            .oneshot(request("/items/1", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let Some(RouteError::Validation(err)) = PendingError::of(&response) else {
            panic!("expected a validation error");
        };
        assert_eq!(err.messages.len(), 1);

        let exhaustive = Validation::new(schema()).options(ValidationOptions { abort_early: false });
        let response = app(exhaustive)
            .oneshot(request("/items/1", r#"{"title":3}"#))
            .await
            .unwrap();
        let Some(RouteError::Validation(err)) = PendingError::of(&response) else {
            panic!("expected a validation error");
        };
        assert_eq!(err.segment, Segment::Body);
        assert_eq!(err.messages.len(), 2);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let response = app(Validation::new(schema()))
            .oneshot(request("/items/1", "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(PendingError::of(&response), Some(RouteError::Http { .. })));
    }
}
