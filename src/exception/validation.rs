use super::{ErrorContext, ErrorMiddleware, ErrorOutcome, RouteError};
use async_trait::async_trait;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// Answers validation failures with a `400 Bad Request` describing the
/// failing segment. Every other error is forwarded.
#[derive(Debug, Default, Clone)]
pub struct DefaultValidationErrorMiddleware;

#[async_trait]
impl ErrorMiddleware for DefaultValidationErrorMiddleware {
    async fn handle(&self, error: RouteError, _context: &ErrorContext) -> ErrorOutcome {
        let RouteError::Validation(failure) = error else {
            return ErrorOutcome::Forward(error);
        };

        let status = StatusCode::BAD_REQUEST;
        let segment = failure.segment.to_string();
        let mut validation = serde_json::Map::new();
        validation.insert(
            segment.clone(),
            json!({
                "source": segment,
                "messages": failure.messages,
            }),
        );

        ErrorOutcome::Respond(
            (
                status,
                Json(json!({
                    "statusCode": status.as_u16(),
                    "error": status.canonical_reason().unwrap_or("Bad Request"),
                    "message": "Validation failed",
                    "validation": validation,
                })),
            )
                .into_response(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Segment, ValidationError};
    use axum::body::to_bytes;
    use axum::http::Request;
    use serde_json::Value;

    fn context() -> ErrorContext {
        ErrorContext::from_request(&Request::post("/todos").body(()).unwrap())
    }

    #[tokio::test]
    async fn answers_validation_errors() {
        let error = RouteError::from(ValidationError {
            segment: Segment::Body,
            messages: vec!["\"title\" is a required property".into()],
        });
        let ErrorOutcome::Respond(response) =
            DefaultValidationErrorMiddleware.handle(error, &context()).await
        else {
            panic!("validation errors must be answered");
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Bad Request");
        assert_eq!(body["validation"]["body"]["source"], "body");
        assert_eq!(
            body["validation"]["body"]["messages"][0],
            "\"title\" is a required property"
        );
    }

    #[tokio::test]
    async fn forwards_everything_else() {
        let outcome = DefaultValidationErrorMiddleware
            .handle(RouteError::not_found("nope"), &context())
            .await;
        assert!(matches!(outcome, ErrorOutcome::Forward(RouteError::Http { .. })));
    }
}
