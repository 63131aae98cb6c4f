use super::{ErrorContext, ErrorMiddleware, ErrorOutcome, RouteError};
use async_trait::async_trait;
use axum::{
    Json,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

/// Catch-all error middleware installed last by the combiner.
///
/// Answers every error with `{"statusCode", "message", "timestamp"}`.
/// Server-side failures are logged and their message is not exposed.
#[derive(Debug, Default, Clone)]
pub struct DefaultHttpErrorMiddleware;

#[async_trait]
impl ErrorMiddleware for DefaultHttpErrorMiddleware {
    async fn handle(&self, error: RouteError, context: &ErrorContext) -> ErrorOutcome {
        let status = error.status();
        let message = if status.is_server_error() {
            tracing::error!(
                method = %context.method,
                uri = %context.uri,
                "Unhandled error: {}",
                error
            );
            StatusCode::INTERNAL_SERVER_ERROR
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        } else {
            error.to_string()
        };

        ErrorOutcome::Respond(
            (
                status,
                Json(json!({
                    "statusCode": status.as_u16(),
                    "message": message,
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                })),
            )
                .into_response(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::Request;
    use serde_json::Value;

    async fn answer(error: RouteError) -> (StatusCode, Value) {
        let request = Request::get("/todos/1").body(()).unwrap();
        let context = ErrorContext::from_request(&request);
        let ErrorOutcome::Respond(response) =
            DefaultHttpErrorMiddleware.handle(error, &context).await
        else {
            panic!("default http middleware must respond");
        };
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn client_errors_keep_their_message() {
        let (status, body) = answer(RouteError::not_found("Todo 1 not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["statusCode"], 404);
        assert_eq!(body["message"], "Todo 1 not found");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn server_errors_are_masked() {
        let (status, body) = answer(RouteError::handler(anyhow::anyhow!("db password wrong"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal Server Error");
    }
}
