use crate::exception::RouteError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

/// Explicit response returned by a controller method.
///
/// The generated handler emits exactly this status and JSON body.
///
/// # Example
/// ```
/// use routewire::common::HttpResponse;
/// use axum::http::StatusCode;
/// use serde_json::json;
///
/// let created = HttpResponse::new(StatusCode::CREATED, json!({ "id": 5 }));
/// assert_eq!(created.status, StatusCode::CREATED);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub json: Value,
}

impl HttpResponse {
    pub fn new(status: StatusCode, json: Value) -> Self {
        Self { status, json }
    }

    /// Serialize `data` as the body of a response with `status`.
    pub fn with<T: Serialize>(status: StatusCode, data: &T) -> Result<Self, RouteError> {
        let json = serde_json::to_value(data).map_err(RouteError::handler)?;
        Ok(Self::new(status, json))
    }

    pub fn created(json: Value) -> Self {
        Self::new(StatusCode::CREATED, json)
    }

    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT, Value::Null)
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        if self.status == StatusCode::NO_CONTENT {
            return self.status.into_response();
        }
        (self.status, Json(self.json)).into_response()
    }
}

/// What a controller method hands back to the generated handler.
///
/// A bare value is sent as `200 OK` JSON, an [`HttpResponse`] as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Json(Value),
    Http(HttpResponse),
}

impl Reply {
    /// Serialize `data` into a plain `200 OK` reply.
    pub fn json<T: Serialize>(data: &T) -> Result<Self, RouteError> {
        serde_json::to_value(data)
            .map(Reply::Json)
            .map_err(RouteError::handler)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Reply::Json(_) => StatusCode::OK,
            Reply::Http(response) => response.status,
        }
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Json(value)
    }
}

impl From<HttpResponse> for Reply {
    fn from(response: HttpResponse) -> Self {
        Reply::Http(response)
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Json(value) => (StatusCode::OK, Json(value)).into_response(),
            Reply::Http(response) => response.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::json;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn plain_reply_is_ok_json() {
        let response = Reply::from(json!({ "ok": true })).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn http_reply_keeps_status_and_body() {
        let response = Reply::from(HttpResponse::created(json!({ "id": 5 }))).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await, json!({ "id": 5 }));
    }

    #[test]
    fn serializes_structs() {
        #[derive(Serialize)]
        struct Todo {
            id: u32,
        }
        assert_eq!(Reply::json(&Todo { id: 1 }).unwrap(), Reply::Json(json!({ "id": 1 })));
        let response = HttpResponse::with(StatusCode::ACCEPTED, &Todo { id: 2 }).unwrap();
        assert_eq!(response.json, json!({ "id": 2 }));
    }
}
