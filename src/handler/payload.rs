//! Request facet readers shared by the handler and the validation middleware.

use super::UploadedFile;
use crate::exception::RouteError;
use axum::{
    body::{Body, Bytes, to_bytes},
    extract::{Form, FromRequest, FromRequestParts, Multipart, Query, RawPathParams},
    http::{HeaderMap, Method, Request, StatusCode, Uri, header::CONTENT_TYPE, request::Parts},
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Largest body the generated handlers will buffer.
pub const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Body and uploaded files of a request.
#[derive(Debug)]
pub(crate) struct Payload {
    pub body: Value,
    pub files: Vec<UploadedFile>,
}

impl Payload {
    fn empty() -> Self {
        Self {
            body: Value::Object(Map::new()),
            files: Vec::new(),
        }
    }
}

pub(crate) async fn read_bytes(body: Body) -> Result<Bytes, RouteError> {
    to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|e| RouteError::bad_request(format!("Failed to read request body: {e}")))
}

/// Path parameters of the matched route, empty outside of routing.
pub(crate) async fn path_params(parts: &mut Parts) -> BTreeMap<String, String> {
    match RawPathParams::from_request_parts(parts, &()).await {
        Ok(params) => params
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        Err(_) => BTreeMap::new(),
    }
}

pub(crate) fn query_params(uri: &Uri) -> Result<BTreeMap<String, String>, RouteError> {
    Query::<BTreeMap<String, String>>::try_from_uri(uri)
        .map(|Query(query)| query)
        .map_err(|e| RouteError::bad_request(e.body_text()))
}

pub(crate) fn params_value(params: &BTreeMap<String, String>) -> Value {
    Value::Object(
        params
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect(),
    )
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    essence.eq_ignore_ascii_case("application/json") || essence.ends_with("+json")
}

/// Decode a buffered body according to its content type.
///
/// JSON bodies are parsed, urlencoded forms become an object of strings and
/// multipart bodies are split into text fields (the body object) and files.
/// An empty body yields `{}`. Any other non-empty body is rejected with 415.
pub(crate) async fn parse(headers: &HeaderMap, bytes: Bytes) -> Result<Payload, RouteError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("multipart/form-data") {
        return parse_multipart(content_type, bytes).await;
    }
    if bytes.is_empty() {
        return Ok(Payload::empty());
    }
    if content_type.starts_with("application/x-www-form-urlencoded") {
        return parse_form(content_type, bytes).await;
    }
    if !is_json(content_type) {
        return Err(RouteError::http(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("Unsupported body content type: '{content_type}'"),
        ));
    }
    let body = serde_json::from_slice(&bytes)
        .map_err(|e| RouteError::bad_request(format!("Malformed JSON body: {e}")))?;
    Ok(Payload {
        body,
        files: Vec::new(),
    })
}

/// A minimal request carrying only what axum's body extractors look at.
fn rebuild(content_type: &str, bytes: Bytes) -> Result<Request<Body>, RouteError> {
    Request::builder()
        .method(Method::POST)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(bytes))
        .map_err(RouteError::handler)
}

async fn parse_form(content_type: &str, bytes: Bytes) -> Result<Payload, RouteError> {
    let Form(fields) = Form::<BTreeMap<String, String>>::from_request(rebuild(content_type, bytes)?, &())
        .await
        .map_err(|e| RouteError::bad_request(e.body_text()))?;
    let mut payload = Payload::empty();
    payload.body = params_value(&fields);
    Ok(payload)
}

async fn parse_multipart(content_type: &str, bytes: Bytes) -> Result<Payload, RouteError> {
    let mut multipart = Multipart::from_request(rebuild(content_type, bytes)?, &())
        .await
        .map_err(|e| RouteError::bad_request(e.body_text()))?;

    let mut payload = Payload::empty();
    let mut fields = Map::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RouteError::bad_request(e.body_text()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        if field.file_name().is_some() {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| RouteError::bad_request(e.body_text()))?;
            payload.files.push(UploadedFile {
                field_name,
                file_name,
                content_type,
                data,
            });
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| RouteError::bad_request(e.body_text()))?;
            fields.insert(field_name, Value::String(text));
        }
    }
    payload.body = Value::Object(fields);
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[tokio::test]
    async fn json_bodies_are_parsed() {
        let payload = parse(&headers("application/json; charset=utf-8"), Bytes::from_static(b"{\"a\":1}"))
            .await
            .unwrap();
        assert_eq!(payload.body, json!({ "a": 1 }));
    }

    #[tokio::test]
    async fn empty_bodies_are_empty_objects() {
        let empty = parse(&headers("application/json"), Bytes::new()).await.unwrap();
        assert_eq!(empty.body, json!({}));
        let untyped = parse(&HeaderMap::new(), Bytes::new()).await.unwrap();
        assert_eq!(untyped.body, json!({}));
    }

    #[tokio::test]
    async fn urlencoded_forms_become_string_objects() {
        let payload = parse(
            &headers("application/x-www-form-urlencoded"),
            Bytes::from_static(b"title=buy+milk&done=false"),
        )
        .await
        .unwrap();
        assert_eq!(payload.body, json!({ "title": "buy milk", "done": "false" }));
    }

    #[tokio::test]
    async fn foreign_or_untyped_bodies_are_unsupported() {
        let text = parse(&headers("text/plain"), Bytes::from_static(b"hi")).await.unwrap_err();
        assert_eq!(text.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let untyped = parse(&HeaderMap::new(), Bytes::from_static(b"{\"a\":1}"))
            .await
            .unwrap_err();
        assert_eq!(untyped.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn multipart_splits_fields_and_files() {
        let body = "--XYZ\r\n\
            Content-Disposition: form-data; name=\"title\"\r\n\r\n\
            report\r\n\
            --XYZ\r\n\
            Content-Disposition: form-data; name=\"doc\"; filename=\"a.txt\"\r\n\
            Content-Type: text/plain\r\n\r\n\
            hello\r\n\
            --XYZ--\r\n";
        let payload = parse(
            &headers("multipart/form-data; boundary=XYZ"),
            Bytes::from(body),
        )
        .await
        .unwrap();
        assert_eq!(payload.body, json!({ "title": "report" }));
        assert_eq!(payload.files.len(), 1);
        let file = &payload.files[0];
        assert_eq!(file.field_name, "doc");
        assert_eq!(file.file_name.as_deref(), Some("a.txt"));
        assert_eq!(file.content_type.as_deref(), Some("text/plain"));
        assert_eq!(&file.data[..], b"hello");
    }

    #[test]
    fn query_strings_decode() {
        let uri: Uri = "/todos?done=true&q=a%20b".parse().unwrap();
        let query = query_params(&uri).unwrap();
        assert_eq!(query["done"], "true");
        assert_eq!(query["q"], "a b");
    }
}
