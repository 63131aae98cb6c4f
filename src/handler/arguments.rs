use crate::exception::RouteError;
use crate::metadata::ParamKind;
use axum::{
    body::Bytes,
    extract::Query,
    http::{HeaderMap, HeaderName, HeaderValue, Method, Uri, request::Parts},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use strum_macros::Display;

/// Kind of a positional argument handed to a controller method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ArgumentKind {
    Request,
    Response,
    Next,
    Body,
    Params,
    Query,
    File,
    Files,
}

impl From<ParamKind> for ArgumentKind {
    fn from(kind: ParamKind) -> Self {
        match kind {
            ParamKind::Body => ArgumentKind::Body,
            ParamKind::Params => ArgumentKind::Params,
            ParamKind::Query => ArgumentKind::Query,
            ParamKind::File => ArgumentKind::File,
            ParamKind::Files => ArgumentKind::Files,
        }
    }
}

/// One file part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Request head seen by the controller method. The body has already been
/// consumed into the bound arguments.
#[derive(Debug)]
pub struct RequestContext {
    parts: Parts,
}

impl RequestContext {
    pub(crate) fn new(parts: Parts) -> Self {
        Self { parts }
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn extension<T: Clone + Send + Sync + 'static>(&self) -> Option<&T> {
        self.parts.extensions.get::<T>()
    }
}

/// Lets a controller method add headers to the response it produces.
#[derive(Debug, Clone, Default)]
pub struct ResponseHandle {
    headers: Arc<Mutex<HeaderMap>>,
}

impl ResponseHandle {
    pub fn insert_header(&self, name: HeaderName, value: HeaderValue) {
        self.headers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
    }

    pub(crate) fn take_headers(&self) -> HeaderMap {
        std::mem::take(&mut *self.headers.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Hands an error to the error-middleware chain.
///
/// Once an error is passed, whatever the method returns is discarded.
#[derive(Debug, Clone, Default)]
pub struct NextHandle {
    error: Arc<OnceLock<RouteError>>,
}

impl NextHandle {
    /// Forward `error`. Only the first error passed is kept.
    pub fn error(&self, error: impl Into<RouteError>) {
        let _ = self.error.set(error.into());
    }

    pub(crate) fn forwarded(&self) -> Option<RouteError> {
        self.error.get().cloned()
    }
}

/// Decoded path parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(pub BTreeMap<String, String>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Parse parameter `name`, answering `400` when missing or malformed.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T, RouteError> {
        let raw = self
            .get(name)
            .ok_or_else(|| RouteError::bad_request(format!("Missing path parameter '{name}'")))?;
        raw.parse()
            .map_err(|_| RouteError::bad_request(format!("Invalid path parameter '{name}': {raw}")))
    }
}

/// Decoded query string, plus the original URI for typed deserialization.
#[derive(Debug, Clone)]
pub struct QueryParams {
    uri: Uri,
    values: BTreeMap<String, String>,
}

impl QueryParams {
    pub(crate) fn new(uri: Uri, values: BTreeMap<String, String>) -> Self {
        Self { uri, values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, RouteError> {
        Query::<T>::try_from_uri(&self.uri)
            .map(|Query(query)| query)
            .map_err(|e| RouteError::bad_request(e.body_text()))
    }
}

/// A positional argument of a controller method.
#[derive(Debug)]
pub enum Argument {
    Request(RequestContext),
    Response(ResponseHandle),
    Next(NextHandle),
    Body(Value),
    Params(PathParams),
    Query(QueryParams),
    File(Option<UploadedFile>),
    Files(Vec<UploadedFile>),
}

impl Argument {
    pub fn kind(&self) -> ArgumentKind {
        match self {
            Argument::Request(_) => ArgumentKind::Request,
            Argument::Response(_) => ArgumentKind::Response,
            Argument::Next(_) => ArgumentKind::Next,
            Argument::Body(_) => ArgumentKind::Body,
            Argument::Params(_) => ArgumentKind::Params,
            Argument::Query(_) => ArgumentKind::Query,
            Argument::File(_) => ArgumentKind::File,
            Argument::Files(_) => ArgumentKind::Files,
        }
    }
}

/// The argument list of one invocation, ordered by ascending weight.
///
/// Arguments can be read positionally or by kind.
#[derive(Debug)]
pub struct Arguments {
    values: Vec<Argument>,
}

impl Arguments {
    pub(crate) fn new(values: Vec<Argument>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Argument> {
        self.values.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.values.iter()
    }

    pub fn kinds(&self) -> Vec<ArgumentKind> {
        self.values.iter().map(Argument::kind).collect()
    }

    pub fn into_vec(self) -> Vec<Argument> {
        self.values
    }

    pub fn request(&self) -> Option<&RequestContext> {
        self.values.iter().find_map(|arg| match arg {
            Argument::Request(request) => Some(request),
            _ => None,
        })
    }

    pub fn response(&self) -> Option<&ResponseHandle> {
        self.values.iter().find_map(|arg| match arg {
            Argument::Response(response) => Some(response),
            _ => None,
        })
    }

    pub fn next(&self) -> Option<&NextHandle> {
        self.values.iter().find_map(|arg| match arg {
            Argument::Next(next) => Some(next),
            _ => None,
        })
    }

    pub fn body_value(&self) -> Option<&Value> {
        self.values.iter().find_map(|arg| match arg {
            Argument::Body(body) => Some(body),
            _ => None,
        })
    }

    /// Deserialize the bound body, answering `400` when it does not fit `T`.
    pub fn body<T: DeserializeOwned>(&self) -> Result<T, RouteError> {
        let body = self
            .body_value()
            .ok_or_else(|| RouteError::handler(anyhow::anyhow!("request body is not bound")))?;
        T::deserialize(body).map_err(|e| RouteError::bad_request(format!("Invalid request body: {e}")))
    }

    pub fn params(&self) -> Option<&PathParams> {
        self.values.iter().find_map(|arg| match arg {
            Argument::Params(params) => Some(params),
            _ => None,
        })
    }

    pub fn query(&self) -> Option<&QueryParams> {
        self.values.iter().find_map(|arg| match arg {
            Argument::Query(query) => Some(query),
            _ => None,
        })
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.values.iter().find_map(|arg| match arg {
            Argument::File(file) => file.as_ref(),
            _ => None,
        })
    }

    pub fn files(&self) -> &[UploadedFile] {
        self.values
            .iter()
            .find_map(|arg| match arg {
                Argument::Files(files) => Some(files.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }
}
