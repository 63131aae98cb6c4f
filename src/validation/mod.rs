//! Request validation
//!
//! Schemas are plain JSON Schema documents, one per request segment, checked
//! with the `jsonschema` crate by the middleware built in
//! [`generate_validation_middleware`].

use crate::error::{Result, RoutewireError};
use crate::middleware::Middleware;
use serde_json::Value;
use std::sync::Arc;
use strum_macros::{Display, EnumString};
use thiserror::Error;

mod middleware;

pub use middleware::ValidationMiddleware;

/// Part of the request a schema applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Segment {
    Params,
    Query,
    Body,
}

/// JSON Schema documents per request segment.
///
/// Path and query values are strings, so their schemas should describe
/// objects of strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationSchema {
    pub params: Option<Value>,
    pub query: Option<Value>,
    pub body: Option<Value>,
}

impl ValidationSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(mut self, schema: Value) -> Self {
        self.params = Some(schema);
        self
    }

    pub fn query(mut self, schema: Value) -> Self {
        self.query = Some(schema);
        self
    }

    pub fn body(mut self, schema: Value) -> Self {
        self.body = Some(schema);
        self
    }

    pub(crate) fn segments(&self) -> impl Iterator<Item = (Segment, &Value)> {
        [
            (Segment::Params, self.params.as_ref()),
            (Segment::Query, self.query.as_ref()),
            (Segment::Body, self.body.as_ref()),
        ]
        .into_iter()
        .filter_map(|(segment, schema)| schema.map(|schema| (segment, schema)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Stop at the first failure in a segment.
    pub abort_early: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self { abort_early: true }
    }
}

/// A validation declaration: schema plus options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    pub schema: ValidationSchema,
    pub options: ValidationOptions,
}

impl Validation {
    pub fn new(schema: ValidationSchema) -> Self {
        Self {
            schema,
            options: ValidationOptions::default(),
        }
    }

    pub fn options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }
}

/// A request segment did not match its schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{segment} validation failed: {summary}", summary = .messages.join("; "))]
pub struct ValidationError {
    pub segment: Segment,
    pub messages: Vec<String>,
}

/// Compile a validation declaration into middleware.
///
/// Schemas are compiled here, so a malformed schema fails router
/// construction rather than the first request.
pub fn generate_validation_middleware(validation: &Validation) -> Result<Arc<dyn Middleware>> {
    let mut validators = Vec::new();
    for (segment, schema) in validation.schema.segments() {
        let validator =
            jsonschema::validator_for(schema).map_err(|e| RoutewireError::InvalidSchema {
                segment: segment.to_string(),
                message: e.to_string(),
            })?;
        validators.push((segment, validator));
    }
    Ok(Arc::new(ValidationMiddleware::new(validators, validation.options)))
}
