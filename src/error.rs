use thiserror::Error;

pub type Result<T> = std::result::Result<T, RoutewireError>;

/// Errors raised while turning controller metadata into a router.
///
/// These are configuration errors: they surface when the router is built,
/// never while a request is being served.
#[derive(Debug, Error)]
pub enum RoutewireError {
    #[error("No class metadata registered for controller {controller}")]
    MissingClassMetadata { controller: String },

    #[error("Failed to downcast metadata for: {type_name}")]
    DowncastFailed { type_name: String },

    #[error("Unknown HTTP verb: {verb}")]
    UnknownVerb { verb: String },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Duplicate route {method} {path} in controller {controller}, already mapped by {existing}")]
    DuplicateRoute {
        method: String,
        path: String,
        controller: String,
        existing: String,
    },

    #[error("Route {path} of controller {controller} captures differently than {existing}")]
    ConflictingRoute {
        path: String,
        existing: String,
        controller: String,
    },

    #[error("Argument weight {weight} is bound to both {first} and {second}")]
    DuplicateWeight {
        weight: u32,
        first: String,
        second: String,
    },

    #[error("Argument weight {weight} of {kind} collides with the reserved {reserved} slot")]
    ReservedWeight {
        weight: u32,
        kind: String,
        reserved: String,
    },

    #[error("Invalid {segment} schema: {message}")]
    InvalidSchema { segment: String, message: String },

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidConfig { key: String, value: String },
}
