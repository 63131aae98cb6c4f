use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};

/// Request facets a controller method can bind to an argument position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ParamKind {
    /// Parsed request body (JSON, or multipart text fields).
    Body,
    /// Path parameters.
    Params,
    /// Query string parameters.
    Query,
    /// First uploaded file of a multipart body.
    File,
    /// Every uploaded file of a multipart body.
    Files,
}

/// Maps binding keys to the argument position (weight) they occupy.
///
/// Each key is bound at most once; binding it again replaces the weight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamsIndex {
    bindings: BTreeMap<ParamKind, u32>,
}

impl ParamsIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, kind: ParamKind, weight: u32) -> Self {
        self.bindings.insert(kind, weight);
        self
    }

    pub fn weight(&self, kind: ParamKind) -> Option<u32> {
        self.bindings.get(&kind).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParamKind, u32)> + '_ {
        self.bindings.iter().map(|(kind, weight)| (*kind, *weight))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
