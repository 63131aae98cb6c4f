use crate::error::{Result, RoutewireError};
use axum::handler::Handler;
use axum::routing::{MethodFilter, MethodRouter, any, on};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// HTTP verb a controller method is routed on.
///
/// `All` matches every verb, like Express' `router.all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
    All,
}

impl HttpMethod {
    /// Parse a verb name, failing with a configuration error on unknown verbs.
    pub fn parse(verb: &str) -> Result<Self> {
        HttpMethod::from_str(verb.trim()).map_err(|_| RoutewireError::UnknownVerb {
            verb: verb.to_string(),
        })
    }

    fn filter(self) -> Option<MethodFilter> {
        match self {
            HttpMethod::Get => Some(MethodFilter::GET),
            HttpMethod::Post => Some(MethodFilter::POST),
            HttpMethod::Put => Some(MethodFilter::PUT),
            HttpMethod::Patch => Some(MethodFilter::PATCH),
            HttpMethod::Delete => Some(MethodFilter::DELETE),
            HttpMethod::Head => Some(MethodFilter::HEAD),
            HttpMethod::Options => Some(MethodFilter::OPTIONS),
            HttpMethod::Trace => Some(MethodFilter::TRACE),
            HttpMethod::All => None,
        }
    }

    /// Whether two verbs registered on the same path would overlap.
    pub(crate) fn overlaps(self, other: HttpMethod) -> bool {
        self == other || self == HttpMethod::All || other == HttpMethod::All
    }

    pub(crate) fn method_router<H, T>(self, handler: H) -> MethodRouter
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        match self.filter() {
            Some(filter) => on(filter, handler),
            None => any(handler),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_verbs_case_insensitively() {
        assert_eq!(HttpMethod::parse("get").unwrap(), HttpMethod::Get);
        assert_eq!(HttpMethod::parse("DELETE").unwrap(), HttpMethod::Delete);
        assert_eq!(HttpMethod::parse(" Patch ").unwrap(), HttpMethod::Patch);
        assert_eq!(HttpMethod::Options.to_string(), "OPTIONS");
    }

    #[test]
    fn rejects_unknown_verbs() {
        let err = HttpMethod::parse("PURGE").unwrap_err();
        assert!(matches!(err, RoutewireError::UnknownVerb { verb } if verb == "PURGE"));
    }

    #[test]
    fn all_overlaps_every_verb() {
        assert!(HttpMethod::All.overlaps(HttpMethod::Get));
        assert!(HttpMethod::Post.overlaps(HttpMethod::All));
        assert!(HttpMethod::Put.overlaps(HttpMethod::Put));
        assert!(!HttpMethod::Get.overlaps(HttpMethod::Post));
    }
}
