use super::ArgumentKind;
use crate::error::{Result, RoutewireError};
use crate::metadata::ParamsIndex;

/// Reserved weight of the request argument.
pub const REQUEST_WEIGHT: u32 = 100;
/// Reserved weight of the response argument.
pub const RESPONSE_WEIGHT: u32 = 101;
/// Reserved weight of the next argument.
pub const NEXT_WEIGHT: u32 = 102;

const RESERVED: [(u32, ArgumentKind); 3] = [
    (REQUEST_WEIGHT, ArgumentKind::Request),
    (RESPONSE_WEIGHT, ArgumentKind::Response),
    (NEXT_WEIGHT, ArgumentKind::Next),
];

/// Argument order of one controller method, fixed when the route is built.
///
/// Weights must be pairwise distinct and must not use a reserved weight, so
/// the order never depends on tie-breaking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPlan {
    slots: Vec<ArgumentKind>,
}

impl ExtractionPlan {
    pub fn compile(params: &ParamsIndex) -> Result<Self> {
        let mut entries: Vec<(u32, ArgumentKind)> = RESERVED.to_vec();

        for (kind, weight) in params.iter() {
            let kind = ArgumentKind::from(kind);
            if let Some((_, reserved)) = RESERVED.iter().find(|(w, _)| *w == weight) {
                return Err(RoutewireError::ReservedWeight {
                    weight,
                    kind: kind.to_string(),
                    reserved: reserved.to_string(),
                });
            }
            if let Some((_, first)) = entries.iter().find(|(w, _)| *w == weight) {
                return Err(RoutewireError::DuplicateWeight {
                    weight,
                    first: first.to_string(),
                    second: kind.to_string(),
                });
            }
            entries.push((weight, kind));
        }

        entries.sort_by_key(|(weight, _)| *weight);
        Ok(Self {
            slots: entries.into_iter().map(|(_, kind)| kind).collect(),
        })
    }

    pub fn slots(&self) -> &[ArgumentKind] {
        &self.slots
    }

    pub fn needs(&self, kind: ArgumentKind) -> bool {
        self.slots.contains(&kind)
    }

    /// Whether the body must be buffered to serve this plan.
    pub fn needs_payload(&self) -> bool {
        self.needs(ArgumentKind::Body) || self.needs(ArgumentKind::File) || self.needs(ArgumentKind::Files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ParamKind;
    use crate::handler::ArgumentKind::*;

    #[test]
    fn unbound_methods_get_request_response_next() {
        let plan = ExtractionPlan::compile(&ParamsIndex::new()).unwrap();
        assert_eq!(plan.slots(), [Request, Response, Next]);
        assert!(!plan.needs_payload());
    }

    #[test]
    fn bindings_sort_around_reserved_weights() {
        let params = ParamsIndex::new()
            .bind(ParamKind::Query, 200)
            .bind(ParamKind::Body, 0)
            .bind(ParamKind::Params, 1);
        let plan = ExtractionPlan::compile(&params).unwrap();
        assert_eq!(plan.slots(), [Body, Params, Request, Response, Next, Query]);
        assert!(plan.needs_payload());
    }

    #[test]
    fn duplicate_weights_are_rejected() {
        let params = ParamsIndex::new()
            .bind(ParamKind::Body, 0)
            .bind(ParamKind::Query, 0);
        let err = ExtractionPlan::compile(&params).unwrap_err();
        assert!(matches!(
            err,
            RoutewireError::DuplicateWeight { weight: 0, ref first, ref second }
                if first == "body" && second == "query"
        ));
    }

    #[test]
    fn reserved_weights_are_rejected() {
        let params = ParamsIndex::new().bind(ParamKind::File, RESPONSE_WEIGHT);
        let err = ExtractionPlan::compile(&params).unwrap_err();
        assert!(matches!(
            err,
            RoutewireError::ReservedWeight { weight: 101, ref reserved, .. } if reserved == "response"
        ));
    }
}
