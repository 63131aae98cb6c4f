use super::{ClassMetadata, MethodMetadata};
use crate::error::{Result, RoutewireError};
use dashmap::DashMap;
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

type MethodEntry = Arc<dyn Any + Send + Sync>;

/// Registry of controller metadata, keyed by controller type.
///
/// Populated once at startup through [`crate::Controller::register`] and
/// only read afterwards.
#[derive(Default)]
pub struct MetadataStore {
    classes: DashMap<TypeId, ClassMetadata>,
    methods: DashMap<TypeId, Vec<MethodEntry>>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach class metadata to `C`, replacing any earlier registration.
    pub fn register_class<C: 'static>(&mut self, metadata: ClassMetadata) -> &mut Self {
        self.classes.insert(TypeId::of::<C>(), metadata);
        self
    }

    /// Append a routed method to `C`. Registration order is routing order.
    pub fn register_method<C: Send + Sync + 'static>(
        &mut self,
        metadata: MethodMetadata<C>,
    ) -> &mut Self {
        self.methods
            .entry(TypeId::of::<C>())
            .or_default()
            .push(Arc::new(metadata));
        self
    }

    pub fn class_metadata<C: 'static>(&self) -> Result<ClassMetadata> {
        self.classes
            .get(&TypeId::of::<C>())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RoutewireError::MissingClassMetadata {
                controller: type_name::<C>().to_string(),
            })
    }

    /// Method entries of `C` in registration order. Empty if none were registered.
    pub fn method_metadata<C: Send + Sync + 'static>(&self) -> Result<Vec<Arc<MethodMetadata<C>>>> {
        let Some(entries) = self.methods.get(&TypeId::of::<C>()) else {
            return Ok(Vec::new());
        };
        entries
            .iter()
            .map(|entry| {
                entry
                    .clone()
                    .downcast::<MethodMetadata<C>>()
                    .map_err(|_| RoutewireError::DowncastFailed {
                        type_name: type_name::<MethodMetadata<C>>().to_string(),
                    })
            })
            .collect()
    }

    pub fn contains<C: 'static>(&self) -> bool {
        self.classes.contains_key(&TypeId::of::<C>())
    }

    /// Number of registered controllers.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Reply;
    use crate::handler::Arguments;
    use serde_json::json;

    struct Users;
    struct Orders;

    async fn list(_: Arc<Users>, _: Arguments) -> std::result::Result<Reply, crate::RouteError> {
        Ok(Reply::from(json!([])))
    }

    #[test]
    fn register_and_read_back() {
        let mut store = MetadataStore::new();
        store
            .register_class::<Users>(ClassMetadata::new("/users"))
            .register_method(MethodMetadata::<Users>::get("list", "/", list))
            .register_method(MethodMetadata::<Users>::post("create", "/", list));

        assert!(store.contains::<Users>());
        assert_eq!(store.class_metadata::<Users>().unwrap().base_url, "/users");

        let methods = store.method_metadata::<Users>().unwrap();
        let names: Vec<_> = methods.iter().map(|m| m.method_name.as_str()).collect();
        assert_eq!(names, ["list", "create"]);
    }

    #[test]
    fn missing_class_metadata_is_an_error() {
        let store = MetadataStore::new();
        let err = store.class_metadata::<Orders>().unwrap_err();
        assert!(matches!(err, RoutewireError::MissingClassMetadata { .. }));
        assert!(store.method_metadata::<Orders>().unwrap().is_empty());
    }
}
