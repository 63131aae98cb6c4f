use routewire::prelude::*;
use std::time::Instant;

pub struct HealthController {
    started: Instant,
}

impl HealthController {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    async fn check(self: Arc<Self>, _args: Arguments) -> Result<Reply, RouteError> {
        Ok(Reply::from(json!({
            "status": "up",
            "uptimeSeconds": self.started.elapsed().as_secs(),
        })))
    }
}

impl Controller for HealthController {
    fn register(store: &mut MetadataStore) -> routewire::Result<()> {
        store
            .register_class::<Self>(ClassMetadata::new("/"))
            .register_method(MethodMetadata::get("check", "/health", Self::check));
        Ok(())
    }
}
