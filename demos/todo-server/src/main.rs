use routewire::prelude::*;
use tower_http::trace::TraceLayer;

mod health;
mod todo;

use health::HealthController;
use todo::{TodoController, TodoService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("🚀 Starting Todo Server...");

    let config = ConfigService::from_env();
    let options = CombineOptions::from_config(&config)?;

    let mut store = MetadataStore::new();
    HealthController::register(&mut store)?;
    TodoController::register(&mut store)?;

    let service = Arc::new(TodoService::new());
    let controllers = ControllerSet::new()
        .add(Arc::new(HealthController::new()))
        .add(Arc::new(TodoController::new(service)));
    let app = combine_controllers(&store, controllers, &options)?.layer(TraceLayer::new_for_http());

    let host = config.get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
    let port = config.get("PORT").unwrap_or_else(|| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("✅ Server running on http://127.0.0.1:{}", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install signal handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("🛑 Initiating graceful shutdown...");
}
