use anyhow::Context;
use dotenvy::dotenv;
use toolbox::logging::{init_tracing, shutdown_tracer};
use toolbox::metrics::{init_metrics, metrics_app};
use toolbox::router::init_router;
use toolbox::state::init_app_state;
use toolbox_config::ServerConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let metrics_handle = init_metrics();
    let state = init_app_state().await?;

    let mut app = init_router(state);
    if let Some(handle) = metrics_handle {
        app = app.merge(metrics_app(handle));
    }

    let config = ServerConfig::from_env();
    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;

    info!(addr = %config.addr, "Server running");
    info!("Swagger UI available at /swagger-ui, Scalar at /scalar");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    shutdown_tracer().await;
    served.context("Server error")
}
