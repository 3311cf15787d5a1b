use std::sync::Arc;

use kakeibo_server::{
    config::AppConfig,
    routes,
    state::{build_backend, AppState},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .with_target(true)
        .init();

    let config = AppConfig::load()?;
    tracing::info!(?config, "Loaded configuration");

    let extractor = Arc::new(config.build_extractor()?);
    let backend = build_backend(&config.ocr)?;
    if backend.is_none() {
        tracing::warn!("No OCR engine configured; only POST /api/ocr/text will succeed");
    }

    let app = routes::router(AppState::new(extractor, backend), config.server.body_limit_bytes);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Receipt OCR service listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
