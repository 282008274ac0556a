//! Storybot API server entry point.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use storybot_api::config::AppConfig;
use storybot_api::error::AppError;
use storybot_api::state::AppState;
use storybot_content::application::catalog;
use storybot_content::application::repository::InMemoryContentRepository;
use storybot_core::clock::SystemClock;
use storybot_core::repository::ContentRepository;
use storybot_store::pg_content_repository::PgContentRepository;
use storybot_store::pg_save_store::PgSaveStore;
use storybot_store::schema;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Storybot API server");

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    schema::run_migrations(&pool).await?;

    let stored_content = PgContentRepository::new(pool.clone());
    let content: Arc<dyn ContentRepository> = if let Some(path) = &config.content_path {
        // Serve from the files, and keep the stored copy in step with them.
        let chapters = catalog::load_catalog(path).map_err(AppError::Content)?;
        stored_content
            .upsert_chapters(&chapters)
            .await
            .map_err(AppError::Content)?;
        tracing::info!(path = %path.display(), chapters = chapters.len(), "Loaded story catalog");
        Arc::new(InMemoryContentRepository::new(chapters))
    } else {
        Arc::new(stored_content)
    };

    let state = AppState::new(
        Arc::new(SystemClock),
        content,
        Arc::new(PgSaveStore::new(pool)),
    );

    // TODO: Replace CorsLayer::permissive() with the chat gateway's origin once it is fixed.
    let app = storybot_api::build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
