mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use placegrid_engine::cache::{InMemoryTileCache, TileCache};
use placegrid_engine::grid::RadiusPolicy;
use placegrid_engine::{SearchEngine, SearchPolicy};
use placegrid_places::PlacesClient;

use crate::api::{build_app, AppState, SearchDefaults};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(placegrid_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let engine = match config.google_places_api_key.as_deref() {
        Some(api_key) => {
            let client = PlacesClient::with_base_url(
                api_key,
                config.request_timeout_secs,
                config.max_attempts,
                config.retry_backoff_base_ms,
                &config.places_base_url,
            )?;
            let cache: Arc<dyn TileCache> = Arc::new(InMemoryTileCache::new());
            let policy = SearchPolicy {
                radius_policy: config.radius_policy.parse::<RadiusPolicy>()?,
                default_category: config.default_category.clone(),
                cache_ttl: Duration::from_secs(config.cache_ttl_secs),
                default_grid_size: config.default_grid_size,
                default_overlap: config.default_overlap,
            };
            Some(Arc::new(SearchEngine::new(client, cache, policy)))
        }
        None => {
            tracing::warn!(
                "GOOGLE_PLACES_API_KEY not set; search and geocode endpoints will report misconfigured"
            );
            None
        }
    };

    let app = build_app(AppState {
        engine,
        defaults: SearchDefaults::from_config(&config),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
