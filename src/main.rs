use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linkdash::analytics::{AnalyticsAggregator, SystemClock};
use linkdash::api::{create_api_router, AppState};
use linkdash::config::Config;
use linkdash::storage::{CachedSource, Fixture, InMemorySource};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Seed the in-memory source
    let source = match config.data.fixture_path.as_deref() {
        Some(path) => {
            info!("Loading fixture: {}", path);
            let fixture = Fixture::load(path).await?;
            Arc::new(InMemorySource::from_fixture(fixture))
        }
        None => {
            info!("No FIXTURE_PATH set, starting with an empty link collection");
            Arc::new(InMemorySource::new())
        }
    };
    info!("{} links available", source.len());

    let cached = Arc::new(CachedSource::new(
        source.clone(),
        config.cache.max_entries,
        config.cache.ttl_secs,
    ));

    let aggregator = Arc::new(AnalyticsAggregator::new_with_config(
        cached,
        Arc::new(SystemClock),
        config.data.short_domain.clone(),
        config.analytics.limits(),
    ));

    let state = Arc::new(AppState {
        links: source,
        aggregator,
    });
    let router = create_api_router(state);

    let addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 API server listening on http://{}", addr);
    info!("   - Links at http://{}/api/links", addr);
    info!("   - Analytics at http://{}/api/analytics/{{id}}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
