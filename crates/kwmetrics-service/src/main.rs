//! Keyword-metrics aggregation service entry point.

mod config;
mod logging;
mod routes;
mod shutdown;
mod state;
mod upstream_stubs;

use axum::routing::{get, post};
use axum::Router;
use config::Config;
use kwmetrics_ads::AdsAdapter;
use kwmetrics_cache::{Cache, RedisConfig};
use kwmetrics_coordinator::BatchCoordinator;
use kwmetrics_queue::JobQueue;
use kwmetrics_trends::TrendsAdapter;
use state::AppState;
use std::sync::Arc;
use upstream_stubs::{UnconfiguredAdsUpstream, UnconfiguredTrendsUpstream};

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    let _log_guard = logging::init(&config.log_dir, &config.log_level);

    tracing::info!("starting keyword metrics batch api");

    let cache = Arc::new(Cache::new(
        RedisConfig {
            host: &config.redis_host,
            port: config.redis_port,
            db: config.redis_db,
            password: config.redis_password.as_deref(),
        },
        config.fifo_cache_path.clone(),
        config.cache_max_entries,
        config.cache_ttl_secs,
    ));

    let ads = Arc::new(AdsAdapter::new(
        config.ads_credentials.clone(),
        Box::new(UnconfiguredAdsUpstream),
    ));

    let trends = Arc::new(TrendsAdapter::new(
        Arc::new(UnconfiguredTrendsUpstream),
        config.trends_snapshot_path.clone(),
    ));

    let queue = Arc::new(JobQueue::default());
    let coordinator = Arc::new(BatchCoordinator::new(cache.clone(), ads.clone(), trends.clone()));

    let state = AppState {
        cache,
        ads,
        trends,
        queue,
        coordinator,
    };

    let app = Router::new()
        .route("/batch_search_volume", post(routes::batch_search_volume))
        .route(
            "/async/batch_search_volume",
            post(routes::async_batch_search_volume),
        )
        .route("/async/status", get(routes::async_status))
        .route("/healthz", get(routes::healthz))
        .with_state(state);

    let addr = format!("{}:{}", config.api_host, config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));

    tracing::info!(%addr, "listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await
        .expect("server error");

    tracing::info!("keyword metrics batch api shut down cleanly");
}
