use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::cache::CacheCoordinator;
use crate::config::AppConfig;
use crate::handlers;
use crate::worldstate::{DistributedRunner, RemoteFetcher, RunnerState};

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<CacheCoordinator>,
    /// Absent when no runner is attached (read-only deployments, tests).
    pub runner_state: Option<watch::Receiver<RunnerState>>,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/api/worldstate", get(handlers::worldstate))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|req: &axum::http::Request<_>| {
                            tracing::info_span!(
                                "http.request",
                                http.method = %req.method(),
                                http.target = %req.uri(),
                                http.status_code = tracing::field::Empty,
                            )
                        })
                        .on_response(
                            |res: &axum::http::Response<_>,
                             latency: std::time::Duration,
                             span: &tracing::Span| {
                                span.record(
                                    "http.status_code",
                                    tracing::field::display(res.status().as_u16()),
                                );
                                tracing::info!(
                                    http.status = %res.status().as_u16(),
                                    elapsed_ms = %latency.as_millis(),
                                    "request handled"
                                );
                            },
                        ),
                )
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

pub struct OnniServer {
    addr: SocketAddr,
    coordinator: Arc<CacheCoordinator>,
    runner: DistributedRunner,
}

pub struct ServerBuilder {
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.config = cfg;
        self
    }

    /// Connects the storage tiers and assembles the fetch pipeline.
    /// Redis problems degrade; a snapshot store that cannot be reached fails.
    pub async fn build(self) -> anyhow::Result<OnniServer> {
        let cfg = self.config;

        let store = crate::create_snapshot_store(&cfg.storage).await?;
        let pool = crate::create_redis_pool(&cfg.redis);
        let fast = crate::create_fast_cache(pool.as_ref());
        let locks = crate::create_lock_service(&cfg.lock, pool.as_ref());

        tracing::info!(
            store = store.backend_name(),
            fast_cache = fast.backend_name(),
            lock = locks.as_ref().map(|l| l.backend_name()).unwrap_or("none"),
            "storage tiers configured"
        );

        let coordinator = CacheCoordinator::shared(fast, store);
        let fetcher = Arc::new(RemoteFetcher::new(&cfg.worldstate, coordinator.clone())?);
        let runner = DistributedRunner::new(fetcher, locks, &cfg.lock);

        Ok(OnniServer {
            addr: cfg.addr(),
            coordinator,
            runner,
        })
    }
}

impl OnniServer {
    /// Serves until Ctrl+C.
    pub async fn run(self) -> anyhow::Result<()> {
        let shutdown = CancellationToken::new();
        tokio::spawn(shutdown_signal(shutdown.clone()));
        self.run_until(shutdown).await
    }

    /// Serves until `shutdown` is cancelled, then stops the runner (releasing
    /// its lease) and closes both storage tiers.
    pub async fn run_until(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);

        let runner = self.runner.spawn(&shutdown);
        let app = build_app(AppState {
            coordinator: self.coordinator.clone(),
            runner_state: Some(runner.subscribe()),
        });

        let serve_token = shutdown.clone();
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move { serve_token.cancelled().await })
            .await;

        shutdown.cancel();
        runner.stop().await;
        self.coordinator.close().await;
        tracing::info!("shutdown complete");

        served?;
        Ok(())
    }
}

async fn shutdown_signal(token: CancellationToken) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("shutdown signal received"),
        _ = token.cancelled() => {}
    }
    token.cancel();
}
