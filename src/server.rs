use crate::admission::AdmissionController;
use crate::auth::{Authenticator, StaticAuthenticator};
use crate::bootstrap::{DatasetBootstrapper, DisabledBootstrapper, NobelApiBootstrapper};
use crate::config::Config;
use crate::error::Result;
use crate::handlers::{
    create_laureate, delete_laureate, get_countries, get_country_chart, get_laureates,
    health_check, search_laureates, update_laureate, AppState, SharedState,
};
use crate::health::HealthChecker;
use crate::middleware::logging_middleware;
use crate::mutation::MutationApi;
use crate::render::{Renderer, SvgChartRenderer};
use crate::store::RecordStore;
use axum::routing::{get, put};
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the router over prepared application state
pub fn create_app(state: SharedState) -> Router {
    Router::new()
        // Read-only queries
        .route("/laureates", get(get_laureates).post(create_laureate))
        .route("/laureates/search", get(search_laureates))
        .route("/laureates/:id", put(update_laureate).delete(delete_laureate))
        .route("/countries", get(get_countries))
        .route("/countries/chart", get(get_country_chart))
        // Health endpoint
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(logging_middleware))
        )
}

/// Wire the store and its collaborators together
pub fn build_state(
    store: Arc<RecordStore>,
    admission: AdmissionController,
    authenticator: Arc<dyn Authenticator>,
    renderer: Arc<dyn Renderer>,
) -> SharedState {
    Arc::new(AppState {
        mutations: MutationApi::new(store.clone(), admission.clone(), authenticator),
        health: HealthChecker::new(store.clone(), admission),
        renderer,
        store,
    })
}

pub struct Server {
    app: Router,
    bind_addr: SocketAddr,
    admission: AdmissionController,
    cleanup_interval: Duration,
}

impl Server {
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let bootstrapper: Box<dyn DatasetBootstrapper> = if config.bootstrap_enabled {
            Box::new(NobelApiBootstrapper::new(
                config.bootstrap_url.clone(),
                *config.bootstrap_timeout,
            )?)
        } else {
            Box::new(DisabledBootstrapper)
        };

        let store = Arc::new(
            RecordStore::load_or_bootstrap(config.data_file.clone(), bootstrapper.as_ref()).await?,
        );
        let admission = AdmissionController::new(config.admission());
        let authenticator = Arc::new(StaticAuthenticator::new(
            config.admin_user.clone(),
            config.admin_password.clone(),
        ));

        let state = build_state(
            store,
            admission.clone(),
            authenticator,
            Arc::new(SvgChartRenderer::default()),
        );

        Ok(Self {
            app: create_app(state),
            bind_addr: config.bind_addr,
            admission,
            cleanup_interval: config.cleanup_interval(),
        })
    }

    pub async fn run(self) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let listener = tokio::net::TcpListener::bind(self.bind_addr).await?;

        tracing::info!("Laureates server listening on {}", self.bind_addr);
        tracing::info!("Health check available at /health");

        let cleanup = tokio::spawn(purge_idle_clients(self.admission.clone(), self.cleanup_interval));

        // Run server with graceful shutdown
        axum::serve(
            listener,
            self.app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        cleanup.abort();
        Ok(())
    }
}

/// Periodically drop admission state for clients with no live events.
async fn purge_idle_clients(admission: AdmissionController, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.tick().await;

    loop {
        interval.tick().await;
        match admission.purge_idle(Instant::now()) {
            Ok(0) => {}
            Ok(purged) => tracing::debug!(purged, "Purged idle admission windows"),
            Err(e) => tracing::warn!(error = %e, "Admission cleanup failed"),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_construction_without_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_file: dir.path().join("laureates.json"),
            bootstrap_enabled: false,
            ..Config::default()
        };

        let server = Server::new(config).await.unwrap();
        assert_eq!(server.bind_addr, Config::default().bind_addr);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let config = Config {
            rate_limit_max: 0,
            bootstrap_enabled: false,
            ..Config::default()
        };
        assert!(Server::new(config).await.is_err());
    }
}
