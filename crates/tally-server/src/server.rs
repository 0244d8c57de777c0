//! `TallyServer`: router assembly and the serve loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use tally_graph::PostClient;
use tally_reconcile::Reconciler;
use tally_settings::TallySettings;
use tally_store::ContestStore;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{activity, contests, process, tokens};
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Persistence.
    pub store: ContestStore,
    /// Reconciliation runner.
    pub reconciler: Arc<Reconciler>,
    /// Loaded settings.
    pub settings: Arc<TallySettings>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
}

/// The tally HTTP server.
pub struct TallyServer {
    state: AppState,
}

impl TallyServer {
    /// Create a server over an opened store and a post client.
    pub fn new(settings: TallySettings, store: ContestStore, client: Arc<dyn PostClient>) -> Self {
        let reconciler = Reconciler::new(store.clone(), client, settings.reconcile.clone());
        let grace = Duration::from_secs(settings.server.shutdown_timeout_secs);
        Self {
            state: AppState {
                store,
                reconciler: Arc::new(reconciler),
                settings: Arc::new(settings),
                shutdown: Arc::new(ShutdownCoordinator::new(grace)),
                start_time: Instant::now(),
            },
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/api/contests", get(contests::list).post(contests::create))
            .route(
                "/api/contests/{id}",
                get(contests::detail)
                    .patch(contests::update)
                    .delete(contests::remove),
            )
            .route("/api/contests/{id}/entries", get(contests::entries))
            .route("/api/auth/token", get(tokens::check).post(tokens::save))
            .route("/api/activity-logs", get(activity::list))
            .route("/api/process-comments", post(process::run))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.state.shutdown
    }

    /// Get the loaded settings.
    pub fn settings(&self) -> &TallySettings {
        &self.state.settings
    }

    /// Serve on `listener` until the shutdown token is cancelled.
    ///
    /// In-flight requests are allowed to finish.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let signalled = self.state.shutdown.signalled();
        let router = self.router();
        info!(addr = %listener.local_addr()?, "tally server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(signalled)
            .await?;

        info!("tally server stopped");
        Ok(())
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.shutdown.is_shutting_down(),
    ))
}
