use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::{
    handle_advance, handle_clear, handle_enqueue, handle_fail, handle_get, handle_health,
    handle_list, handle_pause, handle_process, handle_remove, handle_resume, handle_retry,
    handle_start, QueueState,
};
use crate::config::HubConfig;
use crate::hub::Hub;
use crate::sim::Runner;
use crate::workloads::Workload;

pub struct HubServer {
    pub port: u16,
    pub hub: Hub,
}

impl HubServer {
    pub fn new(port: u16, hub: Option<Hub>) -> Self {
        let hub = hub.unwrap_or_else(|| Hub::new(HubConfig::from_env()));
        Self { port, hub }
    }

    pub async fn start(&self) -> Result<(), String> {
        let app = build_router(self.hub.clone());
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!(%addr, "marine hub listening");
        axum::Server::bind(&addr)
            .serve(app.into_make_service())
            .await
            .map_err(|err| err.to_string())
    }
}

pub fn queue_routes<W: Workload>(runner: Runner<W>, auto_start: bool) -> Router {
    let state = QueueState { runner, auto_start };
    Router::new()
        .route("/", get(handle_list::<W>).post(handle_enqueue::<W>))
        .route("/clear", post(handle_clear::<W>))
        .route("/process", post(handle_process::<W>))
        .route("/pause", post(handle_pause::<W>))
        .route("/resume", post(handle_resume::<W>))
        .route("/:id", get(handle_get::<W>).delete(handle_remove::<W>))
        .route("/:id/advance", post(handle_advance::<W>))
        .route("/:id/fail", post(handle_fail::<W>))
        .route("/:id/retry", post(handle_retry::<W>))
        .route("/:id/start", post(handle_start::<W>))
        .with_state(state)
}

pub fn build_router(hub: Hub) -> Router {
    let auto_start = hub.config.auto_start;
    Router::new()
        .route("/health", get(handle_health))
        .nest("/exports", queue_routes(hub.exports, auto_start))
        .nest("/ingestion", queue_routes(hub.ingestion, auto_start))
        .nest("/classifications", queue_routes(hub.classifications, auto_start))
        .layer(TraceLayer::new_for_http())
}
