use marine_hub::api::server::HubServer;
use marine_hub::{Hub, HubConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marine_hub=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = HubConfig::from_env();
    info!(
        port = config.port,
        tick_ms = config.tick_interval_ms,
        step = config.progress_step,
        auto_start = config.auto_start,
        "starting marine hub"
    );

    let server = HubServer::new(config.port, Some(Hub::new(config)));
    if let Err(err) = server.start().await {
        error!("server error: {}", err);
        std::process::exit(1);
    }
}
