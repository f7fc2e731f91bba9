use std::net::SocketAddr;
use std::time::Duration;

use explore_api::{app, AppState};
use explore_store::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "explore_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().expect("Failed to load config");
    tracing::info!("Starting ExploreGB API on port {}", config.server.port);

    let app_state = AppState::from_config(&config)?;
    let sweep_every = Duration::from_secs(config.sessions.sweep_interval_secs.max(1));
    app_state.spawn_session_sweeper(sweep_every);
    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
