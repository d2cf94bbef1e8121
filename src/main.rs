use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use interview_tracker::auth::JwksVerifier;
use interview_tracker::config::AppConfig;
use interview_tracker::db::PgStore;
use interview_tracker::handlers;
use interview_tracker::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH0_DOMAIN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("starting interview-tracker in {:?} mode", config.environment);

    let store = PgStore::connect(&config.database).await?;
    store.migrate().await?;

    let verifier = JwksVerifier::new(&config.auth);
    let state = AppState::new(Arc::new(store), Arc::new(verifier));

    let app = handlers::router(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
