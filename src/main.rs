use std::sync::Arc;

use csquiz::{
    auth::{token::TokenIssuer, StoreAuthenticator},
    config::Config,
    cors, rest,
    store::UserStore,
    AppState,
};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "csquiz=debug,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    let store = UserStore::new(pool);
    store.migrate().await?;

    let app_state = AppState {
        authenticator: Arc::new(StoreAuthenticator::new(store.clone())),
        store,
        tokens: TokenIssuer::new(&config.jwt_secret),
    };

    let cors = cors::layer(config.cors_allowed_origin.as_deref())?;
    if let Some(origin) = &config.cors_allowed_origin {
        tracing::info!("CORS enabled for {}", origin);
    }

    let app = rest::router(app_state, cors);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("REST API listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutting down");
}
