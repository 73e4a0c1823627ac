//! Hotel Management API server
//! Staff log in, then manage guests, rooms and bookings

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::{path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hotel_backend::{
    api::{cors_layer, create_router},
    auth::{AuthState, JwtHandler, UserStore},
    store::DocumentStore,
    Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = Config::parse();

    info!("🏨 Hotel Management API starting");

    if config.uses_dev_secret() {
        warn!("⚠️  SECRET_KEY not set, using the development secret. SET IT IN PRODUCTION!");
    }

    let user_store = Arc::new(
        UserStore::new(&config.database_path)
            .context("Failed to open user store")?
            .with_bcrypt_cost(config.bcrypt_cost),
    );
    let jwt_handler = Arc::new(
        JwtHandler::new(config.secret_key.as_bytes())
            .with_expiration_hours(config.token_ttl_hours),
    );
    let auth_state = AuthState::new(user_store, jwt_handler);

    info!("🔐 Authentication initialized at: {}", config.database_path);

    let documents = Arc::new(
        DocumentStore::new(&config.database_path).context("Failed to open document store")?,
    );

    let app = create_router(auth_state, documents, cors_layer(&config.cors_origins));

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("👋 Server stopped");
    Ok(())
}

/// Initialize tracing from RUST_LOG, defaulting to debug for this crate
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hotel_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents), then the crate directory
    let _ = dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
