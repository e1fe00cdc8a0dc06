// src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // 1. Config, database, record store and services
    let app_state = AppState::new().await?;

    // 2. First administrator, only for an empty users collection
    if let Some(password) = app_state.config.admin_password.as_deref() {
        app_state
            .auth_service
            .seed_admin(
                &app_state.config.admin_username,
                password,
                &app_state.config.admin_full_name,
            )
            .await?;
    } else if app_state.store.read(|c| c.users.is_empty()).await {
        tracing::warn!("⚠️ No users yet and ADMIN_PASSWORD is not set; nobody can sign in");
    }

    // 3. Pick up writes made by other processes sharing the database
    services::sync::spawn_sync_poller(app_state.store.clone(), app_state.config.sync_interval);

    // 4. Serve
    let bind_addr = app_state.config.bind_addr.clone();
    let app = routes::build_router(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
