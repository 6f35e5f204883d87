//! Vault Sync Service, a standalone module service that keeps an
//! Obsidian-compatible vault stocked with periodic notes and imports
//! daily records from a Memos server into daily notes.
//!
//! Default: http://127.0.0.1:9104/

mod config;
mod memos_client;
mod periodic;
mod record;
mod routes;
mod sync;
mod util;
mod vault;

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Instant;

use config::Settings;
use memos_client::MemosClient;
use routes::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let settings = Settings::from_env();

    match &settings.vault_root {
        Some(root) => log::info!("Vault root: {}", root.display()),
        None => log::warn!(
            "{} not set; vault operations will report not-configured",
            config::env_vars::VAULT_ROOT
        ),
    }

    let memos = match settings.memos_endpoint.as_deref() {
        Some(endpoint) => match MemosClient::new(
            endpoint,
            settings.memos_token.as_deref(),
            settings.memos_version,
            settings.memos_filter.clone(),
        ) {
            Ok(client) => {
                log::info!(
                    "Memos client ready ({}, API {})",
                    endpoint,
                    settings.memos_version
                );
                Some(client)
            }
            Err(e) => {
                log::error!("Failed to configure Memos client: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            log::warn!("MEMOS_ENDPOINT not set; daily record sync is disabled");
            None
        }
    };

    let port = settings.port;
    let state = Arc::new(AppState {
        settings,
        memos,
        start_time: Instant::now(),
        sync_count: AtomicU64::new(0),
        periodic_created: AtomicU64::new(0),
        last_sync_at: tokio::sync::Mutex::new(None),
    });

    let cors = tower_http::cors::CorsLayer::permissive();

    let app = axum::Router::new()
        .route("/rpc/periodic", axum::routing::post(routes::periodic))
        .route("/rpc/sync", axum::routing::post(routes::sync))
        .route("/rpc/status", axum::routing::get(routes::status))
        .with_state(state)
        .layer(cors);

    let addr = format!("127.0.0.1:{}", port);
    log::info!("Vault Sync Service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
