//! Axum route handlers for the vault sync RPC API.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use vault_sync_types::*;

use crate::config::Settings;
use crate::memos_client::MemosClient;
use crate::periodic::create_periodic_file;
use crate::sync::run_sync;

pub struct AppState {
    pub settings: Settings,
    /// None when no Memos endpoint is configured; sync requests are
    /// rejected in that case.
    pub memos: Option<MemosClient>,
    pub start_time: Instant,
    pub sync_count: AtomicU64,
    pub periodic_created: AtomicU64,
    pub last_sync_at: tokio::sync::Mutex<Option<String>>,
}

// POST /rpc/periodic
pub async fn periodic(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PeriodicRequest>,
) -> (StatusCode, Json<RpcResponse<PeriodicResult>>) {
    let date = match &req.date {
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(RpcResponse::err(format!(
                        "Invalid date '{}', expected YYYY-MM-DD",
                        raw
                    ))),
                );
            }
        },
        None => Utc::now().date_naive(),
    };

    match create_periodic_file(date, req.period, &state.settings).await {
        Ok(outcome) => {
            if outcome.did_create() {
                state.periodic_created.fetch_add(1, Ordering::Relaxed);
            }
            let result = PeriodicResult {
                outcome: outcome.as_str().to_string(),
                path: outcome.path().map(|path| path.display().to_string()),
            };
            (StatusCode::OK, Json(RpcResponse::ok(result)))
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RpcResponse::err(e)),
        ),
    }
}

// POST /rpc/sync
pub async fn sync(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<SyncReport>>) {
    let Some(client) = &state.memos else {
        return (
            StatusCode::BAD_REQUEST,
            Json(RpcResponse::err(
                "Memos endpoint is not configured; set MEMOS_ENDPOINT",
            )),
        );
    };

    match run_sync(&state.settings, client).await {
        Ok(report) => {
            state.sync_count.fetch_add(1, Ordering::Relaxed);
            *state.last_sync_at.lock().await = Some(Utc::now().to_rfc3339());
            (StatusCode::OK, Json(RpcResponse::ok(report)))
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RpcResponse::err(e)),
        ),
    }
}

// GET /rpc/status
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<ServiceStatus>>) {
    let status = ServiceStatus {
        running: true,
        vault_configured: state.settings.vault_root.is_some(),
        vault_root: state
            .settings
            .vault_root
            .as_ref()
            .map(|root| root.display().to_string()),
        memos_configured: state.memos.is_some(),
        memos_version: state.settings.memos_version.to_string(),
        locale: state.settings.locale.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        total_syncs: state.sync_count.load(Ordering::Relaxed),
        total_periodic_created: state.periodic_created.load(Ordering::Relaxed),
        last_sync_at: state.last_sync_at.lock().await.clone(),
    };

    (StatusCode::OK, Json(RpcResponse::ok(status)))
}
