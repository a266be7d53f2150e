//! # REST API for Store Maintenance
//!
//! Reset, statistics and backups of the record store. Intended for local
//! development.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use log::{info, warn};
use shared::{DebugAction, DebugRequest, DebugResponse};

use super::{error_response, json_body};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(debug_action))
}

pub async fn debug_action(
    State(state): State<AppState>,
    payload: Result<Json<DebugRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!("POST /api/debug - action: {:?}", request.action);

    let result = match request.action {
        DebugAction::Reset => {
            warn!("Resetting store {}", state.connection.path().display());
            state.connection.reset().await.map(|()| DebugResponse {
                message: "Store reset to its seeded state".to_string(),
                stats: None,
                backup_path: None,
            })
        }
        DebugAction::Stats => Ok(DebugResponse {
            message: "Store statistics".to_string(),
            stats: Some(state.connection.stats().await),
            backup_path: None,
        }),
        DebugAction::Backup => state.connection.backup(&state.backup_dir).await.map(|path| DebugResponse {
            message: "Backup created".to_string(),
            stats: None,
            backup_path: Some(path.display().to_string()),
        }),
    };

    match result {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(e, "Failed to run maintenance action"),
    }
}
