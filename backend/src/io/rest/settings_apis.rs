//! # REST API for Admin Settings
//!
//! Interest rates and credit limits. Reading is open; changing a value needs
//! an administrator.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use log::info;
use shared::UpdateSettingRequest;

use super::mappers::setting_mapper::SettingMapper;
use super::{error_response, json_body};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_settings))
        .route("/:key", put(update_setting))
}

pub async fn list_settings(State(state): State<AppState>) -> Response {
    info!("GET /api/settings");

    match state.settings_service.list_settings().await {
        Ok(settings) => (StatusCode::OK, Json(SettingMapper::to_setting_list_dto(settings))).into_response(),
        Err(e) => error_response(e, "Failed to list settings"),
    }
}

pub async fn update_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: Result<Json<UpdateSettingRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!("PUT /api/settings/{} - request: {:?}", key, request);

    match state
        .settings_service
        .update_setting(&request.admin_id, &key, &request.value, request.description)
        .await
    {
        Ok(setting) => {
            let response = SettingMapper::to_setting_response_dto(setting, "Setting updated successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e, "Failed to update setting"),
    }
}
