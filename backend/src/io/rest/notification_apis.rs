//! # REST API for Notifications

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use log::info;
use shared::NotificationListQuery;

use super::mappers::notification_mapper::NotificationMapper;
use super::{error_response, query_params};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_notifications))
}

/// A member's notifications, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    query: Result<Query<NotificationListQuery>, QueryRejection>,
) -> Response {
    let query = match query_params(query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    info!("GET /api/notifications - member: {}", query.member_id);

    match state.notification_service.list_for_member(&query.member_id).await {
        Ok(notifications) => (
            StatusCode::OK,
            Json(NotificationMapper::to_notification_list_dto(notifications)),
        )
            .into_response(),
        Err(e) => error_response(e, "Failed to list notifications"),
    }
}
