//! # REST API for Authentication
//!
//! Registration and login by consumer code. There are no sessions: clients
//! keep the returned member id and pass it on later calls.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use log::info;
use shared::{LoginRequest, RegisterMemberRequest};

use super::mappers::member_mapper::MemberMapper;
use super::{error_response, json_body};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/admin-login", post(admin_login))
}

/// Register a new person
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterMemberRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!("POST /api/auth/register - name: {}", request.name);

    let command = match MemberMapper::to_register_command(request) {
        Ok(command) => command,
        Err(e) => return error_response(e, "Failed to register member"),
    };

    match state.member_service.register(command).await {
        Ok(member) => {
            let response = MemberMapper::to_member_response_dto(member, "Registration successful");
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response(e, "Failed to register member"),
    }
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!("POST /api/auth/login - consumer code: {}", request.consumer_code);

    match state
        .member_service
        .authenticate(request.consumer_code.trim(), &request.password)
        .await
    {
        Ok(result) => (StatusCode::OK, Json(MemberMapper::to_login_response_dto(result))).into_response(),
        Err(e) => error_response(e, "Failed to log in"),
    }
}

pub async fn admin_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!("POST /api/auth/admin-login - consumer code: {}", request.consumer_code);

    match state
        .member_service
        .authenticate_admin(request.consumer_code.trim(), &request.password)
        .await
    {
        Ok(result) => (StatusCode::OK, Json(MemberMapper::to_login_response_dto(result))).into_response(),
        Err(e) => error_response(e, "Failed to log in"),
    }
}
