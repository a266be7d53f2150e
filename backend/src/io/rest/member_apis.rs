//! # REST API for Member Management

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use log::info;
use shared::{
    AdminActionRequest, MemberListQuery, MemberLookupQuery, SetMembershipRequest, UpdateMemberRequest,
};

use super::mappers::member_mapper::MemberMapper;
use super::{error_body, error_response, json_body, query_params};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_members))
        .route("/lookup", get(lookup_member))
        .route("/:id", get(get_member).put(update_member))
        .route("/:id/membership", post(set_membership))
        .route("/:id/deactivate", post(deactivate_member))
}

/// List members (admin only)
pub async fn list_members(
    State(state): State<AppState>,
    query: Result<Query<MemberListQuery>, QueryRejection>,
) -> Response {
    let query = match query_params(query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    info!("GET /api/members - admin: {}", query.admin_id);

    match state
        .member_service
        .list_members(&query.admin_id, query.include_inactive.unwrap_or(false))
        .await
    {
        Ok(members) => (StatusCode::OK, Json(MemberMapper::to_member_list_dto(members))).into_response(),
        Err(e) => error_response(e, "Failed to list members"),
    }
}

/// Find an active member by consumer code
pub async fn lookup_member(
    State(state): State<AppState>,
    query: Result<Query<MemberLookupQuery>, QueryRejection>,
) -> Response {
    let query = match query_params(query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    info!("GET /api/members/lookup - consumer_code: {}", query.consumer_code);

    match state.member_service.find_by_consumer_code(&query.consumer_code).await {
        Ok(Some(member)) => (StatusCode::OK, Json(MemberMapper::to_dto(member))).into_response(),
        Ok(None) => error_body(
            StatusCode::NOT_FOUND,
            format!("No active member with consumer code {}", query.consumer_code),
        ),
        Err(e) => error_response(e, "Failed to look up member"),
    }
}

pub async fn get_member(State(state): State<AppState>, Path(member_id): Path<String>) -> Response {
    info!("GET /api/members/{}", member_id);

    match state.member_service.get_member(&member_id).await {
        Ok(Some(member)) => (StatusCode::OK, Json(MemberMapper::to_dto(member))).into_response(),
        Ok(None) => error_body(StatusCode::NOT_FOUND, format!("Member not found: {}", member_id)),
        Err(e) => error_response(e, "Failed to get member"),
    }
}

pub async fn update_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    payload: Result<Json<UpdateMemberRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!("PUT /api/members/{} - request: {:?}", member_id, request);

    let command = MemberMapper::to_update_command(request);
    match state.member_service.update_profile(&member_id, command).await {
        Ok(member) => {
            let response = MemberMapper::to_member_response_dto(member, "Profile updated successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e, "Failed to update member"),
    }
}

/// Grant or revoke the member and admin flags
pub async fn set_membership(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    payload: Result<Json<SetMembershipRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!("POST /api/members/{}/membership - request: {:?}", member_id, request);

    let command = MemberMapper::to_membership_command(member_id, request);
    match state.member_service.set_membership(command).await {
        Ok(member) => {
            let response = MemberMapper::to_member_response_dto(member, "Membership updated successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e, "Failed to update membership"),
    }
}

pub async fn deactivate_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    payload: Result<Json<AdminActionRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!("POST /api/members/{}/deactivate - admin: {}", member_id, request.admin_id);

    match state.member_service.deactivate(&request.admin_id, &member_id).await {
        Ok(member) => {
            let response = MemberMapper::to_member_response_dto(member, "Member deactivated");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e, "Failed to deactivate member"),
    }
}
