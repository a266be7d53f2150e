//! # REST API for Credits
//!
//! Credit requests, the admin decision, and credits granted directly by an
//! administrator.

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
use shared::{AdminCreditRequest, CreditApplicationRequest, CreditListQuery, DecideCreditRequest};

use super::mappers::credit_mapper::CreditMapper;
use super::{error_body, error_response, json_body, query_params};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(request_credit).get(list_credits))
        .route("/approve", post(decide_credit))
        .route("/:id", get(get_credit))
}

/// Routes mounted under `/api/admin`
pub fn admin_router() -> Router<AppState> {
    Router::new().route("/credits", post(create_approved_credit))
}

pub async fn request_credit(
    State(state): State<AppState>,
    payload: Result<Json<CreditApplicationRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!("POST /api/credits - request: {:?}", request);

    match state
        .credit_service
        .request_credit(CreditMapper::to_request_command(request))
        .await
    {
        Ok(credit) => {
            let response = CreditMapper::to_credit_response_dto(credit, "Credit request submitted");
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response(e, "Failed to request credit"),
    }
}

/// A member's credits, oldest first
pub async fn list_credits(
    State(state): State<AppState>,
    query: Result<Query<CreditListQuery>, QueryRejection>,
) -> Response {
    let query = match query_params(query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    info!("GET /api/credits - member: {}", query.member_id);

    match state.credit_service.list_member_credits(&query.member_id).await {
        Ok(credits) => (StatusCode::OK, Json(CreditMapper::to_credit_list_dto(credits))).into_response(),
        Err(e) => error_response(e, "Failed to list credits"),
    }
}

pub async fn get_credit(State(state): State<AppState>, Path(credit_id): Path<String>) -> Response {
    info!("GET /api/credits/{}", credit_id);

    match state.credit_service.get_credit(&credit_id).await {
        Ok(Some(credit)) => (StatusCode::OK, Json(CreditMapper::to_dto(credit))).into_response(),
        Ok(None) => error_body(StatusCode::NOT_FOUND, format!("Credit not found: {}", credit_id)),
        Err(e) => error_response(e, "Failed to get credit"),
    }
}

/// Approve or reject a requested credit
pub async fn decide_credit(
    State(state): State<AppState>,
    payload: Result<Json<DecideCreditRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!("POST /api/credits/approve - request: {:?}", request);

    let message = if request.approved {
        "Credit approved"
    } else {
        "Credit rejected"
    };
    match state
        .credit_service
        .decide_credit(CreditMapper::to_decide_command(request))
        .await
    {
        Ok(credit) => (StatusCode::OK, Json(CreditMapper::to_credit_response_dto(credit, message))).into_response(),
        Err(e) => error_response(e, "Failed to decide credit"),
    }
}

pub async fn create_approved_credit(
    State(state): State<AppState>,
    payload: Result<Json<AdminCreditRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!("POST /api/admin/credits - request: {:?}", request);

    match state
        .credit_service
        .create_approved_credit(CreditMapper::to_admin_command(request))
        .await
    {
        Ok(credit) => {
            let response = CreditMapper::to_credit_response_dto(credit, "Credit granted");
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response(e, "Failed to create credit"),
    }
}
