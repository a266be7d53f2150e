//! # REST API for Payments
//!
//! Payments against approved credits, their confirmation by an
//! administrator, and monthly fees with the statements built from them.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use log::info;
use shared::{
    MonthlyPaymentQuery, MonthlyPaymentRequest, PaymentDecisionRequest, PaymentListQuery,
    RecordPaymentRequest,
};

use super::mappers::payment_mapper::PaymentMapper;
use super::{error_body, error_response, json_body, query_params};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(record_payment).get(list_payments))
        .route("/confirm", post(confirm_payment))
        .route("/fail", post(fail_payment))
        .route("/monthly", post(register_monthly_payment).get(get_monthly_payments))
}

pub async fn record_payment(
    State(state): State<AppState>,
    payload: Result<Json<RecordPaymentRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!("POST /api/payments - request: {:?}", request);

    match state
        .payment_service
        .record_payment(PaymentMapper::to_record_command(request))
        .await
    {
        Ok(payment) => {
            let response = PaymentMapper::to_payment_response_dto(payment, "Payment recorded, awaiting confirmation");
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response(e, "Failed to record payment"),
    }
}

/// A member's payments, most recent first
pub async fn list_payments(
    State(state): State<AppState>,
    query: Result<Query<PaymentListQuery>, QueryRejection>,
) -> Response {
    let query = match query_params(query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    info!("GET /api/payments - member: {}", query.member_id);

    match state.payment_service.list_member_payments(&query.member_id).await {
        Ok(payments) => (StatusCode::OK, Json(PaymentMapper::to_payment_list_dto(payments))).into_response(),
        Err(e) => error_response(e, "Failed to list payments"),
    }
}

pub async fn confirm_payment(
    State(state): State<AppState>,
    payload: Result<Json<PaymentDecisionRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!("POST /api/payments/confirm - request: {:?}", request);

    match state
        .payment_service
        .confirm_payment(&request.payment_id, &request.admin_id)
        .await
    {
        Ok(payment) => {
            let response = PaymentMapper::to_payment_response_dto(payment, "Payment confirmed");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e, "Failed to confirm payment"),
    }
}

pub async fn fail_payment(
    State(state): State<AppState>,
    payload: Result<Json<PaymentDecisionRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!("POST /api/payments/fail - request: {:?}", request);

    match state
        .payment_service
        .fail_payment(&request.payment_id, &request.admin_id)
        .await
    {
        Ok(payment) => {
            let response = PaymentMapper::to_payment_response_dto(payment, "Payment marked as failed");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e, "Failed to update payment"),
    }
}

pub async fn register_monthly_payment(
    State(state): State<AppState>,
    payload: Result<Json<MonthlyPaymentRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!("POST /api/payments/monthly - request: {:?}", request);

    match state
        .payment_service
        .register_monthly_payment(PaymentMapper::to_monthly_command(request))
        .await
    {
        Ok(result) => (StatusCode::OK, Json(PaymentMapper::to_monthly_response_dto(result))).into_response(),
        Err(e) => error_response(e, "Failed to register monthly payment"),
    }
}

/// The admin overview when `admin_id` is given, otherwise the member's statement
pub async fn get_monthly_payments(
    State(state): State<AppState>,
    query: Result<Query<MonthlyPaymentQuery>, QueryRejection>,
) -> Response {
    let query = match query_params(query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    info!("GET /api/payments/monthly - query: {:?}", query);

    match (query.admin_id, query.member_id) {
        (Some(admin_id), _) => match state.payment_service.monthly_overview(&admin_id).await {
            Ok(overview) => (StatusCode::OK, Json(PaymentMapper::to_overview_dto(overview))).into_response(),
            Err(e) => error_response(e, "Failed to build monthly overview"),
        },
        (None, Some(member_id)) => match state.payment_service.member_statement(&member_id).await {
            Ok(statement) => (StatusCode::OK, Json(PaymentMapper::to_statement_dto(statement))).into_response(),
            Err(e) => error_response(e, "Failed to build member statement"),
        },
        (None, None) => error_body(StatusCode::BAD_REQUEST, "member_id or admin_id is required"),
    }
}
