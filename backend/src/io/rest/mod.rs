//! # REST API Interface Layer
//!
//! JSON endpoints under `/api`. Handlers parse the request, map the DTO to a
//! domain command, call one service and map the result back.
//!
//! ## Error Handling
//!
//! Every non-2xx response carries `{"error": "<message>"}`. Domain errors map
//! to 400/401/403/404/409; anything else is logged and answered with a 500
//! and a generic message so storage details never leak to clients.

pub mod auth_apis;
pub mod credit_apis;
pub mod debug_apis;
pub mod mappers;
pub mod member_apis;
pub mod notification_apis;
pub mod payment_apis;
pub mod settings_apis;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::{error, warn};
use shared::ErrorResponse;

use crate::domain::errors::DomainError;

/// JSON error body with the given status.
pub fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Translate a service error into a response. `context` is logged, and used
/// as the client message for internal errors.
pub fn error_response(error: anyhow::Error, context: &str) -> Response {
    let Some(domain_error) = DomainError::find(&error) else {
        error!("{}: {:#}", context, error);
        return error_body(StatusCode::INTERNAL_SERVER_ERROR, context);
    };

    let status = match domain_error {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
    };
    warn!("{}: {}", context, domain_error);
    error_body(status, domain_error.to_string())
}

/// Unwrap a JSON body, answering 400 for malformed or incomplete input.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            Err(error_body(StatusCode::BAD_REQUEST, rejection.body_text()))
        }
    }
}

/// Unwrap query parameters, answering 400 when required ones are missing.
pub fn query_params<T>(payload: Result<Query<T>, QueryRejection>) -> Result<T, Response> {
    match payload {
        Ok(Query(value)) => Ok(value),
        Err(rejection) => {
            warn!("Rejected query string: {}", rejection.body_text());
            Err(error_body(StatusCode::BAD_REQUEST, rejection.body_text()))
        }
    }
}
