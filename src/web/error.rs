use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::errors::{ErrorCode, ServiceError, ValidationFailure};
use crate::web::gate::GateRejection;

/// Every way a handler can fail, rendered as `{"error": ...}`.
#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    Gate(GateRejection),
    Forbidden(&'static str),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        ApiError::Service(e)
    }
}

impl From<ErrorCode> for ApiError {
    fn from(code: ErrorCode) -> Self {
        ApiError::Service(code.into())
    }
}

impl From<ValidationFailure> for ApiError {
    fn from(failure: ValidationFailure) -> Self {
        ApiError::Service(ServiceError::Validation(failure))
    }
}

impl From<GateRejection> for ApiError {
    fn from(rejection: GateRejection) -> Self {
        ApiError::Gate(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Service(ServiceError::Validation(failure)) => validation_response(&failure),
            ApiError::Service(ServiceError::Store(e)) => {
                tracing::error!(error = ?e, "store failure");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            ApiError::Gate(GateRejection::Unauthenticated) => {
                error_response(StatusCode::UNAUTHORIZED, "Not authenticated")
            }
            ApiError::Gate(GateRejection::Forbidden) => {
                error_response(StatusCode::FORBIDDEN, "Token type not allowed")
            }
            ApiError::Forbidden(message) => error_response(StatusCode::FORBIDDEN, message),
        }
    }
}

fn validation_response(failure: &ValidationFailure) -> Response {
    let status = if failure.is_conflict() {
        StatusCode::CONFLICT
    } else if failure.is_inexistent() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_REQUEST
    };

    let messages: BTreeMap<&str, &str> = failure.codes().map(|c| (c.as_str(), c.message())).collect();
    let error = match failure.codes().next() {
        Some(code) if failure.len() == 1 => code.message(),
        _ => "Invalid input",
    };
    let codes: Vec<&str> = failure.codes().map(|c| c.as_str()).collect();

    (
        status,
        Json(json!({ "error": error, "codes": codes, "messages": messages })),
    )
        .into_response()
}

pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
