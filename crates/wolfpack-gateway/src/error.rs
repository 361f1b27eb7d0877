// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of `WolfpackError` onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use wolfpack_core::WolfpackError;
use wolfpack_core::policy::DenyReason;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code, e.g. `out_of_range` or `forbidden`.
    pub error: &'static str,
    /// Human-readable description.
    pub message: String,
    /// Denial reason for `forbidden`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
    /// Measured distance for `out_of_range`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
}

/// Handler error.
#[derive(Debug)]
pub enum ApiError {
    /// A domain error from the pack services.
    Domain(WolfpackError),
    /// The request itself is malformed.
    BadRequest(String),
}

impl From<WolfpackError> for ApiError {
    fn from(e: WolfpackError) -> Self {
        Self::Domain(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let err = match self {
            Self::Domain(err) => err,
            Self::BadRequest(_) => return StatusCode::BAD_REQUEST,
        };
        match err {
            WolfpackError::OutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            WolfpackError::LocationNotFound(_)
            | WolfpackError::SessionNotFound(_)
            | WolfpackError::InteractionNotFound(_)
            | WolfpackError::MessageNotFound(_) => StatusCode::NOT_FOUND,
            WolfpackError::Forbidden { .. } => StatusCode::FORBIDDEN,
            WolfpackError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            WolfpackError::Storage { .. }
            | WolfpackError::Config(_)
            | WolfpackError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        let err = match self {
            Self::Domain(err) => err,
            Self::BadRequest(_) => return "bad_request",
        };
        match err {
            WolfpackError::OutOfRange { .. } => "out_of_range",
            WolfpackError::LocationNotFound(_) => "location_not_found",
            WolfpackError::SessionNotFound(_) => "session_not_found",
            WolfpackError::InteractionNotFound(_) => "interaction_not_found",
            WolfpackError::MessageNotFound(_) => "message_not_found",
            WolfpackError::Forbidden { .. } => "forbidden",
            WolfpackError::Timeout { .. } => "timeout",
            WolfpackError::Storage { .. } | WolfpackError::Config(_) | WolfpackError::Internal(_) => {
                "internal"
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let body = match self {
            Self::BadRequest(message) => ErrorResponse {
                error: code,
                message,
                reason: None,
                distance_meters: None,
            },
            Self::Domain(err) => {
                let message =
                    if status.is_server_error() && status != StatusCode::GATEWAY_TIMEOUT {
                        tracing::error!(error = %err, "request failed");
                        "internal server error".to_string()
                    } else {
                        err.to_string()
                    };
                let distance_meters = match &err {
                    WolfpackError::OutOfRange {
                        distance_meters, ..
                    } if distance_meters.is_finite() => Some(*distance_meters),
                    _ => None,
                };
                ErrorResponse {
                    error: code,
                    message,
                    reason: err.deny_reason(),
                    distance_meters,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}
