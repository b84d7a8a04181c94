// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::classify::{ClientError, ErrorKind};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub code: &'static str,
}

/// JSON error body returned by every endpoint.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    /// Stable machine-readable kind, e.g. `validation_error`.
    pub error_code: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code,
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Session => StatusCode::UNAUTHORIZED,
        ErrorKind::Network => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Protocol => StatusCode::BAD_GATEWAY,
        ErrorKind::WalletUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::ConcurrentCall => StatusCode::CONFLICT,
        // Cancellation is answered with a normal outcome body; reaching
        // here means a handler forgot to absorb it.
        ErrorKind::UserCancelled | ErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        let kind = err.kind();
        Self::new(status_for(kind), kind.code(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code.to_string(),
        });
        (self.status, body).into_response()
    }
}
