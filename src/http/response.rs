//! Responses produced by the proxy itself.
//!
//! # Responsibilities
//! - JSON 401 body for fail-closed credential errors
//! - Plain gateway errors when the upstream cannot be reached

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::pipeline::CredentialError;

/// Body of a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// 401 response for a credential error under fail-closed.
#[derive(Debug)]
pub struct Rejection {
    message: &'static str,
}

impl From<&CredentialError> for Rejection {
    fn from(err: &CredentialError) -> Self {
        Self {
            message: err.public_message(),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: "unauthorized".to_string(),
            message: self.message.to_string(),
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// 502 response when forwarding fails.
pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
}
