use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors raised while issuing or validating session tokens
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `access_token.<jwt>` sub-protocol was offered by the client
    #[error("missing access_token sub-protocol")]
    MissingToken,

    /// Token was signed with an algorithm outside the HMAC family
    #[error("unexpected signing method: {0}")]
    UnexpectedAlgorithm(String),

    /// Token expiry is in the past
    #[error("token has expired")]
    TokenExpired,

    /// Token is malformed or its signature does not verify
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The signing backend failed to produce a token
    #[error("failed to issue session token: {0}")]
    TokenIssue(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::TokenIssue(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "INTERNAL_SERVER_ERROR",
                    "message": "Failed to issue session token",
                })),
            )
                .into_response(),
            // The reason stays in the logs; browsers only learn the upgrade was refused
            _ => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
        }
    }
}
