use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use super::auth_error::AuthError;

/// Handler-level errors rendered as `{"error": ..., "message": ...}` bodies
#[derive(Debug, Error)]
pub enum AppError {
    /// Metadata file could not be read or parsed
    #[error("Failed to read metadata from {file}")]
    MetadataUnreadable { file: String, reason: String },

    /// Metadata file parsed but has no `[meta]` table
    #[error("Missing [meta] section in {file}")]
    MetadataSectionMissing { file: String },

    #[error("Failed to issue session token")]
    TokenIssue(#[from] AuthError),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self, "Request failed");
        let body = json!({
            "error": "INTERNAL_SERVER_ERROR",
            "message": self.to_string(),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_metadata_unreadable_body() {
        let err = AppError::MetadataUnreadable {
            file: "deepgram.toml".to_string(),
            reason: "No such file or directory".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "INTERNAL_SERVER_ERROR");
        assert_eq!(json["message"], "Failed to read metadata from deepgram.toml");
    }

    #[tokio::test]
    async fn test_missing_section_body() {
        let err = AppError::MetadataSectionMissing {
            file: "deepgram.toml".to_string(),
        };
        let json = body_json(err.into_response()).await;
        assert_eq!(json["message"], "Missing [meta] section in deepgram.toml");
    }

    #[tokio::test]
    async fn test_token_issue_body() {
        let err: AppError = AuthError::TokenIssue("backend".to_string()).into();
        let json = body_json(err.into_response()).await;
        assert_eq!(json["message"], "Failed to issue session token");
    }
}
