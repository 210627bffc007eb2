use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Fault boundary of the request path. Every fallible operation in a
/// handler routes into one of these variants; nothing else reaches the
/// client.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Image processing failed.")]
    ProcessingFailed,

    #[error("Processing completed, but output file not found.")]
    MissingOutput,

    #[error("Malformed multipart request: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => failure(StatusCode::BAD_REQUEST, &msg),
            AppError::Multipart(e) => failure(StatusCode::BAD_REQUEST, &e.to_string()),
            AppError::ProcessingFailed => {
                failure(StatusCode::INTERNAL_SERVER_ERROR, "Image processing failed.")
            }
            AppError::MissingOutput => failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Processing completed, but output file not found.",
            ),
            AppError::Internal(e) => {
                // Full detail stays server-side; the client gets the fixed line.
                tracing::error!("Unhandled error in request path: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something broke!").into_response()
            }
        }
    }
}

fn failure(status: StatusCode, message: &str) -> Response {
    let body = Json(json!({
        "success": false,
        "message": message
    }));
    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_failure_is_a_500() {
        let response = AppError::ProcessingFailed.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_bad_request_is_a_400() {
        let response = AppError::BadRequest("No image file provided.".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_errors_do_not_leak_detail() {
        let response =
            AppError::Internal(anyhow::anyhow!("secret connection string")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
