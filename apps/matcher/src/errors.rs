use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::forms::FormErrors;

pub const INVALID_FORM: &str = "Form data is invalid. Please correct the errors and try again.";
pub const NO_RESUME_TEXT: &str =
    "No resume text found. Please upload files or paste resume content.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{}", INVALID_FORM)]
    InvalidForm(FormErrors),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("{}", NO_RESUME_TEXT)]
    NoResumeText,

    #[error("Prediction error: {0}")]
    Prediction(String),

    #[error("Scoring error: {0}")]
    Scoring(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::InvalidForm(errors) => {
                let body = Json(json!({
                    "error": {
                        "code": "VALIDATION_ERROR",
                        "message": self.to_string(),
                        "non_field": errors.non_field,
                        "fields": errors.fields,
                    }
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Multipart(e) => (e.status(), "MULTIPART_ERROR", e.body_text()),
            AppError::NoResumeText => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                NO_RESUME_TEXT.to_string(),
            ),
            AppError::Prediction(msg) | AppError::Scoring(msg) => {
                tracing::error!("Recommender error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RECOMMENDER_ERROR",
                    "Resume analysis failed".to_string(),
                )
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "TEMPLATE_ERROR",
                    "The page could not be rendered".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::Field;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_form_envelope_is_flat() {
        let mut errors = FormErrors::default();
        errors.add(Field::JobTitle, "This field is required when pasting resume text.");
        errors.add_non_field("top");

        let response = AppError::InvalidForm(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["message"], INVALID_FORM);
        assert_eq!(json["error"]["non_field"][0], "top");
        assert_eq!(
            json["error"]["fields"]["job_title"][0],
            "This field is required when pasting resume text."
        );
    }

    #[tokio::test]
    async fn test_no_resume_text_is_unprocessable() {
        let response = AppError::NoResumeText.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(response).await;
        assert_eq!(json["error"]["message"], NO_RESUME_TEXT);
    }

    #[tokio::test]
    async fn test_recommender_failure_hides_details() {
        let response = AppError::Scoring("scorer offline".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "RECOMMENDER_ERROR");
        assert!(!json.to_string().contains("scorer offline"));
    }
}
