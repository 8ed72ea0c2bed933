pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::recommender::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Whole-request cap; per-file limits are enforced by the form.
    let body_limit = state.config.max_request_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/",
            get(handlers::handle_home).post(handlers::handle_submit),
        )
        .route("/api/v1/match", post(handlers::handle_match_api))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()) // TODO: restrict origins once the page is served behind a known domain
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::errors::{INVALID_FORM, NO_RESUME_TEXT};
    use crate::forms::MISSING_RESUME;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "matcher-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File {
            filename: &'a str,
            content_type: &'a str,
            data: &'a [u8],
        },
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File {
                    filename,
                    content_type,
                    data,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"resume_files\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn submit(uri: &str, parts: &[Part<'_>]) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        app().oneshot(request).await.unwrap()
    }

    fn app() -> Router {
        build_router(AppState::with_defaults(Config::default()))
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    fn text_resume<'a>(text: &'a str) -> Vec<Part<'a>> {
        vec![
            Part::Text("resume_text", text),
            Part::Text("job_title", "Python Developer"),
            Part::Text("job_skills", "Python, SQL"),
            Part::Text("job_experience", "3"),
            Part::Text("job_education", ""),
            Part::Text("job_certifications", ""),
        ]
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_get_renders_empty_form() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(!html.contains(INVALID_FORM));
    }

    #[tokio::test]
    async fn test_post_without_resume_rerenders_with_errors() {
        let response = submit("/", &[Part::Text("resume_text", "")]).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(INVALID_FORM));
        assert!(html.contains(MISSING_RESUME));
    }

    #[tokio::test]
    async fn test_post_rejects_disallowed_file_type() {
        let response = submit(
            "/",
            &[Part::File {
                filename: "photo.png",
                content_type: "image/png",
                data: b"\x89PNG",
            }],
        )
        .await;
        let html = body_text(response).await;
        assert!(html.contains("Unsupported file type: image/png."));
    }

    #[tokio::test]
    async fn test_post_text_renders_results_and_keeps_values() {
        let response = submit("/", &text_resume("Python developer, 4 years of SQL")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Results"));
        assert!(html.contains("100.00"));
        assert!(html.contains("value=\"Python Developer\""));
    }

    #[tokio::test]
    async fn test_api_invalid_form_is_bad_request_with_fields() {
        let response = submit("/api/v1/match", &[Part::Text("resume_text", "Engineer")]).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            json["error"]["fields"]["job_title"][0],
            "This field is required when pasting resume text."
        );
    }

    #[tokio::test]
    async fn test_api_missing_resume_is_top_level_non_field_error() {
        let response = submit("/api/v1/match", &[Part::Text("resume_text", "")]).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["non_field"][0], MISSING_RESUME);
        assert!(json["error"]["fields"].get("fields").is_none());
    }

    #[tokio::test]
    async fn test_api_rejects_oversized_file() {
        let big = vec![b'a'; 5 * 1024 * 1024 + 1];
        let response = submit(
            "/api/v1/match",
            &[Part::File {
                filename: "huge.txt",
                content_type: "text/plain",
                data: &big,
            }],
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(
            json["error"]["fields"]["resume_files"][0],
            "File 'huge.txt' exceeds the 5MB size limit."
        );
    }

    #[tokio::test]
    async fn test_api_sorts_results_by_score() {
        let response = submit(
            "/api/v1/match",
            &[
                Part::File {
                    filename: "weak.txt",
                    content_type: "text/plain",
                    data: b"Barista",
                },
                Part::File {
                    filename: "strong.txt",
                    content_type: "text/plain; charset=utf-8",
                    data: b"Software engineer, 5 years of Python",
                },
                Part::Text("job_title", "Software Engineer"),
                Part::Text("job_skills", "Python"),
                Part::Text("job_experience", "2"),
            ],
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let results = json["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["index"], 2);
        assert_eq!(results[0]["status"], "scored");
        assert_eq!(results[0]["match_score"], 100.0);
        assert_eq!(results[1]["index"], 1);
        assert!(json["warnings"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_api_blank_file_only_is_unprocessable() {
        let response = submit(
            "/api/v1/match",
            &[Part::File {
                filename: "blank.txt",
                content_type: "text/plain",
                data: b"   ",
            }],
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], NO_RESUME_TEXT);
    }

    #[tokio::test]
    async fn test_page_blank_file_only_shows_no_text_message() {
        let response = submit(
            "/",
            &[Part::File {
                filename: "blank.txt",
                content_type: "text/plain",
                data: b"\n",
            }],
        )
        .await;
        let html = body_text(response).await;
        assert!(html.contains(NO_RESUME_TEXT));
        assert!(!html.contains("Results"));
    }
}
