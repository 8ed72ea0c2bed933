//! Axum route handlers for the resume matcher page and its JSON twin.

use askama::Template;
use axum::{
    extract::{Multipart, State},
    response::Html,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{AppError, INVALID_FORM, NO_RESUME_TEXT};
use crate::forms::{parse_multipart, Field, FormErrors, ResumeForm};
use crate::recommender::pipeline::{run_match, ResumeOutcome};
use crate::state::AppState;
use crate::views::{result_views, FormView, HomeTemplate};

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub submission_id: Uuid,
    pub processed_at: DateTime<Utc>,
    pub results: Vec<ResumeOutcome>,
    /// Per-file extraction problems that did not stop the batch.
    pub warnings: Vec<String>,
}

/// GET /
pub async fn handle_home() -> Result<Html<String>, AppError> {
    Ok(Html(HomeTemplate::empty().render()?))
}

/// POST /
///
/// Validates the submission and re-renders the page with either form errors
/// or one result per resume.
pub async fn handle_submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let submission_id = Uuid::new_v4();
    let form = bind_form(&state, multipart).await?;

    let page = match form.validate() {
        Err(errors) => {
            warn!(%submission_id, "Form errors: {errors}");
            HomeTemplate {
                form: FormView::bound(&form.submission, &errors),
                results: None,
                error: Some(INVALID_FORM.to_string()),
            }
        }
        Ok(cleaned) => {
            let mut errors = FormErrors::default();
            let outcome = run_match(&state, &cleaned, submission_id, &mut errors).await;
            let form_view = FormView::bound(&form.submission, &errors);
            match outcome {
                Ok(results) => HomeTemplate {
                    form: form_view,
                    results: result_views(&results),
                    error: None,
                },
                Err(AppError::NoResumeText) => HomeTemplate {
                    form: form_view,
                    results: None,
                    error: Some(NO_RESUME_TEXT.to_string()),
                },
                Err(e) => return Err(e),
            }
        }
    };

    Ok(Html(page.render()?))
}

/// POST /api/v1/match
///
/// Same pipeline as the page, answering with JSON. Invalid forms are a 400
/// carrying the field errors.
pub async fn handle_match_api(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MatchResponse>, AppError> {
    let submission_id = Uuid::new_v4();
    let form = bind_form(&state, multipart).await?;
    let cleaned = form.validate().map_err(AppError::InvalidForm)?;

    let mut errors = FormErrors::default();
    let results = run_match(&state, &cleaned, submission_id, &mut errors).await?;

    info!(%submission_id, resumes = results.len(), "Match API request served");

    Ok(Json(MatchResponse {
        submission_id,
        processed_at: Utc::now(),
        results,
        warnings: errors.get(Field::ResumeFiles).to_vec(),
    }))
}

async fn bind_form(state: &AppState, multipart: Multipart) -> Result<ResumeForm, AppError> {
    let submission = parse_multipart(multipart).await?;
    Ok(ResumeForm::new(submission).with_max_upload_bytes(state.config.max_upload_bytes))
}
