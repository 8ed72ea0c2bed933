//! Per-request matching pipeline:
//! extract texts → categorize → extract fields → score → suggest → sort.
//!
//! A failing resume never aborts the batch. Extraction failures become form
//! errors on `resume_files`; processing failures become `Failed` outcomes
//! that sort after every scored resume.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::TextExtractor;
use crate::forms::{CleanedForm, Field, FormErrors, UploadedFile};
use crate::recommender::category::CategoryPredictor;
use crate::recommender::resume_data::{extract_resume_data, get_job_data, JobData};
use crate::recommender::scoring::Recommender;
use crate::state::AppState;

/// Result for one resume, in submission order until sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResumeOutcome {
    Scored {
        index: usize,
        category: String,
        match_score: f64,
        suggestions: Vec<String>,
        raw_text: String,
    },
    Failed {
        index: usize,
        error: String,
    },
}

impl ResumeOutcome {
    pub fn index(&self) -> usize {
        match self {
            ResumeOutcome::Scored { index, .. } | ResumeOutcome::Failed { index, .. } => *index,
        }
    }

    pub fn match_score(&self) -> Option<f64> {
        match self {
            ResumeOutcome::Scored { match_score, .. } => Some(*match_score),
            ResumeOutcome::Failed { .. } => None,
        }
    }
}

/// Runs the full pipeline for a validated form.
///
/// Returns `AppError::NoResumeText` when neither the files nor the pasted
/// text yielded any text; extraction errors are still recorded in `errors`.
#[tracing::instrument(skip_all, fields(submission_id = %submission_id))]
pub async fn run_match(
    state: &AppState,
    form: &CleanedForm,
    submission_id: Uuid,
    errors: &mut FormErrors,
) -> Result<Vec<ResumeOutcome>, AppError> {
    let texts = collect_resume_texts(state, form, errors).await;
    if texts.is_empty() {
        warn!("No resume text found in submission");
        return Err(AppError::NoResumeText);
    }

    let job = get_job_data(form);
    let results = score_resumes(state, &texts, &job).await;

    let failed: Vec<usize> = results
        .iter()
        .filter(|r| r.match_score().is_none())
        .map(ResumeOutcome::index)
        .collect();
    info!(resumes = results.len(), failed = ?failed, "Submission processed");

    Ok(sort_results(results))
}

/// Extracts text from each upload, then appends the pasted text.
async fn collect_resume_texts(
    state: &AppState,
    form: &CleanedForm,
    errors: &mut FormErrors,
) -> Vec<String> {
    let mut texts = Vec::new();

    for file in &form.resume_files {
        match extract_in_background(Arc::clone(&state.extractor), file.clone()).await {
            Ok(text) if text.trim().is_empty() => {
                warn!(file = %file.name, "No text extracted");
            }
            Ok(text) => texts.push(text),
            Err(e) => {
                error!(file = %file.name, "Text extraction failed: {e}");
                errors.add(
                    Field::ResumeFiles,
                    format!("Error extracting text from {}: {e}", file.name),
                );
            }
        }
    }

    if let Some(text) = form.resume_text.as_deref().map(str::trim) {
        if !text.is_empty() {
            texts.push(text.to_string());
        }
    }

    texts
}

/// Moves CPU-bound extraction off the async runtime. A panicking extractor
/// is reported as an extraction failure for that file only.
async fn extract_in_background(
    extractor: Arc<dyn TextExtractor>,
    file: UploadedFile,
) -> Result<String, String> {
    match tokio::task::spawn_blocking(move || extractor.extract(&file)).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(join) if join.is_panic() => Err("the document could not be parsed".to_string()),
        Err(join) => Err(join.to_string()),
    }
}

async fn score_resumes(state: &AppState, texts: &[String], job: &JobData) -> Vec<ResumeOutcome> {
    let mut results = Vec::with_capacity(texts.len());

    for (i, text) in texts.iter().enumerate() {
        let index = i + 1;
        match score_one(state, text, job, index).await {
            Ok(outcome) => results.push(outcome),
            Err(e) => {
                error!(resume = index, "Error processing resume: {e}");
                results.push(ResumeOutcome::Failed {
                    index,
                    error: format!("Failed to process resume #{index}: {e}"),
                });
            }
        }
    }

    results
}

async fn score_one(
    state: &AppState,
    text: &str,
    job: &JobData,
    index: usize,
) -> Result<ResumeOutcome, AppError> {
    let category = state.predictor.predict(text)?;
    let resume = extract_resume_data(text);
    let match_score = state.recommender.match_score(&resume, job).await?;
    let suggestions = state.recommender.suggestions(&resume, job).await?;

    Ok(ResumeOutcome::Scored {
        index,
        category,
        match_score,
        suggestions,
        raw_text: snippet(text, state.config.snippet_chars),
    })
}

fn snippet(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Scored outcomes by descending score (ties keep submission order), then
/// failed outcomes in submission order.
pub fn sort_results(results: Vec<ResumeOutcome>) -> Vec<ResumeOutcome> {
    let (mut scored, failed): (Vec<_>, Vec<_>) = results
        .into_iter()
        .partition(|r| r.match_score().is_some());

    scored.sort_by(|a, b| {
        let a = a.match_score().unwrap_or_default();
        let b = b.match_score().unwrap_or_default();
        b.total_cmp(&a)
    });

    scored.extend(failed);
    scored
}
