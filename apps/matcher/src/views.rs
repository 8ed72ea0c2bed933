//! Askama view-models for the resume matcher page.

use askama::Template;

use crate::forms::{Field, FormErrors, ResumeSubmission};
use crate::recommender::pipeline::ResumeOutcome;

pub const FILE_HELP_TEXT: &str = "Accepted formats: PDF, DOC, DOCX, TXT. Max size: 5MB per file.";
const FILE_ACCEPT: &str = ".pdf,.doc,.docx,.txt";

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub form: FormView,
    pub results: Option<Vec<ResultView>>,
    pub error: Option<String>,
}

impl HomeTemplate {
    pub fn empty() -> Self {
        Self {
            form: FormView::unbound(),
            results: None,
            error: None,
        }
    }
}

/// Form as rendered, with submitted values and errors.
pub struct FormView {
    pub non_field_errors: Vec<String>,
    pub fields: Vec<FieldView>,
}

pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    /// One of `file`, `textarea`, `text`, `number`.
    pub widget: &'static str,
    pub placeholder: &'static str,
    pub help_text: &'static str,
    pub accept: &'static str,
    pub max_length: usize,
    pub rows: usize,
    pub value: String,
    pub errors: Vec<String>,
}

impl FormView {
    pub fn unbound() -> Self {
        Self::bound(&ResumeSubmission::default(), &FormErrors::default())
    }

    /// Keeps submitted values (files excepted, browsers never refill those).
    pub fn bound(submission: &ResumeSubmission, errors: &FormErrors) -> Self {
        let value = |raw: &Option<String>| raw.clone().unwrap_or_default();

        let fields = vec![
            FieldView {
                placeholder: "",
                help_text: FILE_HELP_TEXT,
                accept: FILE_ACCEPT,
                ..FieldView::new(Field::ResumeFiles, "Upload Resume Files", "file", String::new(), errors)
            },
            FieldView {
                placeholder: "Paste your resume text here...",
                rows: 6,
                ..FieldView::new(
                    Field::ResumeText,
                    "Paste Resume Text",
                    "textarea",
                    value(&submission.resume_text),
                    errors,
                )
            },
            FieldView {
                placeholder: "e.g. Software Engineer",
                max_length: 100,
                ..FieldView::new(Field::JobTitle, "Job Title", "text", value(&submission.job_title), errors)
            },
            FieldView {
                placeholder: "e.g. Python, Django, SQL",
                ..FieldView::new(
                    Field::JobSkills,
                    "Required Skills",
                    "textarea",
                    value(&submission.job_skills),
                    errors,
                )
            },
            FieldView {
                placeholder: "Years of experience",
                ..FieldView::new(
                    Field::JobExperience,
                    "Minimum Experience (Years)",
                    "number",
                    value(&submission.job_experience),
                    errors,
                )
            },
            FieldView {
                placeholder: "e.g. BSc Computer Science",
                max_length: 100,
                ..FieldView::new(
                    Field::JobEducation,
                    "Required Education",
                    "text",
                    value(&submission.job_education),
                    errors,
                )
            },
            FieldView {
                placeholder: "e.g. AWS Certified, PMP",
                ..FieldView::new(
                    Field::JobCertifications,
                    "Preferred Certifications",
                    "textarea",
                    value(&submission.job_certifications),
                    errors,
                )
            },
        ];

        Self {
            non_field_errors: errors.non_field.clone(),
            fields,
        }
    }
}

impl FieldView {
    fn new(
        field: Field,
        label: &'static str,
        widget: &'static str,
        value: String,
        errors: &FormErrors,
    ) -> Self {
        Self {
            name: field.as_str(),
            label,
            widget,
            placeholder: "",
            help_text: "",
            accept: "",
            max_length: 0,
            rows: 3,
            value,
            errors: errors.get(field).to_vec(),
        }
    }
}

/// One row of the results table.
pub struct ResultView {
    pub index: usize,
    pub is_error: bool,
    pub category: String,
    pub match_score: String,
    pub suggestions: Vec<String>,
    pub raw_text: String,
    pub error: String,
}

impl From<&ResumeOutcome> for ResultView {
    fn from(outcome: &ResumeOutcome) -> Self {
        match outcome {
            ResumeOutcome::Scored {
                index,
                category,
                match_score,
                suggestions,
                raw_text,
            } => ResultView {
                index: *index,
                is_error: false,
                category: category.clone(),
                match_score: format!("{match_score:.2}"),
                suggestions: suggestions.clone(),
                raw_text: raw_text.clone(),
                error: String::new(),
            },
            ResumeOutcome::Failed { index, error } => ResultView {
                index: *index,
                is_error: true,
                category: String::new(),
                match_score: String::new(),
                suggestions: Vec::new(),
                raw_text: String::new(),
                error: error.clone(),
            },
        }
    }
}

/// `None` for an empty list so the template skips the results section.
pub fn result_views(outcomes: &[ResumeOutcome]) -> Option<Vec<ResultView>> {
    if outcomes.is_empty() {
        return None;
    }
    Some(outcomes.iter().map(ResultView::from).collect())
}
