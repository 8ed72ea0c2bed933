//! Resume submission form: multipart parsing, per-field cleaning and the
//! cross-field rules that decide whether a submission can be matched.

use std::collections::BTreeMap;

use axum::extract::Multipart;
use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::errors::AppError;

pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

const TEXT_MAX_CHARS: usize = 100;

pub const MISSING_RESUME: &str =
    "Please provide either pasted resume text or upload at least one resume file.";
pub const REQUIRED_WITH_TEXT: &str = "This field is required when pasting resume text.";

/// Form fields, named as they appear in the multipart body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ResumeFiles,
    ResumeText,
    JobTitle,
    JobSkills,
    JobExperience,
    JobEducation,
    JobCertifications,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::ResumeFiles => "resume_files",
            Field::ResumeText => "resume_text",
            Field::JobTitle => "job_title",
            Field::JobSkills => "job_skills",
            Field::JobExperience => "job_experience",
            Field::JobEducation => "job_education",
            Field::JobCertifications => "job_certifications",
        }
    }
}

/// One uploaded resume document as received from the browser.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    /// Browser-declared MIME type without parameters.
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Raw values of a submitted form, before any cleaning.
#[derive(Debug, Clone, Default)]
pub struct ResumeSubmission {
    pub files: Vec<UploadedFile>,
    pub resume_text: Option<String>,
    pub job_title: Option<String>,
    pub job_skills: Option<String>,
    pub job_experience: Option<String>,
    pub job_education: Option<String>,
    pub job_certifications: Option<String>,
}

/// Validated form values.
#[derive(Debug, Clone, Default)]
pub struct CleanedForm {
    pub resume_files: Vec<UploadedFile>,
    pub resume_text: Option<String>,
    pub job_title: String,
    pub job_skills: String,
    pub job_experience: Option<u32>,
    pub job_education: String,
    pub job_certifications: String,
}

/// Field-level and form-level validation messages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormErrors {
    pub non_field: Vec<String>,
    pub fields: BTreeMap<Field, Vec<String>>,
}

impl FormErrors {
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn get(&self, field: Field) -> &[String] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has(&self, field: Field) -> bool {
        !self.get(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.non_field.is_empty() && self.fields.values().all(Vec::is_empty)
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = self.non_field.clone();
        for (field, messages) in &self.fields {
            for message in messages {
                parts.push(format!("{}: {message}", field.as_str()));
            }
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// Reads every part of a multipart body into a `ResumeSubmission`.
///
/// File inputs left empty by the browser arrive as a part with no file name
/// and no data; those are dropped. Unknown parts are ignored.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<ResumeSubmission, AppError> {
    let mut submission = ResumeSubmission::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume_files" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .map(normalize_mime)
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await?;
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                submission.files.push(UploadedFile {
                    name: file_name,
                    content_type,
                    data,
                });
            }
            "resume_text" => submission.resume_text = Some(field.text().await?),
            "job_title" => submission.job_title = Some(field.text().await?),
            "job_skills" => submission.job_skills = Some(field.text().await?),
            "job_experience" => submission.job_experience = Some(field.text().await?),
            "job_education" => submission.job_education = Some(field.text().await?),
            "job_certifications" => submission.job_certifications = Some(field.text().await?),
            other => debug!(field = %other, "Ignoring unknown multipart field"),
        }
    }

    Ok(submission)
}

/// Strips parameters such as `; charset=utf-8` and lowercases the type.
fn normalize_mime(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Bound resume form. Holds the raw submission so it can be re-rendered.
#[derive(Debug, Clone)]
pub struct ResumeForm {
    pub submission: ResumeSubmission,
    max_upload_bytes: usize,
}

impl ResumeForm {
    pub fn new(submission: ResumeSubmission) -> Self {
        Self {
            submission,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Runs field cleaning, file checks and the cross-field rules.
    pub fn validate(&self) -> Result<CleanedForm, FormErrors> {
        let mut errors = FormErrors::default();
        let s = &self.submission;

        let resume_text = clean_text(s.resume_text.as_deref(), None)
            .unwrap_or_else(|msg| {
                errors.add(Field::ResumeText, msg);
                None
            });
        let job_title = self.clean_optional(&mut errors, Field::JobTitle, &s.job_title, true);
        let job_skills = self.clean_optional(&mut errors, Field::JobSkills, &s.job_skills, false);
        let job_education =
            self.clean_optional(&mut errors, Field::JobEducation, &s.job_education, true);
        let job_certifications = self.clean_optional(
            &mut errors,
            Field::JobCertifications,
            &s.job_certifications,
            false,
        );
        let job_experience = clean_non_negative_int(s.job_experience.as_deref())
            .unwrap_or_else(|msg| {
                errors.add(Field::JobExperience, msg);
                None
            });

        if let Err(msg) = self.clean_resume_files() {
            errors.add(Field::ResumeFiles, msg);
        }

        // Cross-field rules
        if resume_text.is_none() && s.files.is_empty() {
            errors.add_non_field(MISSING_RESUME);
        }

        if resume_text.is_some() {
            let missing = [
                (Field::JobTitle, job_title.is_none()),
                (Field::JobSkills, job_skills.is_none()),
                (Field::JobExperience, job_experience.is_none()),
            ];
            for (field, is_missing) in missing {
                if is_missing && !errors.has(field) {
                    errors.add(field, REQUIRED_WITH_TEXT);
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CleanedForm {
            resume_files: s.files.clone(),
            resume_text,
            job_title: job_title.unwrap_or_default(),
            job_skills: job_skills.unwrap_or_default(),
            job_experience,
            job_education: job_education.unwrap_or_default(),
            job_certifications: job_certifications.unwrap_or_default(),
        })
    }

    fn clean_optional(
        &self,
        errors: &mut FormErrors,
        field: Field,
        raw: &Option<String>,
        limited: bool,
    ) -> Option<String> {
        let max_chars = limited.then_some(TEXT_MAX_CHARS);
        clean_text(raw.as_deref(), max_chars).unwrap_or_else(|msg| {
            errors.add(field, msg);
            None
        })
    }

    /// Checks each upload against the MIME allow-list and the size cap.
    /// Stops at the first offending file.
    fn clean_resume_files(&self) -> Result<(), String> {
        for file in &self.submission.files {
            if !ALLOWED_MIME_TYPES.contains(&file.content_type.as_str()) {
                return Err(format!(
                    "Unsupported file type: {}. Only PDF, DOC, DOCX, TXT are allowed.",
                    file.content_type
                ));
            }
            if file.size() > self.max_upload_bytes {
                return Err(format!(
                    "File '{}' exceeds the {}MB size limit.",
                    file.name,
                    self.max_upload_bytes.div_ceil(1024 * 1024)
                ));
            }
        }
        Ok(())
    }
}

/// Trims a text value; empty input cleans to `None`.
fn clean_text(raw: Option<&str>, max_chars: Option<usize>) -> Result<Option<String>, String> {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Ok(None);
    }
    if let Some(max) = max_chars {
        let len = value.chars().count();
        if len > max {
            return Err(format!(
                "Ensure this value has at most {max} characters (it has {len})."
            ));
        }
    }
    Ok(Some(value.to_string()))
}

/// Parses a whole number ≥ 0. Trailing `.0` decimals are tolerated.
fn clean_non_negative_int(raw: Option<&str>) -> Result<Option<u32>, String> {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Ok(None);
    }
    let integral = match value.split_once('.') {
        Some((whole, frac)) if frac.chars().all(|c| c == '0') => whole,
        Some(_) => return Err("Enter a whole number.".to_string()),
        None => value,
    };
    let parsed: i64 = integral
        .parse()
        .map_err(|_| "Enter a whole number.".to_string())?;
    if parsed < 0 {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }
    u32::try_from(parsed)
        .map(Some)
        .map_err(|_| "Enter a whole number.".to_string())
}
