//! Job criteria normalization and naive resume field extraction.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::forms::CleanedForm;

pub const TITLE_KEYWORDS: &[&str] = &[
    "manager",
    "engineer",
    "developer",
    "analyst",
    "consultant",
    "specialist",
    "architect",
];

pub const SKILL_KEYWORDS: &[&str] = &[
    "python",
    "java",
    "sql",
    "aws",
    "docker",
    "linux",
    "javascript",
    "c++",
    "project management",
];

pub const EDUCATION_KEYWORDS: &[&str] = &["bachelor", "master", "phd", "diploma", "degree", "associate"];

pub const CERTIFICATION_KEYWORDS: &[&str] = &["aws", "pmp", "cisco", "scrum", "six sigma"];

/// Matches "3 years", "5+ years", "2.5 years" in lowercased text.
static YEARS_OF_EXPERIENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(\.\d+)?)\s*\+?\s*years").expect("experience pattern is valid")
});

/// Criteria the user entered for the role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobData {
    pub title: String,
    pub skills: String,
    pub experience: u32,
    pub education: String,
    pub certifications: String,
}

/// Fields pulled out of a resume's raw text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeData {
    pub title: String,
    /// Matched skill keywords, space separated, in keyword-list order.
    pub skills: String,
    pub experience: f64,
    pub education: String,
    pub certifications: String,
}

pub fn get_job_data(form: &CleanedForm) -> JobData {
    JobData {
        title: form.job_title.trim().to_string(),
        skills: form.job_skills.trim().to_string(),
        experience: form.job_experience.unwrap_or(0),
        education: form.job_education.trim().to_string(),
        certifications: form.job_certifications.trim().to_string(),
    }
}

/// Keyword and regex based extraction. Substring matching only, so "java"
/// also fires on "javascript".
pub fn extract_resume_data(text: &str) -> ResumeData {
    let text_lower = text.to_lowercase();

    ResumeData {
        title: first_keyword(&text_lower, TITLE_KEYWORDS),
        skills: all_keywords(&text_lower, SKILL_KEYWORDS),
        experience: years_of_experience(&text_lower),
        education: first_keyword(&text_lower, EDUCATION_KEYWORDS),
        certifications: all_keywords(&text_lower, CERTIFICATION_KEYWORDS),
    }
}

fn first_keyword(text_lower: &str, keywords: &[&str]) -> String {
    keywords
        .iter()
        .find(|kw| text_lower.contains(*kw))
        .map(|kw| capitalize(kw))
        .unwrap_or_default()
}

fn all_keywords(text_lower: &str, keywords: &[&str]) -> String {
    keywords
        .iter()
        .filter(|kw| text_lower.contains(*kw))
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn years_of_experience(text_lower: &str) -> f64 {
    YEARS_OF_EXPERIENCE
        .captures(text_lower)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// First character uppercased, the rest lowercased.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
