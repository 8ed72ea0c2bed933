//! Match scoring: a pluggable recommender comparing extracted
//! resume fields against the job criteria.
//!
//! Default: `KeywordRecommender` (pure-Rust, deterministic, fully testable).
//! `AppState` holds an `Arc<dyn Recommender>`, swapped at startup.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::recommender::resume_data::{JobData, ResumeData, CERTIFICATION_KEYWORDS, SKILL_KEYWORDS};

pub const STRONG_MATCH: &str = "Your resume is a strong match for this role.";

// ────────────────────────────────────────────────────────────────────────────
// Weights (sum to 100)
// ────────────────────────────────────────────────────────────────────────────

const SKILLS_WEIGHT: f64 = 40.0;
const EXPERIENCE_WEIGHT: f64 = 25.0;
const TITLE_WEIGHT: f64 = 15.0;
const EDUCATION_WEIGHT: f64 = 10.0;
const CERTIFICATIONS_WEIGHT: f64 = 10.0;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap scoring backends without touching the pipeline or
/// handlers.
#[async_trait]
pub trait Recommender: Send + Sync {
    /// Score in `0.0..=100.0`.
    async fn match_score(&self, resume: &ResumeData, job: &JobData) -> Result<f64, AppError>;

    async fn suggestions(
        &self,
        resume: &ResumeData,
        job: &JobData,
    ) -> Result<Vec<String>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordRecommender, the default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Weighted keyword overlap:
/// skills 40, experience 25, title 15, education 10, certifications 10.
/// Criteria the job leaves blank award their full weight.
pub struct KeywordRecommender;

#[async_trait]
impl Recommender for KeywordRecommender {
    async fn match_score(&self, resume: &ResumeData, job: &JobData) -> Result<f64, AppError> {
        Ok(compute_match_score(resume, job))
    }

    async fn suggestions(
        &self,
        resume: &ResumeData,
        job: &JobData,
    ) -> Result<Vec<String>, AppError> {
        Ok(build_suggestions(resume, job))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core scoring
// ────────────────────────────────────────────────────────────────────────────

pub fn compute_match_score(resume: &ResumeData, job: &JobData) -> f64 {
    let skills = Coverage::of(&job.skills, &resume.skills, SKILL_KEYWORDS).ratio();
    let certifications =
        Coverage::of(&job.certifications, &resume.certifications, CERTIFICATION_KEYWORDS).ratio();

    let total = SKILLS_WEIGHT * skills
        + EXPERIENCE_WEIGHT * experience_ratio(resume, job)
        + TITLE_WEIGHT * title_ratio(resume, job)
        + EDUCATION_WEIGHT * education_ratio(resume, job)
        + CERTIFICATIONS_WEIGHT * certifications;

    (total.clamp(0.0, 100.0) * 100.0).round() / 100.0
}

pub fn build_suggestions(resume: &ResumeData, job: &JobData) -> Vec<String> {
    let mut suggestions = Vec::new();

    let skills = Coverage::of(&job.skills, &resume.skills, SKILL_KEYWORDS);
    if !skills.missing.is_empty() {
        suggestions.push(format!(
            "Add these required skills to your resume: {}.",
            skills.missing.join(", ")
        ));
    }

    if job.experience > 0 && resume.experience < f64::from(job.experience) {
        suggestions.push(format!(
            "The role asks for {} years of experience; your resume shows {}.",
            job.experience, resume.experience
        ));
    }

    if title_ratio(resume, job) < 1.0 {
        if resume.title.is_empty() {
            suggestions.push(format!(
                "State your job title clearly so it can be compared with '{}'.",
                job.title
            ));
        } else {
            suggestions.push(format!(
                "Your title '{}' does not match the target role '{}'; highlight related experience.",
                resume.title, job.title
            ));
        }
    }

    if education_ratio(resume, job) < 1.0 {
        if resume.education.is_empty() {
            suggestions.push(format!(
                "Mention your education; the role asks for '{}'.",
                job.education
            ));
        } else {
            suggestions.push(format!(
                "Your listed education ('{}') may not meet '{}'.",
                resume.education, job.education
            ));
        }
    }

    let certifications =
        Coverage::of(&job.certifications, &resume.certifications, CERTIFICATION_KEYWORDS);
    if !certifications.missing.is_empty() {
        suggestions.push(format!(
            "Consider adding certifications: {}.",
            certifications.missing.join(", ")
        ));
    }

    if suggestions.is_empty() {
        suggestions.push(STRONG_MATCH.to_string());
    }
    suggestions
}

/// How many of the job's listed items the resume covers.
struct Coverage {
    total: usize,
    missing: Vec<String>,
}

impl Coverage {
    /// `required` is the user's free-text list; `found` the space-joined
    /// keywords extracted from the resume; `keywords` the list `found` was
    /// built from.
    ///
    /// An item is covered when one of the found keywords appears in it as
    /// whole words, so "aws certified" is covered by `aws` but "javascript"
    /// is not covered by `java`.
    fn of(required: &str, found: &str, keywords: &[&str]) -> Self {
        let items = split_items(required);
        let found_lower = found.to_lowercase();
        let found_keywords: Vec<&str> = keywords
            .iter()
            .copied()
            .filter(|kw| contains_words(&found_lower, kw))
            .collect();

        let missing = items
            .iter()
            .filter(|item| !found_keywords.iter().any(|kw| contains_words(item, kw)))
            .cloned()
            .collect();

        Coverage {
            total: items.len(),
            missing,
        }
    }

    fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.total - self.missing.len()) as f64 / self.total as f64
    }
}

/// Whether `phrase` occurs in `haystack` as a run of whole
/// whitespace-separated words.
fn contains_words(haystack: &str, phrase: &str) -> bool {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.is_empty() {
        return false;
    }
    let tokens: Vec<&str> = haystack.split_whitespace().collect();
    tokens.windows(words.len()).any(|run| run == words.as_slice())
}

/// Splits "Python, Django; SQL" into lowercased, deduplicated items.
fn split_items(raw: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in raw.split([',', ';', '\n']) {
        let item = item.trim().to_lowercase();
        if !item.is_empty() && !items.contains(&item) {
            items.push(item);
        }
    }
    items
}

fn experience_ratio(resume: &ResumeData, job: &JobData) -> f64 {
    if job.experience == 0 {
        return 1.0;
    }
    (resume.experience / f64::from(job.experience)).clamp(0.0, 1.0)
}

fn title_ratio(resume: &ResumeData, job: &JobData) -> f64 {
    if job.title.is_empty() {
        return 1.0;
    }
    let matches = !resume.title.is_empty()
        && job.title.to_lowercase().contains(&resume.title.to_lowercase());
    if matches {
        1.0
    } else {
        0.0
    }
}

fn education_ratio(resume: &ResumeData, job: &JobData) -> f64 {
    if job.education.is_empty() {
        return 1.0;
    }
    if resume.education.is_empty() {
        return 0.0;
    }
    if job
        .education
        .to_lowercase()
        .contains(&resume.education.to_lowercase())
    {
        1.0
    } else {
        0.5
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommender::resume_data::extract_resume_data;

    fn job(title: &str, skills: &str, experience: u32) -> JobData {
        JobData {
            title: title.to_string(),
            skills: skills.to_string(),
            experience,
            ..Default::default()
        }
    }

    #[test]
    fn test_blank_job_scores_full() {
        let score = compute_match_score(&ResumeData::default(), &JobData::default());
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_perfect_match_scores_full() {
        let resume = extract_resume_data("Backend Engineer, 6 years of Python and SQL. Bachelor.");
        let mut job = job("Software Engineer", "Python, SQL", 5);
        job.education = "Bachelor of Science".to_string();
        assert_eq!(compute_match_score(&resume, &job), 100.0);
        assert_eq!(build_suggestions(&resume, &job), vec![STRONG_MATCH.to_string()]);
    }

    #[test]
    fn test_partial_skills_and_experience() {
        // skills 1/2 → 20, experience 2/4 → 12.5, title match → 15, rest blank → 20
        let resume = extract_resume_data("Python developer with 2 years");
        let job = job("Python Developer", "Python, Docker", 4);
        assert_eq!(compute_match_score(&resume, &job), 67.5);
    }

    #[test]
    fn test_title_mismatch_scores_zero_for_title() {
        let resume = extract_resume_data("Data analyst");
        let job = job("Software Engineer", "", 0);
        assert_eq!(compute_match_score(&resume, &job), 85.0);
    }

    #[test]
    fn test_education_partial_credit() {
        let resume = extract_resume_data("Diploma in networking");
        let job = JobData {
            education: "Master of Engineering".to_string(),
            ..Default::default()
        };
        assert_eq!(compute_match_score(&resume, &job), 95.0);
    }

    #[test]
    fn test_certification_item_containing_keyword_counts() {
        let resume = extract_resume_data("AWS certified, Cisco CCNA");
        let job = JobData {
            certifications: "AWS Certified Solutions Architect, PMP".to_string(),
            ..Default::default()
        };
        let score = compute_match_score(&resume, &job);
        assert_eq!(score, 95.0);
        let suggestions = build_suggestions(&resume, &job);
        assert_eq!(suggestions, vec!["Consider adding certifications: pmp.".to_string()]);
    }

    #[test]
    fn test_suggestions_list_each_gap() {
        let resume = extract_resume_data("Linux hobbyist");
        let mut job = job("DevOps Engineer", "Docker, Linux; Terraform", 3);
        job.education = "Bachelor".to_string();
        let suggestions = build_suggestions(&resume, &job);
        assert_eq!(suggestions.len(), 4);
        assert_eq!(
            suggestions[0],
            "Add these required skills to your resume: docker, terraform."
        );
        assert_eq!(
            suggestions[1],
            "The role asks for 3 years of experience; your resume shows 0."
        );
        assert!(suggestions[2].contains("DevOps Engineer"));
        assert!(suggestions[3].contains("Bachelor"));
    }

    #[test]
    fn test_java_does_not_cover_javascript() {
        let resume = extract_resume_data("Java developer");
        let job = job("", "JavaScript", 0);
        assert_eq!(compute_match_score(&resume, &job), 60.0);
        assert_eq!(
            build_suggestions(&resume, &job),
            vec!["Add these required skills to your resume: javascript.".to_string()]
        );
    }

    #[test]
    fn test_single_letter_skills_need_whole_word_match() {
        let resume = extract_resume_data("Docker engineer");
        let job = job("", "R, C", 0);
        assert_eq!(compute_match_score(&resume, &job), 60.0);
        assert_eq!(
            build_suggestions(&resume, &job),
            vec!["Add these required skills to your resume: r, c.".to_string()]
        );
    }

    #[test]
    fn test_multi_word_keyword_covers_item() {
        let resume = extract_resume_data("Led project management for a Python team");
        let job = job("", "Agile project management, Python", 0);
        assert_eq!(compute_match_score(&resume, &job), 100.0);
    }

    #[test]
    fn test_contains_words_respects_boundaries() {
        assert!(contains_words("python java sql", "java"));
        assert!(contains_words("aws certified solutions architect", "aws"));
        assert!(contains_words("led project management", "project management"));
        assert!(!contains_words("javascript", "java"));
        assert!(!contains_words("docker", "c"));
        assert!(!contains_words("python", ""));
    }

    #[test]
    fn test_split_items_dedups_and_lowercases() {
        assert_eq!(
            split_items("Python, python;SQL\n , "),
            vec!["python".to_string(), "sql".to_string()]
        );
    }

    #[test]
    fn test_score_is_rounded_to_two_decimals() {
        // skills 1/3 → 13.333…, everything else blank → 60
        let resume = extract_resume_data("python");
        let job = job("", "Python, Go, Rust", 0);
        assert_eq!(compute_match_score(&resume, &job), 73.33);
    }

    #[tokio::test]
    async fn test_keyword_recommender_delegates() {
        let resume = extract_resume_data("Java developer, 4 years");
        let job = job("Java Developer", "Java", 2);
        let score = KeywordRecommender.match_score(&resume, &job).await.unwrap();
        let suggestions = KeywordRecommender.suggestions(&resume, &job).await.unwrap();
        assert_eq!(score, 100.0);
        assert_eq!(suggestions, vec![STRONG_MATCH.to_string()]);
    }
}
