//! Resume categorization.
//!
//! `AppState` holds an `Arc<dyn CategoryPredictor>`; the keyword predictor is
//! the default and the only backend that ships.

use crate::errors::AppError;

pub const FALLBACK_CATEGORY: &str = "General";

/// Category table. Order breaks ties.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Data Science",
        &["machine learning", "data science", "pandas", "statistics", "tensorflow", "numpy"],
    ),
    (
        "Web Development",
        &["javascript", "react", "html", "css", "frontend", "django", "node"],
    ),
    (
        "DevOps",
        &["docker", "kubernetes", "ci/cd", "terraform", "jenkins", "ansible"],
    ),
    (
        "Software Engineering",
        &["java", "c++", "python", "software engineer", "algorithms", "microservices"],
    ),
    (
        "Database Administration",
        &["sql", "database", "oracle", "postgresql", "mysql", "dba"],
    ),
    (
        "Network & Security",
        &["cisco", "network", "firewall", "security", "ccna", "penetration"],
    ),
    (
        "Project Management",
        &["project management", "pmp", "scrum", "agile", "stakeholder", "roadmap"],
    ),
    (
        "Business Analysis",
        &["business analyst", "requirements", "excel", "tableau", "power bi"],
    ),
];

pub trait CategoryPredictor: Send + Sync {
    fn predict(&self, text: &str) -> Result<String, AppError>;
}

/// Picks the category whose keywords appear most often (by distinct keyword).
pub struct KeywordCategoryPredictor;

impl CategoryPredictor for KeywordCategoryPredictor {
    fn predict(&self, text: &str) -> Result<String, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::Prediction(
                "cannot categorize an empty resume".to_string(),
            ));
        }

        let text_lower = text.to_lowercase();
        let mut best: Option<(&str, usize)> = None;

        for &(category, keywords) in CATEGORIES {
            let hits = keywords.iter().filter(|kw| text_lower.contains(*kw)).count();
            if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
                best = Some((category, hits));
            }
        }

        Ok(best
            .map(|(category, _)| category)
            .unwrap_or(FALLBACK_CATEGORY)
            .to_string())
    }
}
