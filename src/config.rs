//! Tuning constants and service configuration.
//!
//! The numeric constants below are empirical. They are kept as named values so
//! they can be tuned without touching the pipeline's control flow.

use std::time::Duration;

/// Compound score at or above which an otherwise unmatched review is Positive.
pub const POSITIVE_THRESHOLD: f64 = 0.1;

/// Compound score at or below which an otherwise unmatched review is Negative.
/// Asymmetric with [`POSITIVE_THRESHOLD`]: the residual band leans Neutral/Negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Chance that a synthetic review mentions the product by name.
pub const NAME_MENTION_PROBABILITY: f64 = 0.3;

/// Chance that a synthetic review gets a category-specific clause appended.
pub const CLAUSE_PROBABILITY: f64 = 0.2;

pub const DEFAULT_MAX_REVIEWS: usize = 20;

/// Review fragments must be strictly longer than this (chars, trimmed).
pub const MIN_REVIEW_CHARS: usize = 10;

/// Generic scan only keeps elements strictly longer than this.
pub const GENERIC_SCAN_MIN_CHARS: usize = 50;

/// Raw product-name candidates must fall strictly between these bounds.
pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 200;

/// Cleaned product names are truncated to this many characters.
pub const CLEAN_NAME_MAX_CHARS: usize = 100;

pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Decision boundaries for the classifier's threshold fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierThresholds {
    pub positive: f64,
    pub negative: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            positive: POSITIVE_THRESHOLD,
            negative: NEGATIVE_THRESHOLD,
        }
    }
}

/// Which page-fetch collaborator the server uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Chrome,
    Http,
}

impl FetchMode {
    fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "http" | "plain" => FetchMode::Http,
            _ => FetchMode::Chrome,
        }
    }
}

/// Runtime configuration for the HTTP service, read from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub database_url: Option<String>,
    pub fetch_mode: FetchMode,
    pub hydration_wait: Duration,
    pub scroll_passes: u32,
    pub cors_origins: Vec<String>,
    pub max_reviews: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5001".to_string(),
            database_url: None,
            fetch_mode: FetchMode::Chrome,
            hydration_wait: Duration::from_secs(4),
            scroll_passes: 3,
            cors_origins: Vec::new(),
            max_reviews: DEFAULT_MAX_REVIEWS,
        }
    }
}

impl ServiceConfig {
    /// Build from process environment. Call `dotenv()` first if a `.env` file should apply.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url,
            fetch_mode: lookup("FETCH_MODE")
                .map(|s| FetchMode::parse(&s))
                .unwrap_or(defaults.fetch_mode),
            hydration_wait: lookup("FETCH_HYDRATION_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.hydration_wait),
            scroll_passes: lookup("FETCH_SCROLL_PASSES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.scroll_passes),
            cors_origins,
            max_reviews: lookup("MAX_REVIEWS")
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_reviews),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ServiceConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = config_from(&[]);
        assert_eq!(config.bind_addr, "0.0.0.0:5001");
        assert!(config.database_url.is_none());
        assert_eq!(config.fetch_mode, FetchMode::Chrome);
        assert_eq!(config.max_reviews, DEFAULT_MAX_REVIEWS);
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let config = config_from(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "postgres://localhost/reviews"),
            ("FETCH_MODE", "HTTP"),
            ("FETCH_HYDRATION_SECS", "1"),
            ("CORS_ORIGINS", "http://localhost:3000, http://localhost:3001,"),
            ("MAX_REVIEWS", "5"),
        ]);
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/reviews"));
        assert_eq!(config.fetch_mode, FetchMode::Http);
        assert_eq!(config.hydration_wait, Duration::from_secs(1));
        assert_eq!(config.cors_origins, vec!["http://localhost:3000", "http://localhost:3001"]);
        assert_eq!(config.max_reviews, 5);
    }

    #[test]
    fn test_blank_database_url_and_bad_numbers_fall_back() {
        let config = config_from(&[("DATABASE_URL", "  "), ("MAX_REVIEWS", "zero"), ("FETCH_SCROLL_PASSES", "-1")]);
        assert!(config.database_url.is_none());
        assert_eq!(config.max_reviews, DEFAULT_MAX_REVIEWS);
        assert_eq!(config.scroll_passes, 3);
    }
}
