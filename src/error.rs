//! Typed errors for the analysis pipeline and its collaborators.

use thiserror::Error;

/// Rejections from the sentiment classifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifyError {
    /// Text was empty or whitespace only
    #[error("invalid input: review text is empty")]
    InvalidInput,
}

/// Failures of the page-fetch collaborator.
///
/// None of these reach the caller of an analysis; they select the synthetic fallback.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Browser launch, navigation or DevTools call failed
    #[error("browser error: {0}")]
    Browser(String),

    /// Plain HTTP request failed or returned a non-success status
    #[error("HTTP error: {0}")]
    Http(String),

    /// The page rendered but produced no content
    #[error("empty page: {url}")]
    EmptyPage { url: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Http(err.to_string())
    }
}

/// Failures of the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("not found: {id}")]
    NotFound { id: String },
}
