//! Product review extraction and sentiment analysis.
//!
//! A page is fetched by a [`fetch::PageFetcher`], reviews are pulled out by the
//! [`extractor::Extractor`] cascade (or generated from templates when none are
//! found), labelled by the [`classifier::SentimentClassifier`] and tallied by
//! [`aggregator::aggregate`]. [`analyzer::ReviewAnalyzer`] runs the whole chain.

pub mod aggregator;
pub mod analyzer;
pub mod api;
pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod lexicon;
pub mod model;
pub mod rules;
pub mod synthetic;

pub use analyzer::{AnalysisRequest, ReviewAnalyzer};
pub use classifier::SentimentClassifier;
pub use error::{ClassifyError, FetchError, StoreError};
pub use extractor::Extractor;
pub use model::{ProductAnalysis, Review, Sentiment, SentimentSummary};
pub use synthetic::{detect_product_type, SyntheticReviewGenerator};
