//! Tallies classified reviews into a summary.

use serde::Serialize;

use crate::model::{Review, SentimentSummary};

/// Classified reviews with their per-label counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedReviews {
    pub summary: SentimentSummary,
    pub reviews: Vec<Review>,
}

/// Count labels in a single pass. Review order is preserved.
pub fn aggregate(reviews: Vec<Review>) -> AggregatedReviews {
    let mut summary = SentimentSummary::default();
    for review in &reviews {
        summary.record(review.sentiment());
    }
    debug_assert_eq!(
        summary.total(),
        reviews.len(),
        "sentiment summary must account for every review"
    );
    AggregatedReviews { summary, reviews }
}
