//! End-to-end analysis of one product page.

use rand::Rng;
use tracing::{info, warn};

use crate::aggregator::aggregate;
use crate::classifier::SentimentClassifier;
use crate::config::{DEFAULT_MAX_REVIEWS, UNKNOWN_PRODUCT};
use crate::error::FetchError;
use crate::extractor::Extractor;
use crate::model::{ProductAnalysis, ProductIdentity, Review, ReviewOrigin};
use crate::synthetic::{detect_product_type, SyntheticReviewGenerator};

/// What the caller wants analysed.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub url: String,
    /// Caller-supplied name, used only when no name can be extracted
    pub product_name: Option<String>,
    pub max_reviews: usize,
}

impl AnalysisRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            product_name: None,
            max_reviews: DEFAULT_MAX_REVIEWS,
        }
    }

    pub fn with_name_hint(mut self, name: Option<String>) -> Self {
        self.product_name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        self
    }

    pub fn with_max_reviews(mut self, max_reviews: usize) -> Self {
        self.max_reviews = max_reviews;
        self
    }
}

/// Holds the immutable extractor, classifier and generator shared by all requests.
#[derive(Default)]
pub struct ReviewAnalyzer {
    extractor: Extractor,
    classifier: SentimentClassifier,
    generator: SyntheticReviewGenerator,
}

impl ReviewAnalyzer {
    pub fn new(
        extractor: Extractor,
        classifier: SentimentClassifier,
        generator: SyntheticReviewGenerator,
    ) -> Self {
        Self {
            extractor,
            classifier,
            generator,
        }
    }

    pub fn classifier(&self) -> &SentimentClassifier {
        &self.classifier
    }

    /// Turn a page-fetch outcome into a full analysis.
    ///
    /// Never fails: a fetch failure or an exhausted extraction both produce
    /// synthetic reviews instead.
    pub fn analyze<R: Rng + ?Sized>(
        &self,
        page: Result<String, FetchError>,
        request: &AnalysisRequest,
        rng: &mut R,
    ) -> ProductAnalysis {
        let url = request.url.as_str();

        let (identity, reviews, origin) = match page {
            Err(e) => {
                warn!("Fetch failed for {}: {}. Using synthetic reviews", url, e);
                let identity = self.extractor.identity_without_page(url);
                let name = final_name(&identity, request.product_name.as_deref());
                // category from the URL alone, no page to read
                let category = detect_product_type(url, "");
                let reviews = self
                    .generator
                    .generate(category, Some(&name), request.max_reviews, rng);
                (identity, reviews, ReviewOrigin::Synthetic)
            }
            Ok(html) => {
                let extraction = self.extractor.extract_capped(&html, url, request.max_reviews);
                if extraction.is_exhausted() {
                    let name = final_name(&extraction.product, request.product_name.as_deref());
                    let category = detect_product_type(url, &name);
                    info!("No reviews on page for {}, generating {} reviews", url, category);
                    let reviews = self
                        .generator
                        .generate(category, Some(&name), request.max_reviews, rng);
                    (extraction.product, reviews, ReviewOrigin::Synthetic)
                } else {
                    let reviews = self.classify_all(&extraction.reviews);
                    (extraction.product, reviews, ReviewOrigin::Extracted)
                }
            }
        };

        let product_name = final_name(&identity, request.product_name.as_deref());
        let aggregated = aggregate(reviews);
        info!(
            "Analysed '{}': {} reviews ({:?})",
            product_name,
            aggregated.reviews.len(),
            origin
        );

        ProductAnalysis {
            product_name,
            summary: aggregated.summary,
            reviews: aggregated.reviews,
            origin,
        }
    }

    fn classify_all(&self, fragments: &[String]) -> Vec<Review> {
        fragments
            .iter()
            .filter_map(|text| match self.classifier.classify(text) {
                Ok(sentiment) => Some(Review::new(text.as_str(), sentiment)),
                Err(e) => {
                    warn!("Skipping review fragment: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// Extracted name, then the caller's hint, then the sentinel.
fn final_name(identity: &ProductIdentity, hint: Option<&str>) -> String {
    if !identity.is_unknown() {
        return identity.name.clone();
    }
    hint.map(str::trim)
        .filter(|h| !h.is_empty())
        .unwrap_or(UNKNOWN_PRODUCT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProductCategory, Sentiment};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_extracted_reviews_are_classified() {
        let html = r#"<html><body>
            <h1 id="productTitle">Studio Monitor Speakers</h1>
            <span data-hook="review-body">Absolutely fantastic purchase, love it.</span>
            <span data-hook="review-body">This is not good at all, returned it.</span>
            <span data-hook="review-body">Average quality, decent value overall.</span>
        </body></html>"#;
        let request = AnalysisRequest::new("https://www.amazon.in/dp/B0X");

        let analysis = ReviewAnalyzer::default().analyze(Ok(html.to_string()), &request, &mut rng());
        assert_eq!(analysis.origin, ReviewOrigin::Extracted);
        assert_eq!(analysis.product_name, "Studio Monitor Speakers");
        let labels: Vec<Sentiment> = analysis.reviews.iter().map(|r| r.sentiment()).collect();
        assert_eq!(labels, vec![Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral]);
        assert_eq!(analysis.summary.total(), 3);
    }

    #[test]
    fn test_exhausted_page_falls_back_to_full_bank() {
        let html = "<html><head><title>Wireless Headphone Pro | Shop</title></head><body></body></html>";
        let request = AnalysisRequest::new("https://x.com/item").with_max_reviews(20);

        let analysis = ReviewAnalyzer::default().analyze(Ok(html.to_string()), &request, &mut rng());
        let expected = SyntheticReviewGenerator::bank_size(ProductCategory::Electronics).min(20);
        assert_eq!(analysis.origin, ReviewOrigin::Synthetic);
        assert_eq!(analysis.reviews.len(), expected);
        assert_eq!(analysis.summary.total(), expected);
        assert_eq!(analysis.product_name, "Wireless Headphone Pro");
    }

    #[test]
    fn test_fetch_failure_respects_max_reviews() {
        let request = AnalysisRequest::new("https://x.com/oak-dining-table").with_max_reviews(4);
        let page = Err(FetchError::Browser("launch failed".into()));

        let analysis = ReviewAnalyzer::default().analyze(page, &request, &mut rng());
        assert_eq!(analysis.origin, ReviewOrigin::Synthetic);
        assert_eq!(analysis.reviews.len(), 4);
        assert_eq!(analysis.summary.total(), 4);
        assert_eq!(analysis.product_name, "Oak Dining Table");
    }

    #[test]
    fn test_hint_used_only_when_name_unknown() {
        let page = || -> Result<String, FetchError> {
            Err(FetchError::EmptyPage { url: "https://x.com/".into() })
        };
        let request = AnalysisRequest::new("https://x.com/")
            .with_name_hint(Some("  Garden Hose ".to_string()));
        let analysis = ReviewAnalyzer::default().analyze(page(), &request, &mut rng());
        assert_eq!(analysis.product_name, "Garden Hose");

        let request = AnalysisRequest::new("https://x.com/");
        let analysis = ReviewAnalyzer::default().analyze(page(), &request, &mut rng());
        assert_eq!(analysis.product_name, UNKNOWN_PRODUCT);

        let request = AnalysisRequest::new("https://x.com/blue-denim-jacket")
            .with_name_hint(Some("Ignored".to_string()));
        let analysis = ReviewAnalyzer::default().analyze(page(), &request, &mut rng());
        assert_eq!(analysis.product_name, "Blue Denim Jacket");
    }

    #[test]
    fn test_zero_max_reviews_gives_empty_analysis() {
        let request = AnalysisRequest::new("https://x.com/lamp").with_max_reviews(0);
        let analysis = ReviewAnalyzer::default().analyze(
            Err(FetchError::Http("timeout".into())),
            &request,
            &mut rng(),
        );
        assert!(analysis.reviews.is_empty());
        assert_eq!(analysis.summary.total(), 0);
    }
}
