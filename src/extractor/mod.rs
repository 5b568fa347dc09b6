//! Review and product-name extraction from rendered product pages.
//!
//! Review fragments come from an ordered list of [`ReviewStrategy`] objects.
//! The first strategy returning a non-empty set wins outright; nothing from
//! other strategies is merged in.

pub mod name;
pub mod selectors;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_MAX_REVIEWS, GENERIC_SCAN_MIN_CHARS, MIN_REVIEW_CHARS};
use crate::model::{ExtractionResult, ProductIdentity};
use crate::rules::{Condition, Text};

pub use name::{clean_product_name, identity_from_url, name_from_url};
use selectors::{
    SelectorGroupSpec, GENERIC_SCAN_ELEMENTS, GENERIC_SCAN_KEYWORDS, PRODUCT_NAME_SELECTORS,
    REVIEW_SELECTOR_GROUPS,
};

/// Visible text of an element: trimmed text nodes joined by single spaces.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_selectors(raw: &[&str]) -> Vec<Selector> {
    raw.iter()
        .filter_map(|s| match Selector::parse(s) {
            Ok(selector) => Some(selector),
            Err(e) => {
                warn!("Skipping invalid selector '{}': {:?}", s, e);
                None
            }
        })
        .collect()
}

/// One way of pulling review fragments out of a page.
pub trait ReviewStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// At most `limit` fragments, or `None` when this strategy found nothing.
    fn try_extract(&self, document: &Html, limit: usize) -> Option<Vec<String>>;
}

/// Review body selectors for one retailer family.
///
/// Selectors are tried in order and the first one producing usable fragments
/// supplies the whole result.
pub struct SelectorGroup {
    retailer: String,
    selectors: Vec<Selector>,
}

impl SelectorGroup {
    pub fn new(retailer: impl Into<String>, selectors: &[&str]) -> Self {
        Self {
            retailer: retailer.into(),
            selectors: parse_selectors(selectors),
        }
    }

    fn from_spec(spec: &SelectorGroupSpec) -> Self {
        Self::new(spec.retailer, spec.selectors)
    }
}

impl ReviewStrategy for SelectorGroup {
    fn name(&self) -> &str {
        &self.retailer
    }

    fn try_extract(&self, document: &Html, limit: usize) -> Option<Vec<String>> {
        self.selectors.iter().find_map(|selector| {
            let fragments: Vec<String> = document
                .select(selector)
                .map(element_text)
                .filter(|text| text.chars().count() > MIN_REVIEW_CHARS)
                .take(limit)
                .collect();
            (!fragments.is_empty()).then_some(fragments)
        })
    }
}

/// Last resort: any long text block that talks like a review.
pub struct GenericScan {
    elements: Selector,
    keywords: Condition,
    min_chars: usize,
}

impl Default for GenericScan {
    fn default() -> Self {
        Self {
            elements: Selector::parse(GENERIC_SCAN_ELEMENTS).expect("generic scan selector is valid"),
            keywords: Condition::Any(GENERIC_SCAN_KEYWORDS),
            min_chars: GENERIC_SCAN_MIN_CHARS,
        }
    }
}

impl ReviewStrategy for GenericScan {
    fn name(&self) -> &str {
        "generic_scan"
    }

    fn try_extract(&self, document: &Html, limit: usize) -> Option<Vec<String>> {
        let fragments: Vec<String> = document
            .select(&self.elements)
            .map(element_text)
            .filter(|text| text.chars().count() > self.min_chars)
            .filter(|text| self.keywords.holds(&Text::new(text)))
            .take(limit)
            .collect();
        debug!("Generic scan found {} candidate reviews", fragments.len());
        (!fragments.is_empty()).then_some(fragments)
    }
}

/// Product-name and review extraction over raw page HTML.
pub struct Extractor {
    name_selectors: Vec<Selector>,
    strategies: Vec<Box<dyn ReviewStrategy>>,
    max_reviews: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        let mut strategies: Vec<Box<dyn ReviewStrategy>> = REVIEW_SELECTOR_GROUPS
            .iter()
            .map(|spec| Box::new(SelectorGroup::from_spec(spec)) as Box<dyn ReviewStrategy>)
            .collect();
        strategies.push(Box::new(GenericScan::default()));

        Self {
            name_selectors: parse_selectors(PRODUCT_NAME_SELECTORS),
            strategies,
            max_reviews: DEFAULT_MAX_REVIEWS,
        }
    }
}

impl Extractor {
    /// An extractor with a custom review cascade (name selectors stay the default).
    pub fn with_strategies(strategies: Vec<Box<dyn ReviewStrategy>>) -> Self {
        Self {
            strategies,
            ..Self::default()
        }
    }

    pub fn max_reviews(mut self, max_reviews: usize) -> Self {
        self.max_reviews = max_reviews;
        self
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Extract with the extractor's default review cap.
    pub fn extract(&self, page: &str, url: &str) -> ExtractionResult {
        self.extract_capped(page, url, self.max_reviews)
    }

    /// Extract at most `limit` review fragments plus the product identity.
    ///
    /// An empty `reviews` list signals exhaustion; it is not an error.
    pub fn extract_capped(&self, page: &str, url: &str, limit: usize) -> ExtractionResult {
        let document = Html::parse_document(page);
        let product = name::resolve_product_name(&document, &self.name_selectors, url);
        debug!("Resolved product name '{}' via {:?}", product.name, product.source);

        for strategy in &self.strategies {
            match strategy.try_extract(&document, limit) {
                Some(reviews) => {
                    info!(
                        "Strategy '{}' extracted {} reviews for {}",
                        strategy.name(),
                        reviews.len(),
                        product.name
                    );
                    return ExtractionResult {
                        reviews,
                        product,
                        strategy: Some(strategy.name().to_string()),
                    };
                }
                None => debug!("Strategy '{}' found nothing", strategy.name()),
            }
        }

        info!("All extraction strategies exhausted for {}", url);
        ExtractionResult {
            reviews: Vec::new(),
            product,
            strategy: None,
        }
    }

    /// Product identity when no page content is available.
    pub fn identity_without_page(&self, url: &str) -> ProductIdentity {
        identity_from_url(url)
    }
}
