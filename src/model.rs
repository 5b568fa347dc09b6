//! Data model shared by the pipeline stages.
//!
//! Everything here is created fresh per analysis request; nothing is cached
//! between requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::config::UNKNOWN_PRODUCT;

/// Categorical sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sentiment::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| format!("Invalid sentiment '{}'. Must be Positive, Negative, or Neutral", s))
    }
}

/// A review text with its derived label.
///
/// Fields are private: a review is only ever built by the classifier, the
/// synthetic generator, or the store when reading back a stored analysis.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Review {
    text: String,
    sentiment: Sentiment,
}

impl Review {
    pub(crate) fn new(text: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            text: text.into(),
            sentiment,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sentiment(&self) -> Sentiment {
        self.sentiment
    }
}

/// Which naming strategy produced a product name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    Dom,
    TitleTag,
    UrlFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductIdentity {
    pub name: String,
    pub source: NameSource,
}

impl ProductIdentity {
    /// The sentinel used when no naming strategy yields a usable string.
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_PRODUCT.to_string(),
            source: NameSource::UrlFallback,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_PRODUCT
    }
}

/// Output of a single extraction pass over one page.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    /// Raw review fragments, in document order
    pub reviews: Vec<String>,
    pub product: ProductIdentity,
    /// Name of the strategy that produced `reviews`, if any did
    pub strategy: Option<String>,
}

impl ExtractionResult {
    /// True when every strategy came back empty and the synthetic fallback applies.
    pub fn is_exhausted(&self) -> bool {
        self.reviews.is_empty()
    }
}

/// Per-label review counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SentimentSummary {
    #[serde(rename = "Positive")]
    pub positive: usize,
    #[serde(rename = "Negative")]
    pub negative: usize,
    #[serde(rename = "Neutral")]
    pub neutral: usize,
}

impl SentimentSummary {
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }

    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

/// Coarse product grouping that selects the synthetic template bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Electronics,
    Clothing,
    Furniture,
    General,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Electronics => "electronics",
            ProductCategory::Clothing => "clothing",
            ProductCategory::Furniture => "furniture",
            ProductCategory::General => "general",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the reviews of an analysis came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOrigin {
    Extracted,
    Synthetic,
}

/// Final output of one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductAnalysis {
    pub product_name: String,
    pub summary: SentimentSummary,
    pub reviews: Vec<Review>,
    pub origin: ReviewOrigin,
}
