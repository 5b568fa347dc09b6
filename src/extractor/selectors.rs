//! CSS selector tables for product pages.
//!
//! Order matters everywhere in this file: earlier entries are tried first and
//! the first usable match wins. Update these tables when a retailer changes its
//! markup.

use crate::rules::Term;

/// Product title candidates, most site-specific first.
pub const PRODUCT_NAME_SELECTORS: &[&str] = &[
    "h1#productTitle",
    "h1.product-title",
    "h1.product-name",
    "h1.title",
    "h1",
    ".product-title",
    ".product-name",
    ".title",
    "[data-hook='product-title']",
    "#product-name",
    ".product-name a",
    "span.product-name",
    "div.product-title",
];

pub const TITLE_SELECTOR: &str = "title";

/// Separators splitting a page title into "product | site" style segments.
pub const TITLE_SEPARATORS: &[char] = &['|', '-', ':'];

/// Promotional phrases stripped from product names (case-insensitive, whole words).
pub const PROMO_BLOCKLIST: &[&str] = &[
    "amazon.com",
    "buy now",
    "shop now",
    "add to cart",
    "free shipping",
    "prime",
    "best seller",
    "deal",
];

/// Review body selectors for one retailer family.
#[derive(Debug, Clone, Copy)]
pub struct SelectorGroupSpec {
    pub retailer: &'static str,
    pub selectors: &'static [&'static str],
}

/// Review selector groups: marketplace-specific first, generic patterns last.
pub const REVIEW_SELECTOR_GROUPS: &[SelectorGroupSpec] = &[
    SelectorGroupSpec {
        retailer: "amazon",
        selectors: &[
            "span[data-hook='review-body']",
            "div[data-hook='review-collapsed'] span",
            "span.review-text-content span",
            "div.review-text span",
            "[data-hook='review-body'] span",
            ".review-text",
            ".a-size-base.review-text",
            ".a-size-base.review-text-content",
        ],
    },
    SelectorGroupSpec {
        retailer: "flipkart",
        selectors: &[
            "div._1AtVbE div._27M-vq",
            "div.t-ZTKy div",
            "div.ZmyHeo div",
        ],
    },
    SelectorGroupSpec {
        retailer: "myntra",
        selectors: &[
            "div.user-review div.review-text",
            "div[data-automationid='review-text']",
        ],
    },
    SelectorGroupSpec {
        retailer: "generic",
        selectors: &[
            ".review-content",
            ".review-body",
            ".customer-review",
            ".product-review",
            "[class*='review']",
            "[id*='review']",
        ],
    },
];

/// Elements examined by the last-resort generic scan.
pub const GENERIC_SCAN_ELEMENTS: &str = "div, span, p";

/// A generic-scan candidate must mention at least one of these.
pub const GENERIC_SCAN_KEYWORDS: &[Term] = &[
    Term::Fragment("star"),
    Term::Fragment("good"),
    Term::Fragment("bad"),
    Term::Fragment("product"),
    Term::Fragment("review"),
];
