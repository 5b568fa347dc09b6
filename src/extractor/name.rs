//! Product name resolution: DOM selectors, then the page title, then the URL.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use super::element_text;
use super::selectors::{PROMO_BLOCKLIST, TITLE_SEPARATORS};
use crate::config::{CLEAN_NAME_MAX_CHARS, NAME_MAX_CHARS, NAME_MIN_CHARS, UNKNOWN_PRODUCT};
use crate::model::{NameSource, ProductIdentity};

static PROMO_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = PROMO_BLOCKLIST.iter().map(|p| regex::escape(p)).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))
        .expect("promo block list compiles to a valid pattern")
});

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(super::selectors::TITLE_SELECTOR).expect("title selector is valid")
});

/// Run the naming cascade over a parsed page.
pub fn resolve_product_name(document: &Html, selectors: &[Selector], url: &str) -> ProductIdentity {
    if let Some(name) = name_from_dom(document, selectors) {
        return ProductIdentity { name, source: NameSource::Dom };
    }
    if let Some(name) = name_from_title(document) {
        return ProductIdentity { name, source: NameSource::TitleTag };
    }
    identity_from_url(url)
}

/// Naming from the URL alone, used when there is no page to look at.
pub fn identity_from_url(url: &str) -> ProductIdentity {
    match name_from_url(url) {
        Some(name) => ProductIdentity { name, source: NameSource::UrlFallback },
        None => ProductIdentity::unknown(),
    }
}

fn name_from_dom(document: &Html, selectors: &[Selector]) -> Option<String> {
    for selector in selectors {
        // only the first element per selector is considered
        let Some(element) = document.select(selector).next() else {
            continue;
        };
        let text = element_text(element);
        let len = text.chars().count();
        if len > NAME_MIN_CHARS && len < NAME_MAX_CHARS {
            let name = clean_product_name(&text);
            if name != UNKNOWN_PRODUCT {
                debug!("Product name from DOM: {}", name);
                return Some(name);
            }
        }
    }
    None
}

fn name_from_title(document: &Html) -> Option<String> {
    let title = element_text(document.select(&TITLE_SELECTOR).next()?);
    let mut segment = title.as_str();
    for separator in TITLE_SEPARATORS {
        segment = segment.split(*separator).next().unwrap_or(segment);
    }
    let name = clean_product_name(segment);
    (name != UNKNOWN_PRODUCT).then(|| {
        debug!("Product name from <title>: {}", name);
        name
    })
}

/// Derive a readable name from the last path segment of a URL.
pub fn name_from_url(url: &str) -> Option<String> {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let segment = path.rsplit('/').find(|s| !s.is_empty())?;
    let stem = segment.split('.').next().unwrap_or_default();
    let decoded = urlencoding::decode(stem)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| stem.to_string());

    let words: Vec<String> = decoded
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(title_case)
        .collect();
    if words.is_empty() {
        return None;
    }

    let name = clean_product_name(&words.join(" "));
    (name != UNKNOWN_PRODUCT).then_some(name)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

/// Normalise a candidate product name.
///
/// Collapses whitespace, removes promotional phrases and truncates to
/// [`CLEAN_NAME_MAX_CHARS`]. The result is a fixed point: cleaning it again
/// returns the same string. Empty results become [`UNKNOWN_PRODUCT`].
pub fn clean_product_name(raw: &str) -> String {
    let mut current = clean_once(raw);
    loop {
        let next = clean_once(&current);
        if next == current {
            break;
        }
        current = next;
    }

    if current.is_empty() {
        UNKNOWN_PRODUCT.to_string()
    } else {
        current
    }
}

fn clean_once(name: &str) -> String {
    let collapsed = collapse_whitespace(name);
    let stripped = collapse_whitespace(&PROMO_PATTERN.replace_all(&collapsed, " "));
    let truncated: String = stripped.chars().take(CLEAN_NAME_MAX_CHARS).collect();
    truncated.trim().to_string()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_selectors() -> Vec<Selector> {
        super::super::selectors::PRODUCT_NAME_SELECTORS
            .iter()
            .map(|s| Selector::parse(s).unwrap())
            .collect()
    }

    #[test]
    fn test_clean_strips_promos_case_insensitively() {
        assert_eq!(
            clean_product_name("  Wireless   Mouse - BUY NOW   Free Shipping "),
            "Wireless Mouse -"
        );
        assert_eq!(clean_product_name("Ideal Desk Lamp Deal"), "Ideal Desk Lamp");
    }

    #[test]
    fn test_clean_truncates_by_chars() {
        let long = "é".repeat(150);
        let cleaned = clean_product_name(&long);
        assert_eq!(cleaned.chars().count(), CLEAN_NAME_MAX_CHARS);
    }

    #[test]
    fn test_clean_is_idempotent() {
        // truncation lands right after "prime"
        let cut_mid_word = format!("{} primed", "x".repeat(94));
        let samples = [
            "Buy deal now Ergonomic Chair",
            "  Prime  Sofa\tBed  ",
            "buy now",
            "",
            cut_mid_word.as_str(),
            "Noise Cancelling Headphones | Amazon.com",
        ];
        for sample in samples {
            let once = clean_product_name(sample);
            assert_eq!(clean_product_name(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_clean_empty_becomes_unknown() {
        assert_eq!(clean_product_name("  best seller "), UNKNOWN_PRODUCT);
    }

    #[test]
    fn test_name_from_url() {
        assert_eq!(
            name_from_url("https://shop.example.com/p/wireless-headphone_pro.html?ref=x#top").as_deref(),
            Some("Wireless Headphone Pro")
        );
        assert_eq!(
            name_from_url("https://shop.example.com/items/caf%C3%A9-TABLE/").as_deref(),
            Some("Café Table")
        );
        assert_eq!(name_from_url("https://shop.example.com/"), None);
    }

    #[test]
    fn test_dom_selector_priority_and_length_bounds() {
        let html = r#"<html><head><title>Site Title | Store</title></head><body>
            <h1 id="productTitle">ab</h1>
            <h1 class="product-title">Trail Running Shoes</h1>
            <h1>Generic heading</h1>
        </body></html>"#;
        let document = Html::parse_document(html);
        let identity = resolve_product_name(&document, &parse_selectors(), "https://x.com/item");
        assert_eq!(identity.name, "Trail Running Shoes");
        assert_eq!(identity.source, NameSource::Dom);
    }

    #[test]
    fn test_title_fallback_takes_first_segment() {
        let html = "<html><head><title>Oak Bookshelf - Home: Living | MegaStore</title></head><body><p>x</p></body></html>";
        let document = Html::parse_document(html);
        let identity = resolve_product_name(&document, &parse_selectors(), "https://x.com/item");
        assert_eq!(identity.name, "Oak Bookshelf");
        assert_eq!(identity.source, NameSource::TitleTag);
    }

    #[test]
    fn test_url_fallback_and_unknown() {
        let document = Html::parse_document("<html><body><p>nothing</p></body></html>");
        let identity = resolve_product_name(&document, &parse_selectors(), "https://x.com/blue-denim-jacket");
        assert_eq!(identity.name, "Blue Denim Jacket");
        assert_eq!(identity.source, NameSource::UrlFallback);

        let identity = resolve_product_name(&document, &parse_selectors(), "https://x.com/");
        assert!(identity.is_unknown());
    }
}
