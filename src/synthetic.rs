//! Synthetic reviews used when no live reviews can be extracted.
//!
//! Each category has a bank of pre-labelled templates. Labels are ground truth
//! and are never re-derived from the (possibly customised) text.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::config::{CLAUSE_PROBABILITY, NAME_MENTION_PROBABILITY, UNKNOWN_PRODUCT};
use crate::model::{ProductCategory, Review, Sentiment};
use crate::rules::{Condition, Rule, RuleChain, Term, Text};

use crate::model::Sentiment::{Negative, Neutral, Positive};

type Template = (&'static str, Sentiment);

const ELECTRONICS_TEMPLATES: &[Template] = &[
    ("Great sound quality for the price! The battery life is impressive - lasts about 8 hours of continuous use. Easy to pair with devices.", Positive),
    ("Decent headphones but the noise cancellation could be better. Works well for calls but music quality is just average.", Neutral),
    ("Stopped working after 3 months of light use. The build quality feels cheap and customer service was unhelpful with warranty.", Negative),
    ("Excellent value! These headphones compete with brands twice the price. Comfortable for long wearing sessions.", Positive),
    ("Connection issues are frustrating - keeps dropping Bluetooth connection. Sound quality is good when it stays connected though.", Negative),
    ("Good bass response and clear highs. The carrying case is a nice touch. Overall satisfied with the purchase.", Positive),
    ("Average quality at best. You get what you pay for. Not suitable for audiophiles but fine for casual listening.", Neutral),
    ("Amazing build quality! The metal construction feels premium. Worth every penny for the durability alone.", Positive),
    ("Too tight on the head, becomes uncomfortable after 30 minutes. Sound quality doesn't justify the discomfort.", Negative),
    ("Works as advertised. No frills but gets the job done. Battery life is the standout feature.", Neutral),
];

const CLOTHING_TEMPLATES: &[Template] = &[
    ("Perfect fit! The fabric quality is excellent and the color is exactly as shown in photos. Very satisfied.", Positive),
    ("Runs small - order one size up. Material is decent but not as soft as expected.", Neutral),
    ("Shrunk after first wash despite following care instructions. Disappointed with the quality for the price.", Negative),
    ("Beautiful design and great quality! Gets lots of compliments when I wear it. Highly recommended.", Positive),
    ("Comfortable and stylish. The material breathes well so it's good for all-day wear.", Positive),
    ("Average quality. Nothing special but works for the price. Expected better material at this price point.", Neutral),
    ("Color faded quickly after just a few washes. Fit is good but durability is questionable.", Negative),
    ("Exactly what I was looking for! The attention to detail is impressive. Will buy from this brand again.", Positive),
    ("Sizing is inconsistent with other brands. Quality is okay but the fit issues are frustrating.", Negative),
    ("Good basic item. Does what it's supposed to do. Not fashion-forward but practical.", Neutral),
];

const FURNITURE_TEMPLATES: &[Template] = &[
    ("Excellent quality furniture! Sturdy construction and easy to assemble. Looks more expensive than it was.", Positive),
    ("Assembly took 4 hours and some parts didn't align properly. Once assembled, it's decent but the process was frustrating.", Neutral),
    ("Wobbly and unstable. Doesn't feel safe for daily use. Particle board construction is disappointing.", Negative),
    ("Perfect size for my space! The finish is beautiful and it was much easier to assemble than expected.", Positive),
    ("Good value for money. Not premium quality but serves its purpose well. Instructions could be clearer.", Neutral),
    ("Scratches easily and shows wear quickly. Looks good from a distance but up close quality is lacking.", Negative),
    ("Solid construction and stylish design. Exceeded my expectations for flat-pack furniture.", Positive),
    ("Average quality. You get what you pay for. Suitable for temporary use but not long-term investment.", Neutral),
    ("Missing hardware made assembly impossible. Customer service was slow to send replacement parts.", Negative),
    ("Beautiful piece that transformed my room! Sturdy and well-made. Worth every penny.", Positive),
];

const GENERAL_TEMPLATES: &[Template] = &[
    ("This product is absolutely amazing! The quality exceeded my expectations and the price is very reasonable.", Positive),
    ("I'm quite disappointed with this purchase. The product stopped working after just a week of use.", Negative),
    ("It's an okay product. Does what it's supposed to do but nothing extraordinary.", Neutral),
    ("Excellent product! Fast shipping and great customer service. The quality is top-notch.", Positive),
    ("Not worth the money. Poor quality materials and the design is flawed.", Negative),
    ("Good value for money. The product works well and meets my needs. No complaints so far.", Positive),
    ("Average quality. It works but I've seen better products in this price range.", Neutral),
    ("I love this product! It has made my life so much easier. Highly recommended!", Positive),
    ("Could be better. The design needs improvement and the materials feel cheap.", Negative),
    ("Pretty good overall. Some minor issues but nothing deal-breaking.", Neutral),
];

const ELECTRONICS_KEYWORDS: &[Term] = &[
    Term::Fragment("headphone"), Term::Fragment("phone"), Term::Fragment("laptop"),
    Term::Fragment("tablet"), Term::Fragment("camera"), Term::Fragment("speaker"),
    Term::Fragment("bluetooth"), Term::Fragment("wireless"), Term::Fragment("charger"),
    Term::Fragment("battery"), Term::Fragment("electronic"), Term::Fragment("gadget"),
    Term::Fragment("tech"),
];

const CLOTHING_KEYWORDS: &[Term] = &[
    Term::Fragment("shirt"), Term::Fragment("pants"), Term::Fragment("dress"),
    Term::Fragment("shoes"), Term::Fragment("jacket"), Term::Fragment("cloth"),
    Term::Fragment("wear"), Term::Fragment("fashion"), Term::Fragment("clothing"),
    Term::Fragment("apparel"), Term::Fragment("outfit"), Term::Fragment("wardrobe"),
];

const FURNITURE_KEYWORDS: &[Term] = &[
    Term::Fragment("table"), Term::Fragment("chair"), Term::Fragment("sofa"),
    Term::Fragment("bed"), Term::Fragment("shelf"), Term::Fragment("cabinet"),
    Term::Fragment("furniture"), Term::Fragment("wardrobe"), Term::Fragment("desk"),
    Term::Fragment("storage"), Term::Fragment("almira"),
];

/// Category detection rules, checked in order; no match means General.
pub fn category_rules() -> RuleChain<ProductCategory> {
    RuleChain::new(vec![
        Rule::new("electronics", Condition::Any(ELECTRONICS_KEYWORDS), ProductCategory::Electronics),
        Rule::new("clothing", Condition::Any(CLOTHING_KEYWORDS), ProductCategory::Clothing),
        Rule::new("furniture", Condition::Any(FURNITURE_KEYWORDS), ProductCategory::Furniture),
    ])
}

/// Guess a product category from its URL and name.
pub fn detect_product_type(url: &str, product_name: &str) -> ProductCategory {
    let haystack = Text::new(&format!("{} {}", url, product_name));
    category_rules()
        .first_match(&haystack)
        .map(|rule| rule.then)
        .unwrap_or(ProductCategory::General)
}

fn templates(category: ProductCategory) -> &'static [Template] {
    match category {
        ProductCategory::Electronics => ELECTRONICS_TEMPLATES,
        ProductCategory::Clothing => CLOTHING_TEMPLATES,
        ProductCategory::Furniture => FURNITURE_TEMPLATES,
        ProductCategory::General => GENERAL_TEMPLATES,
    }
}

fn category_clause(category: ProductCategory) -> Option<&'static str> {
    match category {
        ProductCategory::Electronics => Some("The tech features are impressive."),
        ProductCategory::Clothing => Some("The fit and finish are excellent."),
        ProductCategory::Furniture => Some("Assembly was straightforward."),
        ProductCategory::General => None,
    }
}

/// Template-backed review generator.
#[derive(Debug, Clone)]
pub struct SyntheticReviewGenerator {
    name_probability: f64,
    clause_probability: f64,
}

impl Default for SyntheticReviewGenerator {
    fn default() -> Self {
        Self {
            name_probability: NAME_MENTION_PROBABILITY,
            clause_probability: CLAUSE_PROBABILITY,
        }
    }
}

impl SyntheticReviewGenerator {
    pub fn with_probabilities(name_probability: f64, clause_probability: f64) -> Self {
        Self {
            name_probability: name_probability.clamp(0.0, 1.0),
            clause_probability: clause_probability.clamp(0.0, 1.0),
        }
    }

    pub fn bank_size(category: ProductCategory) -> usize {
        templates(category).len()
    }

    /// Up to `max_count` reviews from the category's bank, shuffled and lightly customised.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        category: ProductCategory,
        product_name: Option<&str>,
        max_count: usize,
        rng: &mut R,
    ) -> Vec<Review> {
        let bank = templates(category);
        let mut selected: Vec<Template> = bank.iter().take(max_count).copied().collect();
        selected.shuffle(rng);

        let known_name = product_name
            .map(str::trim)
            .filter(|n| !n.is_empty() && *n != UNKNOWN_PRODUCT);

        let reviews: Vec<Review> = selected
            .into_iter()
            .map(|(text, sentiment)| {
                Review::new(self.customize(text, category, known_name, rng), sentiment)
            })
            .collect();

        info!(
            "Generated {} synthetic {} reviews for {}",
            reviews.len(),
            category,
            known_name.unwrap_or(UNKNOWN_PRODUCT)
        );
        reviews
    }

    fn customize<R: Rng + ?Sized>(
        &self,
        template: &str,
        category: ProductCategory,
        product_name: Option<&str>,
        rng: &mut R,
    ) -> String {
        // both draws happen regardless of outcome
        let mention = rng.gen_bool(self.name_probability);
        let clause = rng.gen_bool(self.clause_probability);

        let mut text = match product_name {
            Some(name) if mention => template.replace("This product", &format!("This {}", name)),
            _ => template.to_string(),
        };
        if clause {
            if let Some(extra) = category_clause(category) {
                text.push(' ');
                text.push_str(extra);
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_detect_product_type() {
        assert_eq!(
            detect_product_type("https://x.com/wireless-headphone-pro", ""),
            ProductCategory::Electronics
        );
        assert_eq!(detect_product_type("https://x.com/unknown-item", ""), ProductCategory::General);
        assert_eq!(detect_product_type("https://x.com/p/123", "Linen Shirt"), ProductCategory::Clothing);
        assert_eq!(detect_product_type("https://X.com/OAK-DESK", ""), ProductCategory::Furniture);
    }

    #[test]
    fn test_detection_order_prefers_earlier_category() {
        // "wardrobe" is a clothing and a furniture keyword; "tech" makes it electronics
        assert_eq!(detect_product_type("https://x.com/wardrobe", ""), ProductCategory::Clothing);
        assert_eq!(detect_product_type("https://x.com/tech-wardrobe", ""), ProductCategory::Electronics);
    }

    #[test]
    fn test_every_bank_has_ten_templates() {
        for category in [
            ProductCategory::Electronics,
            ProductCategory::Clothing,
            ProductCategory::Furniture,
            ProductCategory::General,
        ] {
            assert_eq!(SyntheticReviewGenerator::bank_size(category), 10);
        }
    }

    #[test]
    fn test_count_is_capped_by_bank_and_request() {
        let generator = SyntheticReviewGenerator::default();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(generator.generate(ProductCategory::General, None, 20, &mut rng).len(), 10);
        assert_eq!(generator.generate(ProductCategory::General, None, 4, &mut rng).len(), 4);
        assert!(generator.generate(ProductCategory::General, None, 0, &mut rng).is_empty());
    }

    #[test]
    fn test_selection_is_bank_prefix_and_labels_survive() {
        let generator = SyntheticReviewGenerator::with_probabilities(0.0, 0.0);
        let mut rng = StdRng::seed_from_u64(42);
        let reviews = generator.generate(ProductCategory::Clothing, Some("Linen Shirt"), 3, &mut rng);

        let expected: HashMap<&str, Sentiment> = CLOTHING_TEMPLATES[..3].iter().copied().collect();
        assert_eq!(reviews.len(), 3);
        for review in &reviews {
            assert_eq!(expected.get(review.text()), Some(&review.sentiment()));
        }
    }

    #[test]
    fn test_forced_customization() {
        let generator = SyntheticReviewGenerator::with_probabilities(1.0, 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        let reviews = generator.generate(ProductCategory::General, Some("Acme Kettle"), 10, &mut rng);

        let mentioned = reviews
            .iter()
            .find(|r| r.text().starts_with("This Acme Kettle is absolutely amazing!"))
            .expect("template mentioning the product");
        assert_eq!(mentioned.sentiment(), Sentiment::Positive);
        // general has no clause to append
        assert!(reviews.iter().all(|r| GENERAL_TEMPLATES
            .iter()
            .any(|(t, _)| r.text() == t.replace("This product", "This Acme Kettle"))));

        let electronics = generator.generate(ProductCategory::Electronics, None, 10, &mut rng);
        assert!(electronics
            .iter()
            .all(|r| r.text().ends_with(" The tech features are impressive.")));
    }

    #[test]
    fn test_unknown_name_is_never_inserted() {
        let generator = SyntheticReviewGenerator::with_probabilities(1.0, 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        let reviews = generator.generate(ProductCategory::General, Some(UNKNOWN_PRODUCT), 10, &mut rng);
        assert!(reviews.iter().any(|r| r.text().starts_with("This product is absolutely amazing!")));
    }

    #[test]
    fn test_same_seed_same_output() {
        let generator = SyntheticReviewGenerator::default();
        let a = generator.generate(ProductCategory::Furniture, Some("Desk"), 10, &mut StdRng::seed_from_u64(9));
        let b = generator.generate(ProductCategory::Furniture, Some("Desk"), 10, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
