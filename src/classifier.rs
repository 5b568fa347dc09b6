//! Review sentiment classification.
//!
//! A lexicon compound score is computed first, then an ordered chain of
//! keyword overrides is consulted. The first override that matches decides the
//! label; only when none matches do the numeric thresholds apply.

use tracing::trace;

use crate::config::ClassifierThresholds;
use crate::error::ClassifyError;
use crate::lexicon::Lexicon;
use crate::model::Sentiment;
use crate::rules::{Condition, Rule, RuleChain, Term, Text};

const NEGATION_WORDS: &[Term] = &[
    Term::Word("not"), Term::Word("no"), Term::Word("never"), Term::Word("none"),
    Term::Word("nothing"), Term::Word("nowhere"), Term::Word("neither"), Term::Word("nobody"),
    Term::Word("cannot"), Term::Word("can't"), Term::Word("won't"), Term::Word("don't"),
    Term::Word("didn't"), Term::Word("doesn't"), Term::Word("isn't"), Term::Word("aren't"),
    Term::Word("wasn't"), Term::Word("weren't"),
];

const PRAISE_WORDS: &[Term] = &[
    Term::Word("good"), Term::Word("great"), Term::Word("excellent"), Term::Word("amazing"),
    Term::Word("fantastic"), Term::Word("wonderful"), Term::Word("perfect"), Term::Word("love"),
    Term::Word("best"), Term::Word("awesome"),
];

const NEGATIVE_DESCRIPTORS: &[Term] = &[
    Term::Fragment("bad"), Term::Fragment("terrible"), Term::Fragment("awful"),
    Term::Fragment("horrible"), Term::Fragment("disappoint"), Term::Fragment("worse"),
    Term::Fragment("worst"), Term::Fragment("poor"), Term::Fragment("cheap"),
    Term::Fragment("flaw"), Term::Fragment("issue"), Term::Fragment("problem"),
    Term::Fragment("damage"), Term::Fragment("not impressed"), Term::Fragment("questionable"),
    Term::Fragment("mediocre"),
];

// substring containment, so "fairly" and "looks" both hedge
const NEUTRAL_HEDGES: &[Term] = &[
    Term::Fragment("okay"), Term::Fragment("ok"), Term::Fragment("average"),
    Term::Fragment("decent"), Term::Fragment("fair"), Term::Fragment("could be better"),
    Term::Fragment("some minor issues"),
];

/// The override chain, in strict priority order.
pub fn default_rules() -> RuleChain<Sentiment> {
    RuleChain::new(vec![
        Rule::new(
            "negated_praise",
            Condition::All(vec![Condition::Any(NEGATION_WORDS), Condition::Any(PRAISE_WORDS)]),
            Sentiment::Negative,
        ),
        Rule::new(
            "negative_descriptor",
            Condition::Any(NEGATIVE_DESCRIPTORS),
            Sentiment::Negative,
        ),
        Rule::new("neutral_hedge", Condition::Any(NEUTRAL_HEDGES), Sentiment::Neutral),
    ])
}

/// A label together with how it was reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub sentiment: Sentiment,
    pub score: f64,
    /// Name of the override rule that fired, `None` for the threshold fallback
    pub rule: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct SentimentClassifier {
    lexicon: Lexicon,
    rules: RuleChain<Sentiment>,
    thresholds: ClassifierThresholds,
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new(Lexicon::standard())
    }
}

impl SentimentClassifier {
    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            lexicon,
            rules: default_rules(),
            thresholds: ClassifierThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: ClassifierThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_rules(mut self, rules: RuleChain<Sentiment>) -> Self {
        self.rules = rules;
        self
    }

    pub fn classify(&self, text: &str) -> Result<Sentiment, ClassifyError> {
        self.explain(text).map(|c| c.sentiment)
    }

    /// Classify and report the score and deciding rule.
    pub fn explain(&self, text: &str) -> Result<Classification, ClassifyError> {
        if text.trim().is_empty() {
            return Err(ClassifyError::InvalidInput);
        }

        let score = self.lexicon.polarity(text);
        let prepared = Text::new(text);

        if let Some(rule) = self.rules.first_match(&prepared) {
            trace!(rule = rule.name, score, "override rule matched");
            return Ok(Classification {
                sentiment: rule.then,
                score,
                rule: Some(rule.name),
            });
        }

        let sentiment = if score >= self.thresholds.positive {
            Sentiment::Positive
        } else if score <= self.thresholds.negative {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        };

        Ok(Classification {
            sentiment,
            score,
            rule: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Sentiment {
        SentimentClassifier::default().classify(text).unwrap()
    }

    #[test]
    fn test_negated_praise_is_negative() {
        let classifier = SentimentClassifier::default();
        let result = classifier.explain("This is not good at all").unwrap();
        assert_eq!(result.sentiment, Sentiment::Negative);
        assert_eq!(result.rule, Some("negated_praise"));
    }

    #[test]
    fn test_negated_praise_beats_high_score() {
        // lexicon alone reads this as clearly positive
        let classifier = SentimentClassifier::default();
        let text = "Never had such a great, amazing, wonderful blender!!!";
        assert!(classifier.explain(text).unwrap().score > 0.1);
        assert_eq!(classify(text), Sentiment::Negative);
    }

    #[test]
    fn test_negative_descriptor() {
        assert_eq!(classify("Terrible build quality"), Sentiment::Negative);
        assert_eq!(classify("Arrived damaged and scratched"), Sentiment::Negative);
        assert_eq!(classify("Honestly I was not impressed"), Sentiment::Negative);
    }

    #[test]
    fn test_neutral_hedge() {
        let classifier = SentimentClassifier::default();
        let result = classifier.explain("Average quality, decent value").unwrap();
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.rule, Some("neutral_hedge"));
        assert_eq!(classify("It's okay for the money"), Sentiment::Neutral);
    }

    #[test]
    fn test_descriptor_outranks_hedge() {
        assert_eq!(classify("Decent, but the hinge is a problem"), Sentiment::Negative);
    }

    #[test]
    fn test_threshold_fallback() {
        let classifier = SentimentClassifier::default();
        let result = classifier.explain("Absolutely fantastic purchase").unwrap();
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.rule, None);

        assert_eq!(classify("Arrived on Tuesday in a brown box"), Sentiment::Neutral);
        assert_eq!(classify("I hate the color and regret it"), Sentiment::Negative);
    }

    #[test]
    fn test_descriptors_and_hedges_match_inside_words() {
        let classifier = SentimentClassifier::default();
        for text in [
            "Fairly comfortable headphones for the price",
            "The stitching looks nice and neat",
            "Unfair pricing compared with the store, but great",
        ] {
            let result = classifier.explain(text).unwrap();
            assert_eq!(result.sentiment, Sentiment::Neutral, "{}", text);
            assert_eq!(result.rule, Some("neutral_hedge"), "{}", text);
        }

        let result = classifier.explain("Flawless finish on the cabinet doors").unwrap();
        assert_eq!(result.sentiment, Sentiment::Negative);
        assert_eq!(result.rule, Some("negative_descriptor"));
    }

    #[test]
    fn test_contracted_negation_before_praise() {
        let classifier = SentimentClassifier::default();
        for text in ["It doesn't feel great", "Isn\u{2019}t the best", "Don't expect excellent bass"] {
            let result = classifier.explain(text).unwrap();
            assert_eq!(result.sentiment, Sentiment::Negative, "{}", text);
            assert_eq!(result.rule, Some("negated_praise"), "{}", text);
        }
    }

    #[test]
    fn test_negation_words_stay_whole_tokens() {
        // "know" is not the negation "no"
        let result = SentimentClassifier::default()
            .explain("I know this is a great kettle")
            .unwrap();
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.rule, None);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let classifier = SentimentClassifier::default();
        assert_eq!(classifier.classify(""), Err(ClassifyError::InvalidInput));
        assert_eq!(classifier.classify(" \n\t "), Err(ClassifyError::InvalidInput));
    }

    #[test]
    fn test_deterministic() {
        let classifier = SentimentClassifier::default();
        let text = "Great sound, but the case feels flimsy";
        let first = classifier.classify(text).unwrap();
        for _ in 0..10 {
            assert_eq!(classifier.classify(text).unwrap(), first);
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = SentimentClassifier::default().with_thresholds(ClassifierThresholds {
            positive: 0.95,
            negative: -0.95,
        });
        assert_eq!(strict.classify("Absolutely fantastic purchase").unwrap(), Sentiment::Neutral);
    }
}
