//! Lexicon-based polarity scoring.
//!
//! Produces a compound score in [-1, 1] from per-word valences, adjusted for
//! degree modifiers, negation within a three-word window, contrastive "but",
//! capitalised emphasis and exclamation/question marks.
//!
//! A [`Lexicon`] is built once and shared read-only; it holds no interior state.

use std::collections::{HashMap, HashSet};

/// Added to a word's valence by a preceding intensifier (or subtracted by a dampener).
const BOOSTER_INCREMENT: f64 = 0.293;
/// Emphasis bonus for an ALL-CAPS sentiment word in otherwise mixed-case text.
const CAPS_INCREMENT: f64 = 0.733;
/// Multiplier applied to a valence inside a negation window.
const NEGATION_SCALAR: f64 = -0.74;
/// Normalisation constant for the compound score.
const NORMALIZATION_ALPHA: f64 = 15.0;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const QUESTION_INCREMENT: f64 = 0.18;
const QUESTION_CAP: f64 = 0.96;
/// How many preceding words a modifier or negation reaches.
const LOOKBACK: usize = 3;

const VALENCES: &[(&str, f64)] = &[
    // positive
    ("good", 1.9), ("great", 3.1), ("excellent", 2.7), ("amazing", 2.8),
    ("awesome", 3.1), ("fantastic", 2.6), ("wonderful", 2.7), ("perfect", 2.7),
    ("perfectly", 2.7), ("love", 3.2), ("loved", 2.9), ("loves", 2.7),
    ("lovely", 2.8), ("best", 3.2), ("better", 1.9), ("nice", 1.8),
    ("happy", 2.7), ("satisfied", 1.8), ("satisfying", 2.0), ("recommend", 1.5),
    ("recommended", 0.8), ("impressive", 2.3), ("impressed", 2.1), ("comfortable", 1.5),
    ("beautiful", 2.9), ("beautifully", 2.7), ("gorgeous", 3.0), ("pleased", 1.9),
    ("pleasant", 2.3), ("enjoy", 2.2), ("enjoyed", 2.3), ("superb", 3.1),
    ("outstanding", 3.0), ("brilliant", 2.8), ("incredible", 1.8), ("exceptional", 1.5),
    ("fine", 0.8), ("easy", 1.9), ("easier", 1.8), ("helpful", 1.7),
    ("glad", 2.0), ("favorite", 2.0), ("compliments", 1.6), ("clear", 1.6),
    ("smooth", 1.2), ("thanks", 1.9), ("fun", 2.3), ("cool", 1.3),
    ("super", 2.9), ("reliable", 0.9), ("worth", 0.9), ("solid", 1.0),
    ("sturdy", 1.1), ("stylish", 1.4), ("premium", 1.0), ("durable", 1.1),
    ("exceeded", 1.3), ("quality", 0.6), ("ok", 1.2), ("okay", 0.9),
    ("fair", 1.3), ("free", 1.1), ("well", 1.1), ("wow", 2.8),
    ("yes", 1.7), ("win", 2.8), ("success", 2.7), ("effective", 2.1),
    ("efficient", 1.8), ("convenient", 1.7), ("affordable", 1.4), ("fast", 0.9),
    ("quick", 0.9), ("friendly", 2.2), ("useful", 1.9), ("valuable", 2.1),
    ("delighted", 2.9), ("thrilled", 2.9), ("flawless", 2.4), ("elegant", 2.1),
    // negative
    ("bad", -2.5), ("terrible", -2.1), ("terribly", -2.1), ("awful", -2.0),
    ("horrible", -2.5), ("worst", -3.1), ("worse", -2.1), ("poor", -2.1),
    ("poorly", -1.8), ("hate", -2.7), ("hated", -3.2), ("disappointed", -1.9),
    ("disappointing", -2.2), ("disappointment", -2.3), ("broken", -1.8), ("broke", -1.8),
    ("useless", -1.8), ("waste", -1.8), ("wasted", -2.2), ("cheap", -0.7),
    ("cheaply", -0.9), ("frustrating", -1.9), ("frustrated", -2.4), ("annoying", -1.4),
    ("problem", -1.7), ("problems", -1.7), ("issue", -0.6), ("issues", -0.6),
    ("uncomfortable", -1.6), ("unhappy", -1.8), ("failed", -2.3), ("fail", -2.5),
    ("fails", -2.5), ("faulty", -1.6), ("defective", -1.9), ("flawed", -1.6),
    ("flaw", -1.4), ("mediocre", -1.0), ("garbage", -1.4), ("junk", -1.8),
    ("ugly", -2.3), ("slow", -0.8), ("unhelpful", -1.5), ("unstable", -1.3),
    ("wobbly", -1.0), ("difficult", -1.5), ("impossible", -1.4), ("missing", -1.2),
    ("damaged", -1.9), ("damage", -1.6), ("lacking", -1.0), ("sad", -2.1),
    ("angry", -2.3), ("regret", -1.9), ("avoid", -1.2), ("scam", -2.7),
    ("fake", -2.1), ("crap", -1.6), ("sucks", -1.5), ("meh", -0.3),
    ("questionable", -1.2), ("disappoint", -2.0), ("stopped", -0.6), ("shrunk", -0.8),
    ("faded", -0.7), ("unsafe", -1.9), ("dangerous", -2.1), ("refund", -0.4),
    ("overpriced", -1.4), ("expensive", -0.5), ("confusing", -1.3), ("complicated", -1.0),
    ("error", -1.4), ("errors", -1.4), ("failure", -2.3), ("worthless", -1.9),
    ("pathetic", -2.3), ("rubbish", -1.8), ("trash", -1.9), ("dislike", -1.6),
];

const INTENSIFIERS: &[&str] = &[
    "absolutely", "amazingly", "awfully", "completely", "considerably", "decidedly",
    "deeply", "enormously", "entirely", "especially", "exceptionally", "extremely",
    "fabulously", "greatly", "highly", "hugely", "incredibly", "intensely",
    "majorly", "more", "most", "particularly", "purely", "quite", "really",
    "remarkably", "so", "substantially", "thoroughly", "totally", "tremendously",
    "unbelievably", "unusually", "utterly", "very",
];

const DAMPENERS: &[&str] = &[
    "almost", "barely", "hardly", "kinda", "less", "little", "marginally",
    "occasionally", "partly", "scarcely", "slightly", "somewhat", "sorta",
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nothing", "nowhere", "neither", "nor",
    "nobody", "cannot", "without", "aint", "dont", "doesnt", "didnt", "isnt",
    "wasnt", "wont", "cant", "shouldnt", "wouldnt", "couldnt",
];

/// Immutable word tables plus the scoring routine.
#[derive(Debug, Clone)]
pub struct Lexicon {
    valences: HashMap<String, f64>,
    modifiers: HashMap<String, f64>,
    negations: HashSet<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::standard()
    }
}

impl Lexicon {
    /// The built-in general-purpose lexicon.
    pub fn standard() -> Self {
        let valences = VALENCES.iter().map(|(w, v)| (w.to_string(), *v)).collect();
        let modifiers = INTENSIFIERS
            .iter()
            .map(|w| (w.to_string(), BOOSTER_INCREMENT))
            .chain(DAMPENERS.iter().map(|w| (w.to_string(), -BOOSTER_INCREMENT)))
            .collect();
        let negations = NEGATIONS.iter().map(|w| w.to_string()).collect();
        Self {
            valences,
            modifiers,
            negations,
        }
    }

    /// Add or override a word's valence.
    pub fn with_valence(mut self, word: &str, valence: f64) -> Self {
        self.valences.insert(word.to_lowercase(), valence);
        self
    }

    pub fn valence(&self, word: &str) -> Option<f64> {
        self.valences.get(word).copied()
    }

    fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(word) || word.ends_with("n't")
    }

    /// Compound polarity of `text` in [-1, 1]. Zero when no lexicon word occurs.
    pub fn polarity(&self, text: &str) -> f64 {
        let tokens: Vec<&str> = text
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return 0.0;
        }

        let lowered: Vec<String> = tokens
            .iter()
            .map(|t| t.to_lowercase().replace('\u{2019}', "'"))
            .collect();
        let shouting = tokens.iter().filter(|t| is_all_caps(t)).count();
        let caps_differential = shouting > 0 && shouting < tokens.len();

        let mut scores: Vec<f64> = Vec::with_capacity(tokens.len());
        for (i, word) in lowered.iter().enumerate() {
            if self.modifiers.contains_key(word.as_str()) {
                scores.push(0.0);
                continue;
            }
            let Some(mut valence) = self.valence(word) else {
                scores.push(0.0);
                continue;
            };

            if caps_differential && is_all_caps(tokens[i]) {
                valence += CAPS_INCREMENT.copysign(valence);
            }

            let window_start = i.saturating_sub(LOOKBACK);
            for (distance, j) in (window_start..i).rev().enumerate() {
                if let Some(&scalar) = self.modifiers.get(lowered[j].as_str()) {
                    // intensifiers push away from zero, dampeners pull towards it
                    let mut boost = scalar * valence.signum();
                    if caps_differential && is_all_caps(tokens[j]) {
                        boost += CAPS_INCREMENT.copysign(boost);
                    }
                    boost *= match distance {
                        0 => 1.0,
                        1 => 0.95,
                        _ => 0.9,
                    };
                    valence += boost;
                }
            }

            if (window_start..i).any(|j| self.is_negation(&lowered[j])) {
                valence *= NEGATION_SCALAR;
            }

            scores.push(valence);
        }

        // Contrastive "but": what follows outweighs what precedes.
        if let Some(pivot) = lowered.iter().position(|w| w == "but") {
            for (i, score) in scores.iter_mut().enumerate() {
                if i < pivot {
                    *score *= 0.5;
                } else if i > pivot {
                    *score *= 1.5;
                }
            }
        }

        let mut total: f64 = scores.iter().sum();
        if total == 0.0 {
            return 0.0;
        }

        let emphasis = punctuation_emphasis(text);
        total += emphasis.copysign(total);

        normalize(total)
    }
}

fn is_all_caps(token: &str) -> bool {
    token.chars().filter(|c| c.is_alphabetic()).count() > 1
        && token.chars().all(|c| !c.is_alphabetic() || c.is_uppercase())
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
    let questions = text.matches('?').count();
    let question_bonus = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * QUESTION_INCREMENT,
        _ => QUESTION_CAP,
    };
    exclamations as f64 * EXCLAMATION_INCREMENT + question_bonus
}

fn normalize(score: f64) -> f64 {
    (score / (score * score + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_and_negative_text() {
        let lexicon = Lexicon::standard();
        assert!(lexicon.polarity("This phone is amazing") > 0.5);
        assert!(lexicon.polarity("Worst phone ever") < -0.5);
    }

    #[test]
    fn test_no_lexicon_words_scores_zero() {
        let lexicon = Lexicon::standard();
        assert_eq!(lexicon.polarity("The parcel arrived on Tuesday"), 0.0);
        assert_eq!(lexicon.polarity("   "), 0.0);
    }

    #[test]
    fn test_negation_flips_polarity() {
        let lexicon = Lexicon::standard();
        assert!(lexicon.polarity("It is good") > 0.0);
        assert!(lexicon.polarity("It is not good") < 0.0);
        assert!(lexicon.polarity("It isn't good") < 0.0);
    }

    #[test]
    fn test_intensifier_and_dampener() {
        let lexicon = Lexicon::standard();
        let plain = lexicon.polarity("The sound is good");
        let boosted = lexicon.polarity("The sound is very good");
        let damped = lexicon.polarity("The sound is slightly good");
        assert!(boosted > plain);
        assert!(damped < plain);
        assert!(damped > 0.0);
    }

    #[test]
    fn test_exclamation_and_caps_add_emphasis() {
        let lexicon = Lexicon::standard();
        let plain = lexicon.polarity("The fit is great");
        assert!(lexicon.polarity("The fit is great!!") > plain);
        assert!(lexicon.polarity("The fit is GREAT") > plain);
    }

    #[test]
    fn test_but_shifts_weight_to_second_clause() {
        let lexicon = Lexicon::standard();
        assert!(lexicon.polarity("The screen is good but the battery is terrible") < 0.0);
        assert!(lexicon.polarity("The box was damaged but the product is great") > 0.0);
    }

    #[test]
    fn test_score_is_bounded() {
        let lexicon = Lexicon::standard();
        let score = lexicon.polarity("BEST BEST BEST amazing awesome perfect love!!!!!!");
        assert!(score <= 1.0 && score > 0.9);
    }

    #[test]
    fn test_custom_valence() {
        let lexicon = Lexicon::standard().with_valence("Snappy", 2.0);
        assert_eq!(lexicon.valence("snappy"), Some(2.0));
        assert!(lexicon.polarity("Very snappy") > 0.0);
    }
}
