//! Declarative keyword rules and the ordered first-match evaluator.
//!
//! Keyword lists used by classification, category detection and the generic
//! review scan are data: a [`RuleChain`] is an ordered list of [`Rule`]s and
//! evaluation stops at the first rule whose [`Condition`] holds.

/// How a single term is matched against prepared [`Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    /// A whole word, or a whole-word sequence such as `"could be better"`.
    Word(&'static str),
    /// Any word starting with the stem (`"disappoint"` matches `"disappointed"`).
    Stem(&'static str),
    /// A raw substring with no word boundaries (`"phone"` matches `"headphones"`).
    Fragment(&'static str),
}

impl Term {
    pub fn matches(&self, text: &Text) -> bool {
        match *self {
            Term::Word(phrase) => {
                let needle: Vec<&str> = phrase.split_whitespace().collect();
                match needle.len() {
                    0 => false,
                    1 => text.words.iter().any(|w| w == needle[0]),
                    n => text
                        .words
                        .windows(n)
                        .any(|window| window.iter().zip(&needle).all(|(w, n)| w == n)),
                }
            }
            Term::Stem(stem) => text.words.iter().any(|w| w.starts_with(stem)),
            Term::Fragment(fragment) => text.lower.contains(fragment),
        }
    }
}

/// Lower-cased text split into words, prepared once and matched many times.
#[derive(Debug, Clone)]
pub struct Text {
    lower: String,
    words: Vec<String>,
}

impl Text {
    pub fn new(raw: &str) -> Self {
        let lower = raw.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'");
        let words = lower
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .map(|w| w.trim_matches('\''))
            .filter(|w| !w.is_empty())
            .map(String::from)
            .collect();
        Self { lower, words }
    }

    pub fn lower(&self) -> &str {
        &self.lower
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

/// A predicate over prepared text.
#[derive(Debug, Clone)]
pub enum Condition {
    /// At least one term matches.
    Any(&'static [Term]),
    /// Every nested condition holds.
    All(Vec<Condition>),
}

impl Condition {
    pub fn holds(&self, text: &Text) -> bool {
        match self {
            Condition::Any(terms) => terms.iter().any(|t| t.matches(text)),
            Condition::All(conditions) => conditions.iter().all(|c| c.holds(text)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule<T> {
    pub name: &'static str,
    pub when: Condition,
    pub then: T,
}

impl<T> Rule<T> {
    pub fn new(name: &'static str, when: Condition, then: T) -> Self {
        Self { name, when, then }
    }
}

/// Ordered rules; earlier rules take strict priority over later ones.
#[derive(Debug, Clone)]
pub struct RuleChain<T> {
    rules: Vec<Rule<T>>,
}

impl<T> RuleChain<T> {
    pub fn new(rules: Vec<Rule<T>>) -> Self {
        Self { rules }
    }

    /// The first rule whose condition holds. Later rules are not evaluated.
    pub fn first_match(&self, text: &Text) -> Option<&Rule<T>> {
        self.rules.iter().find(|rule| rule.when.holds(text))
    }

    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_keeps_contractions_and_normalizes_quotes() {
        let text = Text::new("It DOESN\u{2019}T work, 'really'!");
        assert_eq!(text.words(), &["it", "doesn't", "work", "really"]);
        assert_eq!(text.lower(), "it doesn't work, 'really'!");
    }

    #[test]
    fn test_word_terms_respect_boundaries() {
        let text = Text::new("The book looks nice");
        assert!(!Term::Word("ok").matches(&text));
        assert!(Term::Fragment("ok").matches(&text));
        assert!(Term::Word("looks nice").matches(&text));
        assert!(!Term::Word("nice book").matches(&text));
    }

    #[test]
    fn test_stem_matches_inflections() {
        let text = Text::new("Deeply disappointed with it");
        assert!(Term::Stem("disappoint").matches(&text));
        assert!(!Term::Stem("appoint").matches(&text));
    }

    #[test]
    fn test_chain_stops_at_first_match() {
        const A: &[Term] = &[Term::Word("alpha")];
        const B: &[Term] = &[Term::Word("beta")];
        let chain = RuleChain::new(vec![
            Rule::new("first", Condition::Any(A), 1),
            Rule::new("second", Condition::Any(B), 2),
        ]);

        let both = Text::new("beta then alpha");
        assert_eq!(chain.first_match(&both).map(|r| r.then), Some(1));

        let only_b = Text::new("just beta");
        assert_eq!(chain.first_match(&only_b).map(|r| r.name), Some("second"));

        assert!(chain.first_match(&Text::new("gamma")).is_none());
    }

    #[test]
    fn test_all_condition_requires_every_part() {
        const NEG: &[Term] = &[Term::Word("not")];
        const POS: &[Term] = &[Term::Word("good")];
        let cond = Condition::All(vec![Condition::Any(NEG), Condition::Any(POS)]);
        assert!(cond.holds(&Text::new("not good")));
        assert!(!cond.holds(&Text::new("good enough")));
    }
}
