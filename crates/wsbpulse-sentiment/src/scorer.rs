//! Comment scorer: VADER compound score plus a WSB keyword boost.

use std::collections::HashSet;

use vader_sentiment::SentimentIntensityAnalyzer;

use crate::error::SentimentError;

/// Lowercase tokens that nudge a comment toward bullish.
pub const BOOST_KEYWORDS: &[&str] = &[
    "dd",
    "moon",
    "squeeze",
    "yolo",
    "calls",
    "undervalued",
    "strong",
    "gains",
];

/// Added to the compound score once per matching token.
pub const BOOST_INCREMENT: f64 = 0.1;

/// Compound scores strictly above this are positive, strictly below its
/// negation are negative.
const VERDICT_THRESHOLD: f64 = 0.1;

/// Raw assessment returned by a polarity model.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Polarity {
    /// Normalized score in `[-1.0, 1.0]`.
    pub compound: f64,
    pub pos: f64,
    pub neu: f64,
    pub neg: f64,
}

/// Black-box text polarity scorer.
pub trait PolarityModel: Send + Sync {
    /// Assess one piece of text.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Polarity`] if the model cannot score the text.
    fn assess(&self, text: &str) -> Result<Polarity, SentimentError>;
}

/// [`PolarityModel`] backed by the VADER lexicon.
pub struct VaderModel {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderModel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityModel for VaderModel {
    fn assess(&self, text: &str) -> Result<Polarity, SentimentError> {
        let scores = self.analyzer.polarity_scores(text);
        let field = |name: &str| -> Result<f64, SentimentError> {
            scores
                .get(name)
                .copied()
                .ok_or_else(|| SentimentError::Polarity(format!("VADER returned no `{name}`")))
        };
        Ok(Polarity {
            compound: field("compound")?,
            pos: field("pos")?,
            neu: field("neu")?,
            neg: field("neg")?,
        })
    }
}

/// Per-comment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentVerdict {
    Negative,
    Neutral,
    Positive,
}

impl SentimentVerdict {
    #[must_use]
    pub fn from_compound(compound: f64) -> Self {
        if compound > VERDICT_THRESHOLD {
            Self::Positive
        } else if compound < -VERDICT_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    #[must_use]
    pub fn value(self) -> i8 {
        match self {
            Self::Negative => -1,
            Self::Neutral => 0,
            Self::Positive => 1,
        }
    }
}

/// Result of scoring one thread's comments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreOutcome {
    /// Mean verdict across all comments. May be exactly `0.0`.
    Scored(f64),
    /// There was nothing to score.
    NoReactions,
}

impl ScoreOutcome {
    /// Collapse to a number; `NoReactions` reads as neutral.
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            Self::Scored(v) => v,
            Self::NoReactions => 0.0,
        }
    }
}

/// Turns a batch of comments into one signed sentiment value.
pub struct SentimentScorer {
    model: Box<dyn PolarityModel>,
    keywords: HashSet<String>,
    boost: f64,
}

impl SentimentScorer {
    /// Scorer using the default keyword set and increment.
    pub fn new(model: impl PolarityModel + 'static) -> Self {
        Self::with_keywords(model, BOOST_KEYWORDS.iter().copied(), BOOST_INCREMENT)
    }

    /// Scorer with an explicit keyword set. Keywords are lowercased.
    pub fn with_keywords<I, S>(model: impl PolarityModel + 'static, keywords: I, boost: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            model: Box::new(model),
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
            boost,
        }
    }

    /// Model compound score plus one increment per keyword token.
    ///
    /// The result is not clamped and can exceed `1.0`.
    ///
    /// # Errors
    ///
    /// Propagates the model's failure.
    pub fn boosted_compound(&self, text: &str) -> Result<f64, SentimentError> {
        let polarity = self.model.assess(text)?;
        let lowered = text.to_lowercase();
        let hits = lowered
            .split_whitespace()
            .filter(|token| self.keywords.contains(*token))
            .count();
        #[allow(clippy::cast_precision_loss)]
        let boost = hits as f64 * self.boost;
        Ok(polarity.compound + boost)
    }

    /// # Errors
    ///
    /// Propagates the model's failure.
    pub fn verdict(&self, text: &str) -> Result<SentimentVerdict, SentimentError> {
        self.boosted_compound(text)
            .map(SentimentVerdict::from_compound)
    }

    /// Mean verdict over `reactions`.
    ///
    /// A single model failure fails the whole batch.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Polarity`] (or whatever the model raised) if
    /// any comment cannot be assessed.
    pub fn score<S: AsRef<str>>(&self, reactions: &[S]) -> Result<ScoreOutcome, SentimentError> {
        if reactions.is_empty() {
            return Ok(ScoreOutcome::NoReactions);
        }

        let mut total: i64 = 0;
        for reaction in reactions {
            total += i64::from(self.verdict(reaction.as_ref())?.value());
        }

        #[allow(clippy::cast_precision_loss)]
        let mean = total as f64 / reactions.len() as f64;
        Ok(ScoreOutcome::Scored(mean))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Deterministic model: fixed compound per exact text, `0.0` otherwise.
    /// Text equal to `"ERR"` fails.
    #[derive(Default)]
    pub(crate) struct FixedModel {
        pub(crate) compounds: HashMap<String, f64>,
    }

    impl FixedModel {
        pub(crate) fn with(pairs: &[(&str, f64)]) -> Self {
            Self {
                compounds: pairs.iter().map(|(t, c)| ((*t).to_string(), *c)).collect(),
            }
        }
    }

    impl PolarityModel for FixedModel {
        fn assess(&self, text: &str) -> Result<Polarity, SentimentError> {
            if text == "ERR" {
                return Err(SentimentError::Polarity("model offline".to_string()));
            }
            Ok(Polarity {
                compound: self.compounds.get(text).copied().unwrap_or(0.0),
                ..Polarity::default()
            })
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn verdict_thresholds_are_strict() {
        assert_eq!(SentimentVerdict::from_compound(0.1), SentimentVerdict::Neutral);
        assert_eq!(SentimentVerdict::from_compound(-0.1), SentimentVerdict::Neutral);
        assert_eq!(SentimentVerdict::from_compound(0.11), SentimentVerdict::Positive);
        assert_eq!(SentimentVerdict::from_compound(-0.11), SentimentVerdict::Negative);
        assert_eq!(SentimentVerdict::from_compound(2.5).value(), 1);
    }

    #[test]
    fn empty_batch_is_no_reactions() {
        let scorer = SentimentScorer::new(FixedModel::default());
        let outcome = scorer.score::<&str>(&[]).unwrap();
        assert_eq!(outcome, ScoreOutcome::NoReactions);
        assert_eq!(outcome.value(), 0.0);
    }

    #[test]
    fn each_keyword_occurrence_boosts() {
        let scorer = SentimentScorer::new(FixedModel::default());
        let once = scorer.boosted_compound("to the moon").unwrap();
        let twice = scorer.boosted_compound("moon moon").unwrap();
        assert!(approx(once, 0.1), "got {once}");
        assert!(approx(twice, 0.2), "got {twice}");
    }

    #[test]
    fn keywords_match_case_insensitively_but_whole_token_only() {
        let scorer = SentimentScorer::new(FixedModel::default());
        assert!(approx(scorer.boosted_compound("YOLO Calls").unwrap(), 0.2));
        // Attached punctuation prevents a match.
        assert!(approx(scorer.boosted_compound("moon! calls,").unwrap(), 0.0));
    }

    #[test]
    fn boost_is_not_clamped() {
        let scorer = SentimentScorer::new(FixedModel::with(&[(
            "yolo calls moon squeeze gains dd strong undervalued",
            0.9,
        )]));
        let boosted = scorer
            .boosted_compound("yolo calls moon squeeze gains dd strong undervalued")
            .unwrap();
        assert!(approx(boosted, 1.7), "got {boosted}");
    }

    #[test]
    fn boost_can_flip_a_negative_comment() {
        let scorer = SentimentScorer::new(FixedModel::with(&[("calls calls calls", -0.15)]));
        assert_eq!(
            scorer.verdict("calls calls calls").unwrap(),
            SentimentVerdict::Positive
        );
    }

    #[test]
    fn score_is_mean_of_verdicts() {
        let scorer = SentimentScorer::new(FixedModel::with(&[
            ("great", 0.8),
            ("awful", -0.7),
            ("fine", 0.5),
        ]));
        let outcome = scorer.score(&["great", "awful", "fine", "meh"]).unwrap();
        // (+1 - 1 + 1 + 0) / 4
        assert_eq!(outcome, ScoreOutcome::Scored(0.25));
    }

    #[test]
    fn balanced_batch_scores_exact_zero() {
        let scorer = SentimentScorer::new(FixedModel::with(&[("up", 0.5), ("down", -0.5)]));
        assert_eq!(
            scorer.score(&["up", "down"]).unwrap(),
            ScoreOutcome::Scored(0.0)
        );
    }

    #[test]
    fn model_failure_is_an_error_not_neutral() {
        let scorer = SentimentScorer::new(FixedModel::default());
        let result = scorer.score(&["fine", "ERR"]);
        assert!(
            matches!(result, Err(SentimentError::Polarity(_))),
            "expected Polarity error, got: {result:?}"
        );
    }

    #[test]
    fn custom_keywords_replace_the_default_set() {
        let scorer = SentimentScorer::with_keywords(FixedModel::default(), ["Tendies"], 0.5);
        assert!(approx(scorer.boosted_compound("tendies moon").unwrap(), 0.5));
    }

    #[test]
    fn vader_scores_obvious_polarity() {
        let model = VaderModel::new();
        let positive = model.assess("This is great, I love it!").unwrap();
        let negative = model.assess("This is terrible and I hate it.").unwrap();
        assert!(positive.compound > 0.1, "got {positive:?}");
        assert!(negative.compound < -0.1, "got {negative:?}");
    }

    #[test]
    fn vader_is_deterministic() {
        let model = VaderModel::new();
        let a = model.assess("GME to the moon, best stock ever").unwrap();
        let b = model.assess("GME to the moon, best stock ever").unwrap();
        assert_eq!(a, b);
    }
}
