use tracing::{debug, info};

use crate::error::{Result, TurneyError};
use crate::logging::progress_bar;
use crate::polarity::PolarityScores;
use crate::preprocess::{sentence_words, SentenceSplitter};
use crate::turney::{Polarity, TurneyModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Positive,
    Negative,
    /// Scores that sum to exactly zero; never counted as correct.
    Neither,
}

impl Classification {
    pub fn from_score(score: f64) -> Self {
        if score > 0.0 {
            Classification::Positive
        } else if score < 0.0 {
            Classification::Negative
        } else {
            Classification::Neither
        }
    }

    pub fn matches(&self, expected: Polarity) -> bool {
        matches!(
            (self, expected),
            (Classification::Positive, Polarity::Positive)
                | (Classification::Negative, Polarity::Negative)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewVerdict {
    pub nouns: Vec<String>,
    pub score: f64,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub expected: Polarity,
    pub correct: usize,
    /// One entry per test review, in input order.
    pub verdicts: Vec<ReviewVerdict>,
}

impl Evaluation {
    pub fn total(&self) -> usize {
        self.verdicts.len()
    }
}

/// Known-noun occurrences of one test review. Unlike training, no tagging and no seed exclusion.
fn collect_review_nouns(
    model: &TurneyModel,
    splitter: &dyn SentenceSplitter,
    review: &str,
) -> Result<Vec<String>> {
    let mut nouns = Vec::new();
    for sentence in splitter.split(review) {
        for word in sentence_words(&sentence, model.encoding())? {
            if model.contains_noun(&word) {
                nouns.push(word);
            }
        }
    }
    Ok(nouns)
}

pub fn classify_review(
    model: &TurneyModel,
    scores: &PolarityScores,
    splitter: &dyn SentenceSplitter,
    review: &str,
) -> Result<ReviewVerdict> {
    let nouns = collect_review_nouns(model, splitter, review)?;
    let mut score = 0.0;
    for noun in &nouns {
        score += scores.score(noun)?;
    }
    Ok(ReviewVerdict {
        nouns,
        score,
        classification: Classification::from_score(score),
    })
}

/// Classifies every review of `test_set` and counts those matching `polarity`.
pub fn eval_turney(
    model: &TurneyModel,
    scores: &PolarityScores,
    splitter: &dyn SentenceSplitter,
    test_set: &[String],
    polarity: Polarity,
) -> Result<Evaluation> {
    let pb = progress_bar(test_set.len(), format!("Evaluating {} test set", polarity));
    let mut verdicts = Vec::with_capacity(test_set.len());
    let mut correct = 0;
    for (index, review) in test_set.iter().enumerate() {
        let verdict = classify_review(model, scores, splitter, review)
            .map_err(|e| TurneyError::in_review(index, e))?;
        debug!(
            index,
            score = verdict.score,
            nouns = verdict.nouns.len(),
            classification = ?verdict.classification,
            "classified review"
        );
        if verdict.classification.matches(polarity) {
            correct += 1;
        }
        verdicts.push(verdict);
        pb.inc(1);
    }
    pb.finish_and_clear();
    info!(
        label = %polarity,
        correct,
        total = test_set.len(),
        "evaluated test set"
    );
    Ok(Evaluation {
        expected: polarity,
        correct,
        verdicts,
    })
}

/// Percentage of correctly classified reviews over all evaluations.
pub fn accuracy(evaluations: &[&Evaluation]) -> Result<f64> {
    let total: usize = evaluations.iter().map(|e| e.total()).sum();
    if total == 0 {
        return Err(TurneyError::Domain("no test reviews to evaluate".to_string()));
    }
    let correct: usize = evaluations.iter().map(|e| e.correct).sum();
    Ok(100.0 * correct as f64 / total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::SeedLexicon;
    use crate::polarity::scores_from;
    use crate::preprocess::{FixedTagger, PunktSplitter, TextEncoding};
    use crate::turney::ByPolarity;

    fn reviews(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    /// "food" leans positive, "staff" negative.
    fn fixture() -> (TurneyModel, PolarityScores) {
        let seeds = SeedLexicon::new(vec!["great".into()], vec!["awful".into()]);
        let mut m = TurneyModel::new(seeds, 0.0001, TextEncoding::Latin1);
        let tagger = FixedTagger::with_nouns(&["food", "staff"]);
        m.parse_sentence(&tagger, 0, "great food", Polarity::Positive)
            .unwrap();
        m.parse_sentence(&tagger, 0, "awful staff", Polarity::Negative)
            .unwrap();
        let scores = m.calc_polarity_scores().unwrap();
        (m, scores)
    }

    #[test]
    fn classification_by_sign() {
        assert_eq!(Classification::from_score(0.3), Classification::Positive);
        assert_eq!(Classification::from_score(-2.0), Classification::Negative);
        assert_eq!(Classification::from_score(0.0), Classification::Neither);
        assert!(!Classification::Neither.matches(Polarity::Positive));
        assert!(!Classification::Neither.matches(Polarity::Negative));
    }

    #[test]
    fn single_noun_review_follows_the_noun() {
        let (m, scores) = fixture();
        let verdict =
            classify_review(&m, &scores, &PunktSplitter::english(), "Such food!").unwrap();
        assert_eq!(verdict.nouns, vec!["food"]);
        assert_eq!(verdict.classification, Classification::Positive);
    }

    #[test]
    fn strongly_positive_noun_classifies_its_review_positive() {
        let seeds = SeedLexicon::new(vec!["great".into()], vec!["awful".into()]);
        let mut m = TurneyModel::new(seeds, 0.0001, TextEncoding::Latin1);
        m.num_polarized_seeds = ByPolarity {
            positive: 10.0,
            negative: 5.0,
        };
        m.nouns.insert("food".to_string());
        m.noun_near_seed.positive.insert("food".to_string(), 8.0);
        let scores = m.calc_polarity_scores().unwrap();
        assert!(scores.score("food").unwrap() > 10.0);

        let verdict =
            classify_review(&m, &scores, &PunktSplitter::english(), "The food.").unwrap();
        assert_eq!(verdict.nouns, vec!["food"]);
        assert_eq!(verdict.classification, Classification::Positive);
    }

    #[test]
    fn counts_one_of_two() {
        let (m, scores) = fixture();
        let eval = eval_turney(
            &m,
            &scores,
            &PunktSplitter::english(),
            &reviews(&["Loved the food.", "The staff, the staff."]),
            Polarity::Positive,
        )
        .unwrap();

        assert_eq!(eval.correct, 1);
        assert_eq!(eval.total(), 2);
        assert_eq!(eval.verdicts[1].nouns, vec!["staff", "staff"]);
        assert_eq!(eval.verdicts[1].classification, Classification::Negative);
    }

    #[test]
    fn review_without_known_nouns_is_never_correct() {
        let (m, scores) = fixture();
        for polarity in Polarity::ALL {
            let eval = eval_turney(
                &m,
                &scores,
                &PunktSplitter::english(),
                &reviews(&["Nothing to see here."]),
                polarity,
            )
            .unwrap();
            assert_eq!(eval.correct, 0);
            assert_eq!(eval.verdicts[0].classification, Classification::Neither);
        }
    }

    #[test]
    fn seeds_and_untagged_words_are_ignored_unless_known() {
        // "great" is a seed and never entered the universe, so only "food" is collected.
        let (m, scores) = fixture();
        let verdict =
            classify_review(&m, &scores, &PunktSplitter::english(), "Great food. Great.").unwrap();
        assert_eq!(verdict.nouns, vec!["food"]);
    }

    #[test]
    fn scores_from_another_model_surface_a_lookup_error() {
        let (m, _) = fixture();
        let stale = scores_from(&[("food", 1.0)]);
        let err = eval_turney(
            &m,
            &stale,
            &PunktSplitter::english(),
            &reviews(&["The staff."]),
            Polarity::Negative,
        )
        .unwrap_err();
        match err {
            TurneyError::InReview { source, .. } => {
                assert!(matches!(*source, TurneyError::Lookup(ref noun) if noun == "staff"))
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn accuracy_over_both_classes() {
        let (m, scores) = fixture();
        let splitter = PunktSplitter::english();
        let pos = eval_turney(&m, &scores, &splitter, &reviews(&["food", "staff"]), Polarity::Positive)
            .unwrap();
        let neg = eval_turney(&m, &scores, &splitter, &reviews(&["staff", "staff"]), Polarity::Negative)
            .unwrap();
        assert_eq!(accuracy(&[&pos, &neg]).unwrap(), 75.0);
    }

    #[test]
    fn accuracy_without_reviews_is_a_domain_error() {
        let empty = Evaluation {
            expected: Polarity::Positive,
            correct: 0,
            verdicts: Vec::new(),
        };
        assert!(matches!(accuracy(&[&empty]), Err(TurneyError::Domain(_))));
    }
}
