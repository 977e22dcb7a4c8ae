use std::collections::HashMap;

use tracing::info;

use crate::error::{Result, TurneyError};
use crate::logging::progress_bar;
use crate::turney::{ByPolarity, Polarity, TurneyModel};

/// Frozen noun -> log-odds table produced after training.
#[derive(Debug, Clone, Default)]
pub struct PolarityScores {
    scores: HashMap<String, f64>,
}

impl PolarityScores {
    pub fn get(&self, noun: &str) -> Option<f64> {
        self.scores.get(noun).copied()
    }

    /// Like `get`, but a missing noun is an error.
    pub fn score(&self, noun: &str) -> Result<f64> {
        self.get(noun)
            .ok_or_else(|| TurneyError::Lookup(noun.to_string()))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// The `k` highest scores for `Positive`, the `k` lowest for `Negative`.
    pub fn most_polarized(&self, label: Polarity, k: usize) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .scores
            .iter()
            .map(|(noun, score)| (noun.as_str(), *score))
            .collect();
        ranked.sort_by(|a, b| {
            let order = match label {
                Polarity::Positive => b.1.total_cmp(&a.1),
                Polarity::Negative => a.1.total_cmp(&b.1),
            };
            order.then_with(|| a.0.cmp(b.0))
        });
        ranked.truncate(k);
        ranked
    }
}

/// `log2(((pos_cooc + alpha) * neg_seeds) / ((neg_cooc + alpha) * pos_seeds))`
pub fn polarity_score(
    near_seed: ByPolarity<f64>,
    seed_totals: &ByPolarity<f64>,
    alpha: f64,
) -> Result<f64> {
    if seed_totals.positive == 0.0 || seed_totals.negative == 0.0 {
        return Err(TurneyError::Domain(format!(
            "seed totals must be non-zero (pos = {}, neg = {})",
            seed_totals.positive, seed_totals.negative
        )));
    }
    let denominator = (near_seed.negative + alpha) * seed_totals.positive;
    if denominator == 0.0 {
        return Err(TurneyError::Domain(format!(
            "smoothed negative co-occurrence is zero (alpha = {})",
            alpha
        )));
    }
    let numerator = (near_seed.positive + alpha) * seed_totals.negative;
    Ok((numerator / denominator).log2())
}

impl TurneyModel {
    pub fn calc_polarity_scores(&self) -> Result<PolarityScores> {
        let pb = progress_bar(self.nouns.len(), "Calculating polarity scores".to_string());
        let mut scores = HashMap::with_capacity(self.nouns.len());
        for noun in &self.nouns {
            let near_seed = ByPolarity {
                positive: self.noun_near_seed(Polarity::Positive, noun),
                negative: self.noun_near_seed(Polarity::Negative, noun),
            };
            let score = polarity_score(near_seed, &self.num_polarized_seeds, self.alpha)?;
            scores.insert(noun.clone(), score);
            pb.inc(1);
        }
        pb.finish_and_clear();
        info!(nouns = scores.len(), "calculated polarity scores");
        Ok(PolarityScores { scores })
    }
}

#[cfg(test)]
pub(crate) fn scores_from(pairs: &[(&str, f64)]) -> PolarityScores {
    PolarityScores {
        scores: pairs.iter().map(|(n, s)| (n.to_string(), *s)).collect(),
    }
}
