use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, info};

use crate::error::{Result, TurneyError};
use crate::lexicon::SeedLexicon;
use crate::logging::progress_bar;
use crate::preprocess::{is_common_noun, sentence_words, PosTagger, SentenceSplitter, TextEncoding};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub const ALL: [Polarity; 2] = [Polarity::Positive, Polarity::Negative];

    pub fn label(&self) -> &'static str {
        match self {
            Polarity::Positive => "pos",
            Polarity::Negative => "neg",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per polarity class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ByPolarity<T> {
    pub positive: T,
    pub negative: T,
}

impl<T> ByPolarity<T> {
    pub fn get(&self, label: Polarity) -> &T {
        match label {
            Polarity::Positive => &self.positive,
            Polarity::Negative => &self.negative,
        }
    }

    pub fn get_mut(&mut self, label: Polarity) -> &mut T {
        match label {
            Polarity::Positive => &mut self.positive,
            Polarity::Negative => &mut self.negative,
        }
    }
}

/// Counts accumulated over the training sets, the input to polarity scoring.
pub struct TurneyModel {
    pub(crate) alpha: f64,
    pub(crate) encoding: TextEncoding,
    seeds: SeedLexicon,
    /// Seed hits per class across every training sentence.
    pub(crate) num_polarized_seeds: ByPolarity<f64>,
    pub(crate) nouns: HashSet<String>,
    /// Informational only: which class's pass saw the noun first.
    polarized_nouns: ByPolarity<HashSet<String>>,
    /// Seed hits in the sentences a noun occurred in, per class.
    pub(crate) noun_near_seed: ByPolarity<HashMap<String, f64>>,
    noun_counts: HashMap<String, f64>,
    /// Non-seed noun occurrences per training review, indexed by position in its set.
    review_nouns: ByPolarity<Vec<Vec<String>>>,
}

impl TurneyModel {
    pub fn new(seeds: SeedLexicon, alpha: f64, encoding: TextEncoding) -> Self {
        TurneyModel {
            alpha,
            encoding,
            seeds,
            num_polarized_seeds: ByPolarity::default(),
            nouns: HashSet::new(),
            polarized_nouns: ByPolarity::default(),
            noun_near_seed: ByPolarity::default(),
            noun_counts: HashMap::new(),
            review_nouns: ByPolarity::default(),
        }
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn seeds(&self) -> &SeedLexicon {
        &self.seeds
    }

    pub fn nouns(&self) -> &HashSet<String> {
        &self.nouns
    }

    pub fn contains_noun(&self, word: &str) -> bool {
        self.nouns.contains(word)
    }

    pub fn seed_total(&self, label: Polarity) -> f64 {
        *self.num_polarized_seeds.get(label)
    }

    pub fn noun_near_seed(&self, label: Polarity, noun: &str) -> f64 {
        self.noun_near_seed.get(label).get(noun).copied().unwrap_or(0.0)
    }

    pub fn polarized_nouns(&self, label: Polarity) -> &HashSet<String> {
        self.polarized_nouns.get(label)
    }

    pub fn review_nouns(&self, label: Polarity) -> &[Vec<String>] {
        self.review_nouns.get(label)
    }

    /// Tagged nouns by descending frequency, ties broken alphabetically.
    pub fn most_frequent_nouns(&self, k: usize) -> Vec<(&str, f64)> {
        let mut counts: Vec<(&str, f64)> = self
            .noun_counts
            .iter()
            .map(|(noun, count)| (noun.as_str(), *count))
            .collect();
        counts.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        counts.truncate(k);
        counts
    }

    /// Tags one sentence of training review `review` and folds its nouns and seed hits into the counters.
    pub fn parse_sentence(
        &mut self,
        tagger: &dyn PosTagger,
        review: usize,
        sentence: &str,
        label: Polarity,
    ) -> Result<()> {
        let words = sentence_words(sentence, self.encoding)?;
        let tagged = tagger.tag(&words)?;

        let mut nouns_in_sentence = Vec::new();
        let mut seeds_in_sentence = 0.0;
        for (word, tag) in tagged {
            if self.seeds.is_seed_of(&word, label) {
                *self.num_polarized_seeds.get_mut(label) += 1.0;
                seeds_in_sentence += 1.0;
            }
            if is_common_noun(&tag) {
                self.noun_counts
                    .entry(word.clone())
                    .and_modify(|e| *e += 1.0)
                    .or_insert(1.0);
                nouns_in_sentence.push(word);
            }
        }

        let review_nouns = self.review_nouns.get_mut(label);
        if review_nouns.len() <= review {
            review_nouns.resize_with(review + 1, Vec::new);
        }

        let mut credited: HashSet<&str> = HashSet::new();
        for noun in &nouns_in_sentence {
            if self.seeds.is_seed(noun) {
                continue;
            }
            review_nouns[review].push(noun.clone());
            if self.nouns.insert(noun.clone()) {
                self.polarized_nouns.get_mut(label).insert(noun.clone());
            }
            if credited.insert(noun.as_str()) {
                *self
                    .noun_near_seed
                    .get_mut(label)
                    .entry(noun.clone())
                    .or_insert(0.0) += seeds_in_sentence;
            }
        }
        Ok(())
    }

    /// Parses every sentence of one review. The review is checked against the encoding
    /// up front, so a failure leaves the counters untouched.
    fn parse_review(
        &mut self,
        splitter: &dyn SentenceSplitter,
        tagger: &dyn PosTagger,
        review: usize,
        text: &str,
        label: Polarity,
    ) -> Result<()> {
        self.encoding.narrow(text)?;
        for sentence in splitter.split(text) {
            self.parse_sentence(tagger, review, &sentence, label)?;
        }
        Ok(())
    }

    pub fn parse_training_set(
        &mut self,
        splitter: &dyn SentenceSplitter,
        tagger: &dyn PosTagger,
        training_set: &[String],
        label: Polarity,
    ) -> Result<()> {
        let pb = progress_bar(
            training_set.len(),
            format!("Parsing reviews in {} training set", label),
        );
        for (index, review) in training_set.iter().enumerate() {
            let slot = self.review_nouns.get(label).len();
            self.review_nouns.get_mut(label).push(Vec::new());
            self.parse_review(splitter, tagger, slot, review, label)
                .map_err(|e| TurneyError::in_review(index, e))?;
            pb.inc(1);
        }
        pb.finish_and_clear();
        debug!(
            label = %label,
            reviews = training_set.len(),
            seeds = self.seed_total(label),
            "parsed training set"
        );
        Ok(())
    }

    /// Positive set first, then negative.
    pub fn train_model(
        &mut self,
        splitter: &dyn SentenceSplitter,
        tagger: &dyn PosTagger,
        training_sets: &ByPolarity<Vec<String>>,
    ) -> Result<()> {
        for label in Polarity::ALL {
            info!("Parsing {} training set", label);
            self.parse_training_set(splitter, tagger, training_sets.get(label), label)?;
        }
        info!(
            nouns = self.nouns.len(),
            pos_seeds = self.seed_total(Polarity::Positive),
            neg_seeds = self.seed_total(Polarity::Negative),
            "training complete"
        );
        Ok(())
    }
}
