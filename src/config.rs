use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TurneyError};
use crate::preprocess::TextEncoding;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Smoothing constant added to every co-occurrence count.
    pub pseudocount: f64,
    pub encoding: TextEncoding,
    /// nlprule English tokenizer binary.
    pub tagger_model: PathBuf,
    pub lexicon: LexiconConfig,
    pub corpus: CorpusConfig,
    pub sampling: SamplingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    pub positive: PathBuf,
    pub negative: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// JSON-lines review dump.
    pub reviews: PathBuf,
    pub businesses: Option<PathBuf>,
    /// Only consulted together with `businesses`.
    pub category: Option<String>,
    pub positive_min_stars: f64,
    pub negative_max_stars: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub train: Range<usize>,
    pub test: Range<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pseudocount: 0.0001,
            encoding: TextEncoding::Latin1,
            tagger_model: PathBuf::from("en_tokenizer.bin"),
            lexicon: LexiconConfig::default(),
            corpus: CorpusConfig::default(),
            sampling: SamplingConfig::default(),
        }
    }
}

impl Default for LexiconConfig {
    fn default() -> Self {
        LexiconConfig {
            positive: PathBuf::from("positive-words.txt"),
            negative: PathBuf::from("negative-words.txt"),
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        CorpusConfig {
            reviews: PathBuf::from("../Yelp_dataset/review.json"),
            businesses: Some(PathBuf::from("../Yelp_dataset/business.json")),
            category: None,
            positive_min_stars: 4.0,
            negative_max_stars: 2.0,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            train: 0..100,
            test: 100..150,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| TurneyError::from_io(path, e))
            .with_context(|| format!("Could not read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Could not parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.pseudocount.is_finite() && self.pseudocount > 0.0) {
            return Err(TurneyError::Domain(format!(
                "pseudocount must be positive, got {}",
                self.pseudocount
            )));
        }
        let SamplingConfig { train, test } = &self.sampling;
        for (name, range) in [("train", train), ("test", test)] {
            if range.start > range.end {
                return Err(TurneyError::Domain(format!(
                    "{} range {}..{} is reversed",
                    name, range.start, range.end
                )));
            }
        }
        let both_sampled = !train.is_empty() && !test.is_empty();
        if both_sampled && train.start < test.end && test.start < train.end {
            return Err(TurneyError::Domain(format!(
                "train range {:?} overlaps test range {:?}",
                train, test
            )));
        }
        if self.corpus.negative_max_stars >= self.corpus.positive_min_stars {
            return Err(TurneyError::Domain(format!(
                "negative_max_stars ({}) must be below positive_min_stars ({})",
                self.corpus.negative_max_stars, self.corpus.positive_min_stars
            )));
        }
        Ok(())
    }
}
