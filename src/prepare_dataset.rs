use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::CorpusConfig;
use crate::error::{Result, TurneyError};
use crate::turney::{ByPolarity, Polarity};

#[derive(Debug, Deserialize)]
struct ReviewRecord {
    text: String,
    stars: f64,
    #[serde(default)]
    business_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BusinessRecord {
    business_id: String,
    #[serde(default)]
    categories: Option<Categories>,
}

/// Older dumps list categories, newer ones join them with commas.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Categories {
    Listed(Vec<String>),
    Joined(String),
}

impl Categories {
    fn contains(&self, category: &str) -> bool {
        match self {
            Categories::Listed(list) => list.iter().any(|c| c.trim() == category),
            Categories::Joined(joined) => joined.split(',').any(|c| c.trim() == category),
        }
    }
}

fn open_lines(path: &Path) -> Result<impl Iterator<Item = (usize, std::io::Result<String>)>> {
    let file = File::open(path).map_err(|e| TurneyError::from_io(path, e))?;
    Ok(BufReader::new(file)
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line)))
}

fn parse_record<T: for<'de> Deserialize<'de>>(path: &Path, line_no: usize, line: &str) -> Result<T> {
    serde_json::from_str(line).map_err(|source| TurneyError::Corpus {
        path: path.to_path_buf(),
        line: line_no,
        source,
    })
}

/// Ids of businesses that list `category`.
fn load_business_filter(path: &Path, category: &str) -> Result<HashSet<String>> {
    let mut ids = HashSet::new();
    for (line_no, line) in open_lines(path)? {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let business: BusinessRecord = parse_record(path, line_no, &line)?;
        if business
            .categories
            .as_ref()
            .map_or(false, |c| c.contains(category))
        {
            ids.insert(business.business_id);
        }
    }
    Ok(ids)
}

/// Labelled reviews from a JSON-lines dump, classified by star rating.
#[derive(Debug)]
pub struct CorpusSource {
    reviews: PathBuf,
    positive_min_stars: f64,
    negative_max_stars: f64,
    businesses: Option<HashSet<String>>,
}

impl CorpusSource {
    pub fn new(config: &CorpusConfig) -> Result<Self> {
        let businesses = match (&config.businesses, &config.category) {
            (Some(path), Some(category)) => {
                let ids = load_business_filter(path, category)?;
                info!(category = %category, businesses = ids.len(), "loaded business filter");
                Some(ids)
            }
            _ => None,
        };
        Ok(CorpusSource {
            reviews: config.reviews.clone(),
            positive_min_stars: config.positive_min_stars,
            negative_max_stars: config.negative_max_stars,
            businesses,
        })
    }

    fn accepts(&self, record: &ReviewRecord, label: Polarity) -> bool {
        let rated = match label {
            Polarity::Positive => record.stars >= self.positive_min_stars,
            Polarity::Negative => record.stars <= self.negative_max_stars,
        };
        rated
            && self.businesses.as_ref().map_or(true, |ids| {
                record
                    .business_id
                    .as_ref()
                    .map_or(false, |id| ids.contains(id))
            })
    }

    /// Lazily yields the text of every review carrying `label`, in file order.
    pub fn stream_reviews(
        &self,
        label: Polarity,
    ) -> Result<impl Iterator<Item = Result<String>> + '_> {
        let lines = open_lines(&self.reviews)?;
        Ok(lines.filter_map(move |(line_no, line)| {
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(TurneyError::Io(e))),
            };
            if line.trim().is_empty() {
                return None;
            }
            match parse_record::<ReviewRecord>(&self.reviews, line_no, &line) {
                Ok(record) if self.accepts(&record, label) => Some(Ok(record.text)),
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            }
        }))
    }
}

/// Materializes items `[range.start, range.end)` of `stream`. Errors before the end are surfaced,
/// including those in skipped items.
pub fn initialize_sample_set<I>(stream: I, range: &Range<usize>) -> Result<Vec<String>>
where
    I: Iterator<Item = Result<String>>,
{
    let mut sample = Vec::with_capacity(range.len());
    for (i, review) in stream.enumerate().take(range.end) {
        let review = review?;
        if i >= range.start {
            sample.push(review);
        }
    }
    Ok(sample)
}

pub fn sample_split(source: &CorpusSource, range: &Range<usize>) -> Result<ByPolarity<Vec<String>>> {
    let positive = initialize_sample_set(source.stream_reviews(Polarity::Positive)?, range)?;
    let negative = initialize_sample_set(source.stream_reviews(Polarity::Negative)?, range)?;
    debug!(
        start = range.start,
        end = range.end,
        pos = positive.len(),
        neg = negative.len(),
        "sampled reviews"
    );
    Ok(ByPolarity { positive, negative })
}

#[derive(Debug)]
pub struct RawDataset {
    pub train: ByPolarity<Vec<String>>,
    pub test: ByPolarity<Vec<String>>,
}

pub fn get_raw_dataset(
    source: &CorpusSource,
    train: &Range<usize>,
    test: &Range<usize>,
) -> Result<RawDataset> {
    Ok(RawDataset {
        train: sample_split(source, train)?,
        test: sample_split(source, test)?,
    })
}
