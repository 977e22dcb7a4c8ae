use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{Result, TurneyError};
use crate::preprocess::TextEncoding;
use crate::turney::{ByPolarity, Polarity};

/// Lines of license and citation text at the top of every seed list.
pub const LEXICON_HEADER_LINES: usize = 35;

/// Appends the trimmed, non-blank lines after the header block of `path` to `lexicon`.
pub fn stream_lexicon(path: &Path, encoding: TextEncoding, lexicon: &mut Vec<String>) -> Result<()> {
    let bytes = fs::read(path).map_err(|e| TurneyError::from_io(path, e))?;
    let text = encoding.decode(bytes)?;
    lexicon.extend(
        text.lines()
            .skip(LEXICON_HEADER_LINES)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from),
    );
    Ok(())
}

/// Positive and negative seed words, immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct SeedLexicon {
    seeds: ByPolarity<Vec<String>>,
    lookup: ByPolarity<HashSet<String>>,
    all_seeds: HashSet<String>,
}

impl SeedLexicon {
    pub fn new(positive: Vec<String>, negative: Vec<String>) -> Self {
        let lookup = ByPolarity {
            positive: positive.iter().cloned().collect(),
            negative: negative.iter().cloned().collect(),
        };
        let all_seeds = positive.iter().chain(negative.iter()).cloned().collect();
        SeedLexicon {
            seeds: ByPolarity { positive, negative },
            lookup,
            all_seeds,
        }
    }

    pub fn load(positive_path: &Path, negative_path: &Path, encoding: TextEncoding) -> Result<Self> {
        let mut positive = Vec::new();
        stream_lexicon(positive_path, encoding, &mut positive)?;
        let mut negative = Vec::new();
        stream_lexicon(negative_path, encoding, &mut negative)?;
        Ok(SeedLexicon::new(positive, negative))
    }

    pub fn seeds(&self, label: Polarity) -> &[String] {
        self.seeds.get(label)
    }

    pub fn is_seed_of(&self, word: &str, label: Polarity) -> bool {
        self.lookup.get(label).contains(word)
    }

    /// Membership in either list.
    pub fn is_seed(&self, word: &str) -> bool {
        self.all_seeds.contains(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lexicon_file(entries: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for i in 0..LEXICON_HEADER_LINES {
            writeln!(file, "; header line {}", i).unwrap();
        }
        for entry in entries {
            writeln!(file, "{}", entry).unwrap();
        }
        file
    }

    #[test]
    fn skips_header_and_blank_lines() {
        let file = lexicon_file(&["good", "", "great"]);
        let mut lexicon = Vec::new();
        stream_lexicon(file.path(), TextEncoding::Latin1, &mut lexicon).unwrap();
        assert_eq!(lexicon, vec!["good", "great"]);
    }

    #[test]
    fn whitespace_only_lines_are_blank() {
        let file = lexicon_file(&["  nice  ", "   ", "\tfine"]);
        let mut lexicon = Vec::new();
        stream_lexicon(file.path(), TextEncoding::Latin1, &mut lexicon).unwrap();
        assert_eq!(lexicon, vec!["nice", "fine"]);
    }

    #[test]
    fn reloading_is_idempotent() {
        let file = lexicon_file(&["a+", "abound", "", "accessible"]);
        let mut first = Vec::new();
        stream_lexicon(file.path(), TextEncoding::Latin1, &mut first).unwrap();
        let mut second = Vec::new();
        stream_lexicon(file.path(), TextEncoding::Latin1, &mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn appends_to_existing_entries() {
        let file = lexicon_file(&["great"]);
        let mut lexicon = vec!["good".to_string()];
        stream_lexicon(file.path(), TextEncoding::Latin1, &mut lexicon).unwrap();
        assert_eq!(lexicon, vec!["good", "great"]);
    }

    #[test]
    fn header_only_file_is_empty() {
        let file = lexicon_file(&[]);
        let mut lexicon = Vec::new();
        stream_lexicon(file.path(), TextEncoding::Latin1, &mut lexicon).unwrap();
        assert!(lexicon.is_empty());
    }

    #[test]
    fn missing_file_is_resource_missing() {
        let mut lexicon = Vec::new();
        let err = stream_lexicon(Path::new("no/such/words.txt"), TextEncoding::Latin1, &mut lexicon)
            .unwrap_err();
        assert!(matches!(err, TurneyError::ResourceMissing { .. }));
    }

    #[test]
    fn seed_lookup_by_label() {
        let seeds = SeedLexicon::new(vec!["great".into()], vec!["awful".into()]);
        assert!(seeds.is_seed_of("great", Polarity::Positive));
        assert!(!seeds.is_seed_of("great", Polarity::Negative));
        assert!(seeds.is_seed("awful"));
        assert!(!seeds.is_seed("food"));
        assert_eq!(seeds.seeds(Polarity::Negative), ["awful".to_string()]);
    }
}
