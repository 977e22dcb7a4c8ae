use std::fmt;
use std::io;
use std::ops::Range;
use std::path::Path;

use nlprule::Tokenizer;
use punkt::params::Standard;
use punkt::{SentenceTokenizer, TrainingData};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TurneyError};

/// The character set review text must fit into before it is tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    #[default]
    Latin1,
    Ascii,
    Utf8,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Latin1 => write!(f, "Latin-1"),
            TextEncoding::Ascii => write!(f, "ASCII"),
            TextEncoding::Utf8 => write!(f, "UTF-8"),
        }
    }
}

impl TextEncoding {
    fn max_char(&self) -> char {
        match self {
            TextEncoding::Latin1 => '\u{ff}',
            TextEncoding::Ascii => '\u{7f}',
            TextEncoding::Utf8 => char::MAX,
        }
    }

    /// Fails on the first character the encoding cannot represent.
    pub fn narrow(&self, text: &str) -> Result<()> {
        let max = self.max_char();
        match text.char_indices().find(|&(_, ch)| ch > max) {
            Some((offset, ch)) => Err(TurneyError::Encoding {
                encoding: *self,
                ch,
                offset,
            }),
            None => Ok(()),
        }
    }

    /// Decodes raw file contents. Latin-1 maps every byte to the code point of the same value.
    pub fn decode(&self, bytes: Vec<u8>) -> Result<String> {
        match self {
            TextEncoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
            TextEncoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(offset) => Err(TurneyError::Encoding {
                    encoding: *self,
                    ch: char::from(bytes[offset]),
                    offset,
                }),
                None => Ok(bytes.into_iter().map(char::from).collect()),
            },
            TextEncoding::Utf8 => String::from_utf8(bytes).map_err(|e| {
                let offset = e.utf8_error().valid_up_to();
                TurneyError::Encoding {
                    encoding: *self,
                    ch: char::from(e.as_bytes()[offset]),
                    offset,
                }
            }),
        }
    }
}

/// Removes every ASCII punctuation character.
pub fn strip_punctuation(sentence: &str) -> String {
    sentence.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

pub fn split_words(sentence: &str) -> Vec<String> {
    sentence.split_whitespace().map(String::from).collect()
}

/// Punctuation-free, encoding-checked words of one sentence.
pub fn sentence_words(sentence: &str, encoding: TextEncoding) -> Result<Vec<String>> {
    let stripped = strip_punctuation(sentence);
    encoding.narrow(&stripped)?;
    Ok(split_words(&stripped))
}

pub trait SentenceSplitter {
    fn split(&self, text: &str) -> Vec<String>;
}

pub trait PosTagger {
    /// Returns exactly one `(word, tag)` pair per input word, in order.
    fn tag(&self, words: &[String]) -> Result<Vec<(String, String)>>;
}

/// Singular or plural common noun. nlprule refines `NN` into `NN:U`/`NN:UN` for uncountables.
pub fn is_common_noun(tag: &str) -> bool {
    matches!(tag, "NN" | "NNS") || tag.starts_with("NN:")
}

/// Sentence boundaries from the Punkt algorithm with its pretrained English parameters.
pub struct PunktSplitter {
    data: TrainingData,
}

impl PunktSplitter {
    pub fn english() -> Self {
        PunktSplitter {
            data: TrainingData::english(),
        }
    }
}

impl SentenceSplitter for PunktSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        SentenceTokenizer::<Standard>::new(text, &self.data)
            .map(String::from)
            .collect()
    }
}

pub struct NlpruleTagger {
    tokenizer: Tokenizer,
}

pub fn load_tagger(model_path: &Path) -> Result<NlpruleTagger> {
    if !model_path.is_file() {
        return Err(TurneyError::from_io(
            model_path,
            io::Error::new(io::ErrorKind::NotFound, "tagger model not found"),
        ));
    }
    let tokenizer = Tokenizer::new(model_path).map_err(|e| TurneyError::Tagger(e.to_string()))?;
    Ok(NlpruleTagger { tokenizer })
}

/// Picks one tag from the readings left after disambiguation. A noun reading only wins when no
/// other kind of reading survived, so ambiguous words like `service` (NN/VB) are not nouns.
pub(crate) fn resolve_tag(readings: &[&str]) -> String {
    let mut readings = readings
        .iter()
        .copied()
        .filter(|pos| !pos.is_empty() && !pos.starts_with("SENT_"));
    let first = match readings.next() {
        Some(first) => first,
        None => return String::new(),
    };
    if !is_common_noun(first) {
        return first.to_string();
    }
    readings
        .find(|pos| !is_common_noun(pos))
        .unwrap_or(first)
        .to_string()
}

/// Maps tagged sub-tokens back onto `words`, which were joined with single spaces. Each word
/// takes the tag of its first common-noun sub-token, else of its first sub-token.
pub(crate) fn align_tags(
    words: &[String],
    tokens: &[(Range<usize>, String)],
) -> Result<Vec<(String, String)>> {
    let mut bounds = Vec::with_capacity(words.len());
    let mut start = 0;
    for word in words {
        bounds.push(start..start + word.len());
        start += word.len() + 1;
    }

    let mut tags: Vec<Option<&str>> = vec![None; words.len()];
    for (span, tag) in tokens {
        if let Some(i) = bounds.iter().position(|b| b.contains(&span.start)) {
            match tags[i] {
                None => tags[i] = Some(tag.as_str()),
                Some(current) if !is_common_noun(current) && is_common_noun(tag) => {
                    tags[i] = Some(tag.as_str())
                }
                Some(_) => {}
            }
        }
    }

    words
        .iter()
        .zip(tags)
        .map(|(word, tag)| match tag {
            Some(tag) => Ok((word.clone(), tag.to_string())),
            None => Err(TurneyError::Tagger(format!("no token covers word {:?}", word))),
        })
        .collect()
}

impl PosTagger for NlpruleTagger {
    fn tag(&self, words: &[String]) -> Result<Vec<(String, String)>> {
        let text = words.join(" ");
        let mut tokens = Vec::new();
        for sentence in self.tokenizer.pipe(&text) {
            for token in sentence.tokens() {
                if token.word().text().as_str().trim().is_empty() {
                    continue;
                }
                let readings: Vec<&str> = token
                    .word()
                    .tags()
                    .iter()
                    .map(|data| data.pos().as_str())
                    .collect();
                tokens.push((token.span().byte().clone(), resolve_tag(&readings)));
            }
        }
        align_tags(words, &tokens)
    }
}

/// Tags listed words as `NN` and every other word as `DT`.
#[cfg(test)]
pub(crate) struct FixedTagger {
    nouns: std::collections::HashSet<String>,
}

#[cfg(test)]
impl FixedTagger {
    pub(crate) fn with_nouns(nouns: &[&str]) -> Self {
        FixedTagger {
            nouns: nouns.iter().map(|n| n.to_string()).collect(),
        }
    }
}

#[cfg(test)]
impl PosTagger for FixedTagger {
    fn tag(&self, words: &[String]) -> Result<Vec<(String, String)>> {
        Ok(words
            .iter()
            .map(|w| {
                let tag = if self.nouns.contains(w) { "NN" } else { "DT" };
                (w.clone(), tag.to_string())
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ascii_punctuation_only() {
        assert_eq!(strip_punctuation("Great, isn't it?!"), "Great isnt it");
        assert_eq!(strip_punctuation("café – ok"), "café – ok");
    }

    #[test]
    fn latin1_accepts_accents_and_rejects_euro() {
        assert!(TextEncoding::Latin1.narrow("crème brûlée").is_ok());
        match TextEncoding::Latin1.narrow("costs 5€") {
            Err(TurneyError::Encoding { ch, offset, .. }) => {
                assert_eq!(ch, '€');
                assert_eq!(offset, 7);
            }
            other => panic!("expected encoding error, got {:?}", other),
        }
    }

    #[test]
    fn ascii_rejects_accents_utf8_accepts_everything() {
        assert!(TextEncoding::Ascii.narrow("café").is_err());
        assert!(TextEncoding::Utf8.narrow("café 5€ 🍕").is_ok());
    }

    #[test]
    fn decode_latin1_maps_bytes_directly() {
        let text = TextEncoding::Latin1.decode(vec![b'c', b'a', b'f', 0xe9]).unwrap();
        assert_eq!(text, "café");
    }

    #[test]
    fn decode_rejects_invalid_utf8_and_non_ascii() {
        assert!(TextEncoding::Utf8.decode(vec![b'a', 0xff]).is_err());
        assert!(TextEncoding::Ascii.decode(vec![b'a', 0xe9]).is_err());
        assert_eq!(TextEncoding::Utf8.decode("ok".into()).unwrap(), "ok");
    }

    #[test]
    fn sentence_words_strips_then_splits() {
        let words = sentence_words("The food, was great.", TextEncoding::Latin1).unwrap();
        assert_eq!(words, vec!["The", "food", "was", "great"]);
    }

    #[test]
    fn sentence_words_propagates_encoding_failure() {
        assert!(sentence_words("Great 👍", TextEncoding::Latin1).is_err());
    }

    #[test]
    fn common_noun_tags() {
        assert!(is_common_noun("NN"));
        assert!(is_common_noun("NNS"));
        assert!(is_common_noun("NN:UN"));
        assert!(!is_common_noun("NNP"));
        assert!(!is_common_noun("JJ"));
    }

    #[test]
    fn punkt_splits_review_into_sentences() {
        let splitter = PunktSplitter::english();
        let sentences = splitter.split("The food was great. The service was great too.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].trim(), "The food was great.");
        assert!(sentences[1].contains("service"));
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn noun_reading_needs_to_be_unambiguous() {
        assert_eq!(resolve_tag(&["NN", "NNS"]), "NN");
        assert_eq!(resolve_tag(&["NN", "VB", "VBP"]), "VB");
        assert_eq!(resolve_tag(&["", "SENT_END", "JJ"]), "JJ");
        assert_eq!(resolve_tag(&["SENT_START"]), "");
    }

    #[test]
    fn split_sub_tokens_fold_back_onto_their_word() {
        // "restaurant’s food": the tokenizer splits on the curly apostrophe.
        let ws = words(&["restaurant’s", "food"]);
        let apostrophe = "restaurant".len();
        let s = apostrophe + '’'.len_utf8();
        let tokens = vec![
            (0..apostrophe, "NN".to_string()),
            (apostrophe..s, "POS".to_string()),
            (s..s + 1, "PRP".to_string()),
            (s + 2..s + 6, "NN".to_string()),
        ];
        let tagged = align_tags(&ws, &tokens).unwrap();
        assert_eq!(
            tagged,
            vec![
                ("restaurant’s".to_string(), "NN".to_string()),
                ("food".to_string(), "NN".to_string()),
            ]
        );
    }

    #[test]
    fn later_noun_sub_token_wins_over_earlier_other_tag() {
        let ws = words(&["«Pizza»", "rocks"]);
        let open = '«'.len_utf8();
        let close = open + "Pizza".len();
        let rocks = close + '»'.len_utf8() + 1;
        let tokens = vec![
            (0..open, "``".to_string()),
            (open..close, "NN".to_string()),
            (close..rocks - 1, "''".to_string()),
            (rocks..rocks + 5, "VBZ".to_string()),
        ];
        let tagged = align_tags(&ws, &tokens).unwrap();
        assert_eq!(tagged[0], ("«Pizza»".to_string(), "NN".to_string()));
        assert_eq!(tagged[1].1, "VBZ");
    }

    #[test]
    fn word_without_a_token_is_a_tagger_error() {
        let ws = words(&["good", "food"]);
        let tokens = vec![(0..4, "JJ".to_string())];
        assert!(matches!(align_tags(&ws, &tokens), Err(TurneyError::Tagger(_))));
    }

    #[test]
    fn missing_tagger_model_is_resource_missing() {
        let err = load_tagger(Path::new("no/such/en_tokenizer.bin")).err().unwrap();
        assert!(matches!(err, TurneyError::ResourceMissing { .. }));
    }
}
