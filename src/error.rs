use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::preprocess::TextEncoding;

pub type Result<T> = std::result::Result<T, TurneyError>;

#[derive(Error, Debug)]
pub enum TurneyError {
    #[error("resource not found: {}", path.display())]
    ResourceMissing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("character {ch:?} at byte {offset} is outside the {encoding} encoding")]
    Encoding {
        encoding: TextEncoding,
        ch: char,
        offset: usize,
    },

    #[error("domain error: {0}")]
    Domain(String),

    #[error("no polarity score for noun {0:?}")]
    Lookup(String),

    #[error("tagger error: {0}")]
    Tagger(String),

    #[error("malformed corpus record at {}:{line}", path.display())]
    Corpus {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("review {index} aborted")]
    InReview {
        index: usize,
        #[source]
        source: Box<TurneyError>,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl TurneyError {
    /// Maps a failed open/read of `path`, singling out the not-found case.
    pub fn from_io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            TurneyError::ResourceMissing {
                path: path.into(),
                source: err,
            }
        } else {
            TurneyError::Io(err)
        }
    }

    pub fn in_review(index: usize, err: TurneyError) -> Self {
        TurneyError::InReview {
            index,
            source: Box::new(err),
        }
    }
}
