use thiserror::Error;

/// Errors raised while loading an index or running a merge.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("malformed index at line {line}: {reason}")]
    IndexFormat { line: usize, reason: String },

    #[error("invalid postings for term {term:?}: {reason}")]
    InvalidPostings { term: String, reason: String },

    #[error("cursor for term {term:?} is exhausted")]
    ExhaustedCursor { term: String },

    #[error("corpus size must be at least 1, got {0}")]
    InvalidCorpusSize(u32),

    #[error("corpus of {0} documents does not fit a u32 document count")]
    CorpusSizeOverflow(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub(crate) fn format(line: usize, reason: impl Into<String>) -> Self {
        EngineError::IndexFormat { line, reason: reason.into() }
    }
}
