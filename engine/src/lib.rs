//! Posting-list merge retrieval: conjunctive and TF-IDF ranked queries over a
//! static term -> postings index, answered by a heap-driven multi-way merge.

pub mod boolean;
pub mod cursor;
pub mod error;
pub mod format;
pub mod index;
pub mod persist;
pub mod query;
pub mod ranked;
pub mod tokenizer;

pub use boolean::BooleanMerger;
pub use cursor::MergeCursor;
pub use error::{EngineError, Result};
pub use format::PostingFormat;
pub use index::{DocId, IndexStore, Posting};
pub use query::{execute, Query, RetrievalMode, SearchResults};
pub use ranked::{CorpusSize, RankedMerger, ScoreAccumulator, ScoredDoc};
