use crate::boolean::BooleanMerger;
use crate::error::Result;
use crate::index::{DocId, IndexStore};
use crate::ranked::{RankedMerger, ScoredDoc};
use crate::tokenizer::split_terms;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Distinct query terms in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    terms: Vec<String>,
}

impl Query {
    /// Split a query line on whitespace.
    pub fn parse(line: &str) -> Self {
        Self::from_terms(split_terms(line))
    }

    /// Drop repeated terms so no term is merged (or scored) twice.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let terms = terms
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| seen.insert(t.clone()))
            .collect();
        Self { terms }
    }

    pub fn terms(&self) -> &[String] { &self.terms }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    fn term_strs(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    Boolean,
    /// Ranked retrieval against an already-resolved corpus size.
    Ranked { num_docs: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "results", rename_all = "lowercase")]
pub enum SearchResults {
    Boolean(Vec<DocId>),
    Ranked(Vec<ScoredDoc>),
}

impl SearchResults {
    pub fn len(&self) -> usize {
        match self {
            SearchResults::Boolean(docs) => docs.len(),
            SearchResults::Ranked(docs) => docs.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// `[2, 5]` for boolean results, `[(2.079442, 2), (0.000000, 1)]` for ranked ones.
impl fmt::Display for SearchResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        match self {
            SearchResults::Boolean(docs) => {
                for (i, doc) in docs.iter().enumerate() {
                    if i > 0 { f.write_str(", ")?; }
                    write!(f, "{doc}")?;
                }
            }
            SearchResults::Ranked(docs) => {
                for (i, scored) in docs.iter().enumerate() {
                    if i > 0 { f.write_str(", ")?; }
                    write!(f, "({:.6}, {})", scored.score, scored.doc_id)?;
                }
            }
        }
        f.write_str("]")
    }
}

/// Run one query against the index.
pub fn execute(index: &IndexStore, query: &Query, mode: RetrievalMode) -> Result<SearchResults> {
    let results = match mode {
        RetrievalMode::Boolean => SearchResults::Boolean(BooleanMerger::new(index, query.term_strs()).run()),
        RetrievalMode::Ranked { num_docs } => {
            SearchResults::Ranked(RankedMerger::new(index, query.term_strs(), num_docs)?.run()?)
        }
    };
    tracing::debug!(terms = query.terms.len(), ?mode, hits = results.len(), "query executed");
    Ok(results)
}
