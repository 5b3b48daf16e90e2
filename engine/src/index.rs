use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Opaque document identifier. Postings are ordered by byte-wise comparison of ids.
pub type DocId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32, // raw term frequency, 1 for boolean-only postings
}

impl Posting {
    pub fn new(doc_id: impl Into<DocId>, tf: u32) -> Self {
        Self { doc_id: doc_id.into(), tf }
    }
}

/// Immutable term -> postings mapping.
///
/// Every posting list is non-empty and strictly ascending by `doc_id`; both
/// the text loader and [`IndexStore::from_postings`] reject anything else.
/// The store is never mutated after construction, so a shared `&IndexStore`
/// can serve any number of concurrent queries.
#[derive(Debug, Default, Clone)]
pub struct IndexStore {
    postings: HashMap<String, Vec<Posting>>,
}

impl IndexStore {
    /// Build a store from an in-memory map, validating every posting list.
    pub fn from_postings(postings: HashMap<String, Vec<Posting>>) -> Result<Self> {
        for (term, plist) in &postings {
            check_postings(plist).map_err(|reason| EngineError::InvalidPostings { term: term.clone(), reason })?;
        }
        Ok(Self { postings })
    }

    /// Callers must have run [`check_postings`] on every list already.
    pub(crate) fn from_checked(postings: HashMap<String, Vec<Posting>>) -> Self {
        Self { postings }
    }

    /// Postings for `term`, or `None` when the term is not indexed.
    pub fn lookup(&self, term: &str) -> Option<&[Posting]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    /// Length of the term's posting list; 0 for absent terms.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.lookup(term).map_or(0, <[Posting]>::len)
    }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    /// All indexed terms in lexicographic order.
    pub fn terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.postings.keys().map(String::as_str).collect();
        terms.sort_unstable();
        terms
    }

    /// Number of distinct documents across the union of all posting lists.
    pub fn distinct_documents(&self) -> usize {
        self.postings
            .values()
            .flatten()
            .map(|p| p.doc_id.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Enforce the posting-list invariants: non-empty and strictly ascending ids.
pub(crate) fn check_postings(plist: &[Posting]) -> std::result::Result<(), String> {
    if plist.is_empty() {
        return Err("posting list is empty".into());
    }
    for pair in plist.windows(2) {
        if pair[0].doc_id >= pair[1].doc_id {
            return Err(format!(
                "document ids not strictly ascending: {:?} then {:?}",
                pair[0].doc_id, pair[1].doc_id
            ));
        }
    }
    Ok(())
}
