use crate::cursor::{MergeCursor, MergeQueue};
use crate::error::{EngineError, Result};
use crate::index::{DocId, IndexStore};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Where the corpus size N used by IDF comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusSize {
    /// Total document count declared by the indexer.
    Declared(u32),
    /// Distinct document ids across every posting list in the index.
    DistinctDocuments,
}

impl CorpusSize {
    pub fn resolve(self, index: &IndexStore) -> Result<u32> {
        let n = match self {
            CorpusSize::Declared(n) => n,
            CorpusSize::DistinctDocuments => document_count(index.distinct_documents())?,
        };
        if n == 0 {
            return Err(EngineError::InvalidCorpusSize(n));
        }
        Ok(n)
    }
}

fn document_count(count: usize) -> Result<u32> {
    u32::try_from(count).map_err(|_| EngineError::CorpusSizeOverflow(count))
}

/// `ln(N / df)`
pub fn idf(num_docs: u32, doc_freq: usize) -> f64 {
    (f64::from(num_docs) / doc_freq as f64).ln()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDoc {
    pub score: f64,
    pub doc_id: DocId,
}

impl ScoredDoc {
    /// Descending score, then descending document id.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.doc_id.cmp(&self.doc_id))
    }
}

/// Running per-document score sums for one ranked query.
#[derive(Debug, Default)]
pub struct ScoreAccumulator<'a> {
    scores: HashMap<&'a str, f64>,
}

impl<'a> ScoreAccumulator<'a> {
    pub fn new() -> Self { Self::default() }

    pub fn add(&mut self, doc: &'a str, contribution: f64) {
        *self.scores.entry(doc).or_insert(0.0) += contribution;
    }

    pub fn get(&self, doc: &str) -> Option<f64> {
        self.scores.get(doc).copied()
    }

    /// Remove a document whose score can no longer change.
    pub fn finalize(&mut self, doc: &str) -> Option<ScoredDoc> {
        self.scores
            .remove_entry(doc)
            .map(|(doc, score)| ScoredDoc { score, doc_id: doc.to_string() })
    }
}

/// TF-IDF retrieval: the union of all query terms' postings, scored by
/// `sum(tf * ln(N / df))` over the terms that mention each document.
///
/// Cursors pop in ascending document order, so once the heap minimum moves
/// past a document no cursor can contribute to it again and its score is
/// final. Terms missing from the index contribute nothing.
pub struct RankedMerger<'a> {
    cursors: Vec<MergeCursor<'a>>,
    idfs: Vec<f64>,
}

impl<'a> RankedMerger<'a> {
    pub fn new<I>(index: &'a IndexStore, terms: I, num_docs: u32) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if num_docs == 0 {
            return Err(EngineError::InvalidCorpusSize(num_docs));
        }
        let mut cursors = Vec::new();
        let mut idfs = Vec::new();
        for term in terms {
            match index.lookup(term) {
                Some(plist) => {
                    idfs.push(idf(num_docs, plist.len()));
                    cursors.push(MergeCursor::new(term, plist));
                }
                None => tracing::debug!(term, "query term absent from index, ignored"),
            }
        }
        Ok(Self { cursors, idfs })
    }

    /// Scored documents, best first.
    pub fn run(self) -> Result<Vec<ScoredDoc>> {
        self.run_with(|| true)
    }

    /// Like [`RankedMerger::run`], but calls `keep_going` before every
    /// pop/advance step. When it returns `false` only documents whose score
    /// was already final are returned.
    pub fn run_with<F>(self, mut keep_going: F) -> Result<Vec<ScoredDoc>>
    where
        F: FnMut() -> bool,
    {
        let idfs = self.idfs;
        let mut queue = MergeQueue::new(self.cursors);
        let mut acc = ScoreAccumulator::new();
        let mut results = Vec::new();
        let mut pending: Option<&'a str> = None;
        let mut completed = true;

        while !queue.is_empty() {
            if !keep_going() {
                completed = false;
                break;
            }
            let Some((doc, idx)) = queue.pop() else { break };
            if let Some(prev) = pending.filter(|prev| *prev != doc) {
                results.extend(acc.finalize(prev));
            }
            pending = Some(doc);

            let posting = queue.cursor(idx).current()?;
            acc.add(doc, f64::from(posting.tf) * idfs[idx]);

            if let Some(next) = queue.advance(idx) {
                queue.push(next, idx);
            }
        }
        if completed {
            if let Some(last) = pending {
                results.extend(acc.finalize(last));
            }
        }

        results.sort_by(ScoredDoc::rank_cmp);
        Ok(results)
    }
}
