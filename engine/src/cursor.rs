use crate::error::{EngineError, Result};
use crate::index::Posting;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Forward-only position over one term's posting list.
///
/// A cursor borrows the list from the index and owns nothing but its offset,
/// so each query builds its own set and throws them away afterwards.
#[derive(Debug, Clone)]
pub struct MergeCursor<'a> {
    term: &'a str,
    postings: &'a [Posting],
    position: usize,
}

impl<'a> MergeCursor<'a> {
    pub fn new(term: &'a str, postings: &'a [Posting]) -> Self {
        Self { term, postings, position: 0 }
    }

    pub fn exhausted(&self) -> bool {
        self.position >= self.postings.len()
    }

    /// Posting under the cursor. Check [`MergeCursor::exhausted`] first.
    pub fn current(&self) -> Result<&'a Posting> {
        self.postings
            .get(self.position)
            .ok_or_else(|| EngineError::ExhaustedCursor { term: self.term.to_string() })
    }

    /// Document id under the cursor, `None` once exhausted.
    pub fn current_doc(&self) -> Option<&'a str> {
        self.postings.get(self.position).map(|p| p.doc_id.as_str())
    }

    /// Step to the next posting; stays put once past the end.
    pub fn advance(&mut self) {
        if !self.exhausted() {
            self.position += 1;
        }
    }
}

/// Min-heap of cursors keyed by `(current doc id, cursor index)`.
///
/// The cursor index breaks ties between cursors sitting on the same document,
/// which keeps pop order identical from run to run.
pub(crate) struct MergeQueue<'a> {
    cursors: Vec<MergeCursor<'a>>,
    heap: BinaryHeap<Reverse<(&'a str, usize)>>,
}

impl<'a> MergeQueue<'a> {
    pub(crate) fn new(cursors: Vec<MergeCursor<'a>>) -> Self {
        let mut heap = BinaryHeap::with_capacity(cursors.len());
        for (idx, cursor) in cursors.iter().enumerate() {
            if let Some(doc) = cursor.current_doc() {
                heap.push(Reverse((doc, idx)));
            }
        }
        Self { cursors, heap }
    }

    /// Largest current document id over all live cursors.
    pub(crate) fn max_current(&self) -> Option<&'a str> {
        self.cursors.iter().filter_map(MergeCursor::current_doc).max()
    }

    /// Cursor positioned at the global minimum document id.
    pub(crate) fn pop(&mut self) -> Option<(&'a str, usize)> {
        self.heap.pop().map(|Reverse(entry)| entry)
    }

    pub(crate) fn cursor(&self, idx: usize) -> &MergeCursor<'a> {
        &self.cursors[idx]
    }

    /// Advance a popped cursor and return its new document id. The cursor is
    /// left out of the heap until [`MergeQueue::push`] puts it back.
    pub(crate) fn advance(&mut self, idx: usize) -> Option<&'a str> {
        let cursor = &mut self.cursors[idx];
        cursor.advance();
        cursor.current_doc()
    }

    pub(crate) fn push(&mut self, doc: &'a str, idx: usize) {
        self.heap.push(Reverse((doc, idx)));
    }

    pub(crate) fn is_empty(&self) -> bool { self.heap.is_empty() }
}
