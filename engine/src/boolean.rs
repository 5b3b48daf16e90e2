use crate::cursor::{MergeCursor, MergeQueue};
use crate::index::{DocId, IndexStore};

/// Conjunctive (AND) retrieval over a sorted multi-way merge.
///
/// Tracks the largest document id under any cursor. When the cursor popped
/// from the min-heap sits on that same id, every cursor agrees and the
/// document matches. The merge stops as soon as any cursor runs out, since no
/// later document can then contain every term.
pub struct BooleanMerger<'a> {
    // None when some query term is not indexed
    cursors: Option<Vec<MergeCursor<'a>>>,
}

impl<'a> BooleanMerger<'a> {
    pub fn new<I>(index: &'a IndexStore, terms: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let cursors = terms
            .into_iter()
            .map(|term| index.lookup(term).map(|plist| MergeCursor::new(term, plist)))
            .collect::<Option<Vec<_>>>();
        if cursors.is_none() {
            tracing::debug!("query term absent from index, boolean result is empty");
        }
        Self { cursors }
    }

    /// Matching document ids in strictly ascending order.
    pub fn run(self) -> Vec<DocId> {
        self.run_with(|| true)
    }

    /// Like [`BooleanMerger::run`], but calls `keep_going` before every
    /// pop/advance step and stops with the matches found so far once it
    /// returns `false`.
    pub fn run_with<F>(self, mut keep_going: F) -> Vec<DocId>
    where
        F: FnMut() -> bool,
    {
        let mut matches = Vec::new();
        let cursors = match self.cursors {
            Some(cursors) if !cursors.is_empty() => cursors,
            _ => return matches,
        };
        let mut queue = MergeQueue::new(cursors);
        let Some(mut max_doc) = queue.max_current() else { return matches };

        while keep_going() {
            let Some((doc, idx)) = queue.pop() else { break };
            if doc == max_doc {
                tracing::trace!(doc, "boolean match");
                matches.push(doc.to_string());
            }
            match queue.advance(idx) {
                Some(next) => {
                    if next > max_doc {
                        max_doc = next;
                    }
                    queue.push(next, idx);
                }
                None => break,
            }
        }
        matches
    }
}
