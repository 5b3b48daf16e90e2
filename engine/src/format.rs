//! Line-oriented index text format.
//!
//! One term per line followed by its whitespace-separated postings:
//!
//! ```text
//! cat 1 2 5
//! dog 2,3 3,1 5,4
//! ```
//!
//! A posting is either a bare document id or `documentId,termFrequency`.

use crate::error::{EngineError, Result};
use crate::index::{check_postings, IndexStore, Posting};
use std::collections::HashMap;
use std::io::{BufRead, Write};

/// Shape of the posting tokens in an index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingFormat {
    /// Boolean files: bare ids (tf = 1); `id,tf` tokens are accepted too.
    Bare,
    /// Ranked files: every token must be `id,tf`.
    WithFrequency,
}

/// Parse a whole index. Any malformed line fails the load.
pub fn parse_index<R: BufRead>(reader: R, format: PostingFormat) -> Result<IndexStore> {
    let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line?;
        let mut fields = line.split_whitespace();
        let Some(term) = fields.next() else { continue };

        let plist = fields
            .map(|token| parse_posting(token, format).map_err(|reason| EngineError::format(line_no, reason)))
            .collect::<Result<Vec<_>>>()?;
        check_postings(&plist).map_err(|reason| EngineError::format(line_no, format!("term {term:?}: {reason}")))?;

        if postings.insert(term.to_string(), plist).is_some() {
            return Err(EngineError::format(line_no, format!("term {term:?} listed more than once")));
        }
    }
    Ok(IndexStore::from_checked(postings))
}

fn parse_posting(token: &str, format: PostingFormat) -> std::result::Result<Posting, String> {
    let mut parts = token.split(',');
    let doc_id = parts.next().unwrap_or_default();
    if doc_id.is_empty() {
        return Err(format!("posting {token:?} has an empty document id"));
    }
    let tf = match (parts.next(), format) {
        (None, PostingFormat::Bare) => 1,
        (None, PostingFormat::WithFrequency) => {
            return Err(format!("posting {token:?} is missing a term frequency"));
        }
        (Some(raw), _) => raw
            .parse::<u32>()
            .map_err(|_| format!("posting {token:?} has a non-numeric term frequency"))?,
    };
    if parts.next().is_some() {
        return Err(format!("posting {token:?} has more than two fields"));
    }
    Ok(Posting { doc_id: doc_id.to_string(), tf })
}

/// Write the index in `id,tf` form, terms in lexicographic order.
pub fn write_index<W: Write>(mut writer: W, index: &IndexStore) -> Result<()> {
    for term in index.terms() {
        write!(writer, "{term}")?;
        for p in index.lookup(term).unwrap_or_default() {
            write!(writer, " {},{}", p.doc_id, p.tf)?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}
