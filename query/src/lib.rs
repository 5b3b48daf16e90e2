use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use engine::persist::load_meta;
use engine::tokenizer::analyze;
use engine::{execute, CorpusSize, IndexStore, Query, RetrievalMode, SearchResults};
use serde::Serialize;
use std::borrow::Cow;
use std::io::{BufRead, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `[2, 5]` / `[(2.079442, 2), (0.000000, 1)]`
    #[default]
    Text,
    /// One JSON object per query line
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    pub mode: RetrievalMode,
    /// Run query lines through the indexing analyzer instead of splitting on whitespace.
    pub analyze: bool,
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct QueryOutput<'a> {
    query: &'a str,
    #[serde(flatten)]
    results: &'a SearchResults,
}

/// Pick the corpus size source from the ranked-mode flags. Exactly one
/// source must be given.
pub fn corpus_size(num_docs: Option<u32>, meta: Option<&Path>, union_corpus: bool) -> Result<CorpusSize> {
    match (num_docs, meta, union_corpus) {
        (Some(n), None, false) => Ok(CorpusSize::Declared(n)),
        (None, Some(path), false) => {
            let meta = load_meta(path).with_context(|| format!("reading {}", path.display()))?;
            Ok(CorpusSize::Declared(meta.num_docs))
        }
        (None, None, true) => Ok(CorpusSize::DistinctDocuments),
        (None, None, false) => bail!("ranked retrieval needs a corpus size: pass --num-docs, --meta or --union-corpus"),
        _ => bail!("--num-docs, --meta and --union-corpus are mutually exclusive"),
    }
}

fn empty_results(mode: RetrievalMode) -> SearchResults {
    match mode {
        RetrievalMode::Boolean => SearchResults::Boolean(Vec::new()),
        RetrievalMode::Ranked { .. } => SearchResults::Ranked(Vec::new()),
    }
}

fn answer_line(index: &IndexStore, line: &str, opts: &QueryOptions) -> SearchResults {
    let query = if opts.analyze { Query::from_terms(analyze(line)) } else { Query::parse(line) };
    execute(index, &query, opts.mode).unwrap_or_else(|err| {
        tracing::error!(%err, query = %line, "query failed");
        empty_results(opts.mode)
    })
}

/// Answer every line of `input`, writing one result line per query.
///
/// A query that fails, including a line that is not valid UTF-8, is logged
/// and answered with an empty result so output lines stay aligned with input
/// lines. Only read and write errors end the run.
pub fn run_queries<R: BufRead, W: Write>(index: &IndexStore, input: R, mut out: W, opts: &QueryOptions) -> Result<usize> {
    let mut answered = 0;
    for raw in input.split(b'\n') {
        let raw = raw?;
        let (line, results) = match std::str::from_utf8(&raw) {
            Ok(line) => (Cow::Borrowed(line), answer_line(index, line, opts)),
            Err(err) => {
                let line = String::from_utf8_lossy(&raw);
                tracing::error!(%err, query = %line, "query line is not valid UTF-8");
                (line, empty_results(opts.mode))
            }
        };
        match opts.format {
            OutputFormat::Text => writeln!(out, "{results}")?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut out, &QueryOutput { query: line.trim(), results: &results })?;
                writeln!(out)?;
            }
        }
        answered += 1;
    }
    out.flush()?;
    Ok(answered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_size_needs_exactly_one_source() {
        assert_eq!(corpus_size(Some(5), None, false).unwrap(), CorpusSize::Declared(5));
        assert_eq!(corpus_size(None, None, true).unwrap(), CorpusSize::DistinctDocuments);
        assert!(corpus_size(None, None, false).is_err());
        assert!(corpus_size(Some(5), None, true).is_err());
    }
}
