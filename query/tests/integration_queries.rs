use engine::persist::{load_index, save_meta, IndexPaths, MetaFile, META_VERSION};
use engine::{CorpusSize, PostingFormat, RetrievalMode};
use query::{corpus_size, run_queries, OutputFormat, QueryOptions};
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

fn answer(index_text: &str, format: PostingFormat, opts: QueryOptions, queries: impl AsRef<[u8]>) -> Vec<String> {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index.txt");
    fs::write(&path, index_text).unwrap();
    let index = load_index(&path, format).unwrap();

    let mut out = Vec::new();
    let answered = run_queries(&index, queries.as_ref(), &mut out, &opts).unwrap();
    let lines: Vec<String> = String::from_utf8(out).unwrap().lines().map(str::to_string).collect();
    assert_eq!(answered, lines.len());
    lines
}

fn text(mode: RetrievalMode) -> QueryOptions {
    QueryOptions { mode, analyze: false, format: OutputFormat::Text }
}

#[test]
fn boolean_queries_one_line_each() {
    let lines = answer(
        "cat 1 2 5\ndog 2 3 5\n",
        PostingFormat::Bare,
        text(RetrievalMode::Boolean),
        "cat dog\ncat dog bird\n\ncat\n",
    );
    assert_eq!(lines, vec!["[2, 5]", "[]", "[]", "[1, 2, 5]"]);
}

#[test]
fn ranked_queries_sorted_by_score() {
    let lines = answer(
        "cat 1,2 2,1\ndog 2,3\n",
        PostingFormat::WithFrequency,
        text(RetrievalMode::Ranked { num_docs: 2 }),
        "cat dog\ncat bird dog\n",
    );
    assert_eq!(lines, vec!["[(2.079442, 2), (0.000000, 1)]", "[(2.079442, 2), (0.000000, 1)]"]);
}

#[test]
fn invalid_utf8_line_fails_only_that_query() {
    let lines = answer(
        "cat 1 2 5\ndog 2 3 5\n",
        PostingFormat::Bare,
        text(RetrievalMode::Boolean),
        b"cat\n\xff\xfe\ncat dog\n",
    );
    assert_eq!(lines, vec!["[1, 2, 5]", "[]", "[2, 5]"]);
}

#[test]
fn crlf_query_lines_are_answered() {
    let lines = answer("cat 1 2 5\n", PostingFormat::Bare, text(RetrievalMode::Boolean), "cat\r\ncat\r\n");
    assert_eq!(lines, vec!["[1, 2, 5]", "[1, 2, 5]"]);
}

#[test]
fn json_output_carries_query_and_mode() {
    let opts = QueryOptions { mode: RetrievalMode::Boolean, analyze: false, format: OutputFormat::Json };
    let lines = answer("cat 1 2 5\ndog 2 3 5\n", PostingFormat::Bare, opts, "cat dog\n");
    let json: Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(json["query"], "cat dog");
    assert_eq!(json["mode"], "boolean");
    assert_eq!(json["results"], serde_json::json!(["2", "5"]));
}

#[test]
fn analyzed_queries_match_stemmed_terms() {
    let opts = QueryOptions { mode: RetrievalMode::Boolean, analyze: true, format: OutputFormat::Text };
    let lines = answer("cat 1 2 5\ndog 2 3 5\n", PostingFormat::Bare, opts, "The Cats and DOGS\n");
    assert_eq!(lines, vec!["[2, 5]"]);
}

#[test]
fn malformed_index_fails_to_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index.txt");
    fs::write(&path, "cat 1,2\ndog 2,three\n").unwrap();
    let err = load_index(&path, PostingFormat::WithFrequency).unwrap_err();
    assert!(err.to_string().contains("line 2"), "{err}");
}

#[test]
fn corpus_size_from_meta_file() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let meta = MetaFile { num_docs: 17, num_terms: 2, created_at: "2024-01-01T00:00:00Z".into(), version: META_VERSION };
    save_meta(&paths, &meta).unwrap();
    assert_eq!(corpus_size(None, Some(&paths.meta()), false).unwrap(), CorpusSize::Declared(17));
    assert!(corpus_size(None, Some(&dir.path().join("missing.json")), false).is_err());
}
