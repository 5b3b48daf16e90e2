use anyhow::{anyhow, Context, Result};
use engine::persist::{save_doc_ids, save_index, save_meta, IndexPaths, MetaFile, META_VERSION};
use engine::tokenizer::analyze;
use engine::{DocId, IndexStore, Posting};
use serde::Deserialize;
use walkdir::WalkDir;

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct InputDoc {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub body: String,
}

const MIN_ID_WIDTH: usize = 8;

/// Digits needed to print every ordinal below `num_docs`, never fewer than 8.
///
/// All ids in one index share this width, so byte order of the zero-padded
/// ids matches arrival order and every posting list stays sorted.
pub fn id_width(num_docs: u32) -> usize {
    let largest = num_docs.saturating_sub(1);
    largest.checked_ilog10().map_or(1, |d| d as usize + 1).max(MIN_ID_WIDTH)
}

/// Accumulates documents in arrival order. Postings hold ordinals until
/// [`IndexBuilder::finish`] knows the final count and can pick one id width.
#[derive(Default)]
pub struct IndexBuilder {
    next_doc: u32,
    postings: HashMap<String, Vec<(u32, u32)>>,
    external_ids: Vec<String>,
}

impl IndexBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn num_docs(&self) -> u32 { self.next_doc }

    pub fn add(&mut self, doc: InputDoc) -> Result<()> {
        let ordinal = self.next_doc;
        self.next_doc = ordinal
            .checked_add(1)
            .ok_or_else(|| anyhow!("document {:?} exceeds the {} document limit", doc.id, u32::MAX))?;

        let mut tf_counts: BTreeMap<String, u32> = BTreeMap::new();
        for term in analyze(&doc.title).into_iter().chain(analyze(&doc.body)) {
            *tf_counts.entry(term).or_insert(0) += 1;
        }
        for (term, tf) in tf_counts {
            self.postings.entry(term).or_default().push((ordinal, tf));
        }
        self.external_ids.push(doc.id);
        Ok(())
    }

    pub fn add_file(&mut self, file: &Path) -> Result<()> {
        let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
        let reader = BufReader::new(f);
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() { continue; }
                self.add(serde_json::from_str(&line)?)?;
            }
        } else {
            let json: serde_json::Value = serde_json::from_reader(reader)?;
            match json {
                serde_json::Value::Array(arr) => {
                    for v in arr {
                        self.add(serde_json::from_value(v)?)?;
                    }
                }
                v @ serde_json::Value::Object(_) => self.add(serde_json::from_value(v)?)?,
                _ => tracing::warn!(file = %file.display(), "skipping JSON that is neither object nor array"),
            }
        }
        Ok(())
    }

    /// Write `index.txt`, `meta.json` and `doc_ids.json` under `output`.
    pub fn finish(self, output: &Path) -> Result<MetaFile> {
        let paths = IndexPaths::new(output);
        let num_docs = self.next_doc;
        let width = id_width(num_docs);
        let doc_id = |ordinal: u32| -> DocId { format!("{ordinal:0width$}") };

        let postings: HashMap<String, Vec<Posting>> = self
            .postings
            .into_iter()
            .map(|(term, plist)| (term, plist.into_iter().map(|(ord, tf)| Posting::new(doc_id(ord), tf)).collect()))
            .collect();
        let doc_ids: BTreeMap<DocId, String> = (0..num_docs).map(doc_id).zip(self.external_ids).collect();

        let index = IndexStore::from_postings(postings)?;
        save_index(&paths, &index)?;
        save_doc_ids(&paths, &doc_ids)?;

        let meta = MetaFile {
            num_docs,
            num_terms: u32::try_from(index.num_terms())?,
            created_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_default(),
            version: META_VERSION,
        };
        save_meta(&paths, &meta)?;
        Ok(meta)
    }
}

/// `.json` / `.jsonl` files under `input` (or `input` itself), in path order.
pub fn input_files(input: &Path) -> Vec<PathBuf> {
    if input.is_file() {
        return vec![input.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .filter(|p| matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")))
        .collect();
    files.sort();
    files
}

pub fn build_index(input: &Path, output: &Path) -> Result<MetaFile> {
    let mut builder = IndexBuilder::new();
    for file in input_files(input) {
        builder.add_file(&file)?;
    }
    tracing::info!(num_docs = builder.num_docs(), "ingested documents");
    let meta = builder.finish(output)?;
    tracing::info!(output = %output.display(), num_terms = meta.num_terms, "index build complete");
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::persist::{load_index, load_meta};
    use engine::PostingFormat;
    use std::fs;

    #[test]
    fn builds_sorted_index_with_frequencies() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("docs.jsonl");
        fs::write(
            &input,
            concat!(
                r#"{"id": "a", "title": "Cats", "body": "cat cat dog"}"#, "\n",
                "\n",
                r#"{"id": "b", "body": "dogs chase cats"}"#, "\n",
            ),
        )
        .unwrap();
        let out = dir.path().join("index");
        let meta = build_index(&input, &out).unwrap();
        assert_eq!(meta.num_docs, 2);

        let paths = IndexPaths::new(&out);
        let index = load_index(paths.index(), PostingFormat::WithFrequency).unwrap();
        assert_eq!(index.lookup("cat").unwrap(), [Posting::new("00000000", 3), Posting::new("00000001", 1)]);
        assert_eq!(index.lookup("dog").unwrap().len(), 2);
        assert_eq!(load_meta(paths.meta()).unwrap(), meta);
        let doc_ids: BTreeMap<String, String> = serde_json::from_str(&fs::read_to_string(paths.doc_ids()).unwrap()).unwrap();
        assert_eq!(doc_ids["00000001"], "b");
    }

    #[test]
    fn id_width_grows_past_eight_digits() {
        assert_eq!(id_width(0), 8);
        assert_eq!(id_width(3), 8);
        assert_eq!(id_width(100_000_000), 8);
        assert_eq!(id_width(100_000_001), 9);
        assert_eq!(id_width(u32::MAX), 10);
        let width = id_width(100_000_001);
        assert!(format!("{:0width$}", 99_999_999) < format!("{:0width$}", 100_000_000));
    }

    #[test]
    fn document_count_overflow_is_an_error() {
        let mut builder = IndexBuilder { next_doc: u32::MAX, ..IndexBuilder::default() };
        let doc = InputDoc { id: "late".into(), title: String::new(), body: "cat".into() };
        assert!(builder.add(doc).is_err());
        assert_eq!(builder.num_docs(), u32::MAX);
        assert!(builder.postings.is_empty());
    }

    #[test]
    fn walks_directories_for_json_inputs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("one.json"), r#"[{"id": "1", "body": "alpha"}, {"id": "2", "body": "beta"}]"#).unwrap();
        fs::write(dir.path().join("nested/two.json"), r#"{"id": "3", "body": "alpha beta"}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(input_files(dir.path()).len(), 2);
        let meta = build_index(dir.path(), &dir.path().join("out")).unwrap();
        assert_eq!(meta.num_docs, 3);
    }
}
