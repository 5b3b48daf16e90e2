use crate::error::Result;
use crate::format::{parse_index, write_index, PostingFormat};
use crate::index::{DocId, IndexStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const META_VERSION: u32 = 1;

/// Index-wide facts written by the indexer next to the postings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    /// Declared corpus size N used for IDF.
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn index(&self) -> PathBuf { self.root.join("index.txt") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    pub fn doc_ids(&self) -> PathBuf { self.root.join("doc_ids.json") }
}

/// Load an index text file from disk.
pub fn load_index<P: AsRef<Path>>(path: P, format: PostingFormat) -> Result<IndexStore> {
    let path = path.as_ref();
    let f = File::open(path)?;
    let index = parse_index(BufReader::new(f), format)?;
    tracing::info!(path = %path.display(), terms = index.num_terms(), "index loaded");
    Ok(index)
}

pub fn save_index(paths: &IndexPaths, index: &IndexStore) -> Result<()> {
    create_dir_all(&paths.root)?;
    let f = File::create(paths.index())?;
    write_index(BufWriter::new(f), index)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

/// Read `meta.json` from an explicit path (it need not sit in an index directory).
pub fn load_meta<P: AsRef<Path>>(path: P) -> Result<MetaFile> {
    let mut f = File::open(path)?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Ordinal document id -> external id supplied with the source document.
pub fn save_doc_ids(paths: &IndexPaths, map: &BTreeMap<DocId, String>) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.doc_ids())?;
    let json = serde_json::to_string_pretty(map)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Posting;
    use std::collections::HashMap;

    #[test]
    fn meta_and_index_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("idx"));

        let mut map = HashMap::new();
        map.insert("cat".to_string(), vec![Posting::new("00000001", 2)]);
        let index = IndexStore::from_postings(map).unwrap();
        save_index(&paths, &index).unwrap();
        let meta = MetaFile { num_docs: 3, num_terms: 1, created_at: "2024-01-01T00:00:00Z".into(), version: META_VERSION };
        save_meta(&paths, &meta).unwrap();

        let loaded = load_index(paths.index(), PostingFormat::WithFrequency).unwrap();
        assert_eq!(loaded.lookup("cat"), index.lookup("cat"));
        assert_eq!(load_meta(paths.meta()).unwrap(), meta);
    }

    #[test]
    fn missing_meta_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_meta(dir.path().join("meta.json")).unwrap_err();
        assert!(matches!(err, crate::EngineError::Io(_)));
    }
}
