//! Corpus build from extracted LDC source data.
//!
//! Expected layout under the LDC directory, optionally below a single
//! top-level directory or an explicit prefix:
//!
//! ```text
//! docs/parent_children.tab
//! data/ltf/**/<child_id>.ltf.xml
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::CorpusError;

use super::ltf::convert_ltf_to_raw_text;
use super::{CorpusResult, CorpusWriter, Document};

const PARENT_CHILDREN: &str = "docs/parent_children.tab";
const LTF_DIR: &str = "data/ltf";
const LTF_SUFFIX: &str = ".ltf.xml";

/// Parent and language of a child document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildInfo {
    pub parent_id: String,
    pub lang_id: String,
}

#[derive(Debug, Deserialize)]
struct ParentChildRow {
    child_uid: String,
    parent_uid: String,
    lang_id: String,
}

/// Build a corpus database at `write_to` from an extracted LDC directory.
///
/// Returns the number of documents written.
pub fn build_corpus(ldc_dir: &Path, write_to: &Path, prefix: Option<&Path>) -> CorpusResult<usize> {
    let documents = read_documents(ldc_dir, prefix)?;
    let mut writer = CorpusWriter::create(write_to)?;
    let count = writer.insert_documents(documents)?;
    tracing::info!(documents = count, path = %write_to.display(), "corpus database written");
    Ok(count)
}

/// Read and convert every LTF document of an extracted LDC directory.
pub fn read_documents(ldc_dir: &Path, prefix: Option<&Path>) -> CorpusResult<Vec<Document>> {
    let root = locate_root(ldc_dir, prefix)?;
    tracing::info!(root = %root.display(), "reading LTF documents");

    let children = read_parent_children(&root.join(PARENT_CHILDREN))?;
    let files = ltf_files(&root.join(LTF_DIR))?;

    let pb = crate::progress::bar(files.len() as u64, "Extracting");
    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        let child_id = child_id_of(&path);
        pb.set_message(child_id.clone());
        let info = children
            .get(&child_id)
            .ok_or_else(|| CorpusError::UnknownChild {
                child_id: child_id.clone(),
            })?;
        let xml = std::fs::read_to_string(&path).map_err(|e| CorpusError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let fulltext = convert_ltf_to_raw_text(&xml)?;
        documents.push(Document {
            parent_id: info.parent_id.clone(),
            child_id,
            lang_id: info.lang_id.clone(),
            fulltext,
        });
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(documents)
}

/// The directory holding `docs/` and `data/`.
///
/// With no prefix, the LDC directory itself is used if it has the tab file,
/// else its single top-level subdirectory.
pub fn locate_root(ldc_dir: &Path, prefix: Option<&Path>) -> CorpusResult<PathBuf> {
    if !ldc_dir.is_dir() {
        return Err(CorpusError::Layout {
            expected: format!("a directory at {}", ldc_dir.display()),
        });
    }

    let root = match prefix {
        Some(prefix) => ldc_dir.join(prefix),
        None if ldc_dir.join(PARENT_CHILDREN).is_file() => ldc_dir.to_path_buf(),
        None => single_subdirectory(ldc_dir)?.unwrap_or_else(|| ldc_dir.to_path_buf()),
    };

    if !root.join(PARENT_CHILDREN).is_file() {
        return Err(CorpusError::Layout {
            expected: format!("{PARENT_CHILDREN} (looked in {})", root.display()),
        });
    }
    Ok(root)
}

fn single_subdirectory(dir: &Path) -> CorpusResult<Option<PathBuf>> {
    let io_err = |e| CorpusError::Io {
        path: dir.display().to_string(),
        source: e,
    };
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        entries.push(entry.path());
    }
    match entries.as_slice() {
        [only] if only.is_dir() => Ok(Some(only.clone())),
        _ => Ok(None),
    }
}

/// Read `parent_children.tab` into child id → (parent, language).
pub fn read_parent_children(path: &Path) -> CorpusResult<HashMap<String, ChildInfo>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| CorpusError::TabFile {
            message: format!("{}: {e}", path.display()),
        })?;

    let mut children = HashMap::new();
    for row in reader.deserialize::<ParentChildRow>() {
        let row = row.map_err(|e| CorpusError::TabFile {
            message: e.to_string(),
        })?;
        children.insert(
            row.child_uid,
            ChildInfo {
                parent_id: row.parent_uid,
                lang_id: row.lang_id,
            },
        );
    }
    tracing::debug!(children = children.len(), "read parent_children.tab");
    Ok(children)
}

fn ltf_files(dir: &Path) -> CorpusResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CorpusError::Layout {
            expected: format!("{LTF_DIR}/ (looked for {})", dir.display()),
        });
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| CorpusError::Io {
            path: dir.display().to_string(),
            source: e.into(),
        })?;
        if entry.file_type().is_file()
            && entry.file_name().to_string_lossy().ends_with(LTF_SUFFIX)
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// File name up to the first `.`.
fn child_id_of(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::corpus::ltf::tests::ltf_document;

    const TAB: &str = "catalog_id\tversion\tparent_uid\tchild_uid\turl\tchild_asset_type\ttopic\tlang_id\tlang_manual\tlang_id_method\n\
LDC2019E42\tV1.0\tIC0011UQQ\tHC000Q7NP\tn/a\t.ltf.xml\tR103\teng\tn/a\tn/a\n\
LDC2019E42\tV1.0\tIC0011UQR\tHC000Q7NQ\tn/a\t.ltf.xml\tR103\trus\tn/a\tn/a\n";

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn ldc_tree(root: &Path) {
        write(&root.join(PARENT_CHILDREN), TAB);
        write(
            &root.join("data/ltf/HC000Q7NP.ltf.xml"),
            &ltf_document("HC000Q7NP", &[(0, "Kyiv is a city.")], "Kyiv is a city.\n"),
        );
        write(
            &root.join("data/ltf/nested/HC000Q7NQ.ltf.xml"),
            &ltf_document("HC000Q7NQ", &[(0, "Привет.")], "Привет.\n"),
        );
        write(&root.join("data/ltf/README.txt"), "ignored");
    }

    #[test]
    fn builds_from_single_top_level_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        ldc_tree(&dir.path().join("LDC2019E42_AIDA_Phase_1"));
        let db = dir.path().join("out/corpus.sqlite");

        assert_eq!(build_corpus(dir.path(), &db, None).unwrap(), 2);

        let corpus = Corpus::open(&db).unwrap();
        let doc = corpus.get("IC0011UQQ").unwrap();
        assert_eq!(doc.child_id, "HC000Q7NP");
        assert_eq!(doc.lang_id, "eng");
        assert_eq!(doc.fulltext, "Kyiv is a city.\n");
        assert_eq!(corpus.get("IC0011UQR").unwrap().lang_id, "rus");
    }

    #[test]
    fn explicit_prefix_is_honored() {
        let dir = tempfile::TempDir::new().unwrap();
        ldc_tree(&dir.path().join("a/b"));
        std::fs::create_dir_all(dir.path().join("other")).unwrap();

        assert!(matches!(
            locate_root(dir.path(), None),
            Err(CorpusError::Layout { .. })
        ));
        let root = locate_root(dir.path(), Some(Path::new("a/b"))).unwrap();
        assert_eq!(root, dir.path().join("a/b"));
    }

    #[test]
    fn unknown_child_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        ldc_tree(dir.path());
        write(
            &dir.path().join("data/ltf/HC999.ltf.xml"),
            &ltf_document("HC999", &[(0, "x")], "x\n"),
        );
        assert!(matches!(
            read_documents(dir.path(), None),
            Err(CorpusError::UnknownChild { child_id }) if child_id == "HC999"
        ));
    }

    #[test]
    fn child_id_stops_at_first_dot() {
        assert_eq!(child_id_of(Path::new("/x/HC000Q7NP.ltf.xml")), "HC000Q7NP");
    }
}
