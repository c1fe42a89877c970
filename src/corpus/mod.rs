//! Corpus database: source-document text keyed by LDC document ids.
//!
//! A single SQLite table maps each parent document to its child document,
//! language and full text. The visualizer opens it read-only; `build-corpus`
//! creates it from extracted LDC source data ([`ldc`]).

pub mod ldc;
pub mod ltf;

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};

use crate::elements::Justification;
use crate::error::CorpusError;

/// Result type for corpus operations.
pub type CorpusResult<T> = std::result::Result<T, CorpusError>;

const CORPUS_SCHEMA: &str = "
    CREATE TABLE documents (
        parent_id text PRIMARY KEY,
        child_id text NOT NULL,
        lang_id text NOT NULL,
        fulltext text NOT NULL
    );
";

/// One source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub parent_id: String,
    pub child_id: String,
    pub lang_id: String,
    pub fulltext: String,
}

impl Document {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            parent_id: row.get("parent_id")?,
            child_id: row.get("child_id")?,
            lang_id: row.get("lang_id")?,
            fulltext: row.get("fulltext")?,
        })
    }
}

/// Read-only handle on a corpus database.
pub struct Corpus {
    conn: Connection,
    child_to_parent: HashMap<String, String>,
}

impl Corpus {
    /// Open an existing corpus database.
    pub fn open(path: &Path) -> CorpusResult<Self> {
        if !path.is_file() {
            return Err(CorpusError::Missing {
                path: path.display().to_string(),
            });
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> CorpusResult<Self> {
        let child_to_parent = {
            let mut stmt = conn.prepare("SELECT parent_id, child_id FROM documents")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>("child_id")?, row.get::<_, String>("parent_id")?))
            })?;
            rows.collect::<rusqlite::Result<HashMap<_, _>>>()?
        };
        tracing::debug!(documents = child_to_parent.len(), "opened corpus");
        Ok(Self {
            conn,
            child_to_parent,
        })
    }

    /// Fetch a document by parent id.
    pub fn get(&self, parent_id: &str) -> CorpusResult<Document> {
        self.conn
            .query_row(
                "SELECT parent_id, child_id, lang_id, fulltext FROM documents WHERE parent_id = ?1",
                params![parent_id],
                Document::from_row,
            )
            .optional()?
            .ok_or_else(|| CorpusError::DocumentNotFound {
                id: parent_id.to_string(),
            })
    }

    /// Child document id → parent document id.
    pub fn parent_child_map(&self) -> &HashMap<String, String> {
        &self.child_to_parent
    }

    /// The parent document a justification points into: its `sourceDocument`,
    /// else the parent of its `source`.
    pub fn resolve_document_id<'a>(&'a self, justification: &'a Justification) -> Option<&'a str> {
        justification.parent_id.as_deref().or_else(|| {
            justification
                .child_id
                .as_deref()
                .and_then(|child| self.child_to_parent.get(child))
                .map(String::as_str)
        })
    }

    pub fn len(&self) -> usize {
        self.child_to_parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.child_to_parent.is_empty()
    }
}

impl std::fmt::Debug for Corpus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Corpus").field("documents", &self.len()).finish()
    }
}

/// Creates and fills a corpus database.
pub struct CorpusWriter {
    conn: Connection,
}

impl CorpusWriter {
    /// Open `path` (creating it if needed) and reset its `documents` table.
    pub fn create(path: &Path) -> CorpusResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CorpusError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("DROP TABLE IF EXISTS documents;")?;
        conn.execute_batch(CORPUS_SCHEMA)?;
        tracing::info!(path = %path.display(), "initialized corpus database");
        Ok(Self { conn })
    }

    /// Insert documents in a single transaction. Returns the number inserted.
    pub fn insert_documents<I>(&mut self, documents: I) -> CorpusResult<usize>
    where
        I: IntoIterator<Item = Document>,
    {
        let tx = self.conn.transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO documents (parent_id, child_id, lang_id, fulltext) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for doc in documents {
                stmt.execute(params![doc.parent_id, doc.child_id, doc.lang_id, doc.fulltext])?;
                count += 1;
            }
        }
        tx.commit()?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aif::Node;

    fn doc(parent: &str, child: &str, text: &str) -> Document {
        Document {
            parent_id: parent.into(),
            child_id: child.into(),
            lang_id: "eng".into(),
            fulltext: text.into(),
        }
    }

    fn corpus_in(dir: &Path) -> Corpus {
        let path = dir.join("corpus.sqlite");
        let mut writer = CorpusWriter::create(&path).unwrap();
        writer
            .insert_documents(vec![doc("P1", "C1", "First text."), doc("P2", "C2", "Second.")])
            .unwrap();
        drop(writer);
        Corpus::open(&path).unwrap()
    }

    #[test]
    fn get_and_map() {
        let dir = tempfile::TempDir::new().unwrap();
        let corpus = corpus_in(dir.path());
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get("P2").unwrap().fulltext, "Second.");
        assert_eq!(corpus.parent_child_map().get("C1").map(String::as_str), Some("P1"));
        assert!(matches!(
            corpus.get("P9"),
            Err(CorpusError::DocumentNotFound { .. })
        ));
    }

    #[test]
    fn ids_with_quotes_are_parameterized() {
        let dir = tempfile::TempDir::new().unwrap();
        let corpus = corpus_in(dir.path());
        assert!(matches!(
            corpus.get("P1\" OR \"1\"=\"1"),
            Err(CorpusError::DocumentNotFound { .. })
        ));
    }

    #[test]
    fn resolve_prefers_source_document() {
        let dir = tempfile::TempDir::new().unwrap();
        let corpus = corpus_in(dir.path());
        let mut j = Justification {
            id: Node::Blank("j".into()),
            parent_id: None,
            child_id: Some("C2".into()),
            span_start: 0,
            span_end: 1,
        };
        assert_eq!(corpus.resolve_document_id(&j), Some("P2"));
        j.parent_id = Some("P1".into());
        assert_eq!(corpus.resolve_document_id(&j), Some("P1"));
        j.parent_id = None;
        j.child_id = Some("unknown".into());
        assert_eq!(corpus.resolve_document_id(&j), None);
    }

    #[test]
    fn create_resets_existing_table() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("corpus.sqlite");
        CorpusWriter::create(&path)
            .unwrap()
            .insert_documents(vec![doc("P1", "C1", "old")])
            .unwrap();
        CorpusWriter::create(&path)
            .unwrap()
            .insert_documents(vec![doc("P3", "C3", "new")])
            .unwrap();
        let corpus = Corpus::open(&path).unwrap();
        assert_eq!(corpus.len(), 1);
        assert!(corpus.get("P1").is_err());
    }

    #[test]
    fn missing_database_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Corpus::open(&dir.path().join("nope.sqlite")).unwrap_err();
        assert!(matches!(err, CorpusError::Missing { .. }));
    }
}
