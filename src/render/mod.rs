//! Report writers.
//!
//! - [`html`]: the element report (`visualization.html`) with one document
//!   page per justification under `docs/`.
//! - [`text`]: a tab-separated dump of the same elements.
//! - [`clusters`]: one element report per multi-member cluster.
//! - [`page`]: templates and the shared stylesheet.

pub mod clusters;
pub mod html;
pub mod page;
pub mod text;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::corpus::{Corpus, Document};
use crate::documents::{render_single_justification_document, title_sentence};
use crate::elements::Justification;
use crate::error::{CorpusError, RenderError};

pub use html::HtmlWriter;
pub use text::PrettyPrinter;

/// Result type for rendering.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Subdirectory of the output directory holding document pages.
pub const DOCS_DIR: &str = "docs";

/// File name of the page for one justification.
pub fn document_page_name(document_id: &str, justification: &Justification) -> String {
    format!(
        "{document_id}_{}-{}.html",
        justification.span_start, justification.span_end
    )
}

/// Create `out_dir` and its `docs/` subdirectory.
///
/// Fails if `out_dir` exists and is not a directory.
pub fn prepare_output_dir(out_dir: &Path) -> RenderResult<PathBuf> {
    if out_dir.exists() && !out_dir.is_dir() {
        return Err(RenderError::NotADirectory {
            path: out_dir.display().to_string(),
        });
    }
    let docs = out_dir.join(DOCS_DIR);
    std::fs::create_dir_all(&docs).map_err(|e| RenderError::Write {
        path: docs.display().to_string(),
        source: e,
    })?;
    Ok(docs)
}

pub(crate) fn write_file(path: &Path, contents: &str) -> RenderResult<()> {
    std::fs::write(path, contents).map_err(|e| RenderError::Write {
        path: path.display().to_string(),
        source: e,
    })
}

/// Write `style.css` into `out_dir`.
pub fn write_style(out_dir: &Path) -> RenderResult<()> {
    write_file(&out_dir.join("style.css"), page::STYLE)
}

/// Write the document page for `justification` into `docs_dir`.
pub fn write_document_page(
    docs_dir: &Path,
    document: &Document,
    justification: &Justification,
) -> RenderResult<PathBuf> {
    let body = render_single_justification_document(document, justification)?;
    let title = title_sentence(&document.fulltext).unwrap_or_default();
    let html = page::document_page(&title, &body, &justification.span_key());

    let path = docs_dir.join(document_page_name(&document.parent_id, justification));
    write_file(&path, &html)?;
    Ok(path)
}

/// Documents fetched from a corpus, kept for the lifetime of one report.
pub struct DocumentCache<'c> {
    corpus: &'c Corpus,
    documents: HashMap<String, Document>,
}

impl<'c> DocumentCache<'c> {
    pub fn new(corpus: &'c Corpus) -> Self {
        Self {
            corpus,
            documents: HashMap::new(),
        }
    }

    pub fn corpus(&self) -> &'c Corpus {
        self.corpus
    }

    /// Fetch a document by parent id.
    pub fn get(&mut self, parent_id: &str) -> Result<&Document, CorpusError> {
        if !self.documents.contains_key(parent_id) {
            let document = self.corpus.get(parent_id)?;
            self.documents.insert(parent_id.to_string(), document);
        }
        self.documents
            .get(parent_id)
            .ok_or_else(|| CorpusError::DocumentNotFound {
                id: parent_id.to_string(),
            })
    }

    /// The document a justification points into.
    ///
    /// Logs a warning and returns `None` when it cannot be resolved or is
    /// missing from the corpus.
    pub fn for_justification(&mut self, justification: &Justification) -> Option<&Document> {
        let Some(id) = self.corpus.resolve_document_id(justification) else {
            tracing::warn!(
                justification = %justification.id,
                source = justification.child_id.as_deref().unwrap_or(""),
                "cannot resolve source document"
            );
            return None;
        };
        let id = id.to_string();
        match self.get(&id) {
            Ok(document) => Some(document),
            Err(err) => {
                tracing::warn!(justification = %justification.id, error = %err, "skipping justification");
                None
            }
        }
    }
}
