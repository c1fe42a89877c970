//! Rich diagnostic error types for aida-viz.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::paths::PathError;

/// Top-level error type for aida-viz.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum VizError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Aif(#[from] AifError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Corpus(#[from] CorpusError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Hypothesis(#[from] HypothesisError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),
}

pub type VizResult<T> = std::result::Result<T, VizError>;

// ---------------------------------------------------------------------------
// AIF graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum AifError {
    #[error("failed to read AIF file: {path}")]
    #[diagnostic(
        code(aida_viz::aif::io),
        help("Check that the file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse Turtle in {origin}: {message}")]
    #[diagnostic(
        code(aida_viz::aif::parse),
        help(
            "The input must be an AIF graph serialized as Turtle (.ttl). \
             Validate the file with an RDF tool and check the prefix declarations."
        )
    )]
    Parse { origin: String, message: String },

    #[error("oxigraph store error: {message}")]
    #[diagnostic(
        code(aida_viz::aif::store),
        help("The in-memory RDF store could not be created or iterated.")
    )]
    Store { message: String },

    #[error("{subject} has {count} distinct values for <{predicate}>, expected at most one")]
    #[diagnostic(
        code(aida_viz::aif::not_unique),
        help(
            "AIF allows only one value for this property. \
             The graph is probably malformed or was merged from several sources."
        )
    )]
    NotUnique {
        subject: String,
        predicate: String,
        count: usize,
    },

    #[error("invalid offset literal \"{value}\" on {node}")]
    #[diagnostic(
        code(aida_viz::aif::bad_offset),
        help("Justification offsets must be non-negative integers.")
    )]
    BadOffset { node: String, value: String },
}

// ---------------------------------------------------------------------------
// Corpus errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CorpusError {
    #[error("corpus database not found: {path}")]
    #[diagnostic(
        code(aida_viz::corpus::missing),
        help("Build one first with `aida-viz build-corpus --ldc-dir <dir> --write-to <file>`.")
    )]
    Missing { path: String },

    #[error("SQLite error: {source}")]
    #[diagnostic(
        code(aida_viz::corpus::sqlite),
        help(
            "The corpus database could not be queried. Check that the file is a corpus \
             built by `aida-viz build-corpus` and is not corrupted."
        )
    )]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    #[error("document not found in corpus: \"{id}\"")]
    #[diagnostic(
        code(aida_viz::corpus::not_found),
        help(
            "The AIF file references a document that is not in the corpus database. \
             Make sure the corpus was built from the same LDC release as the AIF file."
        )
    )]
    DocumentNotFound { id: String },

    #[error("I/O error reading {path}")]
    #[diagnostic(
        code(aida_viz::corpus::io),
        help("Check that the LDC directory exists and has correct permissions.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("LDC directory lacks {expected}")]
    #[diagnostic(
        code(aida_viz::corpus::layout),
        help(
            "Point --ldc-dir at the extracted LDC source data. It must contain \
             docs/parent_children.tab and data/ltf/ (optionally under a single top-level \
             directory, or under the directory given with --prefix). Zipped .ltf files \
             must be extracted first."
        )
    )]
    Layout { expected: String },

    #[error("malformed parent_children.tab: {message}")]
    #[diagnostic(
        code(aida_viz::corpus::tab),
        help("The tab file must have child_uid, parent_uid and lang_id columns.")
    )]
    TabFile { message: String },

    #[error("child document \"{child_id}\" is not listed in parent_children.tab")]
    #[diagnostic(
        code(aida_viz::corpus::unknown_child),
        help("The LTF file does not belong to this corpus release.")
    )]
    UnknownChild { child_id: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ltf(#[from] LtfError),
}

#[derive(Debug, Error, Diagnostic)]
pub enum LtfError {
    #[error("DOC tag malformed: {line}")]
    #[diagnostic(
        code(aida_viz::ltf::malformed_doc),
        help("The <DOC> line must carry raw_text_char_length and raw_text_md5 attributes.")
    )]
    MalformedDoc { line: String },

    #[error("checksum mismatch in LTF conversion: expecting {expected}, got {actual}")]
    #[diagnostic(
        code(aida_viz::ltf::checksum),
        help(
            "The reconstructed source text does not match the checksum recorded in the \
             LTF file. The file may be truncated or use an unsupported LTF variant."
        )
    )]
    ChecksumMismatch { expected: String, actual: String },
}

// ---------------------------------------------------------------------------
// Render errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("output path {path} exists and is not a directory")]
    #[diagnostic(
        code(aida_viz::render::not_a_directory),
        help("Pass a directory (new or existing) to --out.")
    )]
    NotADirectory { path: String },

    #[error("failed to write {path}")]
    #[diagnostic(
        code(aida_viz::render::write),
        help("Ensure you have write permissions to the output directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("justification {span} lies outside document \"{document}\"")]
    #[diagnostic(
        code(aida_viz::render::span),
        help(
            "The justification offsets do not fit the document text. The corpus may have \
             been built from a different LDC release than the AIF file."
        )
    )]
    SpanOutOfRange { document: String, span: String },

    #[error("nothing to render for document \"{document}\"")]
    #[diagnostic(code(aida_viz::render::empty), help("The source document text is empty."))]
    Empty { document: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Corpus(#[from] CorpusError),
}

// ---------------------------------------------------------------------------
// Hypothesis errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum HypothesisError {
    #[error("cluster {cluster} has {count} prototype types, expected exactly one")]
    #[diagnostic(
        code(aida_viz::hypothesis::cluster_type),
        help(
            "Each cluster prototype must carry exactly one rdf:type statement. \
             Render without --by-clusters to inspect the raw elements."
        )
    )]
    ClusterType { cluster: String, count: usize },

    #[error("cluster {cluster} has no prototype")]
    #[diagnostic(
        code(aida_viz::hypothesis::no_prototype),
        help("Every aida:SameAsCluster must have an aida:prototype.")
    )]
    NoPrototype { cluster: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Aif(#[from] AifError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),
}

// ---------------------------------------------------------------------------
// Batch errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum BatchError {
    #[error("cannot read manifest {path}")]
    #[diagnostic(
        code(aida_viz::batch::manifest),
        help("The manifest is a text file with one Turtle file path per line.")
    )]
    Manifest {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read line {line_number} of manifest {path}")]
    #[diagnostic(
        code(aida_viz::batch::manifest_line),
        help("Manifest lines must be UTF-8 file paths.")
    )]
    ManifestLine {
        path: String,
        line_number: usize,
        /// The line as far as it could be decoded.
        line: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corpus database not found: {path}")]
    #[diagnostic(
        code(aida_viz::batch::database),
        help("Build one first with `aida-viz build-corpus`.")
    )]
    DatabaseNotFound { path: String },

    #[error("cannot create output directory {path}")]
    #[diagnostic(
        code(aida_viz::batch::output_dir),
        help("Check the parent directory exists and is writable.")
    )]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch {launcher} job for {input}: {message}")]
    #[diagnostic(
        code(aida_viz::batch::launch),
        help(
            "The job could not be started. For the container launcher check that the \
             runtime is installed and the image exists; for the process launcher check \
             the executable path."
        )
    )]
    Launch {
        launcher: String,
        input: String,
        message: String,
    },
}

pub type BatchResult<T> = std::result::Result<T, BatchError>;
