//! Render pipeline: one AIF file plus a corpus database to an HTML report.
//!
//! Used by the `render` command and by the in-process batch launcher. Report
//! files are named after the input stem so that jobs sharing one output
//! directory do not overwrite each other.

use std::path::{Path, PathBuf};

use crate::aif;
use crate::config::VizConfig;
use crate::corpus::Corpus;
use crate::elements::ElementSet;
use crate::error::VizResult;
use crate::hypothesis::{Hypothesis, output_file_name};
use crate::render::{HtmlWriter, PrettyPrinter, text};

/// Everything one render job needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub aif_file: PathBuf,
    pub database: PathBuf,
    pub out_dir: PathBuf,
    /// Hypothesis view only: list every field of each argument.
    pub verbose: bool,
    /// Render the hypothesis view instead of the element report.
    pub by_clusters: bool,
    /// Also write the tab-separated element dump.
    pub pretty_print: bool,
}

impl RenderRequest {
    pub fn new(aif_file: impl Into<PathBuf>, database: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            aif_file: aif_file.into(),
            database: database.into(),
            out_dir: out_dir.into(),
            verbose: false,
            by_clusters: false,
            pretty_print: false,
        }
    }

    /// Path of the HTML report this request produces.
    pub fn report_path(&self) -> PathBuf {
        self.out_dir
            .join(output_file_name(&self.aif_file, self.by_clusters && self.verbose))
    }
}

/// Name of the tab-separated dump for `aif_file`.
pub fn pretty_print_file_name(aif_file: &Path) -> String {
    match aif_file.file_stem() {
        Some(stem) => format!("{}_{}", stem.to_string_lossy(), text::DEFAULT_FILE_NAME),
        None => text::DEFAULT_FILE_NAME.to_string(),
    }
}

/// Load, render and write. Returns the path of the HTML report.
pub fn render(request: &RenderRequest, config: &VizConfig) -> VizResult<PathBuf> {
    tracing::info!(
        aif = %request.aif_file.display(),
        database = %request.database.display(),
        out_dir = %request.out_dir.display(),
        by_clusters = request.by_clusters,
        "rendering"
    );
    let graph = aif::load(&request.aif_file, config.render.aida_namespace.as_deref())?;
    tracing::debug!(triples = graph.len(), "loaded AIF graph");
    let corpus = Corpus::open(&request.database)?;

    let report = request.report_path();
    if request.by_clusters {
        let hypothesis = Hypothesis::from_graph(&graph)?;
        hypothesis.visualize(&request.out_dir, &report, &corpus, request.verbose)?;
        return Ok(report);
    }

    let elements = ElementSet::from_graph(&graph)?;
    let file_name = report
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::render::html::DEFAULT_FILE_NAME.to_string());
    let written = HtmlWriter::new(&corpus, &elements).write_to_dir(&request.out_dir, &file_name)?;
    if request.pretty_print {
        PrettyPrinter::new(&corpus, &elements)
            .write_to_dir(&request.out_dir, &pretty_print_file_name(&request.aif_file))?;
    }
    Ok(written)
}
