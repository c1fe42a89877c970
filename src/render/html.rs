//! The element report.
//!
//! `visualization.html` lists every element grouped by type. Each element
//! shows its justifications as links to per-justification document pages,
//! its statements (type first), and its names, handles, prototypes, members
//! and clusters.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::aif::{Node, local_name};
use crate::corpus::Corpus;
use crate::documents::mention_text;
use crate::elements::{Element, ElementSet, Justification, Statement};
use crate::error::RenderError;

use super::{
    DOCS_DIR, DocumentCache, RenderResult, document_page_name, page, prepare_output_dir,
    write_document_page, write_file, write_style,
};

/// Default report file name.
pub const DEFAULT_FILE_NAME: &str = "visualization.html";

/// Writes an [`ElementSet`] as an HTML report.
pub struct HtmlWriter<'a> {
    elements: &'a ElementSet,
    documents: DocumentCache<'a>,
}

impl<'a> HtmlWriter<'a> {
    pub fn new(corpus: &'a Corpus, elements: &'a ElementSet) -> Self {
        Self {
            elements,
            documents: DocumentCache::new(corpus),
        }
    }

    /// Write document pages, the report `file_name` and `style.css` into
    /// `out_dir`. Returns the report path.
    pub fn write_to_dir(&mut self, out_dir: &Path, file_name: &str) -> RenderResult<PathBuf> {
        let docs_dir = prepare_output_dir(out_dir)?;
        let pages = self.write_document_pages(&docs_dir)?;

        let report = out_dir.join(file_name);
        write_file(&report, &self.render_page())?;
        write_style(out_dir)?;

        tracing::info!(
            report = %report.display(),
            elements = self.elements.len(),
            document_pages = pages,
            "wrote element report"
        );
        Ok(report)
    }

    /// Write one page per distinct renderable justification. Returns the count.
    fn write_document_pages(&mut self, docs_dir: &Path) -> RenderResult<usize> {
        let elements = self.elements;
        let justifications: Vec<&Justification> = elements
            .iter()
            .flat_map(Element::all_justifications)
            .filter(|j| j.is_renderable())
            .collect();

        let pb = crate::progress::bar(justifications.len() as u64, "Documents");
        let mut written = HashSet::new();
        for justification in justifications {
            pb.inc(1);
            let Some(document) = self.documents.for_justification(justification) else {
                continue;
            };
            let name = document_page_name(&document.parent_id, justification);
            if written.contains(&name) {
                continue;
            }
            match write_document_page(docs_dir, document, justification) {
                Ok(_) => {
                    written.insert(name);
                }
                Err(RenderError::SpanOutOfRange { document, span }) => {
                    tracing::warn!(%document, %span, "justification outside document text");
                }
                Err(err) => return Err(err),
            }
        }
        pb.finish_and_clear();
        Ok(written.len())
    }

    /// The complete report page.
    pub fn render_page(&mut self) -> String {
        let mut html = page::report_header("AIF visualization");
        html.push('\n');
        let elements = self.elements;
        for (type_name, members) in elements.grouped_by_type() {
            html.push_str(&format!("<h1>{}</h1>\n", html_escape::encode_text(type_name)));
            for element in members {
                html.push_str(&self.render_element(element));
                html.push('\n');
            }
        }
        html.push_str(page::REPORT_FOOTER);
        html
    }

    /// HTML block for one element.
    pub fn render_element(&mut self, element: &Element) -> String {
        let mut lines = vec!["<div>".to_string()];

        let justifications = self.render_justifications(element.all_justifications());
        lines.push(format!(
            "<u><span id=\"{}\">{} ({})</span></u>: {justifications}",
            html_escape::encode_double_quoted_attribute(&element.id.to_string()),
            html_escape::encode_text(element.id.local_name()),
            html_escape::encode_text(element.type_name()),
        ));

        if !element.statements.is_empty() {
            lines.push(self.render_statements(&element.statements));
        }

        let mut details = Vec::new();
        if !element.names.is_empty() {
            details.push(format!("<li>names: {}</li>", escape_join(&element.names)));
        }
        if !element.handles.is_empty() {
            details.push(format!("<li>handles: {}</li>", escape_join(&element.handles)));
        }
        for (label, nodes) in [
            ("prototypes", &element.prototypes),
            ("members", &element.members),
            ("clusters", &element.clusters),
        ] {
            if !nodes.is_empty() {
                let links: Vec<String> = nodes.iter().map(|n| self.anchor_link(n)).collect();
                details.push(format!("<li>{label}: {}</li>", links.join(", ")));
            }
        }
        if !details.is_empty() {
            lines.push("<ul>".to_string());
            lines.extend(details);
            lines.push("</ul>".to_string());
        }

        lines.push("</div><br>".to_string());
        lines.join("\n")
    }

    /// Statement list: the type statement first, then the rest with role
    /// names stripped of the event or relation type prefix.
    pub fn render_statements(&mut self, statements: &[Statement]) -> String {
        let mut lines = vec!["<div>".to_string(), "<ul>".to_string()];

        let type_statement = statements.iter().find(|s| s.is_type_statement());
        let type_prefix = type_statement
            .and_then(|s| s.object.as_ref())
            .map(|o| o.local_name().to_string());

        if let Some(statement) = type_statement {
            lines.push(format!("<li>{}</li>", self.render_statement(statement, None)));
        }
        for statement in statements.iter().filter(|s| !s.is_type_statement()) {
            lines.push(format!(
                "<li>{}</li>",
                self.render_statement(statement, type_prefix.as_deref())
            ));
        }

        lines.push("</ul>".to_string());
        lines.push("</div>".to_string());
        lines.join("\n")
    }

    fn render_statement(&mut self, statement: &Statement, type_prefix: Option<&str>) -> String {
        let predicate = statement
            .predicate
            .as_ref()
            .map(|p| local_name(p.as_str()))
            .unwrap_or_default();
        let role = strip_type_prefix(predicate, type_prefix);
        let object = statement
            .object
            .as_ref()
            .map(|o| self.anchor_link(o))
            .unwrap_or_default();
        format!(
            "{}: {object} (Justified by {})",
            html_escape::encode_text(role),
            self.render_justifications(&statement.justified_by)
        )
    }

    /// Comma-separated justification links, each rendered once, sorted.
    pub fn render_justifications<'j, I>(&mut self, justifications: I) -> String
    where
        I: IntoIterator<Item = &'j Justification>,
    {
        let mut links = BTreeSet::new();
        for justification in justifications {
            if !justification.is_renderable() {
                continue;
            }
            let Some(document) = self.documents.for_justification(justification) else {
                continue;
            };
            let Some(mention) = mention_text(document, justification) else {
                continue;
            };
            links.insert(format!(
                "<a href=\"{DOCS_DIR}/{}\">\"{}\" [{}:{}]</a>",
                html_escape::encode_double_quoted_attribute(&document_page_name(
                    &document.parent_id,
                    justification
                )),
                html_escape::encode_text(mention),
                justification.span_start,
                justification.span_end,
            ));
        }
        links.into_iter().collect::<Vec<_>>().join(", ")
    }

    /// A link to `node` if it is in the report, else its short name.
    pub fn anchor_link(&self, node: &Node) -> String {
        let name = html_escape::encode_text(node.local_name()).into_owned();
        if self.elements.contains(node) {
            format!(
                "<a href=\"#{}\">{name}</a>",
                html_escape::encode_double_quoted_attribute(&node.to_string())
            )
        } else {
            name
        }
    }
}

/// `Conflict.Attack_Place` with prefix `Conflict.Attack` becomes `Place`.
pub fn strip_type_prefix<'p>(predicate: &'p str, type_prefix: Option<&str>) -> &'p str {
    match type_prefix.and_then(|prefix| predicate.strip_prefix(prefix)) {
        Some(rest) if !rest.is_empty() => rest.trim_start_matches('_'),
        _ => predicate,
    }
}

fn escape_join(values: &[String]) -> String {
    values
        .iter()
        .map(|v| html_escape::encode_text(v).into_owned())
        .collect::<Vec<_>>()
        .join(", ")
}
