//! Tab-separated element dump (`pretty-print.txt`).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::aif::{Node, local_name};
use crate::corpus::Corpus;
use crate::documents::mention_text;
use crate::elements::{Element, ElementSet, Justification, Statement};
use crate::error::RenderError;

use super::html::strip_type_prefix;
use super::{DocumentCache, RenderResult};

/// Default dump file name.
pub const DEFAULT_FILE_NAME: &str = "pretty-print.txt";

const HEADER: [&str; 10] = [
    "element_type",
    "element_id",
    "statements",
    "justifications",
    "prototypes",
    "members",
    "clusters",
    "names",
    "handles",
    "justification_details",
];

/// Writes an [`ElementSet`] as one tab-separated row per element.
pub struct PrettyPrinter<'a> {
    elements: &'a ElementSet,
    documents: DocumentCache<'a>,
}

impl<'a> PrettyPrinter<'a> {
    pub fn new(corpus: &'a Corpus, elements: &'a ElementSet) -> Self {
        Self {
            elements,
            documents: DocumentCache::new(corpus),
        }
    }

    /// Write `file_name` into `out_dir`, creating the directory if needed.
    pub fn write_to_dir(&mut self, out_dir: &Path, file_name: &str) -> RenderResult<PathBuf> {
        if out_dir.exists() && !out_dir.is_dir() {
            return Err(RenderError::NotADirectory {
                path: out_dir.display().to_string(),
            });
        }
        std::fs::create_dir_all(out_dir).map_err(|e| write_error(out_dir, e))?;

        let path = out_dir.join(file_name);
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(&path)
            .map_err(|e| write_error(&path, e.into()))?;

        writer
            .write_record(HEADER)
            .map_err(|e| write_error(&path, e.into()))?;
        let elements = self.elements;
        let mut rows = 0;
        for (_, members) in elements.grouped_by_type() {
            for element in members {
                writer
                    .write_record(self.render_element(element))
                    .map_err(|e| write_error(&path, e.into()))?;
                rows += 1;
            }
        }
        writer.flush().map_err(|e| write_error(&path, e))?;

        tracing::info!(path = %path.display(), rows, "wrote pretty-print report");
        Ok(path)
    }

    /// The row for one element, in [`HEADER`] order.
    pub fn render_element(&mut self, element: &Element) -> [String; 10] {
        let statements = self.render_statements(&element.statements);
        let justifications = self.render_justifications(element.all_justifications());
        let details: Vec<String> = element.all_justifications().map(justification_detail).collect();

        [
            element.type_name().to_string(),
            element.id.to_string(),
            statements,
            justifications,
            node_list(&element.prototypes),
            node_list(&element.members),
            node_list(&element.clusters),
            list(&element.names),
            list(&element.handles),
            list(&details),
        ]
    }

    /// Statements joined by `;; `, the type statement first.
    pub fn render_statements(&mut self, statements: &[Statement]) -> String {
        let type_statement = statements.iter().find(|s| s.is_type_statement());
        let type_prefix = type_statement
            .and_then(|s| s.object.as_ref())
            .map(|o| o.local_name().to_string());

        let mut parts = Vec::new();
        if let Some(statement) = type_statement {
            parts.push(self.render_statement(statement, None));
        }
        for statement in statements.iter().filter(|s| !s.is_type_statement()) {
            parts.push(self.render_statement(statement, type_prefix.as_deref()));
        }
        parts.join(";; ")
    }

    fn render_statement(&mut self, statement: &Statement, type_prefix: Option<&str>) -> String {
        let predicate = statement
            .predicate
            .as_ref()
            .map(|p| local_name(p.as_str()))
            .unwrap_or_default();
        let object = statement
            .object
            .as_ref()
            .map(|o| self.anchor_text(o))
            .unwrap_or_default();
        format!(
            "{}: {object} (Justified by {})",
            strip_type_prefix(predicate, type_prefix),
            self.render_justifications(&statement.justified_by)
        )
    }

    /// Distinct mention texts, sorted, comma-separated.
    pub fn render_justifications<'j, I>(&mut self, justifications: I) -> String
    where
        I: IntoIterator<Item = &'j Justification>,
    {
        let mut mentions = BTreeSet::new();
        for justification in justifications {
            if !justification.is_renderable() {
                continue;
            }
            if let Some(mention) = self
                .documents
                .for_justification(justification)
                .and_then(|doc| mention_text(doc, justification))
            {
                mentions.insert(mention.to_string());
            }
        }
        mentions.into_iter().collect::<Vec<_>>().join(", ")
    }

    /// Full id and short name for elements in the dump, else the short name.
    fn anchor_text(&self, node: &Node) -> String {
        if self.elements.contains(node) {
            format!("{node} {}", node.local_name())
        } else {
            node.local_name().to_string()
        }
    }
}

fn justification_detail(justification: &Justification) -> String {
    let document = justification
        .parent_id
        .as_deref()
        .or(justification.child_id.as_deref())
        .unwrap_or("?");
    format!("{document} {}", justification.span_key())
}

fn node_list(nodes: &[Node]) -> String {
    let names: Vec<String> = nodes.iter().map(Node::to_string).collect();
    list(&names)
}

fn list(values: &[String]) -> String {
    format!("[{}]", values.join(", "))
}

fn write_error(path: &Path, source: std::io::Error) -> RenderError {
    RenderError::Write {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aif::parse_turtle;
    use crate::render::tests::corpus;

    const GRAPH: &str = r#"
@prefix aida: <http://example.org/aida#> .
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix ldc: <http://example.org/ldc#> .
@prefix ex: <http://example.org/data/> .

ex:E1 a aida:Entity ; aida:hasName "Kyiv" ; aida:justifiedBy ex:J1 .
ex:J1 a aida:TextJustification ; aida:source "C1" ;
    aida:startOffset 15 ; aida:endOffsetInclusive 18 .
ex:V1 a aida:Event .
ex:S1 rdf:subject ex:V1 ; rdf:predicate rdf:type ; rdf:object ldc:Conflict.Attack .
ex:S2 rdf:subject ex:V1 ; rdf:predicate ldc:Conflict.Attack_Place ; rdf:object ex:E1 ;
    aida:justifiedBy ex:J1 .
"#;

    #[test]
    fn writes_header_and_one_row_per_element() {
        let dir = tempfile::TempDir::new().unwrap();
        let corpus = corpus(dir.path());
        let graph = parse_turtle(GRAPH, "text-test", None).unwrap();
        let elements = ElementSet::from_graph(&graph).unwrap();

        let path = PrettyPrinter::new(&corpus, &elements)
            .write_to_dir(&dir.path().join("out"), DEFAULT_FILE_NAME)
            .unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_path(&path)
            .unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, HEADER);

        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "Entity");
        assert_eq!(&rows[0][3], "Kyiv");
        assert_eq!(&rows[0][7], "[Kyiv]");
        assert_eq!(&rows[0][9], "[C1 15:18]");

        assert_eq!(&rows[1][0], "Event");
        assert_eq!(
            &rows[1][2],
            "type: Conflict.Attack (Justified by );; \
             Place: http://example.org/data/E1 E1 (Justified by Kyiv)"
        );
    }
}
