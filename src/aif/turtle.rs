//! Turtle loading backed by oxigraph.
//!
//! The file is parsed into an in-memory oxigraph store, then every quad is
//! copied into an [`AifGraph`]. The `aida:` prefix declared by the file decides
//! which ontology namespace the vocabulary resolves against.

use std::path::Path;
use std::sync::LazyLock;

use oxigraph::io::RdfFormat;
use oxigraph::model::Term;
use oxigraph::store::Store;
use regex::Regex;

use crate::error::AifError;

use super::vocab::{DEFAULT_AIDA_NS, Vocabulary};
use super::{AifGraph, AifResult, Node};

static AIDA_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^\s*@?prefix\s+aida:\s*<([^>]*)>").expect("valid prefix regex")
});

/// Load an AIF graph from a Turtle file.
///
/// `namespace_override` is used when the file does not declare an `aida:` prefix.
pub fn load(path: &Path, namespace_override: Option<&str>) -> AifResult<AifGraph> {
    let text = std::fs::read_to_string(path).map_err(|e| AifError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_turtle(&text, &path.display().to_string(), namespace_override)
}

/// Parse Turtle text into an AIF graph. `origin` names the source in errors.
pub fn parse_turtle(
    text: &str,
    origin: &str,
    namespace_override: Option<&str>,
) -> AifResult<AifGraph> {
    let aida_ns = declared_aida_namespace(text)
        .or(namespace_override)
        .unwrap_or(DEFAULT_AIDA_NS);

    let store = Store::new().map_err(|e| AifError::Store {
        message: format!("failed to create oxigraph store: {e}"),
    })?;
    store
        .load_from_reader(RdfFormat::Turtle, text.as_bytes())
        .map_err(|e| AifError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;

    let mut graph = AifGraph::new(Vocabulary::new(aida_ns));
    for quad in store.iter() {
        let quad = quad.map_err(|e| AifError::Store {
            message: format!("quad iteration failed: {e}"),
        })?;
        let subject = node_from_term(Term::from(quad.subject));
        let object = node_from_term(quad.object);
        if let (Some(subject), Some(object)) = (subject, object) {
            graph.insert(subject, Node::Iri(quad.predicate.into_string()), object);
        }
    }

    tracing::debug!(
        origin,
        triples = graph.len(),
        namespace = aida_ns,
        "loaded AIF graph"
    );
    Ok(graph)
}

impl AifGraph {
    /// Load a Turtle file using the default namespace resolution.
    pub fn load(path: &Path) -> AifResult<Self> {
        load(path, None)
    }

    /// Parse Turtle text using the default namespace resolution.
    pub fn from_turtle(text: &str) -> AifResult<Self> {
        parse_turtle(text, "<inline>", None)
    }
}

/// The IRI bound to the `aida:` prefix, if the document declares one.
pub fn declared_aida_namespace(text: &str) -> Option<&str> {
    AIDA_PREFIX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn node_from_term(term: Term) -> Option<Node> {
    match term {
        Term::NamedNode(node) => Some(Node::Iri(node.into_string())),
        Term::BlankNode(node) => Some(Node::Blank(node.as_str().to_string())),
        Term::Literal(literal) => Some(Node::Literal {
            value: literal.value().to_string(),
            datatype: literal.datatype().as_str().to_string(),
        }),
        // Quoted triples never occur in AIF.
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aif::Vocab;

    const SAMPLE: &str = r#"
@prefix aida: <http://example.org/aida#> .
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix ex: <http://example.org/data/> .

ex:E1 a aida:Entity ;
    aida:hasName "Kyiv" ;
    aida:justifiedBy [
        a aida:TextJustification ;
        aida:source "HC0001" ;
        aida:startOffset 3 ;
        aida:endOffsetInclusive 6
    ] .
"#;

    #[test]
    fn parses_turtle_with_declared_namespace() {
        let graph = parse_turtle(SAMPLE, "sample", None).unwrap();
        assert_eq!(graph.vocab().aida_namespace(), "http://example.org/aida#");

        let entities = graph.instances_of(Vocab::Entity);
        assert_eq!(entities, &[Node::iri("http://example.org/data/E1")]);

        let names = graph.objects(&entities[0], graph.term(Vocab::HasName));
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].as_str(), "Kyiv");
    }

    #[test]
    fn blank_nodes_remain_addressable() {
        let graph = parse_turtle(SAMPLE, "sample", None).unwrap();
        let e1 = Node::iri("http://example.org/data/E1");
        let justification = graph
            .value(&e1, graph.term(Vocab::JustifiedBy))
            .unwrap()
            .unwrap();
        assert!(matches!(justification, Node::Blank(_)));
        assert!(graph.is_a(justification, Vocab::TextJustification));
        assert_eq!(
            graph
                .offset(justification, graph.term(Vocab::EndOffsetInclusive))
                .unwrap(),
            Some(6)
        );
    }

    #[test]
    fn override_applies_only_without_declaration() {
        let text = "<http://ex.org/a> a <http://ex.org/ns#Entity> .";
        let graph = parse_turtle(text, "t", Some("http://ex.org/ns#")).unwrap();
        assert_eq!(graph.instances_of(Vocab::Entity).len(), 1);

        let graph = parse_turtle(SAMPLE, "sample", Some("http://ex.org/ns#")).unwrap();
        assert_eq!(graph.vocab().aida_namespace(), "http://example.org/aida#");
    }

    #[test]
    fn default_namespace_when_nothing_declared() {
        let graph = parse_turtle("", "empty", None).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.vocab().aida_namespace(), DEFAULT_AIDA_NS);
    }

    #[test]
    fn malformed_turtle_is_a_parse_error() {
        let err = parse_turtle("ex:broken a", "bad.ttl", None).unwrap_err();
        assert!(matches!(err, AifError::Parse { .. }));
    }

    #[test]
    fn sparql_style_prefix_is_detected() {
        let text = "PREFIX aida: <http://x.org/aida#>\n";
        assert_eq!(declared_aida_namespace(text), Some("http://x.org/aida#"));
    }
}
