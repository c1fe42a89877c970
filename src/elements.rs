//! Graph elements: clusters, entities, events and relations with their
//! justifications and reified statements.

use std::collections::HashSet;

use crate::aif::vocab::RDF_TYPE;
use crate::aif::{AifGraph, AifResult, Node, Vocab};

/// A text span in a source document supporting some graph claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Justification {
    pub id: Node,
    /// `aida:sourceDocument`: the parent document id.
    pub parent_id: Option<String>,
    /// `aida:source`: the child document id.
    pub child_id: Option<String>,
    pub span_start: u64,
    /// Inclusive end offset.
    pub span_end: u64,
}

impl Justification {
    /// Read a justification node.
    ///
    /// Returns `None` (with a warning) when the node lacks offsets or has neither
    /// a source nor a source document.
    pub fn from_node(id: &Node, graph: &AifGraph) -> AifResult<Option<Self>> {
        if !graph.is_a(id, Vocab::TextJustification) {
            tracing::warn!(justification = %id, "node does not have type TextJustification");
        }

        let span_start = graph.offset(id, graph.term(Vocab::StartOffset))?;
        let span_end = graph.offset(id, graph.term(Vocab::EndOffsetInclusive))?;
        let child_id = graph
            .value(id, graph.term(Vocab::Source))?
            .map(|n| n.as_str().to_string());
        let parent_id = graph
            .value(id, graph.term(Vocab::SourceDocument))?
            .map(|n| n.as_str().to_string());

        match (span_start, span_end) {
            (Some(span_start), Some(span_end)) if child_id.is_some() || parent_id.is_some() => {
                Ok(Some(Self {
                    id: id.clone(),
                    parent_id,
                    child_id,
                    span_start,
                    span_end,
                }))
            }
            _ => {
                tracing::warn!(
                    justification = %id,
                    "justification requires span start and end, and one of source or sourceDocument"
                );
                Ok(None)
            }
        }
    }

    /// `start:end` key used for element ids in rendered documents.
    pub fn span_key(&self) -> String {
        format!("{}:{}", self.span_start, self.span_end)
    }

    /// Whether the span is non-empty and representable as character offsets.
    pub fn is_renderable(&self) -> bool {
        self.span_end >= self.span_start
            && usize::try_from(self.span_end).is_ok_and(|end| end < usize::MAX)
    }
}

/// Read every justification node in `ids`, skipping unusable ones.
fn justifications(ids: &[Node], graph: &AifGraph) -> AifResult<Vec<Justification>> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(j) = Justification::from_node(id, graph)? {
            out.push(j);
        }
    }
    Ok(out)
}

/// A reified statement (`rdf:subject`/`rdf:predicate`/`rdf:object`).
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub id: Node,
    pub subject: Option<Node>,
    pub predicate: Option<Node>,
    pub object: Option<Node>,
    pub justified_by: Vec<Justification>,
}

impl Statement {
    pub fn from_node(id: &Node, graph: &AifGraph) -> AifResult<Self> {
        let justified_by_ids = graph.objects(id, graph.term(Vocab::JustifiedBy));

        let mut text_ids: Vec<Node> = justified_by_ids
            .iter()
            .filter(|n| graph.is_a(n, Vocab::TextJustification))
            .cloned()
            .collect();
        for compound in justified_by_ids
            .iter()
            .filter(|n| graph.is_a(n, Vocab::CompoundJustification))
        {
            text_ids.extend(
                graph
                    .objects(compound, graph.term(Vocab::ContainedJustification))
                    .iter()
                    .cloned(),
            );
        }

        Ok(Self {
            id: id.clone(),
            subject: graph.value(id, graph.term(Vocab::Subject))?.cloned(),
            predicate: graph.value(id, graph.term(Vocab::Predicate))?.cloned(),
            object: graph.value(id, graph.term(Vocab::Object))?.cloned(),
            justified_by: justifications(&text_ids, graph)?,
        })
    }

    /// Whether this statement asserts the type of its subject.
    pub fn is_type_statement(&self) -> bool {
        matches!(&self.predicate, Some(Node::Iri(iri)) if iri == RDF_TYPE)
    }
}

/// A top-level graph element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: Node,
    pub element_type: Option<Node>,
    pub prototypes: Vec<Node>,
    pub names: Vec<String>,
    pub handles: Vec<String>,
    /// `aida:clusterMember` values (cluster memberships only).
    pub members: Vec<Node>,
    /// `aida:cluster` values (cluster memberships only).
    pub clusters: Vec<Node>,
    pub informative_justifications: Vec<Justification>,
    pub justified_by: Vec<Justification>,
    pub statements: Vec<Statement>,
}

impl Element {
    pub fn from_node(id: &Node, graph: &AifGraph) -> AifResult<Self> {
        let literal_strings = |term: Vocab| -> Vec<String> {
            graph
                .objects(id, graph.term(term))
                .iter()
                .map(|n| n.as_str().to_string())
                .collect()
        };

        let mut statements = Vec::new();
        for statement_id in graph.subjects(graph.term(Vocab::Subject), id) {
            statements.push(Statement::from_node(statement_id, graph)?);
        }

        Ok(Self {
            id: id.clone(),
            // An element may carry several rdf:type values; the first is used.
            element_type: graph.objects(id, graph.term(Vocab::Type)).first().cloned(),
            prototypes: graph.objects(id, graph.term(Vocab::Prototype)).to_vec(),
            names: literal_strings(Vocab::HasName),
            handles: literal_strings(Vocab::Handle),
            members: graph.objects(id, graph.term(Vocab::ClusterMember)).to_vec(),
            clusters: graph.objects(id, graph.term(Vocab::Cluster)).to_vec(),
            informative_justifications: justifications(
                graph.objects(id, graph.term(Vocab::InformativeJustification)),
                graph,
            )?,
            justified_by: justifications(graph.objects(id, graph.term(Vocab::JustifiedBy)), graph)?,
            statements,
        })
    }

    /// Informative justifications followed by `justifiedBy` justifications.
    pub fn all_justifications(&self) -> impl Iterator<Item = &Justification> {
        self.informative_justifications
            .iter()
            .chain(self.justified_by.iter())
    }

    /// Local name of the element type, or `"Untyped"`.
    pub fn type_name(&self) -> &str {
        self.element_type
            .as_ref()
            .map(Node::local_name)
            .unwrap_or("Untyped")
    }
}

/// Elements in insertion order with id lookup.
#[derive(Debug, Clone, Default)]
pub struct ElementSet {
    elements: Vec<Element>,
    ids: HashSet<Node>,
}

impl ElementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// All clusters, entities, events and relations of the graph, in that order.
    pub fn from_graph(graph: &AifGraph) -> AifResult<Self> {
        let mut set = Self::new();
        for class in [
            Vocab::SameAsCluster,
            Vocab::Entity,
            Vocab::Event,
            Vocab::Relation,
        ] {
            for id in graph.instances_of(class) {
                if !set.contains(id) {
                    set.push(Element::from_node(id, graph)?);
                }
            }
        }
        tracing::debug!(elements = set.len(), "extracted elements");
        Ok(set)
    }

    /// Add an element. Later elements with an already present id replace nothing.
    pub fn push(&mut self, element: Element) {
        if self.ids.insert(element.id.clone()) {
            self.elements.push(element);
        }
    }

    pub fn contains(&self, id: &Node) -> bool {
        self.ids.contains(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements grouped by type local name, groups in first-seen order,
    /// each group sorted by element id.
    pub fn grouped_by_type(&self) -> Vec<(&str, Vec<&Element>)> {
        let mut groups: Vec<(&str, Vec<&Element>)> = Vec::new();
        for element in &self.elements {
            let type_name = element.type_name();
            match groups.iter_mut().find(|(name, _)| *name == type_name) {
                Some((_, members)) => members.push(element),
                None => groups.push((type_name, vec![element])),
            }
        }
        for (_, members) in &mut groups {
            members.sort_by(|a, b| a.id.cmp(&b.id));
        }
        groups
    }
}

impl<'a> IntoIterator for &'a ElementSet {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aif::parse_turtle;

    const GRAPH: &str = r#"
@prefix aida: <http://example.org/aida#> .
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix ldc: <http://example.org/ldc#> .
@prefix ex: <http://example.org/data/> .

ex:E1 a aida:Entity ;
    aida:hasName "Kyiv" ;
    aida:informativeJustification ex:J1 ;
    aida:justifiedBy ex:J2, ex:J_BAD .

ex:J1 a aida:TextJustification ;
    aida:source "HC0001" ; aida:sourceDocument "P0001" ;
    aida:startOffset 0 ; aida:endOffsetInclusive 3 .
ex:J2 a aida:TextJustification ;
    aida:source "HC0001" ;
    aida:startOffset 10 ; aida:endOffsetInclusive 14 .
ex:J_BAD a aida:TextJustification ; aida:startOffset 1 .

ex:V1 a aida:Event .
ex:S1 a rdf:Statement ;
    rdf:subject ex:V1 ; rdf:predicate rdf:type ; rdf:object ldc:Conflict.Attack ;
    aida:justifiedBy ex:J1 .
ex:S2 a rdf:Statement ;
    rdf:subject ex:V1 ; rdf:predicate ldc:Conflict.Attack_Place ; rdf:object ex:E1 ;
    aida:justifiedBy ex:CJ .
ex:CJ a aida:CompoundJustification ; aida:containedJustification ex:J2 .

ex:C1 a aida:SameAsCluster ; aida:prototype ex:E1 ; aida:handle "Kyiv" .
ex:M1 a aida:ClusterMembership ; aida:cluster ex:C1 ; aida:clusterMember ex:E1 .
"#;

    fn graph() -> AifGraph {
        parse_turtle(GRAPH, "elements-test", None).unwrap()
    }

    fn ex(local: &str) -> Node {
        Node::iri(format!("http://example.org/data/{local}"))
    }

    #[test]
    fn element_collects_justifications_and_skips_bad_ones() {
        let g = graph();
        let e1 = Element::from_node(&ex("E1"), &g).unwrap();
        assert_eq!(e1.type_name(), "Entity");
        assert_eq!(e1.names, vec!["Kyiv".to_string()]);
        assert_eq!(e1.informative_justifications.len(), 1);
        assert_eq!(e1.informative_justifications[0].parent_id.as_deref(), Some("P0001"));
        assert_eq!(e1.informative_justifications[0].span_key(), "0:3");
        // J_BAD lacks an end offset and a source.
        assert_eq!(e1.justified_by.len(), 1);
        assert_eq!(e1.all_justifications().count(), 2);
    }

    #[test]
    fn statements_expand_compound_justifications() {
        let g = graph();
        let v1 = Element::from_node(&ex("V1"), &g).unwrap();
        assert_eq!(v1.statements.len(), 2);

        let typed: Vec<_> = v1.statements.iter().filter(|s| s.is_type_statement()).collect();
        assert_eq!(typed.len(), 1);
        assert_eq!(typed[0].justified_by[0].span_key(), "0:3");

        let place = v1.statements.iter().find(|s| !s.is_type_statement()).unwrap();
        assert_eq!(place.object.as_ref(), Some(&ex("E1")));
        assert_eq!(place.justified_by.len(), 1);
        assert_eq!(place.justified_by[0].span_key(), "10:14");
    }

    #[test]
    fn cluster_membership_fields() {
        let g = graph();
        let m1 = Element::from_node(&ex("M1"), &g).unwrap();
        assert_eq!(m1.members, vec![ex("E1")]);
        assert_eq!(m1.clusters, vec![ex("C1")]);
        let c1 = Element::from_node(&ex("C1"), &g).unwrap();
        assert_eq!(c1.prototypes, vec![ex("E1")]);
        assert_eq!(c1.handles, vec!["Kyiv".to_string()]);
    }

    #[test]
    fn element_set_orders_clusters_first_and_groups_by_type() {
        let g = graph();
        let set = ElementSet::from_graph(&g).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().next().unwrap().id, ex("C1"));
        assert!(set.contains(&ex("V1")));
        assert!(!set.contains(&ex("M1")));

        let groups = set.grouped_by_type();
        let names: Vec<_> = groups.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["SameAsCluster", "Entity", "Event"]);
    }
}
