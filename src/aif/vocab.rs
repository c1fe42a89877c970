//! RDF and AIDA ontology vocabulary.

use super::Node;

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Namespace of the AIDA Interchange Ontology, used when a file does not declare `aida:`.
pub const DEFAULT_AIDA_NS: &str = "https://raw.githubusercontent.com/NextCenturyCorporation/AIDA-Interchange-Format/master/java/src/main/resources/com/ncc/aif/ontologies/InterchangeOntology#";

/// Terms the visualizer looks up in an AIF graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocab {
    // rdf:
    Type,
    Subject,
    Predicate,
    Object,
    // aida: classes
    Entity,
    Event,
    Relation,
    SameAsCluster,
    ClusterMembership,
    Hypothesis,
    TextJustification,
    CompoundJustification,
    // aida: properties
    InformativeJustification,
    JustifiedBy,
    ContainedJustification,
    Prototype,
    HasName,
    Handle,
    Cluster,
    ClusterMember,
    StartOffset,
    EndOffsetInclusive,
    Source,
    SourceDocument,
}

impl Vocab {
    pub const ALL: [Vocab; 24] = [
        Vocab::Type,
        Vocab::Subject,
        Vocab::Predicate,
        Vocab::Object,
        Vocab::Entity,
        Vocab::Event,
        Vocab::Relation,
        Vocab::SameAsCluster,
        Vocab::ClusterMembership,
        Vocab::Hypothesis,
        Vocab::TextJustification,
        Vocab::CompoundJustification,
        Vocab::InformativeJustification,
        Vocab::JustifiedBy,
        Vocab::ContainedJustification,
        Vocab::Prototype,
        Vocab::HasName,
        Vocab::Handle,
        Vocab::Cluster,
        Vocab::ClusterMember,
        Vocab::StartOffset,
        Vocab::EndOffsetInclusive,
        Vocab::Source,
        Vocab::SourceDocument,
    ];

    /// Local name within its namespace.
    pub fn local_name(self) -> &'static str {
        match self {
            Vocab::Type => "type",
            Vocab::Subject => "subject",
            Vocab::Predicate => "predicate",
            Vocab::Object => "object",
            Vocab::Entity => "Entity",
            Vocab::Event => "Event",
            Vocab::Relation => "Relation",
            Vocab::SameAsCluster => "SameAsCluster",
            Vocab::ClusterMembership => "ClusterMembership",
            Vocab::Hypothesis => "Hypothesis",
            Vocab::TextJustification => "TextJustification",
            Vocab::CompoundJustification => "CompoundJustification",
            Vocab::InformativeJustification => "informativeJustification",
            Vocab::JustifiedBy => "justifiedBy",
            Vocab::ContainedJustification => "containedJustification",
            Vocab::Prototype => "prototype",
            Vocab::HasName => "hasName",
            Vocab::Handle => "handle",
            Vocab::Cluster => "cluster",
            Vocab::ClusterMember => "clusterMember",
            Vocab::StartOffset => "startOffset",
            Vocab::EndOffsetInclusive => "endOffsetInclusive",
            Vocab::Source => "source",
            Vocab::SourceDocument => "sourceDocument",
        }
    }

    fn is_rdf(self) -> bool {
        matches!(
            self,
            Vocab::Type | Vocab::Subject | Vocab::Predicate | Vocab::Object
        )
    }
}

/// Vocabulary nodes resolved against a concrete AIDA namespace.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    aida_ns: String,
    nodes: Vec<Node>,
}

impl Vocabulary {
    pub fn new(aida_ns: impl Into<String>) -> Self {
        let aida_ns = aida_ns.into();
        let nodes = Vocab::ALL
            .iter()
            .map(|term| {
                let ns = if term.is_rdf() { RDF_NS } else { aida_ns.as_str() };
                Node::Iri(format!("{ns}{}", term.local_name()))
            })
            .collect();
        Self { aida_ns, nodes }
    }

    pub fn aida_namespace(&self) -> &str {
        &self.aida_ns
    }

    pub fn node(&self, term: Vocab) -> &Node {
        &self.nodes[term as usize]
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_AIDA_NS)
    }
}
