//! In-memory triple index for AIF graphs.
//!
//! Two nested hash indexes answer the lookups the visualizer needs:
//! subject → predicate → objects and predicate → object → subjects.
//! Duplicate triples are stored once; values keep insertion order.

use std::collections::HashMap;

use crate::error::AifError;

use super::vocab::{Vocab, Vocabulary};
use super::{AifResult, Node};

type Index = HashMap<Node, HashMap<Node, Vec<Node>>>;

/// Read-only AIF graph with subject- and object-side indexes.
#[derive(Debug, Clone, Default)]
pub struct AifGraph {
    vocab: Vocabulary,
    /// subject → predicate → objects
    forward: Index,
    /// predicate → object → subjects
    reverse: Index,
    triple_count: usize,
}

impl AifGraph {
    /// Create an empty graph using the given vocabulary.
    pub fn new(vocab: Vocabulary) -> Self {
        Self {
            vocab,
            forward: HashMap::new(),
            reverse: HashMap::new(),
            triple_count: 0,
        }
    }

    /// Insert a triple. Returns `false` if it was already present.
    pub fn insert(&mut self, subject: Node, predicate: Node, object: Node) -> bool {
        let objects = self
            .forward
            .entry(subject.clone())
            .or_default()
            .entry(predicate.clone())
            .or_default();
        if objects.contains(&object) {
            return false;
        }
        objects.push(object.clone());

        self.reverse
            .entry(predicate)
            .or_default()
            .entry(object)
            .or_default()
            .push(subject);
        self.triple_count += 1;
        true
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Shorthand for a vocabulary node.
    pub fn term(&self, term: Vocab) -> &Node {
        self.vocab.node(term)
    }

    pub fn len(&self) -> usize {
        self.triple_count
    }

    pub fn is_empty(&self) -> bool {
        self.triple_count == 0
    }

    /// All objects of `(subject, predicate, ?)`.
    pub fn objects(&self, subject: &Node, predicate: &Node) -> &[Node] {
        self.forward
            .get(subject)
            .and_then(|by_pred| by_pred.get(predicate))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All subjects of `(?, predicate, object)`.
    pub fn subjects(&self, predicate: &Node, object: &Node) -> &[Node] {
        self.reverse
            .get(predicate)
            .and_then(|by_obj| by_obj.get(object))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The single object of `(subject, predicate, ?)`, if any.
    ///
    /// Fails when the property has more than one distinct value.
    pub fn value(&self, subject: &Node, predicate: &Node) -> AifResult<Option<&Node>> {
        match self.objects(subject, predicate) {
            [] => Ok(None),
            [only] => Ok(Some(only)),
            many => Err(AifError::NotUnique {
                subject: subject.to_string(),
                predicate: predicate.to_string(),
                count: many.len(),
            }),
        }
    }

    /// The first subject of `(?, predicate, object)`, if any.
    pub fn subject_for(&self, predicate: &Node, object: &Node) -> Option<&Node> {
        self.subjects(predicate, object).first()
    }

    pub fn contains(&self, subject: &Node, predicate: &Node, object: &Node) -> bool {
        self.objects(subject, predicate).contains(object)
    }

    /// Subjects typed with `class` via `rdf:type`.
    pub fn instances_of(&self, class: Vocab) -> &[Node] {
        self.subjects(self.term(Vocab::Type), self.term(class))
    }

    /// Whether `node` is typed with `class`.
    pub fn is_a(&self, node: &Node, class: Vocab) -> bool {
        self.contains(node, self.term(Vocab::Type), self.term(class))
    }

    /// The single value of `(subject, predicate)` parsed as an offset.
    pub fn offset(&self, subject: &Node, predicate: &Node) -> AifResult<Option<u64>> {
        let Some(node) = self.value(subject, predicate)? else {
            return Ok(None);
        };
        node.as_str()
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| AifError::BadOffset {
                node: subject.to_string(),
                value: node.as_str().to_string(),
            })
    }
}
