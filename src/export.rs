//! Export types for serializing extracted elements.
//!
//! These types provide flat, string-valued representations of elements,
//! statements and justifications suitable for JSON export.

use serde::{Deserialize, Serialize};

use crate::elements::{Element, ElementSet, Justification, Statement};

/// Exported element with its type resolved to a local name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementExport {
    /// Element IRI or blank node label.
    pub id: String,
    /// Type local name (Entity, Event, Relation, SameAsCluster, ...).
    pub element_type: String,
    pub names: Vec<String>,
    pub handles: Vec<String>,
    pub prototypes: Vec<String>,
    pub members: Vec<String>,
    pub clusters: Vec<String>,
    pub informative_justifications: Vec<JustificationExport>,
    pub justified_by: Vec<JustificationExport>,
    pub statements: Vec<StatementExport>,
}

/// Exported text justification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JustificationExport {
    pub id: String,
    /// Parent document id (`aida:sourceDocument`).
    pub source_document: Option<String>,
    /// Child document id (`aida:source`).
    pub source: Option<String>,
    pub start: u64,
    /// Inclusive end offset.
    pub end: u64,
}

/// Exported reified statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementExport {
    pub id: String,
    pub subject: Option<String>,
    pub predicate: Option<String>,
    pub object: Option<String>,
    pub justified_by: Vec<JustificationExport>,
}

impl From<&Justification> for JustificationExport {
    fn from(j: &Justification) -> Self {
        Self {
            id: j.id.to_string(),
            source_document: j.parent_id.clone(),
            source: j.child_id.clone(),
            start: j.span_start,
            end: j.span_end,
        }
    }
}

impl From<&Statement> for StatementExport {
    fn from(s: &Statement) -> Self {
        Self {
            id: s.id.to_string(),
            subject: s.subject.as_ref().map(ToString::to_string),
            predicate: s.predicate.as_ref().map(ToString::to_string),
            object: s.object.as_ref().map(ToString::to_string),
            justified_by: s.justified_by.iter().map(Into::into).collect(),
        }
    }
}

impl From<&Element> for ElementExport {
    fn from(e: &Element) -> Self {
        let strings = |nodes: &[crate::aif::Node]| nodes.iter().map(ToString::to_string).collect();
        Self {
            id: e.id.to_string(),
            element_type: e.type_name().to_string(),
            names: e.names.clone(),
            handles: e.handles.clone(),
            prototypes: strings(&e.prototypes),
            members: strings(&e.members),
            clusters: strings(&e.clusters),
            informative_justifications: e.informative_justifications.iter().map(Into::into).collect(),
            justified_by: e.justified_by.iter().map(Into::into).collect(),
            statements: e.statements.iter().map(Into::into).collect(),
        }
    }
}

/// Export every element of the set, in set order.
pub fn export_elements(elements: &ElementSet) -> Vec<ElementExport> {
    elements.iter().map(ElementExport::from).collect()
}
