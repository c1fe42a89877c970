//! One element report per multi-member cluster.
//!
//! Each page holds the cluster, its memberships and the member elements, and
//! is named by its position among written clusters (`0000.html`, ...).

use std::path::{Path, PathBuf};

use crate::aif::{AifGraph, Node, Vocab};
use crate::corpus::Corpus;
use crate::elements::{Element, ElementSet};
use crate::error::VizResult;

use super::HtmlWriter;

/// Elements shown on the page for `cluster`, or `None` if it has at most one
/// membership.
pub fn cluster_elements(graph: &AifGraph, cluster: &Node) -> VizResult<Option<ElementSet>> {
    let memberships = graph.subjects(graph.term(Vocab::Cluster), cluster);
    if memberships.len() <= 1 {
        return Ok(None);
    }

    let mut set = ElementSet::new();
    set.push(Element::from_node(cluster, graph)?);
    let mut members = Vec::new();
    for membership in memberships {
        let element = Element::from_node(membership, graph)?;
        members.extend(element.members.iter().cloned());
        set.push(element);
    }
    for member in &members {
        if !set.contains(member) {
            set.push(Element::from_node(member, graph)?);
        }
    }
    Ok(Some(set))
}

/// Write a page for every SameAsCluster with more than one membership.
/// Returns the written page paths.
pub fn write_cluster_pages(graph: &AifGraph, corpus: &Corpus, out_dir: &Path) -> VizResult<Vec<PathBuf>> {
    let clusters = graph.instances_of(Vocab::SameAsCluster);
    let pb = crate::progress::bar(clusters.len() as u64, "Clusters");

    let mut sets = Vec::new();
    for cluster in clusters {
        if let Some(set) = cluster_elements(graph, cluster)? {
            sets.push(set);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let mut pages = Vec::with_capacity(sets.len());
    for (index, set) in sets.iter().enumerate() {
        let page = HtmlWriter::new(corpus, set).write_to_dir(out_dir, &format!("{index:04}.html"))?;
        pages.push(page);
    }
    tracing::info!(
        clusters = clusters.len(),
        pages = pages.len(),
        out_dir = %out_dir.display(),
        "wrote cluster pages"
    );
    Ok(pages)
}
