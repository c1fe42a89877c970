//! Hypothesis view (`--by-clusters`).
//!
//! Event and relation clusters are flattened into [`ClusterArgument`] rows:
//! one per non-type argument of each cluster member. Event clusters with no
//! `Place` argument get one inferred from related `Physical.LocatedNear` or
//! `OrganizationAffiliation` relations, from a location-typed argument, or
//! from the location most often mentioned in the event's document.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::aif::vocab::RDF_TYPE;
use crate::aif::{AifGraph, AifResult, Node, Vocab, local_name};
use crate::corpus::Corpus;
use crate::documents::mention_text;
use crate::elements::Justification;
use crate::error::{HypothesisError, RenderError};
use crate::render::{
    DOCS_DIR, DocumentCache, document_page_name, page, prepare_output_dir, write_document_page,
    write_file, write_style,
};

/// Result type for hypothesis operations.
pub type HypothesisResult<T> = std::result::Result<T, HypothesisError>;

pub const LOCATED_NEAR: &str = "Physical.LocatedNear";
pub const MOVEMENT_TRANSPORT: &str = "Movement.Transport";
pub const ORG_AFFILIATION: &str = "OrganizationAffiliation";
pub const PLACE: &str = "Place";
pub const PLACE_TYPES: [&str; 3] = ["FAC", "GPE", "LOC"];

/// The informative justification of a node, flattened.
///
/// The default value stands for a node without one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct JustificationRef {
    pub source: Option<String>,
    pub source_document: Option<String>,
    pub start: u64,
    pub end: u64,
}

impl JustificationRef {
    /// Read the `aida:informativeJustification` of `node`.
    pub fn informative(node: &Node, graph: &AifGraph) -> AifResult<Self> {
        let Some(j) = graph.value(node, graph.term(Vocab::InformativeJustification))? else {
            return Ok(Self::default());
        };
        let text = |term: Vocab| -> AifResult<Option<String>> {
            Ok(graph.value(j, graph.term(term))?.map(|n| n.as_str().to_string()))
        };
        Ok(Self {
            source: text(Vocab::Source)?,
            source_document: text(Vocab::SourceDocument)?,
            start: graph.offset(j, graph.term(Vocab::StartOffset))?.unwrap_or(0),
            end: graph.offset(j, graph.term(Vocab::EndOffsetInclusive))?.unwrap_or(0),
        })
    }

    pub fn is_missing(&self) -> bool {
        *self == Self::default()
    }

    fn to_justification(&self) -> Justification {
        Justification {
            id: Node::Blank(format!("informative-{}-{}", self.start, self.end)),
            parent_id: self.source_document.clone(),
            child_id: self.source.clone(),
            span_start: self.start,
            span_end: self.end,
        }
    }
}

/// One argument of one member of an event or relation cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ClusterArgument {
    pub cluster: Node,
    pub cluster_type: Node,
    pub member: Node,
    pub member_justification: JustificationRef,
    pub predicate: Node,
    pub object: Node,
    pub object_types: BTreeSet<String>,
    pub object_names: BTreeSet<String>,
    pub object_handles: BTreeSet<String>,
    pub justification: JustificationRef,
}

impl ClusterArgument {
    /// Local name of the cluster type, e.g. `Conflict.Attack`.
    pub fn type_name(&self) -> &str {
        self.cluster_type.local_name()
    }

    /// Argument role: the predicate's last `_`-separated part, e.g. `Place`.
    pub fn role(&self) -> &str {
        role_of(&self.predicate)
    }

    fn has_place_type(&self) -> bool {
        self.object_types
            .iter()
            .any(|t| PLACE_TYPES.iter().any(|p| t.contains(p)))
    }

    /// A `Place` argument for `member`'s cluster filled from `source`.
    fn place_from(member: &ClusterArgument, source: &ClusterArgument) -> Self {
        Self {
            cluster: member.cluster.clone(),
            cluster_type: member.cluster_type.clone(),
            member: member.member.clone(),
            member_justification: member.member_justification.clone(),
            predicate: Node::Iri(format!("{}_{PLACE}", member.cluster_type.as_str())),
            object: source.object.clone(),
            object_types: source.object_types.clone(),
            object_names: source.object_names.clone(),
            object_handles: source.object_handles.clone(),
            justification: source.justification.clone(),
        }
    }
}

fn role_of(predicate: &Node) -> &str {
    predicate.as_str().rsplit('_').next().unwrap_or_default()
}

/// Arguments grouped by cluster, clusters in first-seen order.
fn by_cluster(arguments: &[ClusterArgument]) -> Vec<(&Node, Vec<&ClusterArgument>)> {
    let mut groups: Vec<(&Node, Vec<&ClusterArgument>)> = Vec::new();
    for argument in arguments {
        match groups.iter_mut().find(|(c, _)| *c == &argument.cluster) {
            Some((_, members)) => members.push(argument),
            None => groups.push((&argument.cluster, vec![argument])),
        }
    }
    groups
}

/// The event and relation clusters of an AIF hypothesis.
#[derive(Debug, Clone, Serialize)]
pub struct Hypothesis {
    name: String,
    events: Vec<ClusterArgument>,
    relations: Vec<ClusterArgument>,
}

impl Hypothesis {
    pub fn from_graph(graph: &AifGraph) -> HypothesisResult<Self> {
        let mut clusters: Vec<&Node> = graph.instances_of(Vocab::SameAsCluster).iter().collect();
        clusters.sort();

        let clusters_of = |class: Vocab| {
            clusters
                .iter()
                .copied()
                .filter(|cluster| {
                    let members = entities_in_cluster(graph, cluster);
                    !members.is_empty() && members.iter().all(|m| graph.is_a(m, class))
                })
                .collect::<Vec<&Node>>()
        };

        let relations = parse_clusters(&clusters_of(Vocab::Relation), graph, None)?;
        let events = parse_clusters(&clusters_of(Vocab::Event), graph, Some(&relations))?;

        let name = graph
            .subject_for(graph.term(Vocab::Type), graph.term(Vocab::Hypothesis))
            .map(Node::to_string)
            .unwrap_or_else(|| "unnamed".to_string());

        tracing::debug!(
            hypothesis = %name,
            events = events.len(),
            relations = relations.len(),
            "parsed hypothesis"
        );
        Ok(Self {
            name,
            events,
            relations,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn events(&self) -> &[ClusterArgument] {
        &self.events
    }

    pub fn relations(&self) -> &[ClusterArgument] {
        &self.relations
    }

    pub fn event_by_cluster(&self) -> Vec<(&Node, Vec<&ClusterArgument>)> {
        by_cluster(&self.events)
    }

    pub fn relation_by_cluster(&self) -> Vec<(&Node, Vec<&ClusterArgument>)> {
        by_cluster(&self.relations)
    }

    /// Write `style.css`, document pages under `docs/` and the hypothesis page
    /// `output_file` into `out_dir`.
    pub fn visualize(
        &self,
        out_dir: &Path,
        output_file: &Path,
        corpus: &Corpus,
        verbose: bool,
    ) -> HypothesisResult<PathBuf> {
        let docs_dir = prepare_output_dir(out_dir)?;
        write_style(out_dir)?;

        let mut writer = HypothesisPage {
            docs_dir,
            documents: DocumentCache::new(corpus),
            written: HashSet::new(),
            verbose,
        };

        let mut lines = vec![
            page::report_header(&self.name),
            format!(
                "<b>Hypothesis Name: </b>{}<br>",
                html_escape::encode_text(&self.name)
            ),
            "Note: Cluster handle is used when entity name is not found.<br>".to_string(),
        ];
        for (label, groups) in [
            ("Event", self.event_by_cluster()),
            ("Relation", self.relation_by_cluster()),
        ] {
            for (_, arguments) in groups {
                let type_name = arguments[0].type_name();
                lines.push(format!(
                    "<br><u>{label}: {}</u>",
                    html_escape::encode_text(type_name)
                ));
                lines.extend(writer.render_cluster(arguments)?);
            }
        }
        lines.push(page::REPORT_FOOTER.to_string());

        write_file(output_file, &lines.join("\n"))?;
        tracing::info!(
            report = %output_file.display(),
            document_pages = writer.written.len(),
            "wrote hypothesis report"
        );
        Ok(output_file.to_path_buf())
    }
}

/// `<stem>_visualization.html`, or `<stem>_visualization_verbose.html`.
pub fn output_file_name(aif_file: &Path, verbose: bool) -> String {
    let stem = aif_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "hypothesis".to_string());
    if verbose {
        format!("{stem}_visualization_verbose.html")
    } else {
        format!("{stem}_visualization.html")
    }
}

struct HypothesisPage<'c> {
    docs_dir: PathBuf,
    documents: DocumentCache<'c>,
    written: HashSet<String>,
    verbose: bool,
}

/// Link text and target for an informative justification.
struct MentionLink {
    mention: String,
    href: Option<String>,
}

impl MentionLink {
    fn to_html(&self) -> String {
        let mention = html_escape::encode_text(&self.mention);
        match &self.href {
            Some(href) => format!(
                "<a href=\"{}\">{mention}</a>",
                html_escape::encode_double_quoted_attribute(href)
            ),
            None => mention.into_owned(),
        }
    }
}

impl HypothesisPage<'_> {
    /// List items for one cluster: members sorted, each with its arguments.
    fn render_cluster(&mut self, mut arguments: Vec<&ClusterArgument>) -> HypothesisResult<Vec<String>> {
        arguments.sort_by(|a, b| {
            (&a.member, &a.member_justification, a.role())
                .cmp(&(&b.member, &b.member_justification, b.role()))
        });

        let mut lines = vec!["<ul>".to_string()];
        let mut current: Option<&Node> = None;
        for argument in arguments {
            if current != Some(&argument.member) {
                if current.is_some() {
                    lines.push("</ul></li>".to_string());
                }
                current = Some(&argument.member);
                let member_link = self.link(&argument.member_justification)?;
                let member_name = argument.member.as_str().rsplit('/').next().unwrap_or_default();
                lines.push("<li>".to_string());
                lines.push(format!(
                    "ID: {}",
                    MentionLink {
                        mention: member_name.to_string(),
                        href: member_link.href,
                    }
                    .to_html()
                ));
                lines.push("<ul>".to_string());
            }

            lines.push(format!(
                "<li><u>{}:</u>",
                html_escape::encode_text(argument.role())
            ));
            let link = self.link(&argument.justification)?;
            if self.verbose {
                lines.push("<ul>".to_string());
                lines.push(format!(
                    "<li><b>informativeJustification</b>: {}</li>",
                    link.to_html()
                ));
                for (label, values) in [
                    ("hasName", &argument.object_names),
                    ("handle", &argument.object_handles),
                    ("type", &argument.object_types),
                ] {
                    lines.push(format!("<li><b>{label}</b>: {}</li>", joined_or_nothing(values)));
                }
                lines.push("</ul>".to_string());
            } else {
                let mut line = link.to_html();
                for identifier in identifiers(argument, &link.mention) {
                    line.push_str(", ");
                    line.push_str(&html_escape::encode_text(identifier));
                }
                lines.push(line);
            }
            lines.push("</li>".to_string());
        }
        if current.is_some() {
            lines.push("</ul></li>".to_string());
        }
        lines.push("</ul>".to_string());
        Ok(lines)
    }

    /// Write the document page for `reference` (once) and describe the link.
    fn link(&mut self, reference: &JustificationRef) -> HypothesisResult<MentionLink> {
        let span = format!("({}:{})", reference.start, reference.end);
        if reference.is_missing() {
            return Ok(MentionLink {
                mention: "no informative justification".to_string(),
                href: None,
            });
        }

        let justification = reference.to_justification();
        let Some(document) = self.documents.for_justification(&justification) else {
            return Ok(MentionLink {
                mention: span,
                href: None,
            });
        };
        let Some(mention) = mention_text(document, &justification) else {
            tracing::warn!(document = %document.parent_id, %span, "justification outside document text");
            return Ok(MentionLink {
                mention: span,
                href: None,
            });
        };
        let mention = format!("{mention} {span}");

        let name = document_page_name(&document.parent_id, &justification);
        if !self.written.contains(&name) {
            match write_document_page(&self.docs_dir, document, &justification) {
                Ok(_) => {
                    self.written.insert(name.clone());
                }
                Err(RenderError::SpanOutOfRange { .. }) => {
                    return Ok(MentionLink { mention, href: None });
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(MentionLink {
            mention,
            href: Some(format!("{DOCS_DIR}/{name}")),
        })
    }
}

fn joined_or_nothing(values: &BTreeSet<String>) -> String {
    if values.is_empty() {
        return "Nothing found".to_string();
    }
    values
        .iter()
        .map(|v| html_escape::encode_text(v).into_owned())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Names, handles and types of the argument's object, without repeats and
/// without the first word of the mention.
fn identifiers<'a>(argument: &'a ClusterArgument, mention: &str) -> Vec<&'a str> {
    let mut all: Vec<&str> = argument
        .object_names
        .iter()
        .chain(&argument.object_handles)
        .chain(&argument.object_types)
        .map(String::as_str)
        .collect();
    if let Some(first) = mention.split_whitespace().next() {
        all.retain(|id| *id != first);
    }
    let mut seen = HashSet::new();
    all.retain(|id| seen.insert(*id));
    all
}

/// Members of `cluster` across all of its memberships, deduplicated.
fn entities_in_cluster(graph: &AifGraph, cluster: &Node) -> Vec<Node> {
    let mut members: Vec<Node> = Vec::new();
    for membership in graph.subjects(graph.term(Vocab::Cluster), cluster) {
        for member in graph.objects(membership, graph.term(Vocab::ClusterMember)) {
            if !members.contains(member) {
                members.push(member.clone());
            }
        }
    }
    members
}

/// The object of the single `rdf:type` statement about the cluster prototype.
fn cluster_type(graph: &AifGraph, cluster: &Node) -> HypothesisResult<Node> {
    let prototype = graph
        .value(cluster, graph.term(Vocab::Prototype))?
        .ok_or_else(|| HypothesisError::NoPrototype {
            cluster: cluster.to_string(),
        })?;

    let mut types = Vec::new();
    for statement in graph.subjects(graph.term(Vocab::Subject), prototype) {
        if graph.contains(statement, graph.term(Vocab::Predicate), graph.term(Vocab::Type))
            && let Some(object) = graph.value(statement, graph.term(Vocab::Object))?
        {
            types.push(object.clone());
        }
    }
    match types.as_slice() {
        [only] => Ok(only.clone()),
        _ => Err(HypothesisError::ClusterType {
            cluster: cluster.to_string(),
            count: types.len(),
        }),
    }
}

fn literal_set(graph: &AifGraph, subject: Option<&Node>, term: Vocab) -> BTreeSet<String> {
    subject
        .map(|s| {
            graph
                .objects(s, graph.term(term))
                .iter()
                .map(|n| n.as_str().to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_clusters(
    clusters: &[&Node],
    graph: &AifGraph,
    relations: Option<&[ClusterArgument]>,
) -> HypothesisResult<Vec<ClusterArgument>> {
    let mut parsed: Vec<ClusterArgument> = Vec::new();
    let mut seen: HashSet<ClusterArgument> = HashSet::new();

    for &cluster in clusters {
        let cluster_type = cluster_type(graph, cluster)?;
        let mut members = entities_in_cluster(graph, cluster);
        members.sort();

        for member in &members {
            let member_justification = JustificationRef::informative(member, graph)?;
            let mut statements: Vec<&Node> = graph.subjects(graph.term(Vocab::Subject), member).iter().collect();
            statements.sort();

            for statement in statements {
                let predicate = graph.value(statement, graph.term(Vocab::Predicate))?;
                let object = graph.value(statement, graph.term(Vocab::Object))?;
                let (Some(predicate), Some(object)) = (predicate, object) else {
                    continue;
                };
                if predicate.as_str() == RDF_TYPE {
                    continue;
                }

                let object_cluster = match graph.subject_for(graph.term(Vocab::ClusterMember), object) {
                    Some(membership) => graph.value(membership, graph.term(Vocab::Cluster))?,
                    None => None,
                };
                let mut object_types = BTreeSet::new();
                for type_statement in graph.subjects(graph.term(Vocab::Subject), object) {
                    if graph.contains(type_statement, graph.term(Vocab::Predicate), graph.term(Vocab::Type))
                        && let Some(t) = graph.value(type_statement, graph.term(Vocab::Object))?
                    {
                        object_types.insert(local_name(t.as_str()).to_string());
                    }
                }
                let justification = JustificationRef::informative(object, graph)?;
                if justification.is_missing() || member_justification.is_missing() {
                    tracing::warn!(
                        member = %member,
                        argument = %object,
                        "informative justification missing; the argument may render without a link"
                    );
                }

                let argument = ClusterArgument {
                    cluster: cluster.clone(),
                    cluster_type: cluster_type.clone(),
                    member: member.clone(),
                    member_justification: member_justification.clone(),
                    predicate: predicate.clone(),
                    object: object.clone(),
                    object_types,
                    object_names: literal_set(graph, Some(object), Vocab::HasName),
                    object_handles: literal_set(graph, object_cluster, Vocab::Handle),
                    justification,
                };
                if seen.insert(argument.clone()) {
                    parsed.push(argument);
                }
            }
        }
    }

    if let Some(relations) = relations {
        let inferred = infer_places(&parsed, relations);
        parsed.extend(inferred);
    }
    Ok(parsed)
}

/// Place arguments for event clusters that lack one.
fn infer_places(events: &[ClusterArgument], relations: &[ClusterArgument]) -> Vec<ClusterArgument> {
    let mut relation_groups: Vec<(&Node, Vec<&ClusterArgument>)> = Vec::new();
    let mut locations_by_document: HashMap<&str, Vec<&ClusterArgument>> = HashMap::new();
    for relation in relations {
        let relation_type = relation.type_name();
        let keep = if relation_type == LOCATED_NEAR {
            if relation.role() == PLACE
                && let Some(doc) = relation.justification.source_document.as_deref()
            {
                locations_by_document.entry(doc).or_default().push(relation);
            }
            true
        } else {
            relation_type.starts_with(ORG_AFFILIATION)
        };
        if keep {
            match relation_groups.iter_mut().find(|(c, _)| *c == &relation.cluster) {
                Some((_, members)) => members.push(relation),
                None => relation_groups.push((&relation.cluster, vec![relation])),
            }
        }
    }

    let mut inferred = Vec::new();
    for (cluster, group) in by_cluster(events) {
        let cluster_type = group[0].type_name();
        if group.iter().any(|a| a.role() == PLACE) || cluster_type.contains(MOVEMENT_TRANSPORT) {
            continue;
        }
        if let Some(place) = place_from_relation_or_argument(&group, &relation_groups) {
            inferred.push(place);
            continue;
        }

        let document = group[0].justification.source_document.as_deref();
        match document.and_then(|doc| most_frequent_location(locations_by_document.get(doc)?)) {
            Some(location) => inferred.push(ClusterArgument::place_from(group[0], location)),
            None => tracing::warn!(
                cluster = %cluster,
                cluster_type,
                "no place could be inferred for event cluster"
            ),
        }
    }
    inferred
}

/// The most often mentioned location; ties go to the first seen.
fn most_frequent_location<'a>(locations: &[&'a ClusterArgument]) -> Option<&'a ClusterArgument> {
    let mut counts: Vec<(&JustificationRef, usize, &ClusterArgument)> = Vec::new();
    for &location in locations {
        match counts.iter_mut().find(|(j, _, _)| **j == location.justification) {
            Some((_, count, _)) => *count += 1,
            None => counts.push((&location.justification, 1, location)),
        }
    }
    let best = counts.iter().map(|(_, count, _)| *count).max()?;
    counts
        .into_iter()
        .find(|(_, count, _)| *count == best)
        .map(|(_, _, location)| location)
}

fn place_from_relation_or_argument(
    event_cluster: &[&ClusterArgument],
    relation_groups: &[(&Node, Vec<&ClusterArgument>)],
) -> Option<ClusterArgument> {
    let mut located_near: Vec<&[&ClusterArgument]> = Vec::new();
    let mut affiliations: Vec<&[&ClusterArgument]> = Vec::new();

    for (_, group) in relation_groups {
        for relation in group {
            let shares_argument = |member: &&&ClusterArgument| {
                !member.justification.is_missing() && relation.justification == member.justification
            };
            if relation.type_name() == LOCATED_NEAR {
                for member in event_cluster.iter().filter(shares_argument) {
                    if relation.member_justification == member.member_justification {
                        if let Some(place) = group.iter().find(|r| r.role() == PLACE) {
                            return Some(ClusterArgument::place_from(member, place));
                        }
                    } else {
                        located_near.push(group);
                    }
                }
            } else if relation.type_name().starts_with(ORG_AFFILIATION)
                && event_cluster.iter().any(|m| shares_argument(&m))
            {
                affiliations.push(group);
            }
        }
    }

    let first_member = event_cluster[0];
    if let Some(group) = located_near.first() {
        if let Some(place) = group.iter().find(|r| r.role() == PLACE) {
            return Some(ClusterArgument::place_from(first_member, place));
        }
    } else if let Some(group) = affiliations.first()
        && let Some(relation) = group.iter().find(|r| r.has_place_type())
    {
        return Some(ClusterArgument::place_from(first_member, relation));
    }

    event_cluster
        .iter()
        .find(|member| member.has_place_type())
        .map(|member| ClusterArgument::place_from(member, member))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aif::parse_turtle;
    use crate::render::tests::corpus;
    use scraper::{Html, Selector};

    // Text: "Troops entered Kyiv on Monday. Residents fled the city."
    const ENTITIES: &str = r#"
@prefix aida: <http://example.org/aida#> .
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix ldc: <http://example.org/ldc#> .
@prefix ex: <http://example.org/data/> .

ex:H1 a aida:Hypothesis .

ex:IJ_V1 a aida:TextJustification ; aida:source "C1" ; aida:sourceDocument "P1" ;
    aida:startOffset 7 ; aida:endOffsetInclusive 13 .
ex:IJ_ATT a aida:TextJustification ; aida:source "C1" ; aida:sourceDocument "P1" ;
    aida:startOffset 0 ; aida:endOffsetInclusive 5 .
ex:IJ_KYIV a aida:TextJustification ; aida:source "C1" ; aida:sourceDocument "P1" ;
    aida:startOffset 15 ; aida:endOffsetInclusive 18 .
ex:IJ_RES a aida:TextJustification ; aida:source "C1" ; aida:sourceDocument "P1" ;
    aida:startOffset 31 ; aida:endOffsetInclusive 39 .
ex:IJ_CITY a aida:TextJustification ; aida:source "C1" ; aida:sourceDocument "P1" ;
    aida:startOffset 46 ; aida:endOffsetInclusive 53 .

ex:E_ATT a aida:Entity ; aida:hasName "Troops" ; aida:informativeJustification ex:IJ_ATT .
ex:T_ATT rdf:subject ex:E_ATT ; rdf:predicate rdf:type ; rdf:object ldc:PER .
ex:E_KYIV a aida:Entity ; aida:hasName "Kyiv" ; aida:informativeJustification ex:IJ_KYIV .
ex:T_KYIV rdf:subject ex:E_KYIV ; rdf:predicate rdf:type ; rdf:object ldc:GPE .
ex:E_RES a aida:Entity ; aida:informativeJustification ex:IJ_RES .
ex:T_RES rdf:subject ex:E_RES ; rdf:predicate rdf:type ; rdf:object ldc:PER .
ex:E_CITY a aida:Entity ; aida:informativeJustification ex:IJ_CITY .
ex:T_CITY rdf:subject ex:E_CITY ; rdf:predicate rdf:type ; rdf:object ldc:GPE .

ex:EC_KYIV a aida:SameAsCluster ; aida:prototype ex:E_KYIV ; aida:handle "Kyiv" .
ex:EM_KYIV aida:cluster ex:EC_KYIV ; aida:clusterMember ex:E_KYIV .

ex:V1 a aida:Event ; aida:informativeJustification ex:IJ_V1 .
ex:V1_T rdf:subject ex:V1 ; rdf:predicate rdf:type ; rdf:object ldc:Conflict.Attack .
ex:V1_A rdf:subject ex:V1 ; rdf:predicate ldc:Conflict.Attack_Attacker ; rdf:object ex:E_ATT .
ex:VC a aida:SameAsCluster ; aida:prototype ex:V1 .
ex:VM aida:cluster ex:VC ; aida:clusterMember ex:V1 .
"#;

    const TARGET: &str = r#"
ex:V1_G rdf:subject ex:V1 ; rdf:predicate ldc:Conflict.Attack_Target ; rdf:object ex:E_KYIV .
"#;

    fn relation(filler: &str) -> String {
        format!(
            r#"
ex:R1 a aida:Relation ; aida:informativeJustification ex:IJ_V1 .
ex:R1_T rdf:subject ex:R1 ; rdf:predicate rdf:type ; rdf:object ldc:Physical.LocatedNear .
ex:R1_E rdf:subject ex:R1 ; rdf:predicate ldc:Physical.LocatedNear_EntityOrFiller ; rdf:object ex:{filler} .
ex:R1_P rdf:subject ex:R1 ; rdf:predicate ldc:Physical.LocatedNear_Place ; rdf:object ex:E_CITY .
ex:RC a aida:SameAsCluster ; aida:prototype ex:R1 .
ex:RM aida:cluster ex:RC ; aida:clusterMember ex:R1 .
"#
        )
    }

    fn hypothesis(parts: &[&str]) -> Hypothesis {
        let graph = parse_turtle(&parts.concat(), "hypothesis-test", None).unwrap();
        Hypothesis::from_graph(&graph).unwrap()
    }

    fn ex(local: &str) -> Node {
        Node::iri(format!("http://example.org/data/{local}"))
    }

    fn place(h: &Hypothesis) -> &ClusterArgument {
        h.events().iter().find(|a| a.role() == PLACE).unwrap()
    }

    #[test]
    fn clusters_are_split_into_events_and_relations() {
        let h = hypothesis(&[ENTITIES, TARGET, &relation("E_ATT")]);
        assert_eq!(h.name(), "http://example.org/data/H1");
        assert_eq!(h.relations().len(), 2);
        assert!(h.relations().iter().all(|a| a.type_name() == LOCATED_NEAR));

        let attacker = h.events().iter().find(|a| a.role() == "Attacker").unwrap();
        assert_eq!(attacker.cluster, ex("VC"));
        assert_eq!(attacker.member, ex("V1"));
        assert_eq!(attacker.object_names, BTreeSet::from(["Troops".to_string()]));
        assert_eq!(attacker.object_types, BTreeSet::from(["PER".to_string()]));
        assert_eq!(attacker.justification.start, 0);

        let target = h.events().iter().find(|a| a.role() == "Target").unwrap();
        assert_eq!(target.object_handles, BTreeSet::from(["Kyiv".to_string()]));
    }

    #[test]
    fn place_comes_from_located_near_relation_sharing_justifications() {
        let h = hypothesis(&[ENTITIES, TARGET, &relation("E_ATT")]);
        let place = place(&h);
        assert_eq!(place.object, ex("E_CITY"));
        assert_eq!(
            place.predicate,
            Node::iri("http://example.org/ldc#Conflict.Attack_Place")
        );
        assert_eq!(place.cluster, ex("VC"));
    }

    #[test]
    fn place_falls_back_to_location_typed_argument() {
        let h = hypothesis(&[ENTITIES, TARGET]);
        assert_eq!(place(&h).object, ex("E_KYIV"));
    }

    #[test]
    fn place_falls_back_to_most_frequent_document_location() {
        let h = hypothesis(&[ENTITIES, &relation("E_RES")]);
        assert_eq!(place(&h).object, ex("E_CITY"));
    }

    #[test]
    fn transport_events_get_no_inferred_place() {
        let text = [ENTITIES, TARGET].concat().replace("Conflict.Attack", "Movement.TransportPerson");
        let graph = parse_turtle(&text, "transport", None).unwrap();
        let h = Hypothesis::from_graph(&graph).unwrap();
        assert!(h.events().iter().all(|a| a.role() != PLACE));
    }

    #[test]
    fn prototype_needs_exactly_one_type() {
        let extra = "ex:V1_T2 rdf:subject ex:V1 ; rdf:predicate rdf:type ; rdf:object ldc:Other .\n";
        let graph = parse_turtle(&[ENTITIES, extra].concat(), "two-types", None).unwrap();
        assert!(matches!(
            Hypothesis::from_graph(&graph),
            Err(HypothesisError::ClusterType { count: 2, .. })
        ));
    }

    #[test]
    fn output_names_follow_the_input_stem() {
        assert_eq!(
            output_file_name(Path::new("/in/H001.ttl"), false),
            "H001_visualization.html"
        );
        assert_eq!(
            output_file_name(Path::new("H001.ttl"), true),
            "H001_visualization_verbose.html"
        );
    }

    #[test]
    fn identifiers_drop_the_mention_word_and_repeats() {
        let h = hypothesis(&[ENTITIES, TARGET]);
        let target = h.events().iter().find(|a| a.role() == "Target").unwrap();
        assert_eq!(identifiers(target, "Kyiv (15:18)"), vec!["GPE"]);
        assert_eq!(identifiers(target, "the city"), vec!["Kyiv", "GPE"]);
    }

    #[test]
    fn visualize_writes_page_and_documents() {
        let dir = tempfile::TempDir::new().unwrap();
        let corpus = corpus(dir.path());
        let h = hypothesis(&[ENTITIES, TARGET, &relation("E_ATT")]);

        let out = dir.path().join("out");
        let file = out.join(output_file_name(Path::new("H1.ttl"), false));
        let written = h.visualize(&out, &file, &corpus, false).unwrap();
        assert_eq!(written, file);
        assert!(out.join("style.css").is_file());
        assert!(out.join("docs/P1_46-53.html").is_file());
        assert!(out.join("docs/P1_7-13.html").is_file());

        let raw = std::fs::read_to_string(&file).unwrap();
        assert!(raw.contains("Kyiv (15:18)</a>, GPE"));
        let html = Html::parse_document(&raw);
        let headings: Vec<String> = html
            .select(&Selector::parse("u").unwrap())
            .map(|u| u.text().collect())
            .collect();
        assert!(headings.contains(&"Event: Conflict.Attack".to_string()));
        assert!(headings.contains(&"Relation: Physical.LocatedNear".to_string()));
        assert!(headings.contains(&"Place:".to_string()));

        let links: Vec<String> = html
            .select(&Selector::parse("a").unwrap())
            .map(|a| a.text().collect())
            .collect();
        assert!(links.contains(&"Kyiv (15:18)".to_string()));
        assert!(links.contains(&"the city (46:53)".to_string()));
        assert!(links.contains(&"V1".to_string()));
    }

    #[test]
    fn verbose_lists_object_details() {
        let dir = tempfile::TempDir::new().unwrap();
        let corpus = corpus(dir.path());
        let h = hypothesis(&[ENTITIES, TARGET]);

        let out = dir.path().join("out");
        let file = out.join(output_file_name(Path::new("H1.ttl"), true));
        h.visualize(&out, &file, &corpus, true).unwrap();
        let html = std::fs::read_to_string(&file).unwrap();
        assert!(html.contains("<li><b>hasName</b>: Kyiv</li>"));
        assert!(html.contains("<li><b>handle</b>: Nothing found</li>"));
        assert!(html.contains("<li><b>type</b>: PER</li>"));
    }
}
