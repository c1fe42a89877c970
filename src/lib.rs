// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # aida-viz
//!
//! Static HTML visualization of AIDA Interchange Format (AIF) knowledge graphs.
//!
//! An AIF file in Turtle syntax is loaded into an indexed graph, its clusters,
//! entities, events and relations are extracted, and every justification is
//! rendered against the source document text held in a SQLite corpus database.
//!
//! ## Architecture
//!
//! - **Graph** (`aif`): Turtle parsing via oxigraph into a dual-indexed triple set
//! - **Elements** (`elements`, `hypothesis`): element and cluster views of the graph
//! - **Corpus** (`corpus`): SQLite document store, built from LDC LTF source data
//! - **Rendering** (`documents`, `render`): highlighted document pages and reports
//! - **Batch** (`manifest`, `batch`): one job per manifest line, strictly sequential
//!
//! ## Library usage
//!
//! ```no_run
//! use std::path::Path;
//! use aida_viz::config::VizConfig;
//! use aida_viz::pipeline::{render, RenderRequest};
//!
//! let request = RenderRequest::new("H001.ttl", "documents.sqlite", "visualizer_results");
//! let report = render(&request, &VizConfig::default()).unwrap();
//! assert!(report.starts_with(Path::new("visualizer_results")));
//! ```

pub mod aif;
pub mod batch;
pub mod config;
pub mod corpus;
pub mod documents;
pub mod elements;
pub mod error;
pub mod export;
pub mod hypothesis;
pub mod manifest;
pub mod paths;
pub mod pipeline;
pub mod progress;
pub mod render;
