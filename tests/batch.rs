//! Batch driver properties, checked with a launcher that records its jobs.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use aida_viz::batch::{
    BatchRunner, FailurePolicy, InlineLauncher, JobLauncher, JobOutcome, VisualizationJob,
};
use aida_viz::corpus::{CorpusWriter, Document};
use aida_viz::error::{BatchError, BatchResult};

/// Records every job; fails the ones whose input file name is listed.
#[derive(Default)]
struct RecordingLauncher {
    jobs: RefCell<Vec<VisualizationJob>>,
    failing: Vec<String>,
}

impl RecordingLauncher {
    fn failing(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    fn inputs(&self) -> Vec<String> {
        self.jobs
            .borrow()
            .iter()
            .map(|j| j.input.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }
}

impl JobLauncher for RecordingLauncher {
    fn name(&self) -> &str {
        "recording"
    }

    fn launch(&self, job: &VisualizationJob) -> BatchResult<JobOutcome> {
        self.jobs.borrow_mut().push(job.clone());
        let name = job.input.file_name().unwrap().to_string_lossy();
        if self.failing.iter().any(|f| *f == name) {
            Ok(JobOutcome::Failed {
                code: Some(2),
                message: "render failed".into(),
            })
        } else {
            Ok(JobOutcome::Succeeded)
        }
    }
}

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            dir: tempfile::TempDir::new().unwrap(),
        };
        std::fs::write(ws.database(), b"").unwrap();
        ws
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn database(&self) -> PathBuf {
        self.path("documents.sqlite")
    }

    fn out(&self) -> PathBuf {
        self.path("out")
    }

    /// Create the input files and a manifest listing `lines` verbatim.
    fn manifest(&self, lines: &[&str]) -> PathBuf {
        for line in lines {
            let name = line.trim();
            if !name.is_empty() && !name.starts_with("missing") {
                std::fs::write(self.path(name), "").unwrap();
            }
        }
        let text: Vec<String> = lines
            .iter()
            .map(|line| {
                let name = line.trim();
                if name.is_empty() {
                    line.to_string()
                } else {
                    line.replace(name, &self.path(name).display().to_string())
                }
            })
            .collect();
        let manifest = self.path("manifest.txt");
        std::fs::write(&manifest, text.join("\n")).unwrap();
        manifest
    }

    fn run(&self, launcher: &dyn JobLauncher, policy: FailurePolicy, manifest: &Path) -> aida_viz::batch::BatchReport {
        BatchRunner::new(launcher, policy)
            .run(manifest, &self.database(), &self.out())
            .unwrap()
    }
}

#[test]
fn one_launch_per_line_in_file_order() {
    let ws = Workspace::new();
    let manifest = ws.manifest(&["c.ttl", "a.ttl", "b.ttl"]);
    let launcher = RecordingLauncher::default();

    let report = ws.run(&launcher, FailurePolicy::Continue, &manifest);
    assert_eq!(launcher.inputs(), ["c.ttl", "a.ttl", "b.ttl"]);
    assert_eq!(report.attempted, 3);
    assert_eq!(report.succeeded, 3);
    assert!(report.is_success());
}

#[test]
fn only_the_input_changes_between_jobs() {
    let ws = Workspace::new();
    let manifest = ws.manifest(&["a.ttl", "b.ttl"]);
    let launcher = RecordingLauncher::default();
    ws.run(&launcher, FailurePolicy::Continue, &manifest);

    let jobs = launcher.jobs.borrow();
    assert_eq!(jobs[0].input, ws.path("a.ttl"));
    assert_eq!(jobs[1].input, ws.path("b.ttl"));
    for job in jobs.iter() {
        assert_eq!(job.database, ws.database());
        assert_eq!(job.output_dir, ws.out());
    }
    assert!(ws.out().is_dir());
}

#[test]
fn empty_manifest_launches_nothing() {
    let ws = Workspace::new();
    let manifest = ws.manifest(&[]);
    let launcher = RecordingLauncher::default();

    let report = ws.run(&launcher, FailurePolicy::Continue, &manifest);
    assert!(launcher.inputs().is_empty());
    assert_eq!(report.attempted, 0);
    assert!(report.is_success());
}

#[test]
fn blank_lines_launch_nothing() {
    let ws = Workspace::new();
    let manifest = ws.manifest(&["", "  a.ttl  ", "   ", "\t", "b.ttl", ""]);
    let launcher = RecordingLauncher::default();

    let report = ws.run(&launcher, FailurePolicy::Continue, &manifest);
    assert_eq!(launcher.inputs(), ["a.ttl", "b.ttl"]);
    assert_eq!(report.attempted, 2);
}

#[test]
fn missing_input_is_recorded_without_launch() {
    let ws = Workspace::new();
    let manifest = ws.manifest(&["a.ttl", "missing.ttl", "b.ttl"]);
    let launcher = RecordingLauncher::default();

    let report = ws.run(&launcher, FailurePolicy::Continue, &manifest);
    assert_eq!(launcher.inputs(), ["a.ttl", "b.ttl"]);
    assert_eq!(report.attempted, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].line_number, 2);
    assert_eq!(report.failures[0].message, "input not found");
    assert!(!report.halted);
}

#[test]
fn failures_continue_by_default() {
    let ws = Workspace::new();
    let manifest = ws.manifest(&["a.ttl", "b.ttl", "c.ttl"]);
    let launcher = RecordingLauncher::failing(&["b.ttl"]);

    let report = ws.run(&launcher, FailurePolicy::Continue, &manifest);
    assert_eq!(launcher.inputs(), ["a.ttl", "b.ttl", "c.ttl"]);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failures[0].code, Some(2));
    assert!(!report.is_success());
}

#[test]
fn halt_policy_stops_at_first_failure() {
    let ws = Workspace::new();
    let manifest = ws.manifest(&["a.ttl", "b.ttl", "c.ttl"]);
    let launcher = RecordingLauncher::failing(&["b.ttl"]);

    let report = ws.run(&launcher, FailurePolicy::Halt, &manifest);
    assert_eq!(launcher.inputs(), ["a.ttl", "b.ttl"]);
    assert_eq!(report.attempted, 2);
    assert!(report.halted);
}

#[test]
fn unreadable_line_is_a_job_failure() {
    let ws = Workspace::new();
    for name in ["a.ttl", "b.ttl"] {
        std::fs::write(ws.path(name), "").unwrap();
    }
    let manifest = ws.path("manifest.txt");
    let mut bytes = ws.path("a.ttl").display().to_string().into_bytes();
    bytes.extend_from_slice(b"\n\xff\xfe\n");
    bytes.extend_from_slice(ws.path("b.ttl").display().to_string().as_bytes());
    std::fs::write(&manifest, bytes).unwrap();

    let launcher = RecordingLauncher::default();
    let report = ws.run(&launcher, FailurePolicy::Continue, &manifest);
    assert_eq!(launcher.inputs(), ["a.ttl", "b.ttl"]);
    assert_eq!(report.attempted, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].line_number, 2);

    let launcher = RecordingLauncher::default();
    let report = ws.run(&launcher, FailurePolicy::Halt, &manifest);
    assert_eq!(launcher.inputs(), ["a.ttl"]);
    assert_eq!(report.succeeded, 1);
    assert!(report.halted);
}

#[test]
fn missing_manifest_is_a_setup_error() {
    let ws = Workspace::new();
    let launcher = RecordingLauncher::default();
    let err = BatchRunner::new(&launcher, FailurePolicy::Continue)
        .run(&ws.path("nope.txt"), &ws.database(), &ws.out())
        .unwrap_err();
    assert!(matches!(err, BatchError::Manifest { .. }));
    assert!(launcher.inputs().is_empty());
}

#[test]
fn inline_launcher_renders_each_input() {
    let ws = Workspace::new();
    std::fs::remove_file(ws.database()).unwrap();
    CorpusWriter::create(&ws.database())
        .unwrap()
        .insert_documents([Document {
            parent_id: "P1".into(),
            child_id: "C1".into(),
            lang_id: "eng".into(),
            fulltext: "Troops entered Kyiv on Monday.".into(),
        }])
        .unwrap();

    let aif = r#"
@prefix aida: <http://example.org/aida#> .
@prefix ex: <http://example.org/data/> .
ex:E1 a aida:Entity ; aida:hasName "Kyiv" ; aida:informativeJustification ex:J1 .
ex:J1 a aida:TextJustification ; aida:source "C1" ;
    aida:startOffset 15 ; aida:endOffsetInclusive 18 .
"#;
    let manifest = ws.manifest(&["h1.ttl", "h2.ttl"]);
    std::fs::write(ws.path("h1.ttl"), aif).unwrap();
    std::fs::write(ws.path("h2.ttl"), "this is not turtle").unwrap();

    let launcher = InlineLauncher::default();
    let report = ws.run(&launcher, FailurePolicy::Continue, &manifest);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].line_number, 2);
    assert!(ws.out().join("h1_visualization.html").is_file());
    assert!(ws.out().join("docs/P1_15-18.html").is_file());
}
