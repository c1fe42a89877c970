//! Sequential batch driver.
//!
//! A [`BatchRunner`] reads a manifest top to bottom and hands one
//! [`VisualizationJob`] per non-blank line to a [`JobLauncher`], waiting for
//! each job to finish before reading the next line. Three launchers exist:
//!
//! - [`ContainerLauncher`] runs the visualizer image with the three job paths
//!   bind-mounted and passed through environment variables.
//! - [`ProcessLauncher`] runs `aida-viz render` as a child process.
//! - [`InlineLauncher`] calls the render pipeline in-process.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_AIF_VAR, DEFAULT_DB_VAR, DEFAULT_OUT_VAR, EnvConfig, VizConfig};
use crate::error::{BatchError, BatchResult};
use crate::manifest::{Manifest, ManifestEntry};
use crate::pipeline::{self, RenderRequest};

/// The three paths one visualization job runs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualizationJob {
    pub input: PathBuf,
    pub database: PathBuf,
    pub output_dir: PathBuf,
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    Failed { code: Option<i32>, message: String },
}

impl JobOutcome {
    fn from_status(what: &str, status: ExitStatus) -> Self {
        if status.success() {
            Self::Succeeded
        } else {
            Self::Failed {
                code: status.code(),
                message: format!("{what} exited with {status}"),
            }
        }
    }
}

/// Runs one job to completion.
///
/// `Err` means the job could not be started at all; a job that ran and
/// failed is `Ok(JobOutcome::Failed { .. })`.
pub trait JobLauncher {
    fn name(&self) -> &str;
    fn launch(&self, job: &VisualizationJob) -> BatchResult<JobOutcome>;
}

/// What the runner does after a failed job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and go on with the next manifest line.
    #[default]
    Continue,
    /// Record the failure and stop.
    Halt,
}

/// Render flags forwarded to every job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub verbose: bool,
    pub by_clusters: bool,
    pub pretty_print: bool,
}

impl RenderOptions {
    /// Command-line flags for `aida-viz render`.
    pub fn args(&self) -> Vec<&'static str> {
        let mut args = Vec::new();
        if self.verbose {
            args.push("--verbose");
        }
        if self.by_clusters {
            args.push("--by-clusters");
        }
        if self.pretty_print {
            args.push("--pretty-print");
        }
        args
    }

    pub fn request(&self, job: &VisualizationJob) -> RenderRequest {
        RenderRequest {
            aif_file: job.input.clone(),
            database: job.database.clone(),
            out_dir: job.output_dir.clone(),
            verbose: self.verbose,
            by_clusters: self.by_clusters,
            pretty_print: self.pretty_print,
        }
    }
}

fn launch_error(launcher: &str, job: &VisualizationJob, e: std::io::Error) -> BatchError {
    BatchError::Launch {
        launcher: launcher.to_string(),
        input: job.input.display().to_string(),
        message: e.to_string(),
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

// ---------------------------------------------------------------------------
// Container launcher
// ---------------------------------------------------------------------------

/// Runs each job in a fresh container of the visualizer image.
#[derive(Debug, Clone)]
pub struct ContainerLauncher {
    pub runtime: String,
    pub image: String,
    pub mount_root: String,
    pub env: EnvConfig,
    pub options: RenderOptions,
}

impl ContainerLauncher {
    pub fn from_config(config: &VizConfig, options: RenderOptions) -> Self {
        Self {
            runtime: config.container.runtime.clone(),
            image: config.container.image.clone(),
            mount_root: config.container.mount_root.trim_end_matches('/').to_string(),
            env: config.env.clone(),
            options,
        }
    }

    /// Environment for the container. The host config is not mounted, so the
    /// `render` inside only knows the default variable names; those are always
    /// set, and configured names that differ are set as well.
    fn env_bindings<'a>(
        &'a self,
        input: &'a str,
        database: &'a str,
        output: &'a str,
    ) -> Vec<(&'a str, &'a str)> {
        let mut bindings = Vec::with_capacity(6);
        for (default, configured, value) in [
            (DEFAULT_AIF_VAR, self.env.aif_var.as_str(), input),
            (DEFAULT_DB_VAR, self.env.db_var.as_str(), database),
            (DEFAULT_OUT_VAR, self.env.out_var.as_str(), output),
        ] {
            bindings.push((default, value));
            if configured != default {
                bindings.push((configured, value));
            }
        }
        bindings
    }

    /// `<runtime> run --rm -v … -e … <image> [render flags]`.
    ///
    /// The input and database are mounted read-only under their own file
    /// names; the output directory is mounted read-write.
    pub fn command_for(&self, job: &VisualizationJob) -> Command {
        let file_name = |p: &Path| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        let input = format!("{}/input/{}", self.mount_root, file_name(&job.input));
        let database = format!("{}/db/{}", self.mount_root, file_name(&job.database));
        let output = format!("{}/out", self.mount_root);

        let mut cmd = Command::new(&self.runtime);
        cmd.args(["run", "--rm"])
            .arg("-v")
            .arg(format!("{}:{input}:ro", absolute(&job.input).display()))
            .arg("-v")
            .arg(format!("{}:{database}:ro", absolute(&job.database).display()))
            .arg("-v")
            .arg(format!("{}:{output}", absolute(&job.output_dir).display()));
        for (name, value) in self.env_bindings(&input, &database, &output) {
            cmd.arg("-e").arg(format!("{name}={value}"));
        }
        cmd.arg(&self.image).args(self.options.args());
        cmd
    }
}

impl JobLauncher for ContainerLauncher {
    fn name(&self) -> &str {
        "container"
    }

    fn launch(&self, job: &VisualizationJob) -> BatchResult<JobOutcome> {
        let status = self
            .command_for(job)
            .status()
            .map_err(|e| launch_error(self.name(), job, e))?;
        Ok(JobOutcome::from_status(&self.runtime, status))
    }
}

// ---------------------------------------------------------------------------
// Process launcher
// ---------------------------------------------------------------------------

/// Runs `aida-viz render` as a child process, paths passed through the
/// environment.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    pub executable: PathBuf,
    pub env: EnvConfig,
    pub config_file: Option<PathBuf>,
    pub options: RenderOptions,
}

impl ProcessLauncher {
    pub fn new(executable: impl Into<PathBuf>, env: EnvConfig, options: RenderOptions) -> Self {
        Self {
            executable: executable.into(),
            env,
            config_file: None,
            options,
        }
    }

    /// Launch the currently running executable.
    pub fn current(env: EnvConfig, options: RenderOptions) -> BatchResult<Self> {
        let executable = std::env::current_exe().map_err(|e| BatchError::Launch {
            launcher: "process".into(),
            input: String::new(),
            message: format!("cannot locate the running executable: {e}"),
        })?;
        Ok(Self::new(executable, env, options))
    }

    pub fn with_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_file = path;
        self
    }

    pub fn command_for(&self, job: &VisualizationJob) -> Command {
        let mut cmd = Command::new(&self.executable);
        if let Some(config) = &self.config_file {
            cmd.arg("--config").arg(config);
        }
        cmd.arg("render")
            .args(self.options.args())
            .env(&self.env.aif_var, &job.input)
            .env(&self.env.db_var, &job.database)
            .env(&self.env.out_var, &job.output_dir);
        cmd
    }
}

impl JobLauncher for ProcessLauncher {
    fn name(&self) -> &str {
        "process"
    }

    fn launch(&self, job: &VisualizationJob) -> BatchResult<JobOutcome> {
        let status = self
            .command_for(job)
            .status()
            .map_err(|e| launch_error(self.name(), job, e))?;
        Ok(JobOutcome::from_status(
            &self.executable.display().to_string(),
            status,
        ))
    }
}

// ---------------------------------------------------------------------------
// Inline launcher
// ---------------------------------------------------------------------------

/// Runs the render pipeline in the current process.
#[derive(Debug, Clone, Default)]
pub struct InlineLauncher {
    pub config: VizConfig,
    pub options: RenderOptions,
}

impl InlineLauncher {
    pub fn new(config: VizConfig, options: RenderOptions) -> Self {
        Self { config, options }
    }
}

impl JobLauncher for InlineLauncher {
    fn name(&self) -> &str {
        "inline"
    }

    fn launch(&self, job: &VisualizationJob) -> BatchResult<JobOutcome> {
        match pipeline::render(&self.options.request(job), &self.config) {
            Ok(_) => Ok(JobOutcome::Succeeded),
            Err(err) => Ok(JobOutcome::Failed {
                code: None,
                message: err.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// A job that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobFailure {
    pub line_number: usize,
    pub input: PathBuf,
    pub code: Option<i32>,
    pub message: String,
}

/// Summary of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Manifest entries taken up, including ones that failed before launch.
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<JobFailure>,
    /// Whether the run stopped early under [`FailurePolicy::Halt`].
    pub halted: bool,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct BatchRunner<'l> {
    launcher: &'l dyn JobLauncher,
    policy: FailurePolicy,
}

impl<'l> BatchRunner<'l> {
    pub fn new(launcher: &'l dyn JobLauncher, policy: FailurePolicy) -> Self {
        Self { launcher, policy }
    }

    /// Run one job per non-blank manifest line, in file order, one at a time.
    ///
    /// The database must exist and the output directory is created before the
    /// manifest is read. A manifest line that cannot be read counts as a
    /// failed job.
    pub fn run(&self, manifest: &Path, database: &Path, output_dir: &Path) -> BatchResult<BatchReport> {
        if !database.is_file() {
            return Err(BatchError::DatabaseNotFound {
                path: database.display().to_string(),
            });
        }
        std::fs::create_dir_all(output_dir).map_err(|e| BatchError::OutputDir {
            path: output_dir.display().to_string(),
            source: e,
        })?;

        let mut report = BatchReport::default();
        for entry in Manifest::open(manifest)? {
            report.attempted += 1;
            let failure = match entry {
                Ok(entry) => self.run_entry(&entry, database, output_dir),
                Err(BatchError::ManifestLine {
                    line_number,
                    line,
                    source,
                    ..
                }) => Some(JobFailure {
                    line_number,
                    input: PathBuf::from(line),
                    code: None,
                    message: format!("unreadable manifest line: {source}"),
                }),
                Err(err) => return Err(err),
            };

            let Some(failure) = failure else {
                report.succeeded += 1;
                continue;
            };
            tracing::warn!(
                line = failure.line_number,
                input = %failure.input.display(),
                message = %failure.message,
                "job failed"
            );
            report.failures.push(failure);
            if self.policy == FailurePolicy::Halt {
                report.halted = true;
                break;
            }
        }

        tracing::info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failures.len(),
            halted = report.halted,
            "batch finished"
        );
        Ok(report)
    }

    /// Launch the job for one manifest entry; `None` when it succeeded.
    fn run_entry(
        &self,
        entry: &ManifestEntry,
        database: &Path,
        output_dir: &Path,
    ) -> Option<JobFailure> {
        let job = entry.job(database, output_dir);
        let (code, message) = if !job.input.is_file() {
            (None, "input not found".to_string())
        } else {
            tracing::info!(
                launcher = self.launcher.name(),
                line = entry.line_number,
                input = %job.input.display(),
                "launching job"
            );
            match self.launcher.launch(&job) {
                Ok(JobOutcome::Succeeded) => return None,
                Ok(JobOutcome::Failed { code, message }) => (code, message),
                Err(err) => (None, err.to_string()),
            }
        };
        Some(JobFailure {
            line_number: entry.line_number,
            input: job.input,
            code,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> VisualizationJob {
        VisualizationJob {
            input: PathBuf::from("/data/in/H001.ttl"),
            database: PathBuf::from("/data/corpus.sqlite"),
            output_dir: PathBuf::from("/data/out"),
        }
    }

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn container_command_mounts_paths_and_sets_env() {
        let launcher = ContainerLauncher::from_config(&VizConfig::default(), RenderOptions::default());
        let cmd = launcher.command_for(&job());
        assert_eq!(cmd.get_program(), "docker");
        assert_eq!(
            args(&cmd),
            [
                "run",
                "--rm",
                "-v",
                "/data/in/H001.ttl:/aida/input/H001.ttl:ro",
                "-v",
                "/data/corpus.sqlite:/aida/db/corpus.sqlite:ro",
                "-v",
                "/data/out:/aida/out",
                "-e",
                "AIDA_VIZ_AIF=/aida/input/H001.ttl",
                "-e",
                "AIDA_VIZ_DB=/aida/db/corpus.sqlite",
                "-e",
                "AIDA_VIZ_OUT=/aida/out",
                "aida-viz:latest",
            ]
        );
    }

    #[test]
    fn container_always_sets_default_env_names() {
        let mut config = VizConfig::default();
        config.env.aif_var = "HYPOTHESIS".into();
        let launcher = ContainerLauncher::from_config(&config, RenderOptions::default());
        let args = args(&launcher.command_for(&job()));
        let env: Vec<&str> = args
            .iter()
            .zip(args.iter().skip(1))
            .filter(|(flag, _)| *flag == "-e")
            .map(|(_, value)| value.as_str())
            .collect();
        assert_eq!(
            env,
            [
                "AIDA_VIZ_AIF=/aida/input/H001.ttl",
                "HYPOTHESIS=/aida/input/H001.ttl",
                "AIDA_VIZ_DB=/aida/db/corpus.sqlite",
                "AIDA_VIZ_OUT=/aida/out",
            ]
        );
    }

    #[test]
    fn process_command_passes_paths_through_env() {
        let options = RenderOptions {
            by_clusters: true,
            ..RenderOptions::default()
        };
        let launcher = ProcessLauncher::new("/usr/bin/aida-viz", EnvConfig::default(), options);
        let cmd = launcher.command_for(&job());
        assert_eq!(args(&cmd), ["render", "--by-clusters"]);

        let envs: Vec<(String, String)> = cmd
            .get_envs()
            .filter_map(|(k, v)| Some((k.to_string_lossy().into_owned(), v?.to_string_lossy().into_owned())))
            .collect();
        assert!(envs.contains(&("AIDA_VIZ_AIF".into(), "/data/in/H001.ttl".into())));
        assert!(envs.contains(&("AIDA_VIZ_DB".into(), "/data/corpus.sqlite".into())));
        assert!(envs.contains(&("AIDA_VIZ_OUT".into(), "/data/out".into())));
    }

    #[test]
    fn report_serializes_to_json() {
        let report = BatchReport {
            attempted: 2,
            succeeded: 1,
            failures: vec![JobFailure {
                line_number: 2,
                input: PathBuf::from("b.ttl"),
                code: Some(1),
                message: "boom".into(),
            }],
            halted: false,
        };
        assert!(!report.is_success());
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["failures"][0]["line_number"], 2);
        assert_eq!(json["succeeded"], 1);
    }

    #[test]
    fn missing_database_aborts_before_reading_manifest() {
        let dir = tempfile::TempDir::new().unwrap();
        let launcher = InlineLauncher::default();
        let err = BatchRunner::new(&launcher, FailurePolicy::Continue)
            .run(
                &dir.path().join("manifest.txt"),
                &dir.path().join("missing.sqlite"),
                &dir.path().join("out"),
            )
            .unwrap_err();
        assert!(matches!(err, BatchError::DatabaseNotFound { .. }));
        assert!(!dir.path().join("out").exists());
    }
}
