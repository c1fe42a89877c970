//! aida-viz CLI: AIF visualization and batch driver.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};

use aida_viz::aif;
use aida_viz::batch::{
    BatchRunner, ContainerLauncher, FailurePolicy, InlineLauncher, JobLauncher, ProcessLauncher,
    RenderOptions,
};
use aida_viz::config::{DEFAULT_AIF_VAR, DEFAULT_DB_VAR, DEFAULT_OUT_VAR, VizConfig};
use aida_viz::corpus::{Corpus, ldc};
use aida_viz::elements::ElementSet;
use aida_viz::export::export_elements;
use aida_viz::paths::VizPaths;
use aida_viz::pipeline::{self, RenderRequest};
use aida_viz::render::clusters::write_cluster_pages;

#[derive(Parser)]
#[command(name = "aida-viz", version, about = "Visualize AIF knowledge graphs as HTML")]
struct Cli {
    /// Configuration file (TOML). Defaults to $XDG_CONFIG_HOME/aida-viz/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one visualization job per line of a manifest, sequentially.
    Batch {
        /// File listing one Turtle input path per line.
        manifest: PathBuf,
        /// Corpus database shared by every job.
        database: PathBuf,
        /// Output directory shared by every job.
        out_dir: PathBuf,

        /// How each job is run.
        #[arg(long, value_enum, default_value_t = LauncherKind::Container)]
        launcher: LauncherKind,

        /// Stop at the first failed job.
        #[arg(long)]
        fail_fast: bool,

        /// Container image (overrides the config file).
        #[arg(long)]
        image: Option<String>,

        /// Container runtime binary (overrides the config file).
        #[arg(long)]
        runtime: Option<String>,

        /// Write the batch report as JSON to this file.
        #[arg(long)]
        report: Option<PathBuf>,

        #[command(flatten)]
        render: RenderFlags,
    },

    /// Visualize one AIF file.
    Render {
        /// AIF file to be visualized.
        #[arg(short, long, env = DEFAULT_AIF_VAR)]
        aif_file: Option<PathBuf>,

        /// Corpus database containing the documents the AIF file refers to.
        #[arg(short, long, env = DEFAULT_DB_VAR)]
        db: Option<PathBuf>,

        /// Output directory. Files matching the naming scheme are overwritten.
        #[arg(short, long, env = DEFAULT_OUT_VAR)]
        out: Option<PathBuf>,

        #[command(flatten)]
        render: RenderFlags,
    },

    /// Write one page per cluster with more than one member.
    Clusters {
        /// AIF file to be visualized.
        #[arg(short, long)]
        aif_file: PathBuf,

        /// Corpus database.
        #[arg(short, long)]
        corpus: PathBuf,

        /// Output directory.
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Build a corpus database from an extracted LDC source corpus.
    BuildCorpus {
        /// Extracted LDC corpus directory.
        #[arg(short, long)]
        ldc_dir: PathBuf,

        /// Database file to create.
        #[arg(short, long)]
        write_to: PathBuf,

        /// Directory inside the corpus holding `docs/` and `data/`.
        #[arg(long)]
        prefix: Option<PathBuf>,
    },

    /// Print the elements of an AIF file as JSON.
    Export {
        /// AIF file to read.
        #[arg(short, long)]
        aif_file: PathBuf,
    },
}

#[derive(clap::Args, Clone, Copy)]
struct RenderFlags {
    /// List every field of each hypothesis argument.
    #[arg(short, long)]
    verbose: bool,

    /// Render the hypothesis view (events and relations by cluster).
    #[arg(long)]
    by_clusters: bool,

    /// Also write a tab-separated element dump.
    #[arg(long)]
    pretty_print: bool,
}

impl From<RenderFlags> for RenderOptions {
    fn from(flags: RenderFlags) -> Self {
        Self {
            verbose: flags.verbose,
            by_clusters: flags.by_clusters,
            pretty_print: flags.pretty_print,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LauncherKind {
    /// Run the visualizer image with the container runtime.
    Container,
    /// Run this executable as a child process.
    Process,
    /// Render in this process.
    Inline,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let paths = VizPaths::resolve().ok();
    let config = VizConfig::discover(cli.config.as_deref(), paths.as_ref())?;

    match cli.command {
        Commands::Batch {
            manifest,
            database,
            out_dir,
            launcher,
            fail_fast,
            image,
            runtime,
            report,
            render,
        } => {
            let mut config = config;
            if let Some(image) = image {
                config.container.image = image;
            }
            if let Some(runtime) = runtime {
                config.container.runtime = runtime;
            }
            let options = RenderOptions::from(render);
            let launcher: Box<dyn JobLauncher> = match launcher {
                LauncherKind::Container => Box::new(ContainerLauncher::from_config(&config, options)),
                LauncherKind::Process => Box::new(
                    ProcessLauncher::current(config.env.clone(), options)?
                        .with_config_file(cli.config.clone()),
                ),
                LauncherKind::Inline => Box::new(InlineLauncher::new(config.clone(), options)),
            };
            let policy = if fail_fast || config.batch.fail_fast {
                FailurePolicy::Halt
            } else {
                FailurePolicy::Continue
            };

            let result = BatchRunner::new(launcher.as_ref(), policy).run(&manifest, &database, &out_dir)?;
            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&result).into_diagnostic()?;
                std::fs::write(&path, json).into_diagnostic()?;
            }

            println!(
                "Batch: {} attempted, {} succeeded, {} failed{}",
                result.attempted,
                result.succeeded,
                result.failures.len(),
                if result.halted { " (halted)" } else { "" }
            );
            for failure in &result.failures {
                println!(
                    "  line {}: {}: {}",
                    failure.line_number,
                    failure.input.display(),
                    failure.message
                );
            }
            if !result.is_success() {
                miette::bail!("{} of {} jobs failed", result.failures.len(), result.attempted);
            }
        }

        Commands::Render {
            aif_file,
            db,
            out,
            render,
        } => {
            let Some(aif_file) = aif_file.or_else(|| env_path(&config.env.aif_var)) else {
                miette::bail!("no AIF file given: pass --aif-file or set {}", config.env.aif_var);
            };
            let database = db
                .or_else(|| env_path(&config.env.db_var))
                .or_else(|| config.render.database.clone())
                .or_else(|| paths.as_ref().map(VizPaths::default_database));
            let Some(database) = database else {
                miette::bail!("no corpus database given: pass --db or set {}", config.env.db_var);
            };
            let out_dir = out
                .or_else(|| env_path(&config.env.out_var))
                .unwrap_or_else(|| PathBuf::from("./visualizer_results"));

            let options = RenderOptions::from(render);
            let request = RenderRequest {
                aif_file,
                database,
                out_dir,
                verbose: options.verbose,
                by_clusters: options.by_clusters,
                pretty_print: options.pretty_print,
            };
            let report = pipeline::render(&request, &config)?;
            println!("Visualization: {}", report.display());
        }

        Commands::Clusters {
            aif_file,
            corpus,
            out,
        } => {
            let graph = aif::load(&aif_file, config.render.aida_namespace.as_deref())?;
            let corpus = Corpus::open(&corpus)?;
            let pages = write_cluster_pages(&graph, &corpus, &out)?;
            println!("Wrote {} cluster pages to {}", pages.len(), out.display());
        }

        Commands::BuildCorpus {
            ldc_dir,
            write_to,
            prefix,
        } => {
            let count = ldc::build_corpus(&ldc_dir, &write_to, prefix.as_deref())?;
            println!("Wrote {count} documents to {}", write_to.display());
        }

        Commands::Export { aif_file } => {
            let graph = aif::load(&aif_file, config.render.aida_namespace.as_deref())?;
            let elements = ElementSet::from_graph(&graph)?;
            let json = serde_json::to_string_pretty(&export_elements(&elements)).into_diagnostic()?;
            println!("{json}");
        }
    }

    Ok(())
}

/// A non-empty path from the environment variable `name`.
fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
