//! `snapshots`: the command-line interface for build-output snapshots.
//!
//! Provides `snapshots digest` for writing tracker files from inside a build,
//! `snapshots collect` for assembling a snapshot from a build, `snapshots
//! diff` for comparing two snapshots, and `push`/`get`/`tag` for publishing
//! snapshots to storage.

#![warn(missing_docs)]

mod collect;
mod diff;
mod digest;
mod get;
mod push;
mod tag;
mod workspace;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use snap_diff::DiffFormat;
use tracing_subscriber::EnvFilter;

/// Snapshots: track which build targets changed between builds.
#[derive(Parser, Debug)]
#[command(name = "snapshots", version, about = "Build output snapshots")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `snapshots.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Workspace directory (defaults to `BUILD_WORKSPACE_DIRECTORY`, then
    /// the current directory).
    #[arg(long, global = true)]
    pub workspace_path: Option<PathBuf>,

    /// Storage URL for pushed snapshots, e.g. `file:///srv/snapshots`.
    #[arg(long, global = true)]
    pub storage_url: Option<String>,

    /// Prefix for this workspace's objects in storage.
    #[arg(long, global = true)]
    pub workspace_name: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a tracker file digesting a set of input files.
    Digest(DigestArgs),
    /// Build and collect a snapshot of the workspace.
    Collect(CollectArgs),
    /// Show which labels changed between two snapshots.
    Diff(DiffArgs),
    /// Print a stored snapshot.
    Get(GetArgs),
    /// Store a snapshot file.
    Push(PushArgs),
    /// Tag a stored snapshot.
    Tag(TagArgs),
}

/// Arguments for the `snapshots digest` subcommand.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Input files to digest.
    pub paths: Vec<PathBuf>,

    /// Additional input files (repeatable).
    #[arg(long = "in-paths")]
    pub in_paths: Vec<PathBuf>,

    /// File listing more input files, one per line.
    #[arg(long)]
    pub inputs_file: Option<PathBuf>,

    /// Run identifier recorded in the tracker (repeatable).
    #[arg(long)]
    pub run: Vec<String>,

    /// Tag recorded in the tracker (repeatable).
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Tracker output path. Printed to stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Build and cache flags shared by `collect` and `diff`.
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Path to the `bazel` executable.
    #[arg(long)]
    pub bazel_path: Option<String>,

    /// Extra bazelrc file for the build.
    #[arg(long)]
    pub bazelrc: Option<String>,

    /// Target expression to build.
    #[arg(long)]
    pub expression: Option<String>,

    /// Output group carrying tracker files.
    #[arg(long)]
    pub output_group: Option<String>,

    /// Read build events from this file instead of running a build.
    #[arg(long)]
    pub build_events: Option<String>,

    /// Use TLS for remote cache connections.
    #[arg(long)]
    pub cache_tls: bool,

    /// Remote cache request metadata as `key=value` (repeatable).
    #[arg(long)]
    pub cache_metadata: Vec<String>,

    /// Maximum tracker reads in flight.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Show the build tool's stderr.
    #[arg(long)]
    pub bazel_stderr: bool,
}

/// Arguments for the `snapshots collect` subcommand.
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Build and cache settings.
    #[command(flatten)]
    pub build: BuildArgs,

    /// Write the snapshot here (workspace-relative unless absolute) instead
    /// of stdout.
    #[arg(long)]
    pub out: Option<String>,

    /// Do not print the snapshot when no `--out` is given.
    #[arg(long)]
    pub no_print: bool,

    /// Push the collected snapshot to storage.
    #[arg(long)]
    pub push: bool,

    /// Name for the pushed snapshot (defaults to the git `HEAD` commit).
    #[arg(long)]
    pub name: Option<String>,
}

/// Arguments for the `snapshots diff` subcommand.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Snapshot to compare from: a file, tag or snapshot name.
    pub from: String,

    /// Snapshot to compare to. Collected from the workspace when omitted.
    pub to: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Label)]
    pub format: OutputFormat,

    /// Also print the table format to stderr.
    #[arg(long)]
    pub stderr_pretty: bool,

    /// Build and cache settings for collecting the `to` snapshot.
    #[command(flatten)]
    pub build: BuildArgs,
}

/// Arguments for the `snapshots get` subcommand.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Tag, snapshot name or unique name prefix.
    pub name: String,

    /// Do not look the name up as a tag.
    #[arg(long)]
    pub skip_tags: bool,

    /// Do not look the name up as a snapshot name.
    #[arg(long)]
    pub skip_names: bool,
}

/// Arguments for the `snapshots push` subcommand.
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Snapshot file to push (workspace-relative unless absolute).
    #[arg(long)]
    pub snapshot_path: String,

    /// Snapshot name (defaults to the git `HEAD` commit).
    #[arg(long)]
    pub name: Option<String>,
}

/// Arguments for the `snapshots tag` subcommand.
#[derive(Args, Debug)]
pub struct TagArgs {
    /// The tag to set.
    pub tag: String,

    /// Snapshot to tag (defaults to the git `HEAD` commit).
    #[arg(long)]
    pub name: Option<String>,
}

/// Diff output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Added and changed labels, one per line.
    Label,
    /// JSON array of changes.
    Json,
    /// Human-readable table.
    Pretty,
}

impl From<OutputFormat> for DiffFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Label => DiffFormat::Label,
            OutputFormat::Json => DiffFormat::Json,
            OutputFormat::Pretty => DiffFormat::Pretty,
        }
    }
}

/// Global settings derived from CLI flags.
#[derive(Debug, Default)]
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<PathBuf>,
    /// Explicit workspace directory.
    pub workspace_path: Option<PathBuf>,
    /// Storage URL override.
    pub storage_url: Option<String>,
    /// Workspace name override.
    pub workspace_name: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
        workspace_path: cli.workspace_path,
        storage_url: cli.storage_url,
        workspace_name: cli.workspace_name,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Digest(ref args) => digest::run(args),
        Command::Collect(ref args) => collect::run(args, &global).await,
        Command::Diff(ref args) => diff::run(args, &global).await,
        Command::Get(ref args) => get::run(args, &global),
        Command::Push(ref args) => push::run(args, &global).await,
        Command::Tag(ref args) => tag::run(args, &global).await,
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            process::exit(1);
        }
    }
}

/// Logs go to stderr so that stdout stays machine-readable.
fn init_tracing(global: &GlobalArgs) {
    let level = if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
