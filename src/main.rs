use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{self, filter::EnvFilter};

use reorder_initializers::config::{ProjectConfig, ReorderConfig};
use reorder_initializers::inputs::collect_source_files;
use reorder_initializers::service::ReorderService;

/// Rewrite constructor initializer lists into member declaration order
#[derive(Parser, Debug)]
#[command(name = "reorder-initializers")]
#[command(about = "Reorder C++ constructor initializer lists to match member declaration order")]
#[command(version)]
struct Args {
    /// Source files or directories to rewrite in place
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Additional include directories (can be specified multiple times)
    #[arg(short = 'I', long = "include-dir", value_name = "DIR")]
    include_dirs: Vec<PathBuf>,

    /// Build directory containing compile_commands.json
    #[arg(short = 'p', long = "build-path", value_name = "DIR")]
    build_path: Option<PathBuf>,

    /// Project configuration file (default: discovered .reorder-initializers.yml)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Compute edits and report them without writing any file
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Skip constructors overlapping syntax errors instead of failing the file
    #[arg(long = "tolerate-parse-errors")]
    tolerate_parse_errors: bool,

    /// Maximum file size to process when walking directories (in bytes)
    #[arg(long = "max-file-size", value_name = "BYTES")]
    max_file_size: Option<u64>,

    /// Print the run summary as JSON on stdout
    #[arg(long = "json")]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Compiler arguments, e.g. `-- -Iinclude -std=c++17`
    #[arg(last = true, value_name = "COMPILER_ARGS")]
    compiler_args: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::debug!("Starting with arguments: {:?}", args);

    let json = args.json;
    let paths = args.paths.clone();
    let config = create_config_from_args(args)?;

    let files = collect_source_files(&paths, &config)?;
    tracing::info!("Processing {} file(s)", files.len());

    let service = ReorderService::new(config)?;
    let summary = service.run(&files);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    tracing::info!(
        "{} edit(s) across {} rewritten file(s), {} failure(s)",
        summary.total_edits,
        summary.files_written,
        summary.failures.len()
    );
    std::process::exit(summary.exit_code());
}

/// Create a ReorderConfig from command line arguments and the project file
fn create_config_from_args(args: Args) -> Result<ReorderConfig> {
    let mut config = ReorderConfig {
        include_dirs: args.include_dirs,
        dry_run: args.dry_run,
        tolerate_parse_errors: args.tolerate_parse_errors,
        build_path: args.build_path,
        compiler_args: args.compiler_args,
        ..ReorderConfig::default()
    };

    let project = match args.config {
        Some(path) => Some(
            ProjectConfig::from_file(&path)
                .with_context(|| format!("loading {}", path.display()))?,
        ),
        None => discover_project_config()?,
    };
    if let Some(project) = project {
        config.merge_project(project);
    }

    // Command line wins over the project file.
    if let Some(max) = args.max_file_size {
        config.max_file_size = max;
    }

    Ok(config)
}

fn discover_project_config() -> Result<Option<ProjectConfig>> {
    let cwd = std::env::current_dir()?;
    if let Some((path, project)) = ProjectConfig::discover(&cwd)? {
        tracing::info!("Using project configuration {}", path.display());
        return Ok(Some(project));
    }

    match ProjectConfig::user_config_path().filter(|p| p.is_file()) {
        Some(path) => {
            tracing::info!("Using user configuration {}", path.display());
            Ok(Some(ProjectConfig::from_file(&path)?))
        }
        None => Ok(None),
    }
}
