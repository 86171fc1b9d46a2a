use clap::Parser;
use dirsort::cli::{RunOptions, run};
use dirsort::logging;
use std::path::PathBuf;
use std::process::ExitCode;

/// Sorts the files of a directory into category folders by extension.
#[derive(Debug, Parser)]
#[command(name = "dirsort", version, about)]
struct Cli {
    /// Directory to organize
    #[arg(short, long, value_name = "DIR")]
    path: PathBuf,

    /// Preview actions without moving files
    #[arg(long)]
    dry_run: bool,

    /// Show a progress bar during organization
    #[arg(long)]
    progress: bool,

    /// Keep watching the directory and organize new files as they appear
    #[arg(long)]
    watch: bool,

    /// Override an extension mapping (format: .ext=Category, repeatable)
    #[arg(long = "map", value_name = ".EXT=CATEGORY")]
    map: Vec<String>,

    /// Configuration document with custom mappings (JSON or TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// File with ignore patterns, one per line
    #[arg(long, value_name = "FILE")]
    ignore_file: Option<PathBuf>,

    /// Activity log location
    #[arg(long, value_name = "FILE", default_value = logging::DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Do not write the activity log
    #[arg(long, conflicts_with = "log_file")]
    no_log: bool,

    /// Print debug diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_file = (!cli.no_log).then_some(cli.log_file.as_path());
    let _log_guard = logging::init(cli.verbose, log_file);
    logging::session_started();

    let options = RunOptions {
        root: cli.path.clone(),
        dry_run: cli.dry_run,
        show_progress: cli.progress,
        watch: cli.watch,
        overrides: cli.map.clone(),
        config: cli.config.clone(),
        ignore_file: cli.ignore_file.clone(),
    };

    let code = match run(&options) {
        Ok(_) => {
            if let Some(path) = log_file {
                println!("\nDetailed log written to: {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    };

    logging::session_ended();
    code
}
