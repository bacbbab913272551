//! Taskmon: watches gallery metadata generation and locks navigation while
//! it runs.
//!
//! Usage:
//!     taskmon --server http://127.0.0.1:5000/ --path /cats/2024 [--watch]

mod platform;

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use platform::{AppConfig, LogDestination, RunOptions, DEFAULT_CONFIG_FILE};
use taskmon_core::ViewLocation;
use taskmon_logging::taskmon_warn;

#[derive(Parser, Debug)]
#[command(name = "taskmon", about = "Gallery metadata generation monitor")]
struct Args {
    /// Gallery server root (overrides the config file)
    #[arg(long)]
    server: Option<String>,

    /// Page to open: `/` for the folder tree, `/a/b` for a gallery
    #[arg(long, default_value = "/")]
    path: String,

    /// Initial search query; a `g:` prefix searches every folder
    #[arg(long)]
    search: Option<String>,

    /// Initial sort key, e.g. `date-desc` or `name-asc`
    #[arg(long)]
    sort: Option<String>,

    /// Log destination (overrides the config file)
    #[arg(long, value_enum)]
    log: Option<LogDestination>,

    /// RON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long)]
    verbose: bool,

    /// Keep running and read navigation commands from stdin
    #[arg(long)]
    watch: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let (mut config, config_problem) = match platform::load_config(&config_path) {
        Ok(Some(config)) => (config, None),
        Ok(None) if args.config.is_some() => (
            AppConfig::default(),
            Some(format!(
                "config {} not found; using defaults",
                config_path.display()
            )),
        ),
        Ok(None) => (AppConfig::default(), None),
        Err(err) => (AppConfig::default(), Some(format!("{err:#}; using defaults"))),
    };
    if let Some(server) = args.server {
        config.server = server;
    }
    if let Some(sort) = args.sort {
        config.sort_by = sort;
    }
    if let Some(log) = args.log {
        config.log = log;
    }

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    platform::initialize_logging(config.log, level);
    if let Some(problem) = config_problem {
        taskmon_warn!("{problem}");
        eprintln!("Warning: {problem}");
    }

    platform::run_app(
        &config,
        RunOptions {
            location: ViewLocation::from_pathname(&args.path),
            search_query: args.search.unwrap_or_default(),
            watch: args.watch,
        },
    )
}
