use anyhow::{Context, Result};
use boolir::index::{build, stats};
use boolir::output::{print_query_error, print_results, ColorMode};
use boolir::query::Search;
use boolir::utils::{self, get_config_path, resolve_index_dir, AppConfig};
use clap::{ArgAction, Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "boolir", version)]
#[command(about = "Boolean retrieval over a directory of text documents")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// When to use colors
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,

    /// Config file (defaults to config.json in the app data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build or extend the index for a corpus directory
    Index {
        /// Corpus directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Delete the existing index first
        #[arg(short, long)]
        force: bool,

        /// Store the index here instead of the app data directory
        #[arg(long)]
        index_dir: Option<PathBuf>,
    },
    /// Answer queries interactively until "exit"
    Search {
        /// Corpus directory
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        #[arg(long)]
        index_dir: Option<PathBuf>,
    },
    /// Answer a single query
    Query {
        /// Boolean expression, e.g. "(macbeth AND (NOT witch))"
        #[arg(required = true, trailing_var_arg = true)]
        expr: Vec<String>,

        /// Corpus directory
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        #[arg(long)]
        index_dir: Option<PathBuf>,
    },
    /// Show index statistics
    Stats {
        /// Corpus directory
        #[arg(default_value = ".")]
        path: PathBuf,

        #[arg(long)]
        index_dir: Option<PathBuf>,
    },
    /// List all indexed corpora
    List,
    /// Remove an index
    Remove {
        /// Corpus directory whose index to remove
        path: PathBuf,

        #[arg(long)]
        index_dir: Option<PathBuf>,
    },
    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        write: bool,
    },
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn, // Default
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

/// Index directory for a corpus given on the command line
fn index_location(path: &Path, index_dir: Option<&Path>) -> Result<PathBuf> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Invalid corpus path {}", path.display()))?;
    resolve_index_dir(&root, index_dir)
}

/// Run one query and print the outcome; false if the query was rejected
fn run_query(search: &Search, query: &str, color: ColorMode) -> Result<bool> {
    match search.find(query) {
        Ok(results) => {
            let mut stdout = color.stdout();
            print_results(&mut stdout, &results)?;
            Ok(true)
        }
        Err(e) => {
            let mut stderr = color.stderr();
            print_query_error(&mut stderr, &e)?;
            Ok(false)
        }
    }
}

fn interactive(search: &Search, color: ColorMode) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();

    loop {
        print!("Enter the search expression: ");
        io::stdout().flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            println!();
            break;
        }

        let query = line.trim();
        if query.eq_ignore_ascii_case("exit") {
            break;
        }
        if query.is_empty() {
            continue;
        }
        run_query(search, query, color)?;
    }

    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    match cli.command {
        Some(Commands::Index {
            path,
            force,
            index_dir,
        }) => {
            build::build_index_auto(&path, index_dir.as_deref(), &config, force)?;
        }
        Some(Commands::Search { path, index_dir }) => {
            let index_path = index_location(&path, index_dir.as_deref())?;
            let search = Search::open(&index_path, &config);
            interactive(&search, cli.color)?;
        }
        Some(Commands::Query {
            expr,
            path,
            index_dir,
        }) => {
            let index_path = index_location(&path, index_dir.as_deref())?;
            let search = Search::open(&index_path, &config);
            if !run_query(&search, &expr.join(" "), cli.color)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Some(Commands::Stats { path, index_dir }) => {
            let index_path = index_location(&path, index_dir.as_deref())?;
            stats::show_stats(&index_path)?;
        }
        Some(Commands::List) => {
            stats::list_indexes()?;
        }
        Some(Commands::Remove { path, index_dir }) => {
            let index_path = index_location(&path, index_dir.as_deref())?;
            utils::remove_index(&index_path)?;
            println!("Removed index for: {}", path.display());
        }
        Some(Commands::Config { write }) => {
            let config_path = match cli.config {
                Some(path) => path,
                None => get_config_path()?,
            };
            println!("# {}", config_path.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
            if write {
                config.save_to(&config_path)?;
                println!("Wrote {}", config_path.display());
            }
        }
        None => {
            // Interactive search over the current directory
            let index_path = index_location(Path::new("."), None)?;
            let search = Search::open(&index_path, &config);
            interactive(&search, cli.color)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
