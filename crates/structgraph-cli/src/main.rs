//! structgraph-cli: CLI entry point for structgraph.

mod commands_config;
mod commands_funcs;
mod commands_structs;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use structgraph_core::{PathsConfig, StructgraphConfig};
use structgraph_index::FsPathResolver;

#[derive(Parser)]
#[command(
    name = "structgraph",
    about = "Extract a serializable type graph from Go source trees"
)]
#[command(version, propagate_version = true)]
struct Cli {
    /// Config file (defaults to ~/.structgraph/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit debug traces and a summary on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract structs, interfaces and aliases, following referenced imports
    Structs(commands_structs::StructsArgs),

    /// Extract top-level function signatures of a single package
    Funcs(commands_funcs::FuncsArgs),

    /// Get or set configuration values
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print a config value (dot-separated key, e.g. walk.exclude)
    Get { key: String },
    /// Set a config value (JSON or plain string)
    Set { key: String, value: String },
}

/// Roots used to resolve import paths; override the config file.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct PathArgs {
    /// Workspace root (defaults to the directory holding the nearest go.mod)
    #[arg(long)]
    pub workspace_root: Option<PathBuf>,

    /// System library root, e.g. $GOROOT/src
    #[arg(long)]
    pub system_root: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct OutputArgs {
    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write single-line JSON
    #[arg(long)]
    pub compact: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the JSON, so traces go to stderr.
    let directive = if cli.verbose {
        "structgraph=debug"
    } else {
        "structgraph=warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse().expect("valid tracing directive")),
        )
        .with_target(false)
        .init();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(StructgraphConfig::default_path);

    match cli.command {
        Commands::Structs(args) => {
            let config = load_config(cli.config.as_deref())?;
            commands_structs::cmd_structs(&args, &config, cli.verbose)?;
        }
        Commands::Funcs(args) => {
            let config = load_config(cli.config.as_deref())?;
            commands_funcs::cmd_funcs(&args, &config)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Get { key } => {
                commands_config::cmd_config_get(&config_path, &key)?;
            }
            ConfigAction::Set { key, value } => {
                commands_config::cmd_config_set(&config_path, &key, &value)?;
            }
        },
    }

    Ok(())
}

// ── Helpers (shared across modules) ────────────────────────────────────────

/// Load an explicit config file, or the default one when it exists.
pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<StructgraphConfig> {
    match path {
        Some(path) => Ok(StructgraphConfig::load(path)?),
        None => Ok(StructgraphConfig::load_or_default()),
    }
}

/// Path resolver for a target: flags first, then the config file, then the
/// Go environment.
pub(crate) fn path_resolver(target: &Path, config: &PathsConfig, args: &PathArgs) -> FsPathResolver {
    let workspace_root = args
        .workspace_root
        .clone()
        .or_else(|| config.workspace_root.as_ref().map(PathBuf::from));
    let system_root = args
        .system_root
        .clone()
        .or_else(|| config.system_root.as_ref().map(PathBuf::from));
    let module_cache = config.module_cache.as_ref().map(PathBuf::from);

    let resolver = match workspace_root {
        Some(root) => FsPathResolver::new(root),
        None => FsPathResolver::for_target(target),
    };
    resolver
        .with_system_root(system_root)
        .with_module_cache(module_cache)
        .from_env()
}

/// Serialize `value` once to the output file or stdout.
pub(crate) fn write_json<T: Serialize>(
    value: &T,
    args: &OutputArgs,
    pretty: bool,
) -> anyhow::Result<()> {
    let json = if pretty && !args.compact {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };
    writeln!(writer, "{json}")?;
    writer.flush()?;
    Ok(())
}
