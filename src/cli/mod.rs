mod args;
mod config;
mod global;
mod handlers;

use args::{BuildArgs, ConfigAction, InspectArgs, LookupArgs};
use clap::{Parser, Subcommand};
use global::GlobalArgs;
use tracing_subscriber::EnvFilter;
use utf8_lookup::CharsetRegistry;

#[derive(Parser)]
#[command(name = "utf8-lookup")]
#[command(version)]
#[command(about = "Build packed UTF-8 glyph lookup tables and resolve text against them", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a lookup table from a charset, characters or ranges
    Build(BuildArgs),

    /// Resolve text to glyph offsets
    Lookup(LookupArgs),

    /// Show statistics and contents of a table file
    Inspect(InspectArgs),

    /// Inspect the charset configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show platform and popcount strategy
    Info,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.global);

    // Load charsets configuration with user overrides
    let config = CharsetRegistry::load_with_overrides()?;

    match cli.command {
        Command::Build(args) => handlers::build::handle(args, &cli.global, &config),
        Command::Lookup(args) => handlers::lookup::handle(args, &cli.global, &config),
        Command::Inspect(args) => handlers::inspect::handle(args, &cli.global),
        Command::Config { action } => handlers::config::handle(action, &cli.global, &config),
        Command::Info => handlers::info::handle(&cli.global),
    }
}

fn init_tracing(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("utf8_lookup={}", global.log_level())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
