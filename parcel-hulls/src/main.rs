//! Point d'entrée CLI pour parcel-hulls

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::RunArgs;

/// Concave hulls adaptatifs pour les parcelles multi-parties
#[derive(Parser)]
#[command(name = "parcel-hulls")]
#[command(author, version)]
#[command(about = "Remplacer les MultiPolygons fragmentés par des concave hulls à polygone unique")]
#[command(long_about = "Calcule un concave hull par feature MultiPolygon en augmentant le seuil jusqu'à obtenir un seul polygone.\n\nLes micro-fragments restants sont supprimés, les cas non résolus sont écrits dans des fichiers d'issue.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    run: RunArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    info!(input = %cli.run.input.display(), "Computing concave hulls");
    cli::cmd_run(&cli.run)
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
