use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::warn;

use darmogen::progress::CliProgress;
use darmogen::report::render_summary;
use darmogen_core::config::DEFAULT_CONFIG_FILE;
use darmogen_core::DarmogenConfig;

#[derive(Parser)]
#[command(name = "darmogen", version)]
#[command(about = "Generate Dart models from TypeORM entity classes", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, env = "DARMOGEN_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse entity sources and write Dart models (default)
    Generate,

    /// Write a starter configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::TRACE
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(cli.debug) // Show target module in debug mode
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Generate) {
        Commands::Generate => handle_generate(&cli.config).await,
        Commands::Init { force } => handle_init(&cli.config, force),
    }
}

async fn handle_generate(config_path: &Path) -> Result<()> {
    let config = DarmogenConfig::from_file(config_path)
        .with_context(|| format!("Could not load options file: {}", config_path.display()))?;

    println!("darmogen v{}\n", env!("CARGO_PKG_VERSION"));
    println!("■ Source: \"{}\"", config.parser.source_root.display());
    println!("× Target: \"{}\"\n", config.generator.out.display());

    if !config.parser.source_root.is_dir() {
        anyhow::bail!(
            "Parser \"cwd\" folder doesn't exist: {}",
            config.parser.source_root.display()
        );
    }

    let progress = CliProgress::new();
    let outcome = darmogen::run_generate(&config, &progress)
        .await
        .context("Could not generate Dart models")?;
    println!("│");

    let cwd = std::env::current_dir()?;
    print!("{}", render_summary(&outcome, &cwd, &config.parser));

    if !outcome.is_clean() {
        warn!("{} sources failed", outcome.failure_count());
        anyhow::bail!("{} sources could not be generated", outcome.failure_count());
    }
    Ok(())
}

fn handle_init(config_path: &Path, force: bool) -> Result<()> {
    let dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or(std::env::current_dir()?);
    let path = darmogen::init_config(&dir, force)?;
    println!("Created {}", path.display());
    Ok(())
}
