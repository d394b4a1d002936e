//! Library interface for the darmogen CLI components

pub mod progress;
pub mod report;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use darmogen_codegen::{DartModelGenerator, GenerationReport};
use darmogen_core::config::DEFAULT_CONFIG_FILE;
use darmogen_core::{DarmogenConfig, ProgressSink};
use darmogen_parser::{EntityParser, ParseReport};
use tracing::info;

/// Results of both stages of one run
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub parse: ParseReport,
    pub generation: GenerationReport,
}

impl RunOutcome {
    pub fn is_clean(&self) -> bool {
        self.parse.is_clean() && self.generation.is_clean()
    }

    pub fn failure_count(&self) -> usize {
        self.parse.failures.len() + self.generation.failures.len()
    }
}

/// Parse the configured sources and write their Dart models.
pub async fn run_generate(config: &DarmogenConfig, progress: &dyn ProgressSink) -> Result<RunOutcome> {
    let parser = EntityParser::new(config.parser.clone())?;
    let mut parse = parser
        .parse(progress)
        .await
        .context("Failed to parse entity sources")?;

    let entities = std::mem::take(&mut parse.entities);
    let generation = DartModelGenerator::new(config.generator.clone())
        .generate(entities, progress)
        .await;

    Ok(RunOutcome { parse, generation })
}

/// Write a starter configuration into `dir`, returning its path.
pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let path = dir.join(DEFAULT_CONFIG_FILE);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    fs::write(&path, DarmogenConfig::starter())
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(path)
}
