//! Parse stage orchestration.
//!
//! Candidate files are parsed on the blocking pool, sharing one
//! [`SourceCache`], so a base class imported by many entities is read once.
//! Results are collected by this task alone, which is the only caller of the
//! progress sink. A file that fails is reported and the rest carry on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use darmogen_core::{paths, CoreError, ParserConfig, ProgressSink, SourceEntity, Stage};
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::discovery::discover_sources;
use crate::error::ParserError;
use crate::inheritance::ClassRef;
use crate::properties::PropertyExtractor;
use crate::source_cache::SourceCache;

/// A candidate file that produced no entities because it failed
#[derive(Debug)]
pub struct ParseFailure {
    /// Path relative to the source root
    pub path: PathBuf,
    pub error: ParserError,
}

/// Outcome of the parse stage
#[derive(Debug, Default)]
pub struct ParseReport {
    /// Entities in discovery order, then declaration order within a file
    pub entities: Vec<SourceEntity>,
    pub failures: Vec<ParseFailure>,
    /// Number of candidate files found
    pub files: usize,
}

impl ParseReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct EntityParser {
    config: Arc<ParserConfig>,
    cache: Arc<SourceCache>,
}

impl EntityParser {
    /// Validates the configuration before any file is touched.
    ///
    /// Relative roots are resolved against the process working directory.
    pub fn new(mut config: ParserConfig) -> Result<Self, ParserError> {
        if config.source_root.is_relative() || config.package_root().is_relative() {
            let cwd = std::env::current_dir().map_err(CoreError::from)?;
            config.resolve_relative_to(&cwd);
        }
        let cache = SourceCache::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            cache: Arc::new(cache),
        })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    /// Candidate files, relative to the source root
    pub fn discover(&self) -> Result<Vec<PathBuf>, ParserError> {
        discover_sources(&self.config.source_root, &self.config.ext)
    }

    /// Resolve every entity declared in one candidate file.
    pub fn parse_file(&self, relative: &Path) -> Result<Vec<SourceEntity>, ParserError> {
        let absolute = paths::resolve(&self.config.source_root, relative);
        let source = self.cache.load(&absolute)?;
        let extractor = PropertyExtractor::new(&self.cache, &self.config);

        let entities = source
            .entities()
            .filter_map(|class| ClassRef::new(Arc::clone(&source), &class.name))
            .map(|class| SourceEntity {
                path: relative.to_path_buf(),
                name: class.name().to_string(),
                model: extractor.extract_model(&class),
            })
            .collect::<Vec<_>>();

        debug!("{}: {} entities", relative.display(), entities.len());
        Ok(entities)
    }

    /// Discover and parse every candidate file.
    ///
    /// Only a missing source root fails the whole stage; per-file errors land
    /// in [`ParseReport::failures`].
    #[instrument(skip(self, progress), level = "info")]
    pub async fn parse(&self, progress: &dyn ProgressSink) -> Result<ParseReport, ParserError> {
        let files = self.discover()?;
        info!("Parsing {} candidate files", files.len());
        progress.start(Stage::Parsing, files.len());

        let mut pending = FuturesUnordered::new();
        for (index, relative) in files.iter().enumerate() {
            let parser = self.clone();
            let relative = relative.clone();
            let handle = tokio::task::spawn_blocking(move || parser.parse_file(&relative));
            pending.push(async move { (index, handle.await) });
        }

        let mut outcomes: Vec<Option<Result<Vec<SourceEntity>, ParserError>>> =
            files.iter().map(|_| None).collect();
        let mut loaded = 0;
        while let Some((index, joined)) = pending.next().await {
            let outcome = joined.unwrap_or_else(|e| {
                Err(ParserError::Task {
                    path: files[index].clone(),
                    message: e.to_string(),
                })
            });
            loaded += 1;
            let label = match &outcome {
                Ok(entities) if !entities.is_empty() => entities
                    .iter()
                    .map(|e| e.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => files[index].display().to_string(),
            };
            progress.advance(Stage::Parsing, loaded, &label);
            outcomes[index] = Some(outcome);
        }
        progress.finish(Stage::Parsing);

        let mut report = ParseReport {
            files: files.len(),
            ..ParseReport::default()
        };
        for (path, outcome) in files.into_iter().zip(outcomes) {
            match outcome {
                Some(Ok(entities)) => report.entities.extend(entities),
                Some(Err(error)) => {
                    warn!("Failed to parse {}: {}", path.display(), error);
                    report.failures.push(ParseFailure { path, error });
                }
                None => {}
            }
        }

        info!(
            "Resolved {} entities ({} failures)",
            report.entities.len(),
            report.failures.len()
        );
        Ok(report)
    }
}
