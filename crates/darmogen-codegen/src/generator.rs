//! Generate stage: target placement, parallel emission and file writes.
//!
//! Entities are emitted on the blocking pool against one shared
//! [`DartModel`]. Each file is written to a temporary sibling and renamed
//! into place, so a target is either fully written or left untouched. One
//! entity failing does not stop the others.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use darmogen_core::naming::Formatter;
use darmogen_core::{paths, GeneratorConfig, ProgressSink, SourceEntity, Stage};
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{info, instrument, warn};

use crate::dart::DartModel;
use crate::error::CodegenError;
use crate::target::{DartEntity, EntityIndex};

/// One generated file
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedFile {
    /// Formatted class name
    pub entity: String,
    pub target_file: PathBuf,
    pub content: String,
}

#[derive(Debug)]
pub struct GenerationFailure {
    pub entity: String,
    pub target_file: PathBuf,
    pub error: CodegenError,
}

/// Outcome of the generate stage, in entity order
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub written: Vec<EmittedFile>,
    pub failures: Vec<GenerationFailure>,
}

impl GenerationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct DartModelGenerator {
    config: GeneratorConfig,
    name_formatter: Formatter,
    filename_formatter: Formatter,
}

impl DartModelGenerator {
    /// Formatters follow the configured name and file styles.
    pub fn new(config: GeneratorConfig) -> Self {
        let name_formatter = config.name_style.formatter("");
        let filename_formatter = config.file_style.formatter(config.file_suffix.clone());
        Self {
            config,
            name_formatter,
            filename_formatter,
        }
    }

    pub fn with_name_formatter(mut self, formatter: Formatter) -> Self {
        self.name_formatter = formatter;
        self
    }

    pub fn with_filename_formatter(mut self, formatter: Formatter) -> Self {
        self.filename_formatter = formatter;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// `<out>/<source dir>/<formatted file name>`
    pub fn target_file(&self, entity: &SourceEntity) -> PathBuf {
        let source_dir = entity.path.parent().unwrap_or_else(|| Path::new(""));
        paths::resolve(&self.config.out, source_dir).join((self.filename_formatter)(&entity.name))
    }

    pub fn build_model(&self, entities: Vec<SourceEntity>) -> DartModel {
        let entities = entities
            .into_iter()
            .map(|entity| DartEntity {
                class_name: (self.name_formatter)(&entity.name),
                target_file: self.target_file(&entity),
                name: entity.name,
                source_path: entity.path,
                model: entity.model,
            })
            .collect();
        DartModel::new(EntityIndex::new(entities), self.config.clone())
    }

    /// Emit every entity in memory, without writing anything.
    pub fn render(&self, entities: Vec<SourceEntity>) -> Result<Vec<EmittedFile>, CodegenError> {
        let model = self.build_model(entities);
        (0..model.index().len())
            .map(|index| emit_file(&model, index))
            .collect()
    }

    /// Emit and write every entity.
    #[instrument(skip_all, fields(out = %self.config.out.display()), level = "info")]
    pub async fn generate(
        &self,
        entities: Vec<SourceEntity>,
        progress: &dyn ProgressSink,
    ) -> GenerationReport {
        let model = Arc::new(self.build_model(entities));
        let total = model.index().len();
        info!("Generating {} models", total);
        progress.start(Stage::Generating, total);

        let mut pending = FuturesUnordered::new();
        for index in 0..total {
            let model = Arc::clone(&model);
            pending.push(async move {
                let emitted = tokio::task::spawn_blocking(move || emit_file(&model, index))
                    .await
                    .unwrap_or_else(|e| Err(CodegenError::Task(e.to_string())));
                let result = match emitted {
                    Ok(file) => write_atomic(&file.target_file, &file.content)
                        .await
                        .map(|_| file),
                    Err(e) => Err(e),
                };
                (index, result)
            });
        }

        let mut outcomes: Vec<Option<Result<EmittedFile, CodegenError>>> =
            (0..total).map(|_| None).collect();
        let mut loaded = 0;
        while let Some((index, result)) = pending.next().await {
            loaded += 1;
            progress.advance(Stage::Generating, loaded, &model.index()[index].class_name);
            outcomes[index] = Some(result);
        }
        progress.finish(Stage::Generating);

        let mut report = GenerationReport::default();
        for (entity, outcome) in model.index().iter().zip(outcomes) {
            match outcome {
                Some(Ok(file)) => report.written.push(file),
                Some(Err(error)) => {
                    warn!("Failed to generate {}: {}", entity.class_name, error);
                    report.failures.push(GenerationFailure {
                        entity: entity.class_name.clone(),
                        target_file: entity.target_file.clone(),
                        error,
                    });
                }
                None => {}
            }
        }

        info!(
            "Wrote {} files ({} failures)",
            report.written.len(),
            report.failures.len()
        );
        report
    }
}

fn emit_file(model: &DartModel, index: usize) -> Result<EmittedFile, CodegenError> {
    let content = model.emit(index)?;
    let entity = &model.index()[index];
    Ok(EmittedFile {
        entity: entity.class_name.clone(),
        target_file: entity.target_file.clone(),
        content,
    })
}

async fn write_atomic(path: &Path, content: &str) -> Result<(), CodegenError> {
    let io_error = |source: std::io::Error| CodegenError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = path.with_file_name(format!(".{}.tmp", file_name));

    tokio::fs::write(&staging, content).await.map_err(io_error)?;
    if let Err(source) = tokio::fs::rename(&staging, path).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(io_error(source));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use darmogen_core::{EntityModel, NameStyle};
    use std::sync::Arc;

    fn source_entity(path: &str, name: &str) -> SourceEntity {
        SourceEntity {
            path: PathBuf::from(path),
            name: name.to_string(),
            model: EntityModel {
                name: name.to_string(),
                fields: Vec::new(),
            },
        }
    }

    #[test]
    fn test_target_file_mirrors_source_layout() {
        let generator = DartModelGenerator::new(
            GeneratorConfig::new("/project/lib/models").with_file_suffix(".model.dart"),
        );
        assert_eq!(
            generator.target_file(&source_entity("user/user-profile.entity.ts", "UserProfile")),
            PathBuf::from("/project/lib/models/user/user-profile.model.dart")
        );
        assert_eq!(
            generator.target_file(&source_entity("tag.entity.ts", "Tag")),
            PathBuf::from("/project/lib/models/tag.model.dart")
        );
    }

    #[test]
    fn test_custom_formatters() -> Result<(), CodegenError> {
        let generator = DartModelGenerator::new(GeneratorConfig::new("/out"))
            .with_name_formatter(Arc::new(|name: &str| format!("{}Model", name)))
            .with_filename_formatter(NameStyle::Snake.formatter(".g.dart"));

        let files = generator.render(vec![source_entity("a/order-item.entity.ts", "OrderItem")])?;
        assert_eq!(files[0].entity, "OrderItemModel");
        assert_eq!(files[0].target_file, PathBuf::from("/out/a/order_item.g.dart"));
        assert!(files[0].content.starts_with("class OrderItemModel extends Model {"));
        Ok(())
    }
}
