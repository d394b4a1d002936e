//! Parsed-file cache keyed by absolute path.
//!
//! Each path is read and parsed at most once per cache, even when several
//! workers ask for it at the same time: the first caller initializes the slot,
//! the others block on it and then share the result. Failures are cached too.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use darmogen_core::{paths, CoreError, ModuleResolver, ParserConfig};
use indexmap::IndexMap;

use crate::classifier::EntityClassifier;
use crate::error::ParserError;
use crate::syntax::{self, ClassDecl};

/// A class declared in a cached source file
#[derive(Debug, Clone, PartialEq)]
pub struct EntityClass {
    pub name: String,
    /// Cache key of the declaring file
    pub source: PathBuf,
    pub decl: ClassDecl,
    pub is_entity: bool,
}

/// A parsed file: its import table and every class it declares
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSource {
    pub path: PathBuf,
    /// Local binding → resolved absolute path of the module it came from
    pub imports: HashMap<String, PathBuf>,
    pub classes: IndexMap<String, EntityClass>,
}

impl ImportedSource {
    pub fn class(&self, name: &str) -> Option<&EntityClass> {
        self.classes.get(name)
    }

    pub fn import_origin(&self, name: &str) -> Option<&Path> {
        self.imports.get(name).map(PathBuf::as_path)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityClass> {
        self.classes.values().filter(|class| class.is_entity)
    }
}

#[derive(Debug, Clone)]
enum SourceFailure {
    Unreadable(String),
    Syntax(String),
}

impl SourceFailure {
    fn to_error(&self, path: &Path) -> ParserError {
        match self {
            SourceFailure::Unreadable(reason) => ParserError::MissingSourceFile {
                path: path.to_path_buf(),
                reason: reason.clone(),
            },
            SourceFailure::Syntax(message) => ParserError::Syntax {
                path: path.to_path_buf(),
                message: message.clone(),
            },
        }
    }
}

type Slot = Arc<OnceLock<Result<Arc<ImportedSource>, SourceFailure>>>;

#[derive(Debug)]
pub struct SourceCache {
    resolver: ModuleResolver,
    classifier: EntityClassifier,
    entries: DashMap<PathBuf, Slot>,
    reads: AtomicUsize,
}

impl SourceCache {
    pub fn new(resolver: ModuleResolver, classifier: EntityClassifier) -> Self {
        Self {
            resolver,
            classifier,
            entries: DashMap::new(),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn from_config(config: &ParserConfig) -> Result<Self, CoreError> {
        Ok(Self::new(
            ModuleResolver::from_config(config)?,
            EntityClassifier::from_identifier(&config.identifier)?,
        ))
    }

    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    pub fn classifier(&self) -> &EntityClassifier {
        &self.classifier
    }

    /// Number of files read from disk so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Load `path`, parsing it on first use. Repeated calls return the same
    /// `Arc`.
    pub fn load(&self, path: &Path) -> Result<Arc<ImportedSource>, ParserError> {
        let key = paths::normalize(path);
        // Clone the slot so the map shard is unlocked while parsing.
        let slot: Slot = Arc::clone(&*self.entries.entry(key.clone()).or_default());
        slot.get_or_init(|| self.read_source(&key))
            .clone()
            .map_err(|failure| failure.to_error(&key))
    }

    /// Lenient form of [`load`](Self::load): unreadable or unparseable files
    /// yield `None`.
    pub fn import_source(&self, path: &Path) -> Option<Arc<ImportedSource>> {
        match self.load(path) {
            Ok(source) => Some(source),
            Err(err) => {
                tracing::debug!("Skipping import: {}", err);
                None
            }
        }
    }

    fn read_source(&self, path: &Path) -> Result<Arc<ImportedSource>, SourceFailure> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let text = fs::read_to_string(path).map_err(|e| SourceFailure::Unreadable(e.to_string()))?;
        let module = syntax::parse_module(path, text).map_err(|e| match e {
            ParserError::Syntax { message, .. } => SourceFailure::Syntax(message),
            other => SourceFailure::Syntax(other.to_string()),
        })?;

        let base_dir = path.parent().unwrap_or(path);
        let mut imports = HashMap::new();
        for import in &module.imports {
            let target = self.resolver.resolve_import(&import.specifier, base_dir);
            for binding in &import.bindings {
                imports.insert(binding.clone(), target.clone());
            }
        }

        let classes = module
            .classes
            .into_iter()
            .map(|decl| {
                let class = EntityClass {
                    name: decl.name.clone(),
                    source: path.to_path_buf(),
                    is_entity: self.classifier.is_entity(&decl),
                    decl,
                };
                (class.name.clone(), class)
            })
            .collect();

        tracing::debug!("Parsed {}", path.display());
        Ok(Arc::new(ImportedSource {
            path: path.to_path_buf(),
            imports,
            classes,
        }))
    }
}
