//! Transitive heritage resolution

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::source_cache::{EntityClass, ImportedSource, SourceCache};

/// Handle to a class inside a cached source file
#[derive(Debug, Clone)]
pub struct ClassRef {
    pub source: Arc<ImportedSource>,
    index: usize,
}

impl ClassRef {
    pub fn new(source: Arc<ImportedSource>, name: &str) -> Option<Self> {
        let index = source.classes.get_index_of(name)?;
        Some(Self { source, index })
    }

    pub fn class(&self) -> &EntityClass {
        &self.source.classes[self.index]
    }

    pub fn name(&self) -> &str {
        &self.class().name
    }

    fn key(&self) -> (PathBuf, String) {
        (self.source.path.clone(), self.name().to_string())
    }
}

/// Walks `extends` and `implements` clauses across files.
///
/// A heritage name resolves through the declaring file's import table, or to
/// a class of the same file when it was not imported. Names that resolve to
/// unreadable files, or to files without such a class, are skipped.
pub struct InheritanceResolver<'a> {
    cache: &'a SourceCache,
}

impl<'a> InheritanceResolver<'a> {
    pub fn new(cache: &'a SourceCache) -> Self {
        Self { cache }
    }

    /// Every ancestor of `class`, depth first in heritage order. Each class
    /// appears at most once, so cyclic hierarchies terminate.
    pub fn resolve_ancestors(&self, class: &ClassRef) -> Vec<ClassRef> {
        let mut visited = HashSet::new();
        visited.insert(class.key());
        let mut ancestors = Vec::new();
        self.collect(class, &mut visited, &mut ancestors);
        ancestors
    }

    fn collect(
        &self,
        class: &ClassRef,
        visited: &mut HashSet<(PathBuf, String)>,
        ancestors: &mut Vec<ClassRef>,
    ) {
        for base in class.class().decl.heritage() {
            let Some(parent) = self.lookup(&class.source, base) else {
                tracing::trace!("{}: heritage '{}' not resolved", class.name(), base);
                continue;
            };
            if !visited.insert(parent.key()) {
                tracing::debug!("{}: inheritance cycle through '{}'", class.name(), base);
                continue;
            }
            ancestors.push(parent.clone());
            self.collect(&parent, visited, ancestors);
        }
    }

    fn lookup(&self, source: &Arc<ImportedSource>, name: &str) -> Option<ClassRef> {
        let target = match source.import_origin(name) {
            Some(origin) if origin != source.path => self.cache.import_source(origin)?,
            _ => Arc::clone(source),
        };
        ClassRef::new(target, name)
    }
}
