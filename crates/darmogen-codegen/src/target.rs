//! Entities as the emitter sees them: formatted names and output locations

use std::ops::Index;
use std::path::{Path, PathBuf};

use darmogen_core::EntityModel;

#[derive(Debug, Clone, PartialEq)]
pub struct DartEntity {
    /// Class name as declared in the source
    pub name: String,
    /// Class name after the name formatter
    pub class_name: String,
    /// Source file relative to the source root
    pub source_path: PathBuf,
    pub target_file: PathBuf,
    pub model: EntityModel,
}

impl DartEntity {
    pub fn target_dir(&self) -> &Path {
        self.target_file.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Every entity of a run, addressable by position and source name
#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    entities: Vec<DartEntity>,
}

impl EntityIndex {
    pub fn new(entities: Vec<DartEntity>) -> Self {
        Self { entities }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DartEntity> {
        self.entities.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DartEntity> {
        self.entities.iter()
    }

    /// First entity declared with `name`
    pub fn by_name(&self, name: &str) -> Option<usize> {
        self.entities.iter().position(|e| e.name == name)
    }

    /// An entity declared in `source_path`, preferring one named `name`
    pub fn by_source(&self, source_path: &Path, name: &str) -> Option<usize> {
        let mut fallback = None;
        for (index, entity) in self.entities.iter().enumerate() {
            if entity.source_path == source_path {
                if entity.name == name {
                    return Some(index);
                }
                fallback.get_or_insert(index);
            }
        }
        fallback
    }
}

impl Index<usize> for EntityIndex {
    type Output = DartEntity;

    fn index(&self, index: usize) -> &DartEntity {
        &self.entities[index]
    }
}
