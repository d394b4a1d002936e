//! Import tracking and header assembly for one emitted file.
//!
//! Entity references are recorded while field types are mapped, so a type
//! that only appears as an array element still gets its import. The tracker
//! lives for a single emission; entities themselves are never mutated.

use std::path::Path;

use darmogen_core::paths;
use indexmap::IndexSet;

use crate::target::EntityIndex;

/// Entities referenced by the file being emitted
#[derive(Debug, Clone)]
pub struct ImportTracker {
    current: usize,
    referenced: IndexSet<usize>,
}

impl ImportTracker {
    pub fn new(current: usize) -> Self {
        Self {
            current,
            referenced: IndexSet::new(),
        }
    }

    /// Record a reference. References to the entity being emitted are dropped.
    pub fn record(&mut self, entity: usize) {
        if entity != self.current {
            self.referenced.insert(entity);
        }
    }

    pub fn referenced(&self) -> impl Iterator<Item = usize> + '_ {
        self.referenced.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.referenced.is_empty()
    }
}

/// Builds the header lines of an emitted file
pub struct HeaderAssembler<'a> {
    index: &'a EntityIndex,
    out_dir: &'a Path,
    imports: &'a [String],
    headers: &'a [String],
}

impl<'a> HeaderAssembler<'a> {
    pub fn new(
        index: &'a EntityIndex,
        out_dir: &'a Path,
        imports: &'a [String],
        headers: &'a [String],
    ) -> Self {
        Self {
            index,
            out_dir,
            imports,
            headers,
        }
    }

    /// Header lines for entity `current`, de-duplicated in first-seen order:
    /// configured header text, configured imports, imports of field type
    /// origins, then every reference recorded in `tracker`.
    ///
    /// Any import whose target is the entity's own file is dropped, whichever
    /// source it came from.
    pub fn assemble(&self, current: usize, tracker: &ImportTracker) -> Vec<String> {
        let entity = &self.index[current];
        let from_dir = entity.target_dir();
        let mut lines = IndexSet::new();

        for header in self.headers {
            lines.insert(header.trim_end().to_string());
        }

        let mut push_import = |target: &Path| {
            if target != entity.target_file.as_path() {
                lines.insert(import_line(from_dir, target));
            }
        };

        for import in self.imports {
            push_import(&paths::resolve(self.out_dir, import));
        }

        for field in &entity.model.fields {
            let Some(origin) = &field.ty.relative_origin else {
                continue;
            };
            if let Some(other) = self.index.by_source(origin, &field.ty.name) {
                push_import(&self.index[other].target_file);
            }
        }

        for other in tracker.referenced() {
            push_import(&self.index[other].target_file);
        }

        lines.into_iter().collect()
    }
}

fn import_line(from_dir: &Path, target: &Path) -> String {
    let relative = paths::relative_path(from_dir, target);
    format!("import '{}';", paths::to_specifier(&relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::DartEntity;
    use darmogen_core::{EntityModel, Field, TypeDescriptor, TypeNode};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn entity(name: &str, source: &str, target: &str, fields: Vec<Field>) -> DartEntity {
        DartEntity {
            name: name.to_string(),
            class_name: name.to_string(),
            source_path: PathBuf::from(source),
            target_file: PathBuf::from(target),
            model: EntityModel {
                name: name.to_string(),
                fields,
            },
        }
    }

    fn index() -> EntityIndex {
        let author = Field::new(
            "author",
            TypeDescriptor::local(TypeNode::reference("User")).with_origin(
                PathBuf::from("/src/user/user.entity.ts"),
                PathBuf::from("user/user.entity.ts"),
            ),
        );
        let parent = Field::new(
            "parent",
            TypeDescriptor::local(TypeNode::reference("Post")).with_origin(
                PathBuf::from("/src/post/post.entity.ts"),
                PathBuf::from("post/post.entity.ts"),
            ),
        );
        EntityIndex::new(vec![
            entity("User", "user/user.entity.ts", "/out/user/user.dart", vec![]),
            entity(
                "Post",
                "post/post.entity.ts",
                "/out/post/post.dart",
                vec![author, parent],
            ),
            entity("Tag", "post/tag.entity.ts", "/out/post/tag.dart", vec![]),
        ])
    }

    #[test]
    fn test_tracker_drops_self_references() {
        let mut tracker = ImportTracker::new(1);
        tracker.record(1);
        assert!(tracker.is_empty());
        tracker.record(2);
        tracker.record(0);
        tracker.record(2);
        assert_eq!(tracker.referenced().collect::<Vec<_>>(), vec![2, 0]);
    }

    #[test]
    fn test_assemble_orders_and_dedupes() {
        let index = index();
        let imports = vec!["./rest.dart".to_string()];
        let headers = vec!["// GENERATED CODE\n".to_string()];
        let assembler = HeaderAssembler::new(&index, Path::new("/out"), &imports, &headers);

        let mut tracker = ImportTracker::new(1);
        tracker.record(2);
        tracker.record(0);

        assert_eq!(
            assembler.assemble(1, &tracker),
            vec![
                "// GENERATED CODE",
                "import '../rest.dart';",
                "import '../user/user.dart';",
                "import 'tag.dart';",
            ]
        );
    }

    #[test]
    fn test_assemble_skips_configured_import_of_own_file() {
        let index = index();
        let imports = vec!["./user/user.dart".to_string(), "./rest.dart".to_string()];
        let assembler = HeaderAssembler::new(&index, Path::new("/out"), &imports, &[]);

        assert_eq!(
            assembler.assemble(0, &ImportTracker::new(0)),
            vec!["import '../rest.dart';"]
        );
    }

    #[test]
    fn test_assemble_skips_entities_sharing_the_target_file() {
        let related = Field::new(
            "related",
            TypeDescriptor::local(TypeNode::reference("B")).with_origin(
                PathBuf::from("/src/b.entity.ts"),
                PathBuf::from("b.entity.ts"),
            ),
        );
        let index = EntityIndex::new(vec![
            entity("A", "a.entity.ts", "/out/models.dart", vec![related]),
            entity("B", "b.entity.ts", "/out/models.dart", vec![]),
        ]);
        let assembler = HeaderAssembler::new(&index, Path::new("/out"), &[], &[]);

        let mut tracker = ImportTracker::new(0);
        tracker.record(1);
        assert!(assembler.assemble(0, &tracker).is_empty());
    }

    #[test]
    fn test_assemble_without_configuration() {
        let index = index();
        let assembler = HeaderAssembler::new(&index, Path::new("/out"), &[], &[]);
        assert!(assembler.assemble(0, &ImportTracker::new(0)).is_empty());
    }
}
