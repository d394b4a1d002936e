//! Field extraction from a class and its ancestors.
//!
//! A member is a field when it is not static, carries at least one decorator
//! (unless that requirement is switched off) and does not carry the exclusion
//! decorator. The concrete class is read first and then each ancestor, so a
//! redeclared field keeps the most derived declaration. Excluding a field in a
//! subclass hides the inherited declaration too.

use std::collections::HashSet;

use darmogen_core::{paths, EntityModel, Field, Keyword, ParserConfig, TypeDescriptor, TypeNode};

use crate::inheritance::{ClassRef, InheritanceResolver};
use crate::source_cache::SourceCache;
use crate::syntax::PropertyDecl;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Visibility {
    Field,
    Hidden,
    /// Not a field here, but does not shadow an inherited one
    Ignored,
}

pub struct PropertyExtractor<'a> {
    cache: &'a SourceCache,
    exclude_decorator: String,
    require_decorator: bool,
}

impl<'a> PropertyExtractor<'a> {
    pub fn new(cache: &'a SourceCache, config: &ParserConfig) -> Self {
        Self {
            cache,
            exclude_decorator: config.exclude_decorator.clone(),
            require_decorator: config.require_field_decorator,
        }
    }

    /// Resolve the full model of `class`
    pub fn extract_model(&self, class: &ClassRef) -> EntityModel {
        EntityModel {
            name: class.name().to_string(),
            fields: self.extract_fields(class),
        }
    }

    pub fn extract_fields(&self, class: &ClassRef) -> Vec<Field> {
        let ancestors = InheritanceResolver::new(self.cache).resolve_ancestors(class);
        let mut seen = HashSet::new();
        let mut fields = Vec::new();

        for owner in std::iter::once(class).chain(ancestors.iter()) {
            for prop in &owner.class().decl.properties {
                match self.visibility(prop) {
                    Visibility::Ignored => {}
                    Visibility::Hidden => {
                        seen.insert(prop.name.clone());
                    }
                    Visibility::Field => {
                        if seen.insert(prop.name.clone()) {
                            fields.push(Field::new(&prop.name, self.describe(owner, prop)));
                        }
                    }
                }
            }
        }

        tracing::trace!("{}: {} fields", class.name(), fields.len());
        fields
    }

    fn visibility(&self, prop: &PropertyDecl) -> Visibility {
        if prop.is_static {
            Visibility::Ignored
        } else if prop.has_decorator(&self.exclude_decorator) {
            Visibility::Hidden
        } else if self.require_decorator && prop.decorators.is_empty() {
            Visibility::Ignored
        } else {
            Visibility::Field
        }
    }

    /// Collapse the annotation and attach the origin of its name, looked up in
    /// the declaring file's import table.
    fn describe(&self, owner: &ClassRef, prop: &PropertyDecl) -> TypeDescriptor {
        let node = prop
            .ty
            .as_ref()
            .map(TypeNode::collapse)
            .unwrap_or(TypeNode::Keyword(Keyword::Any));
        let descriptor = TypeDescriptor::local(node);

        match owner.source.import_origin(&descriptor.name) {
            Some(origin) => {
                let relative = paths::relative_path(self.cache.resolver().source_root(), origin);
                descriptor.with_origin(origin.to_path_buf(), relative)
            }
            None => descriptor,
        }
    }
}
