//! TypeScript → Dart type mapping

use darmogen_core::{Keyword, TypeDescriptor, TypeNode};

use crate::import_tracker::ImportTracker;
use crate::target::EntityIndex;

const DART_DYNAMIC: &str = "dynamic";

/// How a field crosses the JSON boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldShape<'a> {
    /// `Date`, sent as an ISO-8601 string
    Date,
    /// Another entity, sent as a nested object
    Entity(usize),
    /// An array with the given element type
    List(&'a TypeNode),
    /// A string-keyed map with the given value type
    Map(&'a TypeNode),
    /// Anything that JSON carries as is
    Plain,
}

pub struct TypeMapper<'a> {
    index: &'a EntityIndex,
}

impl<'a> TypeMapper<'a> {
    pub fn new(index: &'a EntityIndex) -> Self {
        Self { index }
    }

    pub fn map_descriptor(&self, descriptor: &TypeDescriptor, tracker: &mut ImportTracker) -> String {
        self.map_type(&descriptor.node, tracker)
    }

    /// Dart spelling of `node`. Every entity reference met on the way,
    /// including array elements, is recorded in `tracker`.
    pub fn map_type(&self, node: &TypeNode, tracker: &mut ImportTracker) -> String {
        match node {
            TypeNode::Reference { name, .. } if name == "Date" => "DateTime".to_string(),
            TypeNode::Reference { name, .. } => match self.index.by_name(name) {
                Some(entity) => {
                    tracker.record(entity);
                    self.index[entity].class_name.clone()
                }
                None => {
                    tracing::trace!("unknown type '{}' mapped to dynamic", name);
                    DART_DYNAMIC.to_string()
                }
            },
            TypeNode::Keyword(keyword) => keyword_type(*keyword).to_string(),
            TypeNode::Array(element) => format!("List<{}>", self.map_type(element, tracker)),
            TypeNode::Map { value, .. } => {
                format!("Map<String, {}>", self.map_type(value, tracker))
            }
            TypeNode::IndexedAccess { index, .. } => self.map_type(index, tracker),
            TypeNode::Union(_) | TypeNode::Literal(_) => self.map_type(&node.collapse(), tracker),
            TypeNode::Unsupported(_) => DART_DYNAMIC.to_string(),
        }
    }

    /// Entity referenced by `node`, if it names one
    pub fn entity_of(&self, node: &TypeNode) -> Option<usize> {
        match node {
            TypeNode::Reference { name, .. } if name != "Date" => self.index.by_name(name),
            _ => None,
        }
    }

    pub fn shape<'n>(&self, node: &'n TypeNode) -> FieldShape<'n> {
        match node {
            TypeNode::Reference { name, .. } if name == "Date" => FieldShape::Date,
            TypeNode::Array(element) => FieldShape::List(element),
            TypeNode::Map { value, .. } => FieldShape::Map(value),
            _ => match self.entity_of(node) {
                Some(entity) => FieldShape::Entity(entity),
                None => FieldShape::Plain,
            },
        }
    }
}

fn keyword_type(keyword: Keyword) -> &'static str {
    match keyword {
        Keyword::String => "String",
        Keyword::Number => "int",
        Keyword::Boolean => "bool",
        Keyword::BigInt => "BigInt",
        _ => DART_DYNAMIC,
    }
}
