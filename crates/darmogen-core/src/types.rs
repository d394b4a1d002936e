//! Semantic type model shared by the resolver and emitter stages
//!
//! `TypeNode` is the lowered shape of a TypeScript type annotation. It keeps
//! just enough structure for the emitter to recurse into element types.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// TypeScript keyword types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    String,
    Number,
    Boolean,
    BigInt,
    Any,
    Unknown,
    Object,
    Symbol,
    Void,
    Undefined,
    Null,
    Never,
}

impl Keyword {
    /// Normalized name, as used for type-name lookups
    pub fn name(self) -> &'static str {
        match self {
            Keyword::String => "String",
            Keyword::Number => "Number",
            Keyword::Boolean => "Boolean",
            Keyword::BigInt => "BigInt",
            Keyword::Any => "Any",
            Keyword::Unknown => "Unknown",
            Keyword::Object => "Object",
            Keyword::Symbol => "Symbol",
            Keyword::Void => "Void",
            Keyword::Undefined => "Undefined",
            Keyword::Null => "Null",
            Keyword::Never => "Never",
        }
    }

    pub fn is_nullish(self) -> bool {
        matches!(self, Keyword::Null | Keyword::Undefined)
    }
}

/// Kind of a literal type (`'admin'`, `42`, `true`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    String,
    Number,
    Boolean,
    BigInt,
}

impl LiteralKind {
    pub fn underlying(self) -> Keyword {
        match self {
            LiteralKind::String => Keyword::String,
            LiteralKind::Number => Keyword::Number,
            LiteralKind::Boolean => Keyword::Boolean,
            LiteralKind::BigInt => Keyword::BigInt,
        }
    }
}

/// Lowered type annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeNode {
    Keyword(Keyword),
    Literal(LiteralKind),
    /// Named type reference (`Date`, `User`, `Partial<User>`)
    Reference { name: String, args: Vec<TypeNode> },
    /// `T[]`, `Array<T>`, `ReadonlyArray<T>`
    Array(Box<TypeNode>),
    /// `Record<K, V>`, `Map<K, V>`
    Map { key: Box<TypeNode>, value: Box<TypeNode> },
    Union(Vec<TypeNode>),
    /// `T[K]`, usually `(typeof VALUES)[number]`
    IndexedAccess {
        object: Box<TypeNode>,
        index: Box<TypeNode>,
    },
    /// Anything else, tagged with the syntax kind it came from
    Unsupported(String),
}

impl TypeNode {
    pub fn reference(name: impl Into<String>) -> Self {
        TypeNode::Reference {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn array(element: TypeNode) -> Self {
        TypeNode::Array(Box::new(element))
    }

    /// Reduce to the variant that carries meaning.
    ///
    /// Unions keep their first variant that is not `null`/`undefined`; literal
    /// types become their underlying keyword.
    pub fn collapse(&self) -> TypeNode {
        match self {
            TypeNode::Union(variants) => variants
                .iter()
                .find(|v| !v.is_nullish())
                .or_else(|| variants.first())
                .map(TypeNode::collapse)
                .unwrap_or(TypeNode::Keyword(Keyword::Any)),
            TypeNode::Literal(kind) => TypeNode::Keyword(kind.underlying()),
            other => other.clone(),
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, TypeNode::Keyword(k) if k.is_nullish())
    }

    /// Normalized name: keyword name, referenced class name, or a structural tag.
    pub fn name(&self) -> String {
        match self {
            TypeNode::Keyword(k) => k.name().to_string(),
            TypeNode::Literal(kind) => kind.underlying().name().to_string(),
            TypeNode::Reference { name, .. } => name.clone(),
            TypeNode::Array(_) => "ArrayType".to_string(),
            TypeNode::Map { .. } => "MapType".to_string(),
            TypeNode::Union(_) => "UnionType".to_string(),
            TypeNode::IndexedAccess { .. } => "IndexedAccessType".to_string(),
            TypeNode::Unsupported(tag) => tag.clone(),
        }
    }

    /// Element type of an array, if this is one
    pub fn element(&self) -> Option<&TypeNode> {
        match self {
            TypeNode::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Referenced name, if this is a type reference
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            TypeNode::Reference { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Array(element) => write!(f, "{}[]", element),
            TypeNode::Reference { name, args } if !args.is_empty() => {
                let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}<{}>", name, args.join(", "))
            }
            TypeNode::Map { key, value } => write!(f, "Record<{}, {}>", key, value),
            TypeNode::Union(variants) => {
                let variants: Vec<String> = variants.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", variants.join(" | "))
            }
            TypeNode::IndexedAccess { object, index } => write!(f, "{}[{}]", object, index),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Resolved type of one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Normalized name of `node`
    pub name: String,
    pub node: TypeNode,
    /// Absolute path of the file the type name was imported from
    pub origin: Option<PathBuf>,
    /// `origin` relative to the source root
    pub relative_origin: Option<PathBuf>,
}

impl TypeDescriptor {
    /// Descriptor for a locally declared (or primitive) type
    pub fn local(node: TypeNode) -> Self {
        Self {
            name: node.name(),
            node,
            origin: None,
            relative_origin: None,
        }
    }

    pub fn with_origin(mut self, origin: PathBuf, relative: PathBuf) -> Self {
        self.origin = Some(origin);
        self.relative_origin = Some(relative);
        self
    }

    /// Descriptor for a nested node, keeping this descriptor's origin
    pub fn nested(&self, node: TypeNode) -> Self {
        Self {
            name: node.name(),
            node,
            origin: self.origin.clone(),
            relative_origin: self.relative_origin.clone(),
        }
    }
}

/// One exposed property of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: TypeDescriptor,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Fully resolved entity: concrete and inherited fields, de-duplicated by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityModel {
    pub name: String,
    pub fields: Vec<Field>,
}

impl EntityModel {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// An entity together with the source file it was found in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntity {
    /// Source file path relative to the source root
    pub path: PathBuf,
    pub name: String,
    pub model: EntityModel,
}
