//! Configuration, module resolution and the semantic type model for darmogen

pub mod alias;
pub mod config;
pub mod error;
pub mod module_resolver;
pub mod naming;
pub mod paths;
pub mod progress;
pub mod types;

pub use alias::AliasTable;
pub use config::{DarmogenConfig, EntityIdentifier, EntityRule, GeneratorConfig, ParserConfig};
pub use error::CoreError;
pub use module_resolver::ModuleResolver;
pub use naming::NameStyle;
pub use progress::{NoProgress, ProgressEvent, ProgressSink, Stage};
pub use types::{EntityModel, Field, Keyword, LiteralKind, SourceEntity, TypeDescriptor, TypeNode};
