//! TypeScript entity resolution: discovery, parsing, classification,
//! inheritance and property extraction

pub mod classifier;
pub mod discovery;
pub mod entity_parser;
pub mod error;
pub mod inheritance;
pub mod properties;
pub mod source_cache;
pub mod syntax;

pub use classifier::EntityClassifier;
pub use entity_parser::{EntityParser, ParseFailure, ParseReport};
pub use error::ParserError;
pub use inheritance::{ClassRef, InheritanceResolver};
pub use properties::PropertyExtractor;
pub use source_cache::{EntityClass, ImportedSource, SourceCache};
