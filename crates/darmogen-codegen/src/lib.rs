//! Dart model generation from resolved entities

pub mod dart;
pub mod error;
pub mod generator;
pub mod import_tracker;
pub mod target;
pub mod type_mapper;

pub use dart::DartModel;
pub use error::CodegenError;
pub use generator::{DartModelGenerator, EmittedFile, GenerationFailure, GenerationReport};
pub use import_tracker::{HeaderAssembler, ImportTracker};
pub use target::{DartEntity, EntityIndex};
pub use type_mapper::{FieldShape, TypeMapper};
