use std::path::PathBuf;

use darmogen_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Source root does not exist: {0}")]
    SourceRootMissing(PathBuf),

    #[error("File not found: {path} ({reason})")]
    MissingSourceFile { path: PathBuf, reason: String },

    #[error("Syntax error in {path}: {message}")]
    Syntax { path: PathBuf, message: String },

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Parse task failed for {path}: {message}")]
    Task { path: PathBuf, message: String },
}
