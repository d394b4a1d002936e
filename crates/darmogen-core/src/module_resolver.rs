//! Import specifier → absolute file path resolution
//!
//! Resolution order:
//! 1. aliases, applied in sequence
//! 2. bare specifiers that matched no alias resolve under `<root>/node_modules`
//! 3. relative specifiers resolve against the importing file's directory
//!
//! Nothing is checked on disk. A specifier that cannot be resolved still
//! produces a path; reading it later fails and the caller degrades.

use std::path::{Path, PathBuf};

use crate::alias::AliasTable;
use crate::config::ParserConfig;
use crate::error::CoreError;
use crate::paths;

pub const EXTERNAL_PACKAGE_DIR: &str = "node_modules";

const SOURCE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts"];

#[derive(Debug, Clone)]
pub struct ModuleResolver {
    aliases: AliasTable,
    source_root: PathBuf,
    package_root: PathBuf,
    import_extension: String,
}

impl ModuleResolver {
    pub fn new(
        aliases: AliasTable,
        source_root: impl Into<PathBuf>,
        package_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            aliases,
            source_root: source_root.into(),
            package_root: package_root.into(),
            import_extension: ".ts".to_string(),
        }
    }

    pub fn from_config(config: &ParserConfig) -> Result<Self, CoreError> {
        let aliases = AliasTable::from_config(config)?;
        Ok(Self::new(aliases, &config.source_root, config.package_root())
            .with_import_extension(config.import_extension.clone()))
    }

    pub fn with_import_extension(mut self, extension: impl Into<String>) -> Self {
        self.import_extension = extension.into();
        self
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Resolve a raw specifier as written.
    pub fn resolve(&self, specifier: &str, base_dir: Option<&Path>) -> PathBuf {
        let (rewritten, aliased) = self.aliases.rewrite(specifier);

        let resolved = if rewritten.starts_with('/') || Path::new(&rewritten).is_absolute() {
            paths::normalize(Path::new(&rewritten))
        } else if rewritten.starts_with('.') {
            paths::resolve(base_dir.unwrap_or(&self.source_root), &rewritten)
        } else if !aliased {
            paths::resolve(&self.package_root.join(EXTERNAL_PACKAGE_DIR), &rewritten)
        } else {
            // An alias produced a bare path; anchor it at the source root.
            paths::resolve(&self.source_root, &rewritten)
        };

        tracing::trace!("resolve '{}' (aliased={}) -> {}", specifier, aliased, resolved.display());
        resolved
    }

    /// Resolve an import declaration's module specifier to the file defining it.
    ///
    /// The configured source extension is appended unless the specifier
    /// already names a TypeScript file.
    pub fn resolve_import(&self, specifier: &str, base_dir: &Path) -> PathBuf {
        if SOURCE_EXTENSIONS.iter().any(|ext| specifier.ends_with(ext)) {
            self.resolve(specifier, Some(base_dir))
        } else {
            let with_ext = format!("{}{}", specifier, self.import_extension);
            self.resolve(&with_ext, Some(base_dir))
        }
    }

    /// Whether a resolved path points into the external package directory.
    pub fn is_external(&self, path: &Path) -> bool {
        path.starts_with(self.package_root.join(EXTERNAL_PACKAGE_DIR))
    }
}
