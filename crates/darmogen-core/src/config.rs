//! Run configuration for the parser and generator stages.
//!
//! A `darmogen.toml` file looks like:
//!
//! ```toml
//! [parser]
//! cwd = "../backend/src"
//! root = "../backend"
//! ext = ".entity.ts"
//! identifier = { decorator = "Entity" }
//!
//! [parser.aliases]
//! src = "{cwd}"
//!
//! [generator]
//! out = "./lib/models"
//! imports = ["./rest.dart"]
//! file_suffix = ".model.dart"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::naming::NameStyle;
use crate::paths;

pub const DEFAULT_CONFIG_FILE: &str = "darmogen.toml";

fn default_ext() -> String {
    ".entity.ts".to_string()
}

fn default_import_extension() -> String {
    ".ts".to_string()
}

fn default_exclude_decorator() -> String {
    "Exclude".to_string()
}

fn default_true() -> bool {
    true
}

fn default_base_class() -> String {
    "Model".to_string()
}

fn default_identity_field() -> String {
    "id".to_string()
}

fn default_file_style() -> NameStyle {
    NameStyle::Kebab
}

fn default_file_suffix() -> String {
    ".dart".to_string()
}

/// Raw entity identification settings, exactly one of which must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implements: Option<String>,
}

/// The single identification rule active for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRule {
    /// Class carries a decorator with this identifier (`@Entity()`)
    Decorator(String),
    /// Class directly extends this base class
    Extends(String),
    /// Class directly implements this interface
    Implements(String),
}

impl EntityIdentifier {
    pub fn decorator(name: impl Into<String>) -> Self {
        Self {
            decorator: Some(name.into()),
            ..Self::default()
        }
    }

    /// Select the active rule. Zero or several configured rules is a
    /// configuration error.
    pub fn rule(&self) -> Result<EntityRule, CoreError> {
        let mut rules = Vec::new();
        if let Some(name) = &self.decorator {
            rules.push(EntityRule::Decorator(name.clone()));
        }
        if let Some(name) = &self.extends {
            rules.push(EntityRule::Extends(name.clone()));
        }
        if let Some(name) = &self.implements {
            rules.push(EntityRule::Implements(name.clone()));
        }

        match rules.len() {
            0 => Err(CoreError::Configuration(
                "No source entity identifier specified (set one of decorator, extends, implements)"
                    .to_string(),
            )),
            1 => Ok(rules.remove(0)),
            n => Err(CoreError::Configuration(format!(
                "Entity identifier must name exactly one rule, found {}",
                n
            ))),
        }
    }
}

/// Settings for the resolver stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Source root; candidate files are discovered beneath it
    #[serde(rename = "cwd")]
    pub source_root: PathBuf,

    /// Package root holding `node_modules`; defaults to the source root
    #[serde(rename = "root", default)]
    pub package_root: PathBuf,

    /// Suffix identifying candidate source files
    #[serde(default = "default_ext")]
    pub ext: String,

    /// Import prefix → template, applied in declaration order
    #[serde(default)]
    pub aliases: IndexMap<String, String>,

    #[serde(default)]
    pub identifier: EntityIdentifier,

    /// Member decorator that hides a field from the model
    #[serde(default = "default_exclude_decorator")]
    pub exclude_decorator: String,

    /// Only decorated members (`@Column()`, `@ManyToOne()`, ...) are fields
    #[serde(default = "default_true")]
    pub require_field_decorator: bool,

    /// Appended to import specifiers that lack a source extension
    #[serde(default = "default_import_extension")]
    pub import_extension: String,
}

impl ParserConfig {
    pub fn new(source_root: impl Into<PathBuf>, identifier: EntityIdentifier) -> Self {
        Self {
            source_root: source_root.into(),
            package_root: PathBuf::new(),
            ext: default_ext(),
            aliases: IndexMap::new(),
            identifier,
            exclude_decorator: default_exclude_decorator(),
            require_field_decorator: true,
            import_extension: default_import_extension(),
        }
    }

    pub fn with_alias(mut self, prefix: impl Into<String>, template: impl Into<String>) -> Self {
        self.aliases.insert(prefix.into(), template.into());
        self
    }

    pub fn with_package_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.package_root = root.into();
        self
    }

    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = ext.into();
        self
    }

    /// Effective package root
    pub fn package_root(&self) -> &Path {
        if self.package_root.as_os_str().is_empty() {
            &self.source_root
        } else {
            &self.package_root
        }
    }

    /// Make the source and package roots absolute relative to `base`
    pub fn resolve_relative_to(&mut self, base: &Path) {
        self.source_root = paths::resolve(base, &self.source_root);
        if !self.package_root.as_os_str().is_empty() {
            self.package_root = paths::resolve(base, &self.package_root);
        }
    }
}

/// Settings for the emitter stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Output directory; entity files mirror their source layout beneath it
    pub out: PathBuf,

    /// Import specifiers added to every file, relative to `out`
    #[serde(default)]
    pub imports: Vec<String>,

    /// Text blocks written verbatim before the imports
    #[serde(default)]
    pub headers: Vec<String>,

    /// Base class owning the identity field
    #[serde(default = "default_base_class")]
    pub base_class: String,

    #[serde(default = "default_identity_field")]
    pub identity_field: String,

    #[serde(default)]
    pub name_style: NameStyle,

    #[serde(default = "default_file_style")]
    pub file_style: NameStyle,

    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
}

impl GeneratorConfig {
    pub fn new(out: impl Into<PathBuf>) -> Self {
        Self {
            out: out.into(),
            imports: Vec::new(),
            headers: Vec::new(),
            base_class: default_base_class(),
            identity_field: default_identity_field(),
            name_style: NameStyle::default(),
            file_style: default_file_style(),
            file_suffix: default_file_suffix(),
        }
    }

    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.imports.push(import.into());
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self
    }

    pub fn with_file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = suffix.into();
        self
    }
}

/// Complete configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DarmogenConfig {
    pub parser: ParserConfig,
    pub generator: GeneratorConfig,
}

impl DarmogenConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let content = fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let base = if base.is_absolute() {
            base
        } else {
            paths::resolve(&std::env::current_dir()?, &base)
        };
        config.resolve_relative_to(&base);
        config.validate()?;

        tracing::debug!(
            "Loaded config from {}: cwd={}, out={}",
            path.display(),
            config.parser.source_root.display(),
            config.generator.out.display()
        );
        Ok(config)
    }

    /// Make every configured path absolute relative to `base`
    pub fn resolve_relative_to(&mut self, base: &Path) {
        self.parser.resolve_relative_to(base);
        self.generator.out = paths::resolve(base, &self.generator.out);
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.parser.identifier.rule()?;
        if self.parser.ext.is_empty() {
            return Err(CoreError::Configuration(
                "parser.ext must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Starter configuration written by `darmogen init`
    pub fn starter() -> &'static str {
        r#"[parser]
cwd = "./src"
root = "."
ext = ".entity.ts"
identifier = { decorator = "Entity" }

[parser.aliases]
src = "{cwd}"

[generator]
out = "./models"
imports = []
file_suffix = ".model.dart"
"#
    }
}
