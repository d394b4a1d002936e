//! Import path aliases.
//!
//! Alias targets are templates: `{cwd}` or `{identifier.decorator}` are looked
//! up as dot paths in the serialized parser configuration. Expansion happens
//! once, when the table is built, and unknown paths expand to nothing.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::config::ParserConfig;
use crate::error::CoreError;

fn template_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("valid template regex"))
}

/// A single expanded alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub prefix: String,
    pub target: String,
}

impl Alias {
    /// Rewrite `specifier` if it starts with this alias on a path boundary.
    ///
    /// `src` matches `src` and `src/user` but not `srcfoo`.
    pub fn apply(&self, specifier: &str) -> Option<String> {
        let rest = specifier.strip_prefix(&self.prefix)?;
        if rest.is_empty() || rest.starts_with('/') || self.prefix.ends_with('/') {
            Some(format!("{}{}", self.target, rest))
        } else {
            None
        }
    }
}

/// Ordered, expanded alias table
///
/// An alias only matches whole leading path segments: `~` rewrites `~/x` but
/// not `~models/x`, unlike plain string-prefix matching. A prefix ending in
/// `/` matches anything beneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: Vec<Alias>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand every configured alias template against `config`.
    pub fn from_config(config: &ParserConfig) -> Result<Self, CoreError> {
        let root = serde_json::to_value(config)?;
        let mut table = Self::new();

        for (prefix, template) in &config.aliases {
            if prefix.is_empty() {
                return Err(CoreError::InvalidAlias {
                    alias: prefix.clone(),
                    reason: "alias prefix must not be empty".to_string(),
                });
            }
            let target = expand_template(template, &root);
            tracing::debug!("alias '{}' -> '{}'", prefix, target);
            table.aliases.push(Alias {
                prefix: prefix.clone(),
                target,
            });
        }

        Ok(table)
    }

    pub fn insert(&mut self, prefix: impl Into<String>, target: impl Into<String>) {
        self.aliases.push(Alias {
            prefix: prefix.into(),
            target: target.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alias> {
        self.aliases.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Apply every alias in order, each to the output of the previous one.
    ///
    /// Returns the rewritten specifier and whether any alias matched.
    pub fn rewrite(&self, specifier: &str) -> (String, bool) {
        let mut current = specifier.to_string();
        let mut matched = false;
        for alias in &self.aliases {
            if let Some(rewritten) = alias.apply(&current) {
                tracing::trace!("alias '{}' rewrote '{}' to '{}'", alias.prefix, current, rewritten);
                current = rewritten;
                matched = true;
            }
        }
        (current, matched)
    }
}

/// Replace every `{dot.path}` in `template` with the value found in `root`.
pub fn expand_template(template: &str, root: &Value) -> String {
    template_pattern()
        .replace_all(template, |caps: &regex::Captures<'_>| {
            dot_get(root, &caps[1]).unwrap_or_default()
        })
        .into_owned()
}

fn dot_get(root: &Value, path: &str) -> Option<String> {
    let mut current = root;
    for part in path.split('.') {
        current = current.get(part.trim())?;
    }
    match current {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::config::EntityIdentifier;

    fn config() -> ParserConfig {
        ParserConfig::new("/project/app", EntityIdentifier::decorator("Entity"))
            .with_package_root("/project")
    }

    #[test]
    fn test_expand_config_fields() -> Result<(), CoreError> {
        let config = config()
            .with_alias("src", "{cwd}")
            .with_alias("@shared", "{root}/shared")
            .with_alias("@tag", "/tags/{identifier.decorator}")
            .with_alias("@missing", "/x{nope.nothing}");
        let table = AliasTable::from_config(&config)?;
        let targets: Vec<_> = table.iter().map(|a| a.target.as_str()).collect();
        assert_eq!(
            targets,
            vec!["/project/app", "/project/shared", "/tags/Entity", "/x"]
        );
        Ok(())
    }

    #[test]
    fn test_rewrite_respects_path_boundary() {
        let mut table = AliasTable::new();
        table.insert("src", "/project/app");

        assert_eq!(table.rewrite("src/user"), ("/project/app/user".to_string(), true));
        assert_eq!(table.rewrite("src"), ("/project/app".to_string(), true));
        assert_eq!(table.rewrite("srcfoo/user"), ("srcfoo/user".to_string(), false));
        assert_eq!(table.rewrite("./user"), ("./user".to_string(), false));

        table.insert("~", "/lib");
        assert_eq!(table.rewrite("~/models/x"), ("/lib/models/x".to_string(), true));
        assert_eq!(table.rewrite("~models/x"), ("~models/x".to_string(), false));
    }

    #[test]
    fn test_rewrite_chains_aliases() {
        let mut table = AliasTable::new();
        table.insert("@app", "src/app");
        table.insert("src", "/project");

        assert_eq!(
            table.rewrite("@app/user"),
            ("/project/app/user".to_string(), true)
        );
    }

    #[test]
    fn test_empty_prefix_is_rejected() {
        let config = config().with_alias("", "/x");
        assert!(matches!(
            AliasTable::from_config(&config),
            Err(CoreError::InvalidAlias { .. })
        ));
    }
}
