//! Shared naming utilities for class names, file names and local identifiers.
//!
//! Words are split on `-`, `_`, whitespace, lower→upper transitions and the end
//! of an acronym (`HTTPServer` → `HTTP`, `Server`). Every style is built from
//! the same word list so formatting stays consistent between the class name
//! written into a file and the file name itself.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A user-supplied string → string formatter.
pub type Formatter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Split an identifier into its words, preserving the original casing.
///
/// # Examples
/// ```
/// use darmogen_core::naming::split_words;
/// assert_eq!(split_words("UserProfile"), vec!["User", "Profile"]);
/// assert_eq!(split_words("user_profile-item"), vec!["user", "profile", "item"]);
/// assert_eq!(split_words("HTTPServer"), vec!["HTTP", "Server"]);
/// ```
pub fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == '_' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

/// Convert to PascalCase
///
/// # Examples
/// ```
/// use darmogen_core::naming::to_pascal_case;
/// assert_eq!(to_pascal_case("user"), "User");
/// assert_eq!(to_pascal_case("user_profile"), "UserProfile");
/// assert_eq!(to_pascal_case("UserProfile"), "UserProfile");
/// ```
pub fn to_pascal_case(name: &str) -> String {
    split_words(name).iter().map(|w| capitalize(w)).collect()
}

/// Convert to camelCase, used for closure parameters in generated code
///
/// # Examples
/// ```
/// use darmogen_core::naming::to_camel_case;
/// assert_eq!(to_camel_case("UserProfile"), "userProfile");
/// assert_eq!(to_camel_case("post"), "post");
/// ```
pub fn to_camel_case(name: &str) -> String {
    let pascal = to_pascal_case(name);
    let mut chars = pascal.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Convert to lowercase kebab-case
///
/// # Examples
/// ```
/// use darmogen_core::naming::to_kebab_case;
/// assert_eq!(to_kebab_case("UserProfile"), "user-profile");
/// ```
pub fn to_kebab_case(name: &str) -> String {
    split_words(name)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Convert to lowercase snake_case
///
/// # Examples
/// ```
/// use darmogen_core::naming::to_snake_case;
/// assert_eq!(to_snake_case("UserProfile"), "user_profile");
/// ```
pub fn to_snake_case(name: &str) -> String {
    split_words(name)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Casing applied by the configured name and file-name formatters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameStyle {
    #[default]
    Pascal,
    Camel,
    Kebab,
    Snake,
    /// Leave the name untouched
    Preserve,
}

impl NameStyle {
    pub fn apply(self, name: &str) -> String {
        match self {
            NameStyle::Pascal => to_pascal_case(name),
            NameStyle::Camel => to_camel_case(name),
            NameStyle::Kebab => to_kebab_case(name),
            NameStyle::Snake => to_snake_case(name),
            NameStyle::Preserve => name.to_string(),
        }
    }

    /// Wrap this style in a shareable formatter, appending `suffix`.
    pub fn formatter(self, suffix: impl Into<String>) -> Formatter {
        let suffix = suffix.into();
        Arc::new(move |name: &str| format!("{}{}", self.apply(name), suffix))
    }
}

impl fmt::Display for NameStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameStyle::Pascal => write!(f, "pascal"),
            NameStyle::Camel => write!(f, "camel"),
            NameStyle::Kebab => write!(f, "kebab"),
            NameStyle::Snake => write!(f, "snake"),
            NameStyle::Preserve => write!(f, "preserve"),
        }
    }
}
