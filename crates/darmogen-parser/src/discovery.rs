//! Candidate file discovery

use std::path::{Path, PathBuf};

use darmogen_core::module_resolver::EXTERNAL_PACKAGE_DIR;
use walkdir::{DirEntry, WalkDir};

use crate::error::ParserError;

fn is_package_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == EXTERNAL_PACKAGE_DIR
}

/// Every file under `root` whose name ends with `suffix`, as paths relative to
/// `root`, in sorted order. Installed packages are never searched.
#[tracing::instrument(level = "debug", skip_all, fields(root = %root.display()))]
pub fn discover_sources(root: &Path, suffix: &str) -> Result<Vec<PathBuf>, ParserError> {
    if !root.is_dir() {
        return Err(ParserError::SourceRootMissing(root.to_path_buf()));
    }

    let mut found = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_package_dir(entry));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(suffix));
        if matches {
            if let Ok(relative) = entry.path().strip_prefix(root) {
                found.push(relative.to_path_buf());
            }
        }
    }

    found.sort();
    tracing::debug!("Found {} candidate files", found.len());
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discovers_sorted_relative_paths() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        fs::create_dir_all(root.join("user"))?;
        fs::create_dir_all(root.join("post"))?;
        fs::create_dir_all(root.join("node_modules/pkg"))?;
        fs::write(root.join("user/user.entity.ts"), "")?;
        fs::write(root.join("user/user.service.ts"), "")?;
        fs::write(root.join("post/post.entity.ts"), "")?;
        fs::write(root.join("node_modules/pkg/dep.entity.ts"), "")?;

        let found = discover_sources(root, ".entity.ts")?;
        assert_eq!(
            found,
            vec![
                PathBuf::from("post/post.entity.ts"),
                PathBuf::from("user/user.entity.ts"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let result = discover_sources(Path::new("/definitely/not/here"), ".entity.ts");
        assert!(matches!(result, Err(ParserError::SourceRootMissing(_))));
    }
}
