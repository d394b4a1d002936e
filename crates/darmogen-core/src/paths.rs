//! Lexical path arithmetic shared by the module resolver and the import assembler.
//!
//! Nothing here touches the filesystem: resolution must work for files that do
//! not exist yet (generated output) and for specifiers that never will
//! (external packages).

use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` components without consulting the filesystem.
///
/// A `..` directly below the root is dropped, matching how `path.resolve`
/// behaves on POSIX systems.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(segment) => out.push(segment),
        }
    }
    out
}

/// Resolve `path` against `base`; absolute inputs ignore the base.
pub fn resolve(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    normalize(&base.join(path))
}

/// Compute the path that leads from the directory `from_dir` to `to`.
///
/// Both inputs are normalized first. Returns an empty path when they are equal.
pub fn relative_path(from_dir: &Path, to: &Path) -> PathBuf {
    let from = normalize(from_dir);
    let to = normalize(to);

    let from_components: Vec<Component<'_>> = from.components().collect();
    let to_components: Vec<Component<'_>> = to.components().collect();

    let common = from_components
        .iter()
        .zip(&to_components)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..from_components.len() {
        out.push("..");
    }
    for component in &to_components[common..] {
        out.push(component.as_os_str());
    }

    tracing::trace!("relative_path: {:?} -> {:?} = {:?}", from, to, out);
    out
}

/// Render a relative path with forward slashes, as import specifiers expect.
pub fn to_specifier(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_collapses_dots() {
        assert_eq!(
            normalize(Path::new("/project/app/../lib/./user.ts")),
            PathBuf::from("/project/lib/user.ts")
        );
        assert_eq!(normalize(Path::new("/../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize(Path::new("../a/../../b")), PathBuf::from("../../b"));
    }

    #[test]
    fn test_resolve_absolute_ignores_base() {
        assert_eq!(
            resolve(Path::new("/base"), "/abs/file.ts"),
            PathBuf::from("/abs/file.ts")
        );
        assert_eq!(
            resolve(Path::new("/base/dir"), "../file.ts"),
            PathBuf::from("/base/file.ts")
        );
    }

    #[test]
    fn test_relative_path_sibling_and_nested() {
        assert_eq!(
            relative_path(Path::new("/out/user"), Path::new("/out/user/profile.dart")),
            PathBuf::from("profile.dart")
        );
        assert_eq!(
            relative_path(Path::new("/out/user"), Path::new("/out/post/post.dart")),
            PathBuf::from("../post/post.dart")
        );
        assert_eq!(
            relative_path(Path::new("/out/a/b"), Path::new("/out/rest.dart")),
            PathBuf::from("../../rest.dart")
        );
    }

    #[test]
    fn test_to_specifier_uses_forward_slashes() {
        let path: PathBuf = ["..", "post", "post.dart"].iter().collect();
        assert_eq!(to_specifier(&path), "../post/post.dart");
    }

    proptest! {
        #[test]
        fn relative_path_round_trips(
            from in proptest::collection::vec("[a-z]{1,6}", 0..4),
            to in proptest::collection::vec("[a-z]{1,6}", 1..5),
        ) {
            let from_dir = PathBuf::from("/").join(from.join("/"));
            let target = PathBuf::from("/").join(to.join("/"));
            let rel = relative_path(&from_dir, &target);
            prop_assert_eq!(resolve(&from_dir, &rel), normalize(&target));
        }
    }
}
