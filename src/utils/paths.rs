use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// Makes a path absolute, resolving relative paths from current directory
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined
pub fn make_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().context("Could not determine current directory")?;
        Ok(current_dir.join(path))
    }
}

/// Resolves symlinks and `..` so two paths can be compared lexically,
/// falling back to the absolute form when the path does not exist
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined
pub fn resolve(path: &Path) -> Result<PathBuf> {
    match path.canonicalize() {
        Ok(canonical) => Ok(canonical),
        Err(_) => make_absolute(path),
    }
}

/// Express `path` relative to `base`, walking up with `..` where needed
///
/// Both paths should be absolute; `None` if no relative form exists
/// (e.g. different drive prefixes on Windows).
#[must_use]
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    pathdiff::diff_paths(path, base)
}

/// Joins the components of a relative path with `/`, independent of platform
#[must_use]
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_make_absolute() {
        let abs = make_absolute(Path::new("some/file.c")).unwrap();
        assert!(abs.is_absolute());
        assert!(abs.ends_with("some/file.c"));
    }

    #[test]
    fn test_resolve_existing_and_missing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("a");
        std::fs::create_dir(&dir).unwrap();

        let resolved = resolve(&dir.join("..").join("a")).unwrap();
        assert_eq!(resolved, dir.canonicalize().unwrap());

        let missing = resolve(&temp.path().join("missing")).unwrap();
        assert!(missing.is_absolute());
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(
            relative_to(Path::new("/work/src/drivers/uart.c"), Path::new("/work/src")),
            Some(PathBuf::from("drivers/uart.c"))
        );
        assert_eq!(
            relative_to(Path::new("/work/lib/a.c"), Path::new("/work/project")),
            Some(PathBuf::from("../lib/a.c"))
        );
    }

    #[test]
    fn test_to_slash() {
        let path: PathBuf = ["..", "lib", "a.c"].iter().collect();
        assert_eq!(to_slash(&path), "../lib/a.c");
        assert_eq!(to_slash(Path::new("./drivers/uart.c")), "drivers/uart.c");
    }
}
