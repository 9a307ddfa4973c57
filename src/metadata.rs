//! Per-file metadata recorded in an annotation.

use std::fs;
use std::path::{Component, Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

use crate::language::{extension_of, Language};

/// Package name used when a Go file has no readable `package` clause.
pub const UNKNOWN_PACKAGE: &str = "unknown";

/// Package name recorded for Dockerfiles.
pub const DOCKER_PACKAGE: &str = "docker";

/// Language name for files the registry does not know.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

lazy_static! {
    static ref GO_PACKAGE: Regex =
        Regex::new(r"^\s*package\s+([\p{L}_][\p{L}\p{Nd}_]*)").unwrap();
}

/// Everything the annotator needs to stamp one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Where the file lives on disk.
    pub path: PathBuf,
    /// The path written into the annotation (`path=`).
    pub display_path: String,
    /// Display name of the language (`lang=`).
    pub language: String,
    /// Package or module name (`pkg=`).
    pub package_name: String,
    /// Placeholder for a resolved import path; currently the absolute path.
    pub import_path: String,
}

impl FileInfo {
    /// Derive metadata for `path`, recording it relative to `root`.
    pub fn derive(root: &Path, path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            display_path: display_path(root, path),
            language: determine_language(path).to_string(),
            package_name: determine_package_name(path),
            import_path: determine_import_path(path),
        }
    }
}

/// Display name of the language for `path`.
///
/// Extensionless files only count as Dockerfiles when they are named so.
pub fn determine_language(path: &Path) -> &'static str {
    if is_dockerfile(path) {
        return Language::Dockerfile.name();
    }
    match Language::for_path(path) {
        Some(Language::Dockerfile) | None => UNKNOWN_LANGUAGE,
        Some(lang) => lang.name(),
    }
}

/// Package name: the Go `package` clause, a fixed name for Dockerfiles, or
/// the parent directory's basename.
pub fn determine_package_name(path: &Path) -> String {
    if extension_of(path) == ".go" {
        return read_go_package_name(path);
    }
    if is_dockerfile(path) {
        return DOCKER_PACKAGE.to_string();
    }
    path.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| UNKNOWN_PACKAGE.to_string())
}

/// Import path placeholder. Module-aware resolution (go.mod, package.json)
/// is not done yet; this is the absolute file path.
pub fn determine_import_path(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

/// `path` relative to `root` with `/` separators, or `path` as-is when it
/// is not under `root`.
pub fn display_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::RootDir | Component::Prefix(_) | Component::CurDir => None,
        })
        .collect();
    let joined = parts.join("/");
    if rel.has_root() {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Extract the package name from Go source text.
pub fn parse_go_package(source: &str) -> Option<&str> {
    source
        .lines()
        .find_map(|line| GO_PACKAGE.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn read_go_package_name(path: &Path) -> String {
    let Ok(bytes) = fs::read(path) else {
        return UNKNOWN_PACKAGE.to_string();
    };
    let source = String::from_utf8_lossy(&bytes);
    parse_go_package(&source)
        .unwrap_or(UNKNOWN_PACKAGE)
        .to_string()
}

fn is_dockerfile(path: &Path) -> bool {
    extension_of(path) == ".dockerfile"
        || path
            .file_name()
            .map(|n| n.eq_ignore_ascii_case("Dockerfile"))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_determine_language() {
        assert_eq!(determine_language(Path::new("a/main.go")), "Go");
        assert_eq!(determine_language(Path::new("a/tool.py")), "Python");
        assert_eq!(determine_language(Path::new("a/app.jsx")), "JavaScript");
        assert_eq!(determine_language(Path::new("a/app.ts")), "TypeScript");
        assert_eq!(determine_language(Path::new("a/Dockerfile")), "Dockerfile");
        assert_eq!(determine_language(Path::new("a/prod.dockerfile")), "Dockerfile");
        assert_eq!(determine_language(Path::new("a/Makefile")), "Unknown");
        assert_eq!(determine_language(Path::new("a/lib.rs")), "Unknown");
    }

    #[test]
    fn test_parse_go_package() {
        assert_eq!(parse_go_package("package main\n\nfunc main(){}\n"), Some("main"));
        assert_eq!(
            parse_go_package("// Package util does things.\npackage util // import \"x/util\"\n"),
            Some("util")
        );
        assert_eq!(parse_go_package("//go:build linux\n\n  package   sys\n"), Some("sys"));
        assert_eq!(parse_go_package("func main() {}\n"), None);
    }

    #[test]
    fn test_parse_go_package_unicode_identifier() {
        assert_eq!(parse_go_package("package café\n"), Some("café"));
        assert_eq!(parse_go_package("package _π2\n"), Some("_π2"));
    }

    #[test]
    fn test_go_package_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("server.go");
        fs::write(&path, "package api\n").unwrap();
        assert_eq!(determine_package_name(&path), "api");

        let missing = temp.path().join("missing.go");
        assert_eq!(determine_package_name(&missing), UNKNOWN_PACKAGE);
    }

    #[test]
    fn test_package_from_parent_directory() {
        assert_eq!(determine_package_name(Path::new("/repo/utils/helpers.py")), "utils");
        assert_eq!(determine_package_name(Path::new("/repo/web/app.ts")), "web");
    }

    #[test]
    fn test_dockerfile_package_sentinel() {
        assert_eq!(determine_package_name(Path::new("/repo/deploy/Dockerfile")), DOCKER_PACKAGE);
    }

    #[test]
    fn test_display_path_is_relative_with_slashes() {
        let root = Path::new("/repo");
        assert_eq!(display_path(root, Path::new("/repo/a.go")), "a.go");
        assert_eq!(display_path(root, Path::new("/repo/pkg/x/b.py")), "pkg/x/b.py");
        assert_eq!(display_path(root, Path::new("/other/c.go")), "/other/c.go");
    }

    #[test]
    fn test_derive_file_info() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("scripts");
        fs::create_dir(&dir).unwrap();
        let path = dir.join("run.py");
        fs::write(&path, "print('hi')\n").unwrap();

        let info = FileInfo::derive(temp.path(), &path);
        assert_eq!(info.display_path, "scripts/run.py");
        assert_eq!(info.language, "Python");
        assert_eq!(info.package_name, "scripts");
        assert!(Path::new(&info.import_path).is_absolute());
    }
}
