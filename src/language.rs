//! Language registry: comment syntax per file extension.
//!
//! The registry is a static table from extension to [`Language`]. Adding a
//! language means adding a variant and its table entries; nothing else
//! needs to change.

use phf::phf_map;
use std::path::Path;

/// Languages that can carry a codemap annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Go,
    Python,
    JavaScript,
    TypeScript,
    Dockerfile,
}

/// Extension (including the dot, `""` for none) to language.
static REGISTRY: phf::Map<&'static str, Language> = phf_map! {
    ".go" => Language::Go,
    ".py" => Language::Python,
    ".js" => Language::JavaScript,
    ".jsx" => Language::JavaScript,
    ".ts" => Language::TypeScript,
    ".tsx" => Language::TypeScript,
    ".dockerfile" => Language::Dockerfile,
    "" => Language::Dockerfile,
};

const GO_DIRECTIVES: &[&str] = &["//go:generate", "//go:build", "//nolint", "// +build"];

const PYTHON_DIRECTIVES: &[&str] = &[
    "#!",
    "# -*-",
    "# type:",
    "# noqa",
    "# pylint:",
    "# pragma:",
];

const SCRIPT_DIRECTIVES: &[&str] = &[
    "@ts-ignore",
    "@ts-nocheck",
    "@ts-check",
    "@ts-expect-error",
    "@flow",
    "eslint-",
];

const DOCKERFILE_DIRECTIVES: &[&str] = &["# syntax=", "# escape=", "# check="];

impl Language {
    /// Look up the language registered for an extension.
    ///
    /// The extension includes the leading dot; pass `""` for files without
    /// one. There is no fallback.
    pub fn resolve(ext: &str) -> Option<Language> {
        REGISTRY.get(ext).copied()
    }

    /// Resolve a path via its extension.
    pub fn for_path(path: &Path) -> Option<Language> {
        Self::resolve(extension_of(path))
    }

    /// Display name, as recorded in the `lang=` field.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Go => "Go",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Dockerfile => "Dockerfile",
        }
    }

    /// All extensions registered for this language.
    pub fn extensions(&self) -> Vec<&'static str> {
        let mut exts: Vec<&'static str> = REGISTRY
            .entries()
            .filter(|(_, lang)| *lang == self)
            .map(|(ext, _)| *ext)
            .collect();
        exts.sort_unstable();
        exts
    }

    /// Opens a single-line comment.
    pub fn line_comment(&self) -> &'static str {
        match self {
            Language::Go | Language::JavaScript | Language::TypeScript => "//",
            Language::Python | Language::Dockerfile => "#",
        }
    }

    /// Opens a multi-line comment.
    pub fn block_comment(&self) -> &'static str {
        match self {
            Language::Go | Language::JavaScript | Language::TypeScript => "/*",
            Language::Python => "\"\"\"",
            Language::Dockerfile => "#",
        }
    }

    /// Closes a multi-line comment; empty when the language has none.
    pub fn block_comment_end(&self) -> &'static str {
        match self {
            Language::Go | Language::JavaScript | Language::TypeScript => "*/",
            Language::Python => "\"\"\"",
            Language::Dockerfile => "",
        }
    }

    /// True for directive comments (build tags, lint pragmas, type-checker
    /// hints) that must be left alone and never read as an annotation.
    pub fn is_special_comment(&self, line: &str) -> bool {
        let line = line.trim();
        match self {
            Language::Go => GO_DIRECTIVES.iter().any(|p| line.starts_with(p)),
            Language::Python => PYTHON_DIRECTIVES.iter().any(|p| line.starts_with(p)),
            Language::JavaScript | Language::TypeScript => {
                let body = line
                    .strip_prefix("//")
                    .or_else(|| line.strip_prefix("/*"))
                    .unwrap_or(line)
                    .trim_start();
                SCRIPT_DIRECTIVES.iter().any(|p| body.starts_with(p))
            }
            Language::Dockerfile => {
                let lower = line.to_ascii_lowercase();
                DOCKERFILE_DIRECTIVES.iter().any(|p| lower.starts_with(p))
            }
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The extension of a path's basename, from its last `.` inclusive.
///
/// `main.go` gives `.go`, `app.min.js` gives `.js`, `Dockerfile` gives `""`.
pub fn extension_of(path: &Path) -> &str {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    match name.rfind('.') {
        Some(idx) => &name[idx..],
        None => "",
    }
}

/// All registered extensions, sorted.
pub fn registered_extensions() -> Vec<&'static str> {
    let mut exts: Vec<&'static str> = REGISTRY.keys().copied().collect();
    exts.sort_unstable();
    exts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_extensions() {
        assert_eq!(Language::resolve(".go"), Some(Language::Go));
        assert_eq!(Language::resolve(".py"), Some(Language::Python));
        assert_eq!(Language::resolve(".jsx"), Some(Language::JavaScript));
        assert_eq!(Language::resolve(".tsx"), Some(Language::TypeScript));
        assert_eq!(Language::resolve(".dockerfile"), Some(Language::Dockerfile));
    }

    #[test]
    fn test_resolve_has_no_fallback() {
        assert_eq!(Language::resolve(".md"), None);
        assert_eq!(Language::resolve("go"), None);
        assert_eq!(Language::resolve(".GO"), None);
    }

    #[test]
    fn test_extensionless_file_resolves_to_dockerfile() {
        assert_eq!(
            Language::for_path(Path::new("/repo/Dockerfile")),
            Some(Language::Dockerfile)
        );
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("src/main.go")), ".go");
        assert_eq!(extension_of(Path::new("web/app.min.js")), ".js");
        assert_eq!(extension_of(Path::new("Dockerfile")), "");
        assert_eq!(extension_of(Path::new("dir.d/Makefile")), "");
    }

    #[test]
    fn test_comment_syntax() {
        assert_eq!(Language::Go.line_comment(), "//");
        assert_eq!(Language::Python.line_comment(), "#");
        assert_eq!(Language::TypeScript.block_comment(), "/*");
        assert_eq!(Language::Python.block_comment(), "\"\"\"");
        assert_eq!(Language::Dockerfile.block_comment_end(), "");
    }

    #[test]
    fn test_extensions_per_language() {
        assert_eq!(Language::JavaScript.extensions(), vec![".js", ".jsx"]);
        assert_eq!(Language::Dockerfile.extensions(), vec!["", ".dockerfile"]);
        assert_eq!(registered_extensions().len(), 8);
    }

    #[test]
    fn test_go_special_comments() {
        assert!(Language::Go.is_special_comment("//go:build linux"));
        assert!(Language::Go.is_special_comment("  // +build ignore"));
        assert!(Language::Go.is_special_comment("//nolint:errcheck"));
        assert!(!Language::Go.is_special_comment("// codemap: path=a.go;pkg=main;lang=Go"));
    }

    #[test]
    fn test_python_special_comments() {
        assert!(Language::Python.is_special_comment("#!/usr/bin/env python3"));
        assert!(Language::Python.is_special_comment("# -*- coding: utf-8 -*-"));
        assert!(Language::Python.is_special_comment("# type: ignore"));
        assert!(!Language::Python.is_special_comment("# regular comment"));
    }

    #[test]
    fn test_script_special_comments() {
        assert!(Language::TypeScript.is_special_comment("// @ts-nocheck"));
        assert!(Language::JavaScript.is_special_comment("/* eslint-disable */"));
        assert!(Language::JavaScript.is_special_comment("// @flow"));
        assert!(!Language::JavaScript.is_special_comment("// just a note"));
    }

    #[test]
    fn test_dockerfile_directives() {
        assert!(Language::Dockerfile.is_special_comment("# syntax=docker/dockerfile:1"));
        assert!(Language::Dockerfile.is_special_comment("# Escape=`"));
        assert!(!Language::Dockerfile.is_special_comment("# build stage"));
    }
}
