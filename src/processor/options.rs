//! Run configuration, loadable from a YAML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Config file names looked up in the target directory.
pub const CONFIG_FILE_NAMES: &[&str] = &["codemap.yaml", ".codemap.yaml"];

/// Options controlling a codemap run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Options {
    /// Directory to process.
    pub directory: PathBuf,
    /// Remove annotations instead of adding them.
    pub clean: bool,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Directory basenames to skip (case-insensitive).
    pub exclude_dirs: Vec<String>,
    /// Glob patterns matched against file basenames.
    pub exclude_files: Vec<String>,
    /// Process files on a worker pool.
    pub concurrent: bool,
    /// Worker pool size (0 = let the pool decide).
    pub max_workers: usize,
    /// Extensions eligible for annotation, with leading dot; `""` for
    /// extensionless files.
    pub supported_types: Vec<String>,
    /// Detailed logging.
    pub verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            clean: false,
            recursive: true,
            exclude_dirs: to_strings(&[
                ".git",
                ".github",
                ".gitlab",
                ".vscode",
                ".idea",
                "node_modules",
                "vendor",
                ".venv",
                "__pycache__",
                "dist",
                "build",
            ]),
            exclude_files: to_strings(&[
                ".*",
                "*.min.js",
                "*.map",
                "*.lock",
                "package-lock.json",
                "yarn.lock",
                "pnpm-lock.yaml",
                "*.sum",
                "*.mod",
            ]),
            concurrent: true,
            max_workers: 4,
            supported_types: to_strings(&[
                ".go",
                ".py",
                ".js",
                ".jsx",
                ".ts",
                ".tsx",
                ".dockerfile",
                "",
            ]),
            verbose: false,
        }
    }
}

impl Options {
    /// Parse options from a YAML file. Missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        Self::from_yaml(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Find a config file in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Check that all exclusion globs compile.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.exclude_files {
            globset::Glob::new(pattern).map_err(|source| Error::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Whether `ext` (as produced by [`crate::language::extension_of`]) is
    /// in the supported set.
    pub fn is_supported_type(&self, ext: &str) -> bool {
        self.supported_types.iter().any(|t| t == ext)
    }
}

/// Normalize a comma-separated type list (`"go, py,.ts"`) into extensions
/// with a leading dot. `none` or an empty entry stands for extensionless
/// files.
pub fn parse_types(list: &str) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    for raw in list.split(',') {
        let t = raw.trim();
        let ext = if t.is_empty() || t.eq_ignore_ascii_case("none") {
            String::new()
        } else if t.starts_with('.') {
            t.to_string()
        } else {
            format!(".{t}")
        };
        if !types.contains(&ext) {
            types.push(ext);
        }
    }
    types
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let opts = Options::default();
        assert_eq!(opts.directory, PathBuf::from("."));
        assert!(opts.recursive);
        assert!(opts.concurrent);
        assert_eq!(opts.max_workers, 4);
        assert!(opts.exclude_dirs.contains(&"node_modules".to_string()));
        assert!(opts.exclude_files.contains(&"*.min.js".to_string()));
        assert!(opts.is_supported_type(".go"));
        assert!(opts.is_supported_type(""));
        assert!(!opts.is_supported_type(".md"));
    }

    #[test]
    fn test_parse_yaml_keeps_defaults_for_missing_keys() {
        let yaml = r#"
max_workers: 8
concurrent: false
supported_types: [".go"]
"#;
        let opts = Options::from_yaml(yaml).unwrap();
        assert_eq!(opts.max_workers, 8);
        assert!(!opts.concurrent);
        assert_eq!(opts.supported_types, vec![".go".to_string()]);
        assert_eq!(opts.exclude_dirs, Options::default().exclude_dirs);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Options::from_yaml("  \n").unwrap(), Options::default());
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("codemap.yaml");
        fs::write(&path, "max_workers: [not, a, number]\n").unwrap();

        let err = Options::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_discover() {
        let temp = TempDir::new().unwrap();
        assert!(Options::discover(temp.path()).is_none());

        fs::write(temp.path().join(".codemap.yaml"), "verbose: true\n").unwrap();
        let found = Options::discover(temp.path()).unwrap();
        assert!(found.ends_with(".codemap.yaml"));
        assert!(Options::from_file(found).unwrap().verbose);
    }

    #[test]
    fn test_validate_rejects_bad_glob() {
        let opts = Options {
            exclude_files: vec!["[oops".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            opts.validate().unwrap_err(),
            Error::InvalidPattern { .. }
        ));
        assert!(Options::default().validate().is_ok());
    }

    #[test]
    fn test_parse_types() {
        assert_eq!(
            parse_types("go, py,.ts"),
            vec![".go".to_string(), ".py".to_string(), ".ts".to_string()]
        );
        assert_eq!(
            parse_types("dockerfile,none,go,go"),
            vec![".dockerfile".to_string(), String::new(), ".go".to_string()]
        );
    }
}
