//! Tree-sitter parsing coordinator.
//!
//! Lists the Go files of a directory (or takes a single file), parses each
//! with tree-sitter-go and groups the lowered compilation units by package.

use crate::lower;
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use structgraph_core::decl::{CompilationUnit, Package};
use structgraph_core::{PackageSource, StructgraphError};
use tree_sitter::Parser;

/// [`PackageSource`] backed by tree-sitter-go.
#[derive(Debug, Clone, Default)]
pub struct GoSource {
    include_tests: bool,
}

impl GoSource {
    /// Create a source that skips `_test.go` files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also parse `_test.go` files.
    pub fn with_tests(mut self, include_tests: bool) -> Self {
        self.include_tests = include_tests;
        self
    }

    /// Parse in-memory Go source.
    pub fn parse_source(
        &self,
        path: &str,
        content: &[u8],
    ) -> Result<CompilationUnit, StructgraphError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| StructgraphError::Parse(e.to_string()))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| StructgraphError::Parse(format!("{path}: parser returned no tree")))?;

        if tree.root_node().has_error() {
            tracing::warn!("{} contains syntax errors", path);
        }

        Ok(lower::lower_source_file(&tree, content))
    }

    /// Read and parse a single file.
    pub fn parse_file(&self, path: &Path) -> Result<CompilationUnit, StructgraphError> {
        let content = std::fs::read(path)?;
        self.parse_source(&path.to_string_lossy(), &content)
    }

    /// Go files directly inside `dir`, sorted by name.
    fn go_files(&self, dir: &Path) -> Vec<PathBuf> {
        let walker = WalkBuilder::new(dir)
            .max_depth(Some(1))
            .hidden(true) // skip hidden files
            .git_ignore(true) // respect .gitignore
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!("Walk error: {}", err);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(".go") {
                continue;
            }
            if !self.include_tests && name.ends_with("_test.go") {
                continue;
            }
            files.push(path.to_path_buf());
        }
        files
    }
}

impl PackageSource for GoSource {
    fn parse_path(&self, path: &Path) -> Result<BTreeMap<String, Package>, StructgraphError> {
        let metadata = std::fs::metadata(path)?;
        let files = if metadata.is_dir() {
            self.go_files(path)
        } else {
            vec![path.to_path_buf()]
        };

        let mut packages: BTreeMap<String, Package> = BTreeMap::new();
        for file in files {
            let unit = self.parse_file(&file)?;
            if unit.package.is_empty() {
                tracing::warn!("{} has no package clause, skipping", file.display());
                continue;
            }
            packages
                .entry(unit.package.clone())
                .or_insert_with(|| Package::new(unit.package.clone()))
                .files
                .insert(file.to_string_lossy().into_owned(), unit);
        }

        tracing::debug!(
            "Parsed {}: {} package(s)",
            path.display(),
            packages.len()
        );
        Ok(packages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir() -> tempfile::TempDir {
        tempfile::Builder::new()
            .prefix("structgraph")
            .tempdir()
            .unwrap()
    }

    #[test]
    fn parse_source_reads_package() {
        let source = GoSource::new();
        let unit = source
            .parse_source("a.go", b"package models\n\ntype ID string\n")
            .unwrap();
        assert_eq!(unit.package, "models");
        assert_eq!(unit.declarations.len(), 1);
    }

    #[test]
    fn directory_groups_files_by_package() {
        let dir = temp_dir();
        fs::write(dir.path().join("b.go"), "package models\n\ntype B int\n").unwrap();
        fs::write(dir.path().join("a.go"), "package models\n\ntype A int\n").unwrap();
        fs::write(dir.path().join("doc.go"), "package models_test\n").unwrap();
        fs::write(dir.path().join("a_test.go"), "package models\n\ntype T int\n").unwrap();
        fs::write(dir.path().join("readme.md"), "# not go").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.go"), "package sub\n").unwrap();

        let packages = GoSource::new().parse_path(dir.path()).unwrap();
        assert_eq!(packages.len(), 2, "packages: {:?}", packages.keys());

        let models = &packages["models"];
        let names: Vec<String> = models
            .files
            .keys()
            .map(|k| Path::new(k).file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.go".to_string(), "b.go".to_string()]);
        assert!(packages.contains_key("models_test"));
    }

    #[test]
    fn tests_are_included_on_request() {
        let dir = temp_dir();
        fs::write(dir.path().join("a.go"), "package models\n").unwrap();
        fs::write(dir.path().join("a_test.go"), "package models\n").unwrap();

        let packages = GoSource::new()
            .with_tests(true)
            .parse_path(dir.path())
            .unwrap();
        assert_eq!(packages["models"].files.len(), 2);
    }

    #[test]
    fn single_file_yields_its_package() {
        let dir = temp_dir();
        let file = dir.path().join("email.go");
        fs::write(&file, "package email\n\ntype Email string\n").unwrap();

        let packages = GoSource::new().parse_path(&file).unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages["email"].files.len(), 1);
    }

    #[test]
    fn missing_path_is_io_error() {
        let err = GoSource::new()
            .parse_path(Path::new("/nonexistent/structgraph/dir"))
            .unwrap_err();
        assert!(matches!(err, StructgraphError::Io(_)));
    }
}
