use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::decl::Package;
use crate::StructgraphError;

// ── Traits ──────────────────────────────────────────────────────────────────

/// Parser boundary: turns a file or directory into declaration trees.
pub trait PackageSource {
    /// Parse `path` and return its packages keyed by package name.
    ///
    /// A directory yields every package declared directly inside it; a file
    /// yields the single package it belongs to.
    fn parse_path(&self, path: &Path) -> Result<BTreeMap<String, Package>, StructgraphError>;
}

/// Path-resolution boundary: maps import paths to locations on disk.
pub trait PathResolver {
    /// Resolve an import path against the workspace (own module, vendor
    /// directory, GOPATH-style layout, module cache).
    fn resolve_workspace(&self, import_path: &str) -> Option<PathBuf>;

    /// Resolve an import path against the system-library root.
    fn resolve_system(&self, import_path: &str) -> Option<PathBuf>;

    /// Import path of the module a parsed file belongs to, if the file lives
    /// under a known root.
    fn full_name(&self, file: &Path) -> Option<String>;
}
