//! Import Graph Walker.
//!
//! Parses a target path, runs the file-processing pass on every compilation
//! unit and follows imports that captured declarations actually reference.
//! A path is parsed at most once per walk, which both stops import cycles
//! and avoids re-parsing diamond dependencies. Under a depth limit, a path
//! reached again closer to the target has its imports followed again from
//! the shallower depth.

use crate::collect::collect_result;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use structgraph_core::config::{WalkConfig, DEFAULT_EXCLUDES};
use structgraph_core::{
    Diagnostic, DiagnosticKind, ImportDefinition, PackageSource, PathResolver, StructgraphError,
    World,
};

/// Traversal policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    /// Package names that are never stored nor followed.
    pub exclude: BTreeSet<String>,
    /// Import depth limit below the target (`Some(0)` parses the target only).
    pub max_depth: Option<usize>,
    /// Store files that contribute no struct, interface or alias.
    pub keep_empty_files: bool,
}

impl WalkOptions {
    pub fn new() -> Self {
        Self {
            exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            max_depth: None,
            keep_empty_files: false,
        }
    }

    pub fn from_config(config: &WalkConfig) -> Self {
        Self {
            exclude: config.exclude.iter().cloned().collect(),
            max_depth: config.max_depth,
            keep_empty_files: config.keep_empty_files,
        }
    }
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a finished walk produced.
#[derive(Debug)]
pub struct WalkOutput {
    pub world: World,
    pub diagnostics: Vec<Diagnostic>,
    /// Normalized paths in the order they were first visited.
    pub visited: Vec<PathBuf>,
}

/// Bookkeeping for one parsed path.
#[derive(Debug)]
struct Visit {
    /// Shallowest depth the path has been reached at.
    depth: usize,
    /// Referenced imports, keyed by full import path.
    imports: BTreeMap<String, ImportDefinition>,
    /// Whether `imports` have been resolved once; unresolved ones are
    /// reported only then.
    followed: bool,
}

/// Depth-first walker over the import graph.
pub struct Walker<'a> {
    source: &'a dyn PackageSource,
    paths: &'a dyn PathResolver,
    options: WalkOptions,
    visited: HashMap<PathBuf, Visit>,
    visit_order: Vec<PathBuf>,
    world: World,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Walker<'a> {
    pub fn new(
        source: &'a dyn PackageSource,
        paths: &'a dyn PathResolver,
        options: WalkOptions,
    ) -> Self {
        Self {
            source,
            paths,
            options,
            visited: HashMap::new(),
            visit_order: Vec::new(),
            world: World::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Walk `path` and everything it transitively needs. An already visited
    /// path is never parsed again.
    pub fn walk(&mut self, path: &Path) -> Result<(), StructgraphError> {
        self.walk_at(path, 0)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn is_visited(&self, path: &Path) -> bool {
        normalize(path).is_ok_and(|key| self.visited.contains_key(&key))
    }

    pub fn finish(self) -> WalkOutput {
        tracing::info!(
            "Walked {} path(s): {} module(s), {} file(s), {} diagnostic(s)",
            self.visit_order.len(),
            self.world.modules.len(),
            self.world.file_count(),
            self.diagnostics.len(),
        );
        WalkOutput {
            world: self.world,
            diagnostics: self.diagnostics,
            visited: self.visit_order,
        }
    }

    fn walk_at(&mut self, path: &Path, depth: usize) -> Result<(), StructgraphError> {
        let key = normalize(path)?;
        if let Some(visit) = self.visited.get_mut(&key) {
            if visit.depth <= depth || self.options.max_depth.is_none() {
                tracing::debug!("Already visited {}", key.display());
                return Ok(());
            }
            tracing::debug!(
                "Reached {} again at depth {} (was {})",
                key.display(),
                depth,
                visit.depth
            );
            visit.depth = depth;
            return self.follow_imports(&key, depth);
        }
        self.visit_order.push(key.clone());
        tracing::debug!("Walking {} (depth {})", key.display(), depth);

        let packages = self.source.parse_path(&key)?;

        // Keyed by full import path so two files naming one import differently
        // still trigger a single traversal.
        let mut needed: BTreeMap<String, ImportDefinition> = BTreeMap::new();

        for (package_name, package) in &packages {
            if self.options.exclude.contains(package_name) {
                tracing::debug!("Skipping excluded package {}", package_name);
                continue;
            }

            for (file_name, unit) in &package.files {
                let collected = collect_result(file_name, unit)?;
                self.diagnostics.extend(collected.diagnostics);

                for import in collected.result.imports.values().filter(|i| i.need_parse) {
                    needed
                        .entry(import.full_name.clone())
                        .or_insert_with(|| import.clone());
                }

                if collected.result.is_empty() && !self.options.keep_empty_files {
                    tracing::debug!("{} has nothing to capture", file_name);
                    continue;
                }

                let full_name = self.paths.full_name(Path::new(file_name));
                let module = self.world.module_mut(package_name);
                if module.full_name.is_empty() {
                    if let Some(full_name) = full_name {
                        module.full_name = full_name;
                    }
                }
                module.files.insert(file_name.clone(), collected.result);
            }
        }

        self.visited.insert(
            key.clone(),
            Visit {
                depth,
                imports: needed,
                followed: false,
            },
        );
        self.follow_imports(&key, depth)
    }

    /// Walk the referenced imports of a visited path, one level below `depth`.
    fn follow_imports(&mut self, key: &Path, depth: usize) -> Result<(), StructgraphError> {
        let Some(visit) = self.visited.get_mut(key) else {
            return Ok(());
        };
        if self.options.max_depth.is_some_and(|max| depth >= max) {
            if !visit.imports.is_empty() {
                tracing::debug!(
                    "Depth limit reached at {}, not following {} import(s)",
                    key.display(),
                    visit.imports.len()
                );
            }
            return Ok(());
        }
        let report = !visit.followed;
        visit.followed = true;
        let imports: Vec<ImportDefinition> = visit.imports.values().cloned().collect();

        for import in &imports {
            match self.resolve(import) {
                Some(next) => self.walk_at(&next, depth + 1)?,
                None if report => {
                    tracing::debug!("Cannot resolve import {}", import.full_name);
                    self.diagnostics.push(Diagnostic {
                        file: key.to_string_lossy().into_owned(),
                        subject: import.full_name.clone(),
                        kind: DiagnosticKind::UnresolvedImport,
                        message: format!("{} not found", import.full_name),
                    });
                }
                None => {}
            }
        }

        Ok(())
    }

    /// Multi-segment imports are tried against the workspace first, then the
    /// system root; single-segment imports only against the system root.
    fn resolve(&self, import: &ImportDefinition) -> Option<PathBuf> {
        if import.is_multi_segment() {
            self.paths
                .resolve_workspace(&import.full_name)
                .or_else(|| self.paths.resolve_system(&import.full_name))
        } else {
            self.paths.resolve_system(&import.full_name)
        }
    }
}

/// Absolute form of `path`, with symlinks resolved when it exists.
pub fn normalize(path: &Path) -> Result<PathBuf, StructgraphError> {
    let absolute = std::path::absolute(path)?;
    Ok(std::fs::canonicalize(&absolute).unwrap_or(absolute))
}

/// Walk a single target and return the finished output.
pub fn build_world(
    source: &dyn PackageSource,
    paths: &dyn PathResolver,
    options: WalkOptions,
    target: &Path,
) -> Result<WalkOutput, StructgraphError> {
    let mut walker = Walker::new(source, paths, options);
    walker.walk(target)?;
    Ok(walker.finish())
}
