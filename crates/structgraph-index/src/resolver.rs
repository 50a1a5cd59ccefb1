//! Filesystem-backed import path resolution.
//!
//! Maps Go import paths to directories under the workspace (own module,
//! `vendor/`, GOPATH-style layout, module cache) or the system-library root,
//! and maps parsed files back to the import path of their package.

use crate::manifest::{escape_module_path, find_go_mod, parse_go_mod, unescape_module_path, GoModule};
use std::path::{Component, Path, PathBuf};
use structgraph_core::PathResolver;

/// [`PathResolver`] that checks candidate locations on disk.
#[derive(Debug, Clone)]
pub struct FsPathResolver {
    workspace_root: PathBuf,
    module: Option<GoModule>,
    system_root: Option<PathBuf>,
    module_cache: Option<PathBuf>,
}

impl FsPathResolver {
    /// Resolver rooted at `workspace_root`, reading its `go.mod` if present.
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        let workspace_root = canonical(workspace_root.into());
        let module = parse_go_mod(&workspace_root.join("go.mod"));
        Self {
            workspace_root,
            module,
            system_root: None,
            module_cache: None,
        }
    }

    /// Resolver for a walk target: the workspace is the directory holding the
    /// nearest `go.mod`, or the target directory itself.
    pub fn for_target(target: &Path) -> Self {
        let target = canonical(target.to_path_buf());
        let dir = if target.is_file() {
            target.parent().map(Path::to_path_buf).unwrap_or_default()
        } else {
            target
        };
        match find_go_mod(&dir).and_then(|go_mod| go_mod.parent().map(Path::to_path_buf)) {
            Some(root) => Self::new(root),
            None => Self::new(dir),
        }
    }

    pub fn with_system_root(mut self, root: Option<PathBuf>) -> Self {
        self.system_root = root.map(canonical);
        self
    }

    pub fn with_module_cache(mut self, cache: Option<PathBuf>) -> Self {
        self.module_cache = cache.map(canonical);
        self
    }

    /// Fill unset roots from `GOROOT`, `GOMODCACHE` and `GOPATH`.
    pub fn from_env(self) -> Self {
        let system_root = self.system_root.clone().or_else(|| {
            std::env::var_os("GOROOT")
                .map(|goroot| PathBuf::from(goroot).join("src"))
                .filter(|src| src.is_dir())
        });
        let module_cache = self.module_cache.clone().or_else(default_module_cache);
        self.with_system_root(system_root)
            .with_module_cache(module_cache)
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn module(&self) -> Option<&GoModule> {
        self.module.as_ref()
    }

    fn resolve_module_cache(&self, import_path: &str) -> Option<PathBuf> {
        let cache = self.module_cache.as_ref()?;
        let module = self.module.as_ref()?;
        let req = module.requirement_for(import_path)?;
        let rest = import_path[req.path.len()..].trim_start_matches('/');
        let mut dir = cache.join(format!("{}@{}", escape_module_path(&req.path), req.version));
        if !rest.is_empty() {
            dir = dir.join(rest);
        }
        Some(dir)
    }

    fn module_full_name(&self, rel: &str) -> Option<String> {
        if let Some(vendored) = rel.strip_prefix("vendor/") {
            return Some(vendored.to_string());
        }
        match &self.module {
            Some(module) if rel.is_empty() => Some(module.module.clone()),
            Some(module) => Some(format!("{}/{rel}", module.module)),
            None if rel.is_empty() => None,
            None => Some(rel.to_string()),
        }
    }
}

impl PathResolver for FsPathResolver {
    fn resolve_workspace(&self, import_path: &str) -> Option<PathBuf> {
        let own = self
            .module
            .as_ref()
            .and_then(|module| module.strip_module(import_path))
            .map(|rest| self.workspace_root.join(rest));

        [
            own,
            Some(self.workspace_root.join("vendor").join(import_path)),
            Some(self.workspace_root.join(import_path)),
            self.resolve_module_cache(import_path),
        ]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.exists())
    }

    fn resolve_system(&self, import_path: &str) -> Option<PathBuf> {
        let candidate = self.system_root.as_ref()?.join(import_path);
        candidate.exists().then_some(candidate)
    }

    fn full_name(&self, file: &Path) -> Option<String> {
        let dir = if file.is_dir() { file } else { file.parent()? };

        if let Some(rel) = self.system_root.as_ref().and_then(|root| relative(dir, root)) {
            return (!rel.is_empty()).then_some(rel);
        }
        if let Some(rel) = self.module_cache.as_ref().and_then(|root| relative(dir, root)) {
            let without_version: Vec<&str> = rel
                .split('/')
                .map(|segment| segment.split('@').next().unwrap_or(segment))
                .collect();
            return Some(unescape_module_path(&without_version.join("/")));
        }
        let rel = relative(dir, &self.workspace_root)?;
        self.module_full_name(&rel)
    }
}

fn canonical(path: PathBuf) -> PathBuf {
    std::fs::canonicalize(&path).unwrap_or(path)
}

/// `path` relative to `root`, `/`-separated.
fn relative(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(segments.join("/"))
}

fn default_module_cache() -> Option<PathBuf> {
    if let Some(cache) = std::env::var_os("GOMODCACHE").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(cache));
    }
    let gopath = std::env::var_os("GOPATH")
        .filter(|v| !v.is_empty())
        .and_then(|v| std::env::split_paths(&v).next())
        .or_else(|| dirs::home_dir().map(|home| home.join("go")))?;
    Some(gopath.join("pkg").join("mod")).filter(|cache| cache.is_dir())
}
