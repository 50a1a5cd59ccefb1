//! `structgraph structs`: walk a target and write the world model.

use crate::{OutputArgs, PathArgs};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use structgraph_core::{StructgraphConfig, WalkConfig};
use structgraph_index::{build_world, GoSource, WalkOptions, WalkOutput};

#[derive(Args, Debug, Clone)]
pub(crate) struct StructsArgs {
    /// Package directory or Go file to start from
    #[arg(short, long)]
    pub target: PathBuf,

    /// Package name to skip (repeatable)
    #[arg(short = 'x', long)]
    pub exclude: Vec<String>,

    /// Drop the configured exclusion list before applying --exclude
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Maximum import depth below the target
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Parse _test.go files too
    #[arg(long)]
    pub include_tests: bool,

    /// Keep files that contribute no struct, interface or alias
    #[arg(long)]
    pub keep_empty_files: bool,

    #[command(flatten)]
    pub paths: PathArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl StructsArgs {
    /// Config walk settings with the command-line overrides applied.
    fn walk_config(&self, config: &WalkConfig) -> WalkConfig {
        let mut walk = config.clone();
        if self.no_default_excludes {
            walk.exclude.clear();
        }
        walk.exclude.extend(self.exclude.iter().cloned());
        if self.max_depth.is_some() {
            walk.max_depth = self.max_depth;
        }
        walk.include_tests |= self.include_tests;
        walk.keep_empty_files |= self.keep_empty_files;
        walk
    }
}

pub(crate) fn cmd_structs(
    args: &StructsArgs,
    config: &StructgraphConfig,
    verbose: bool,
) -> anyhow::Result<()> {
    let walk = args.walk_config(&config.walk);
    let source = GoSource::new().with_tests(walk.include_tests);
    let resolver = crate::path_resolver(&args.target, &config.paths, &args.paths);
    tracing::debug!(
        "Workspace root {}, {} excluded package(s)",
        resolver.workspace_root().display(),
        walk.exclude.len()
    );

    let output = build_world(
        &source,
        &resolver,
        WalkOptions::from_config(&walk),
        &args.target,
    )?;
    crate::write_json(&output.world, &args.output, config.output.pretty)?;

    if verbose {
        print_summary(&output);
    }
    Ok(())
}

fn print_summary(output: &WalkOutput) {
    eprintln!("{}", "structgraph".bold());
    eprintln!("  Paths visited:  {}", output.visited.len());
    eprintln!("  Modules:        {}", output.world.modules.len());
    eprintln!("  Files:          {}", output.world.file_count());

    if output.diagnostics.is_empty() {
        eprintln!("  Diagnostics:    {}", "none".green());
        return;
    }
    eprintln!(
        "  Diagnostics:    {}",
        output.diagnostics.len().to_string().yellow().bold()
    );
    for diagnostic in &output.diagnostics {
        eprintln!(
            "    [{}] {} {}: {}",
            diagnostic.kind.to_string().yellow(),
            diagnostic.file.dimmed(),
            diagnostic.subject,
            diagnostic.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> StructsArgs {
        StructsArgs {
            target: PathBuf::from("models"),
            exclude: Vec::new(),
            no_default_excludes: false,
            max_depth: None,
            include_tests: false,
            keep_empty_files: false,
            paths: PathArgs::default(),
            output: OutputArgs::default(),
        }
    }

    #[test]
    fn config_values_survive_without_flags() {
        let config = WalkConfig {
            max_depth: Some(4),
            keep_empty_files: true,
            ..WalkConfig::default()
        };
        let walk = args().walk_config(&config);
        assert_eq!(walk, config);
    }

    #[test]
    fn flags_extend_and_override() {
        let mut args = args();
        args.exclude = vec!["bson".to_string()];
        args.max_depth = Some(1);
        args.include_tests = true;
        let walk = args.walk_config(&WalkConfig::default());
        assert!(walk.exclude.contains(&"fmt".to_string()));
        assert!(walk.exclude.contains(&"bson".to_string()));
        assert_eq!(walk.max_depth, Some(1));
        assert!(walk.include_tests);
    }

    #[test]
    fn no_default_excludes_clears_list() {
        let mut args = args();
        args.no_default_excludes = true;
        args.exclude = vec!["bson".to_string()];
        let walk = args.walk_config(&WalkConfig::default());
        assert_eq!(walk.exclude, vec!["bson".to_string()]);
    }
}
