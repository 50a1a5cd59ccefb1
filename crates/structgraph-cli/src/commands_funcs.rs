//! `structgraph funcs`: write the function signatures of one package.

use crate::{OutputArgs, PathArgs};
use clap::Args;
use std::path::PathBuf;
use structgraph_core::StructgraphConfig;
use structgraph_index::{build_func_world, GoSource};

#[derive(Args, Debug, Clone)]
pub(crate) struct FuncsArgs {
    /// Package directory or Go file
    #[arg(short, long)]
    pub target: PathBuf,

    /// Parse _test.go files too
    #[arg(long)]
    pub include_tests: bool,

    #[command(flatten)]
    pub paths: PathArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub(crate) fn cmd_funcs(args: &FuncsArgs, config: &StructgraphConfig) -> anyhow::Result<()> {
    let source = GoSource::new().with_tests(args.include_tests || config.walk.include_tests);
    let resolver = crate::path_resolver(&args.target, &config.paths, &args.paths);
    let world = build_func_world(&source, &resolver, &args.target)?;
    crate::write_json(&world, &args.output, config.output.pretty)
}
