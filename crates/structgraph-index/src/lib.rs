//! structgraph-index: Go declaration extraction and import graph walking.
//!
//! Turns parsed Go packages into the serializable world model of
//! `structgraph-core`: exported structs, interfaces and aliases per file,
//! with enumerated constant values attached to their aliases, following
//! referenced imports transitively.
//!
//! # Architecture
//!
//! - **parser** / **lower**: tree-sitter-go parsing and lowering into the declaration tree
//! - **unquote**: Go string and rune literal unescaping
//! - **type_expr**: Type Expression Resolver
//! - **tags**: struct field tag parsing
//! - **classify**: Declaration Classifier
//! - **collect**: File Result Aggregator with the struct and interface builders
//! - **alias**: alias builder and Alias-Value Resolver
//! - **walker**: Import Graph Walker
//! - **resolver** / **manifest**: import path resolution and `go.mod` parsing
//! - **funcs**: function-signature extraction

pub mod alias;
pub mod classify;
pub mod collect;
pub mod funcs;
pub mod lower;
pub mod manifest;
pub mod parser;
pub mod resolver;
pub mod tags;
pub mod type_expr;
pub mod unquote;
pub mod walker;

pub use alias::AliasValueOutcome;
pub use classify::{classify, is_exported, DeclKind};
pub use collect::{collect_imports, collect_result, Collected, FileCollector};
pub use funcs::{build_func_world, collect_functions};
pub use manifest::{find_go_mod, parse_go_mod, GoModule, Requirement};
pub use parser::GoSource;
pub use resolver::FsPathResolver;
pub use tags::{parse_tags, ParsedTags};
pub use type_expr::resolve_type;
pub use walker::{build_world, WalkOptions, WalkOutput, Walker};
