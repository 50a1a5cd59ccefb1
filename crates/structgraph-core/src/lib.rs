//! structgraph-core: Shared types, traits, and errors for structgraph.

pub mod config;
pub mod decl;
pub mod error;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::*;
pub use traits::*;
pub use types::*;
