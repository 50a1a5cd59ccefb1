/// Unified error type for structgraph.
///
/// Every variant except `NotFound`, `Config`, `Io` and `Json` is one of the
/// fatal conditions that abort a walk.
#[derive(Debug, thiserror::Error)]
pub enum StructgraphError {
    #[error("Unsupported type expression: {0}")]
    UnsupportedTypeExpr(String),

    #[error("{0} is incomplete struct definition")]
    IncompleteStruct(String),

    #[error("Cannot derive a name for embedded field of type {0}")]
    MissingEmbeddedName(String),

    #[error("Unquote error: {0}")]
    Unquote(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
