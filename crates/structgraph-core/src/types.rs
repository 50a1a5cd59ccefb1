//! World model emitted by a walk: modules, per-file results and the
//! canonical recursive [`Type`].

use crate::decl::{ChanDir, ConstSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Import table of one compilation unit, keyed by local name.
pub type ImportTable = BTreeMap<String, ImportDefinition>;

/// Root aggregate: module name -> module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "F: Serialize",
    deserialize = "F: Deserialize<'de>"
))]
pub struct World<F = FileResult> {
    #[serde(rename = "module")]
    pub modules: BTreeMap<String, Module<F>>,
}

impl<F> World<F> {
    pub fn new() -> Self {
        Self {
            modules: BTreeMap::new(),
        }
    }

    /// Get or create the module with the given name.
    pub fn module_mut(&mut self, name: &str) -> &mut Module<F> {
        self.modules
            .entry(name.to_string())
            .or_insert_with(|| Module::new(name))
    }

    /// Number of files across all modules.
    pub fn file_count(&self) -> usize {
        self.modules.values().map(|m| m.files.len()).sum()
    }
}

impl<F> Default for World<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "F: Serialize",
    deserialize = "F: Deserialize<'de>"
))]
pub struct Module<F = FileResult> {
    pub name: String,
    /// Workspace-relative import path, filled from the first file that yields one.
    #[serde(rename = "fullname")]
    pub full_name: String,
    #[serde(rename = "file")]
    pub files: BTreeMap<String, F>,
}

impl<F> Module<F> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: String::new(),
            files: BTreeMap::new(),
        }
    }
}

/// Everything captured from one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileResult {
    pub name: String,
    #[serde(rename = "alias", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, AliasDefinition>,
    #[serde(rename = "struct", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub structs: BTreeMap<String, StructDefinition>,
    #[serde(rename = "interface", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub interfaces: BTreeMap<String, InterfaceDefinition>,
    #[serde(rename = "import", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub imports: ImportTable,
    /// Alias values whose alias has not been declared (yet) in this file.
    #[serde(skip)]
    pub pending_alias_values: Vec<AliasValue>,
}

impl FileResult {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// True when no struct, interface or alias was captured.
    pub fn is_empty(&self) -> bool {
        self.structs.is_empty() && self.interfaces.is_empty() && self.aliases.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructDefinition {
    pub name: String,
    pub fields: BTreeMap<String, Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub tags: BTreeMap<String, Vec<String>>,
    #[serde(rename = "type")]
    pub ty: Type,
    pub embed: bool,
}

/// Placeholder marking an exported interface; methods are not extracted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDefinition {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasDefinition {
    pub name: String,
    pub original: Type,
    pub candidates: Vec<AliasValue>,
    /// Declarations behind each candidate, in candidate order.
    #[serde(skip)]
    pub raw_candidates: Vec<ConstSpec>,
}

impl AliasDefinition {
    pub fn new(name: impl Into<String>, original: Type) -> Self {
        Self {
            name: name.into(),
            original,
            candidates: Vec::new(),
            raw_candidates: Vec::new(),
        }
    }
}

/// One enumerated value of an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasValue {
    /// Name of the alias this value claims to belong to.
    #[serde(skip)]
    pub type_name: String,
    pub name: String,
    /// Literal source text, quotes included.
    pub value: String,
    /// Per-file declaration sequence.
    #[serde(skip)]
    pub seq: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDefinition {
    pub name: String,
    #[serde(rename = "fullname")]
    pub full_name: String,
    #[serde(rename = "needparse")]
    pub need_parse: bool,
}

impl ImportDefinition {
    pub fn new(name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            need_parse: false,
        }
    }

    /// Workspace-style paths have more than one segment (`github.com/a/b`).
    pub fn is_multi_segment(&self) -> bool {
        self.full_name.contains('/')
    }
}

/// Canonical recursive type representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Type {
    Primitive { value: String },
    Array { value: Box<Type> },
    Map { key: Box<Type>, value: Box<Type> },
    Struct { fields: Vec<Type> },
    Interface { methods: Vec<Type> },
    Pointer { value: Box<Type> },
    Selector { prefix: String, value: String },
    Func { args: Vec<Type>, results: Vec<Type> },
    Channel { value: Box<Type>, dir: ChanDir },
    Ellipsis { value: Box<Type> },
}

impl Type {
    pub fn primitive(name: impl Into<String>) -> Self {
        Self::Primitive { value: name.into() }
    }

    pub fn array(elem: Type) -> Self {
        Self::Array {
            value: Box::new(elem),
        }
    }

    pub fn map(key: Type, value: Type) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn pointer(target: Type) -> Self {
        Self::Pointer {
            value: Box::new(target),
        }
    }

    pub fn selector(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Selector {
            prefix: prefix.into(),
            value: name.into(),
        }
    }

    pub fn channel(value: Type, dir: ChanDir) -> Self {
        Self::Channel {
            value: Box::new(value),
            dir,
        }
    }

    pub fn ellipsis(elem: Type) -> Self {
        Self::Ellipsis {
            value: Box::new(elem),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[Type], sep: &str) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}

/// Renders the type back as a Go type expression.
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive { value } => f.write_str(value),
            Self::Array { value } => write!(f, "[]{value}"),
            Self::Map { key, value } => write!(f, "map[{key}]{value}"),
            Self::Struct { fields } => {
                if fields.is_empty() {
                    return f.write_str("struct{}");
                }
                f.write_str("struct{ ")?;
                write_list(f, fields, "; ")?;
                f.write_str(" }")
            }
            Self::Interface { methods } => {
                if methods.is_empty() {
                    return f.write_str("interface{}");
                }
                f.write_str("interface{ ")?;
                write_list(f, methods, "; ")?;
                f.write_str(" }")
            }
            Self::Pointer { value } => write!(f, "*{value}"),
            Self::Selector { prefix, value } => write!(f, "{prefix}.{value}"),
            Self::Func { args, results } => {
                f.write_str("func(")?;
                write_list(f, args, ", ")?;
                f.write_str(")")?;
                match results.as_slice() {
                    [] => Ok(()),
                    [single] => write!(f, " {single}"),
                    many => {
                        f.write_str(" (")?;
                        write_list(f, many, ", ")?;
                        f.write_str(")")
                    }
                }
            }
            Self::Channel { value, dir } => match dir {
                ChanDir::Both => write!(f, "chan {value}"),
                ChanDir::Send => write!(f, "chan<- {value}"),
                ChanDir::Recv => write!(f, "<-chan {value}"),
            },
            Self::Ellipsis { value } => write!(f, "...{value}"),
        }
    }
}

// ── Functions ──────────────────────────────────────────────────────────────

/// Function world produced by signature extraction.
pub type FuncWorld = World<FuncFile>;

/// Top-level functions of one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuncFile {
    pub name: String,
    #[serde(rename = "function")]
    pub functions: BTreeMap<String, FuncDefinition>,
    #[serde(rename = "import", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub imports: ImportTable,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuncDefinition {
    pub name: String,
    pub params: Vec<FuncParam>,
    pub returns: Vec<FuncParam>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncParam {
    /// Empty for unnamed parameters and results.
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

// ── Diagnostics ────────────────────────────────────────────────────────────

/// A recoverable condition: the offending item is left out of the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// File (or import path) the condition was found in.
    pub file: String,
    /// Declaration, tag key or import the condition concerns.
    pub subject: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    ComplexConstant,
    MalformedTag,
    UnresolvedImport,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ComplexConstant => write!(f, "complex_constant"),
            Self::MalformedTag => write!(f, "malformed_tag"),
            Self::UnresolvedImport => write!(f, "unresolved_import"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}: {}", self.file, self.kind, self.subject, self.message)
    }
}
