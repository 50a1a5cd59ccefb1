//! Declaration tree handed over by a [`PackageSource`](crate::PackageSource).
//!
//! This is the already-parsed input of the engine: one [`CompilationUnit`]
//! per source file, listing its top-level declarations in source order and
//! its import specs. Nothing here knows about source text.

use std::collections::BTreeMap;

/// A parsed package: every compilation unit that declared the same package
/// name inside one directory, keyed by file path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Package {
    pub name: String,
    pub files: BTreeMap<String, CompilationUnit>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: BTreeMap::new(),
        }
    }
}

/// One source file's declarations and imports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompilationUnit {
    /// Declared package name.
    pub package: String,
    /// Top-level declarations in source order, one entry per declared name.
    pub declarations: Vec<Declaration>,
    pub imports: Vec<ImportSpec>,
}

/// An entry of the import list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Path exactly as written, quotes included.
    pub path: String,
    /// Explicit local name (`_`, `.` or an identifier).
    pub alias: Option<String>,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Type(TypeSpec),
    Const(ConstSpec),
    Func(FuncDecl),
}

impl Declaration {
    /// The declared name.
    pub fn name(&self) -> &str {
        match self {
            Self::Type(spec) => &spec.name,
            Self::Const(spec) => &spec.name,
            Self::Func(decl) => &decl.name,
        }
    }
}

/// `type Name Expr` or `type Name = Expr`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: String,
    pub expr: TypeExpr,
}

/// One name of a constant spec. Every name of `const a, b = 1, 2` gets its
/// own `ConstSpec` sharing the type and the full value list.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstSpec {
    pub name: String,
    pub ty: Option<TypeExpr>,
    /// Empty for implicitly repeated specs inside a group.
    pub values: Vec<ValueExpr>,
}

/// A top-level function (methods are not part of the tree).
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub signature: FuncSignature,
}

/// Syntactic type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Ident(String),
    Selector { package: String, name: String },
    /// Arrays and slices; the length is not modeled.
    Array(Box<TypeExpr>),
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    Pointer(Box<TypeExpr>),
    Struct(StructBody),
    /// Methods carry one name and a `Func` type; embedded elements have no name.
    Interface(Vec<FieldDecl>),
    Func(FuncSignature),
    Chan { dir: ChanDir, value: Box<TypeExpr> },
    Ellipsis(Box<TypeExpr>),
    /// A grammar node kind the engine does not model.
    Unsupported(String),
}

impl TypeExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    pub fn selector(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Selector {
            package: package.into(),
            name: name.into(),
        }
    }

    pub fn pointer(target: TypeExpr) -> Self {
        Self::Pointer(Box::new(target))
    }

    pub fn array(elem: TypeExpr) -> Self {
        Self::Array(Box::new(elem))
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Short label of the expression kind, used in error messages.
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Ident(_) => "ident",
            Self::Selector { .. } => "selector",
            Self::Array(_) => "array",
            Self::Map { .. } => "map",
            Self::Pointer(_) => "pointer",
            Self::Struct(_) => "struct",
            Self::Interface(_) => "interface",
            Self::Func(_) => "func",
            Self::Chan { .. } => "chan",
            Self::Ellipsis(_) => "ellipsis",
            Self::Unsupported(kind) => kind,
        }
    }

    /// The last identifier reached by descending through the expression:
    /// `Base` for `Base`, `*Base` and `*pkg.Base`.
    pub fn innermost_ident(&self) -> Option<&str> {
        match self {
            Self::Ident(name) => Some(name),
            Self::Selector { name, .. } => Some(name),
            Self::Pointer(target) => target.innermost_ident(),
            _ => None,
        }
    }
}

/// Member list of a struct type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructBody {
    pub fields: Vec<FieldDecl>,
    /// Set when the parser could not read the body completely.
    pub incomplete: bool,
}

/// A struct field, parameter, result or interface element.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// Empty for embedded fields and unnamed parameters.
    pub names: Vec<String>,
    pub ty: TypeExpr,
    /// Raw tag literal, quotes included.
    pub tag: Option<String>,
}

impl FieldDecl {
    pub fn named(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            names: vec![name.into()],
            ty,
            tag: None,
        }
    }

    pub fn embedded(ty: TypeExpr) -> Self {
        Self {
            names: Vec::new(),
            ty,
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuncSignature {
    pub params: Vec<FieldDecl>,
    pub results: Vec<FieldDecl>,
}

/// Channel direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChanDir {
    #[default]
    Both,
    Send,
    Recv,
}

/// Initializer expression of a constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpr {
    /// Basic literal; `text` is the source form (`"red"`, `42`, `-1`, `'x'`).
    Literal { text: String },
    Ident(String),
    /// The auto-increment marker.
    Iota,
    Selector { package: String, name: String },
    Call {
        callee: Box<ValueExpr>,
        args: Vec<ValueExpr>,
    },
    /// Any other expression, with its operand sub-expressions in source order.
    Compound(Vec<ValueExpr>),
}

impl ValueExpr {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal { text: text.into() }
    }

    pub fn call(callee: ValueExpr, args: Vec<ValueExpr>) -> Self {
        Self::Call {
            callee: Box::new(callee),
            args,
        }
    }

    /// First literal in pre-order.
    pub fn find_literal(&self) -> Option<&str> {
        match self {
            Self::Literal { text } => Some(text),
            Self::Call { callee, args } => callee
                .find_literal()
                .or_else(|| args.iter().find_map(ValueExpr::find_literal)),
            Self::Compound(children) => children.iter().find_map(ValueExpr::find_literal),
            Self::Ident(_) | Self::Iota | Self::Selector { .. } => None,
        }
    }

    /// First call expression in pre-order.
    pub fn find_call(&self) -> Option<(&ValueExpr, &[ValueExpr])> {
        match self {
            Self::Call { callee, args } => Some((callee, args)),
            Self::Compound(children) => children.iter().find_map(ValueExpr::find_call),
            _ => None,
        }
    }
}
