//! Lowering of tree-sitter-go syntax trees into the declaration tree.

use structgraph_core::decl::{
    ChanDir, CompilationUnit, ConstSpec, Declaration, FieldDecl, FuncDecl, FuncSignature,
    ImportSpec, StructBody, TypeExpr, TypeSpec, ValueExpr,
};
use tree_sitter::{Node, Tree};

/// Lower a parsed Go source file.
pub fn lower_source_file(tree: &Tree, source: &[u8]) -> CompilationUnit {
    let mut unit = CompilationUnit::default();
    let root = tree.root_node();

    for node in named_children(root) {
        match node.kind() {
            "package_clause" => {
                if let Some(ident) = named_children(node).into_iter().next() {
                    unit.package = node_text(ident, source);
                }
            }
            "import_declaration" => lower_imports(node, source, &mut unit.imports),
            "type_declaration" => {
                for spec in named_children(node) {
                    if matches!(spec.kind(), "type_spec" | "type_alias") {
                        if let Some(decl) = lower_type_spec(spec, source) {
                            unit.declarations.push(Declaration::Type(decl));
                        }
                    }
                }
            }
            "const_declaration" => {
                for spec in named_children(node) {
                    if spec.kind() == "const_spec" {
                        lower_const_spec(spec, source, &mut unit.declarations);
                    }
                }
            }
            "function_declaration" => {
                if let Some(name) = node.child_by_field_name("name") {
                    unit.declarations.push(Declaration::Func(FuncDecl {
                        name: node_text(name, source),
                        signature: lower_signature(node, source),
                    }));
                }
            }
            // Methods and variables are not part of the declaration tree.
            _ => {}
        }
    }

    unit
}

// ── Declarations ──────────────────────────────────────────────────────────

fn lower_imports(node: Node, source: &[u8], imports: &mut Vec<ImportSpec>) {
    for child in named_children(node) {
        match child.kind() {
            "import_spec" => {
                if let Some(spec) = lower_import_spec(child, source) {
                    imports.push(spec);
                }
            }
            "import_spec_list" => lower_imports(child, source, imports),
            _ => {}
        }
    }
}

fn lower_import_spec(node: Node, source: &[u8]) -> Option<ImportSpec> {
    let path = node.child_by_field_name("path")?;
    Some(ImportSpec {
        path: node_text(path, source),
        alias: node
            .child_by_field_name("name")
            .map(|name| node_text(name, source)),
    })
}

fn lower_type_spec(node: Node, source: &[u8]) -> Option<TypeSpec> {
    let name = node_text(node.child_by_field_name("name")?, source);
    // Parametric declarations are not modeled.
    let expr = if node.child_by_field_name("type_parameters").is_some() {
        TypeExpr::Unsupported("type_parameter_list".to_string())
    } else {
        required_type(node, "type", source)
    };
    Some(TypeSpec { name, expr })
}

fn lower_const_spec(node: Node, source: &[u8], declarations: &mut Vec<Declaration>) {
    let ty = node
        .child_by_field_name("type")
        .map(|ty| lower_type(ty, source));
    let values: Vec<ValueExpr> = node
        .child_by_field_name("value")
        .map(|list| {
            named_children(list)
                .into_iter()
                .map(|value| lower_value(value, source))
                .collect()
        })
        .unwrap_or_default();

    // The name field also covers the commas between identifiers.
    let mut cursor = node.walk();
    let names: Vec<String> = node
        .children_by_field_name("name", &mut cursor)
        .filter(|name| name.kind() == "identifier")
        .map(|name| node_text(name, source))
        .collect();

    for name in names {
        declarations.push(Declaration::Const(ConstSpec {
            name,
            ty: ty.clone(),
            values: values.clone(),
        }));
    }
}

// ── Types ─────────────────────────────────────────────────────────────────

/// Lower a type node.
pub fn lower_type(node: Node, source: &[u8]) -> TypeExpr {
    match node.kind() {
        "type_identifier" | "identifier" | "package_identifier" => {
            TypeExpr::Ident(node_text(node, source))
        }
        "qualified_type" => match (
            node.child_by_field_name("package"),
            node.child_by_field_name("name"),
        ) {
            (Some(package), Some(name)) => {
                TypeExpr::selector(node_text(package, source), node_text(name, source))
            }
            _ => TypeExpr::Unsupported("qualified_type".to_string()),
        },
        "pointer_type" => match named_children(node).into_iter().next() {
            Some(target) => TypeExpr::pointer(lower_type(target, source)),
            None => TypeExpr::Unsupported("pointer_type".to_string()),
        },
        "slice_type" | "array_type" | "implicit_length_array_type" => {
            TypeExpr::Array(Box::new(required_type(node, "element", source)))
        }
        "map_type" => TypeExpr::Map {
            key: Box::new(required_type(node, "key", source)),
            value: Box::new(required_type(node, "value", source)),
        },
        "struct_type" => TypeExpr::Struct(lower_struct(node, source)),
        "interface_type" => TypeExpr::Interface(lower_interface(node, source)),
        "function_type" => TypeExpr::Func(lower_signature(node, source)),
        "channel_type" => TypeExpr::Chan {
            dir: channel_dir(node),
            value: Box::new(required_type(node, "value", source)),
        },
        "parenthesized_type" => match named_children(node).into_iter().next() {
            Some(inner) => lower_type(inner, source),
            None => TypeExpr::Unsupported("parenthesized_type".to_string()),
        },
        other => TypeExpr::Unsupported(other.to_string()),
    }
}

fn required_type(node: Node, field: &str, source: &[u8]) -> TypeExpr {
    match node.child_by_field_name(field) {
        Some(child) => lower_type(child, source),
        None => TypeExpr::Unsupported(format!("{} without {field}", node.kind())),
    }
}

fn lower_struct(node: Node, source: &[u8]) -> StructBody {
    let mut body = StructBody {
        fields: Vec::new(),
        incomplete: node.has_error(),
    };
    let Some(list) = named_children(node)
        .into_iter()
        .find(|child| child.kind() == "field_declaration_list")
    else {
        body.incomplete = true;
        return body;
    };

    for field in named_children(list) {
        if field.kind() != "field_declaration" {
            continue;
        }
        let mut cursor = field.walk();
        let names: Vec<String> = field
            .children_by_field_name("name", &mut cursor)
            .map(|name| node_text(name, source))
            .collect();

        let mut ty = required_type(field, "type", source);
        // `*T` embedding keeps the star outside the type field.
        if names.is_empty() && has_token(field, "*") {
            ty = TypeExpr::pointer(ty);
        }

        body.fields.push(FieldDecl {
            names,
            ty,
            tag: field
                .child_by_field_name("tag")
                .map(|tag| node_text(tag, source)),
        });
    }
    body
}

fn lower_interface(node: Node, source: &[u8]) -> Vec<FieldDecl> {
    let mut elements = Vec::new();
    for elem in named_children(node) {
        match elem.kind() {
            "method_elem" | "method_spec" => {
                if let Some(name) = elem.child_by_field_name("name") {
                    elements.push(FieldDecl::named(
                        node_text(name, source),
                        TypeExpr::Func(lower_signature(elem, source)),
                    ));
                }
            }
            "type_elem" => {
                let types = named_children(elem);
                let ty = match types.as_slice() {
                    [single] => lower_type(*single, source),
                    _ => TypeExpr::Unsupported("type_elem".to_string()),
                };
                elements.push(FieldDecl::embedded(ty));
            }
            _ => elements.push(FieldDecl::embedded(lower_type(elem, source))),
        }
    }
    elements
}

/// Parameters and results of a function declaration, function type or method element.
fn lower_signature(node: Node, source: &[u8]) -> FuncSignature {
    let params = node
        .child_by_field_name("parameters")
        .map(|list| lower_parameters(list, source))
        .unwrap_or_default();
    let results = match node.child_by_field_name("result") {
        Some(result) if result.kind() == "parameter_list" => lower_parameters(result, source),
        Some(result) => vec![FieldDecl::embedded(lower_type(result, source))],
        None => Vec::new(),
    };
    FuncSignature { params, results }
}

fn lower_parameters(list: Node, source: &[u8]) -> Vec<FieldDecl> {
    let mut params = Vec::new();
    for param in named_children(list) {
        let mut cursor = param.walk();
        let names: Vec<String> = param
            .children_by_field_name("name", &mut cursor)
            .map(|name| node_text(name, source))
            .collect();
        let ty = match param.kind() {
            "parameter_declaration" => required_type(param, "type", source),
            "variadic_parameter_declaration" => {
                TypeExpr::Ellipsis(Box::new(required_type(param, "type", source)))
            }
            _ => continue,
        };
        params.push(FieldDecl {
            names,
            ty,
            tag: None,
        });
    }
    params
}

fn channel_dir(node: Node) -> ChanDir {
    let mut cursor = node.walk();
    let tokens: Vec<&str> = node
        .children(&mut cursor)
        .filter(|child| !child.is_named())
        .map(|child| child.kind())
        .collect();
    match tokens.as_slice() {
        ["<-", ..] => ChanDir::Recv,
        ["chan", "<-", ..] => ChanDir::Send,
        _ => ChanDir::Both,
    }
}

// ── Values ────────────────────────────────────────────────────────────────

/// Lower a constant initializer expression.
pub fn lower_value(node: Node, source: &[u8]) -> ValueExpr {
    match node.kind() {
        "interpreted_string_literal" | "raw_string_literal" | "int_literal" | "float_literal"
        | "imaginary_literal" | "rune_literal" => ValueExpr::literal(node_text(node, source)),
        "iota" => ValueExpr::Iota,
        "identifier" | "true" | "false" | "nil" => ValueExpr::Ident(node_text(node, source)),
        "selector_expression" => match (
            node.child_by_field_name("operand"),
            node.child_by_field_name("field"),
        ) {
            (Some(operand), Some(field)) if operand.kind() == "identifier" => ValueExpr::Selector {
                package: node_text(operand, source),
                name: node_text(field, source),
            },
            _ => ValueExpr::Compound(lower_operands(node, source)),
        },
        "call_expression" => {
            let callee = node
                .child_by_field_name("function")
                .map(|function| lower_value(function, source))
                .unwrap_or(ValueExpr::Compound(Vec::new()));
            let args = node
                .child_by_field_name("arguments")
                .map(|args| lower_operands(args, source))
                .unwrap_or_default();
            ValueExpr::call(callee, args)
        }
        // `T(x)` when the grammar commits to a conversion rather than a call.
        "type_conversion_expression" => {
            let callee = match node.child_by_field_name("type") {
                Some(ty) => match lower_type(ty, source) {
                    TypeExpr::Ident(name) => ValueExpr::Ident(name),
                    TypeExpr::Selector { package, name } => ValueExpr::Selector { package, name },
                    _ => ValueExpr::Compound(Vec::new()),
                },
                None => ValueExpr::Compound(Vec::new()),
            };
            let args = node
                .child_by_field_name("operand")
                .map(|operand| vec![lower_value(operand, source)])
                .unwrap_or_default();
            ValueExpr::call(callee, args)
        }
        "unary_expression" => {
            let operator = node
                .child_by_field_name("operator")
                .map(|op| node_text(op, source));
            let operand = node.child_by_field_name("operand");
            match (operator.as_deref(), operand) {
                (Some(sign @ ("-" | "+")), Some(operand))
                    if matches!(
                        operand.kind(),
                        "int_literal" | "float_literal" | "imaginary_literal"
                    ) =>
                {
                    ValueExpr::literal(format!("{sign}{}", node_text(operand, source)))
                }
                _ => ValueExpr::Compound(lower_operands(node, source)),
            }
        }
        _ => ValueExpr::Compound(lower_operands(node, source)),
    }
}

fn lower_operands(node: Node, source: &[u8]) -> Vec<ValueExpr> {
    named_children(node)
        .into_iter()
        .map(|child| lower_value(child, source))
        .collect()
}

// ── Helper Functions ──────────────────────────────────────────────────────

fn node_text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}

/// Named children without comments.
fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect();
    children
}

fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}
