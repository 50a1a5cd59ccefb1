//! Type Expression Resolver: declaration-tree type expressions to [`Type`].

use structgraph_core::decl::{FieldDecl, TypeExpr};
use structgraph_core::{ImportTable, StructgraphError, Type};

/// Resolve a type expression in the context of a file's import table.
///
/// The only side effect is flagging `need_parse` on the import a selector
/// type refers to. Selectors whose prefix is not an import are left alone.
pub fn resolve_type(expr: &TypeExpr, imports: &mut ImportTable) -> Result<Type, StructgraphError> {
    let ty = match expr {
        TypeExpr::Ident(name) => Type::primitive(name.clone()),
        TypeExpr::Selector { package, name } => {
            if let Some(import) = imports.get_mut(package) {
                import.need_parse = true;
            }
            Type::selector(package.clone(), name.clone())
        }
        TypeExpr::Array(elem) => Type::array(resolve_type(elem, imports)?),
        TypeExpr::Map { key, value } => {
            Type::map(resolve_type(key, imports)?, resolve_type(value, imports)?)
        }
        TypeExpr::Pointer(target) => Type::pointer(resolve_type(target, imports)?),
        TypeExpr::Struct(body) => {
            if body.incomplete {
                return Err(StructgraphError::IncompleteStruct("anonymous struct".to_string()));
            }
            Type::Struct {
                fields: resolve_fields(&body.fields, imports)?,
            }
        }
        TypeExpr::Interface(elements) => Type::Interface {
            methods: resolve_fields(elements, imports)?,
        },
        TypeExpr::Func(signature) => Type::Func {
            args: resolve_fields(&signature.params, imports)?,
            results: resolve_fields(&signature.results, imports)?,
        },
        TypeExpr::Chan { dir, value } => Type::channel(resolve_type(value, imports)?, *dir),
        TypeExpr::Ellipsis(elem) => Type::ellipsis(resolve_type(elem, imports)?),
        TypeExpr::Unsupported(kind) => {
            return Err(StructgraphError::UnsupportedTypeExpr(kind.clone()));
        }
    };
    Ok(ty)
}

/// One type per field declaration; `a, b int` contributes a single entry.
pub fn resolve_fields(
    fields: &[FieldDecl],
    imports: &mut ImportTable,
) -> Result<Vec<Type>, StructgraphError> {
    fields
        .iter()
        .map(|field| resolve_type(&field.ty, imports))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use structgraph_core::decl::{ChanDir, FuncSignature, StructBody};
    use structgraph_core::ImportDefinition;

    fn imports() -> ImportTable {
        let mut table = ImportTable::new();
        table.insert("bson".to_string(), ImportDefinition::new("bson", "gopkg.in/mgo.v2/bson"));
        table.insert("time".to_string(), ImportDefinition::new("time", "time"));
        table
    }

    #[test]
    fn primitives_and_containers() {
        let mut table = imports();
        let expr = TypeExpr::map(
            TypeExpr::ident("string"),
            TypeExpr::array(TypeExpr::pointer(TypeExpr::ident("int"))),
        );
        let ty = resolve_type(&expr, &mut table).unwrap();
        assert_eq!(
            ty,
            Type::map(
                Type::primitive("string"),
                Type::array(Type::pointer(Type::primitive("int")))
            )
        );
        assert!(table.values().all(|i| !i.need_parse));
    }

    #[test]
    fn selector_flags_matching_import_only() {
        let mut table = imports();
        let ty = resolve_type(
            &TypeExpr::pointer(TypeExpr::selector("bson", "ObjectId")),
            &mut table,
        )
        .unwrap();
        assert_eq!(ty, Type::pointer(Type::selector("bson", "ObjectId")));
        assert!(table["bson"].need_parse);
        assert!(!table["time"].need_parse);

        // Unknown prefixes are ignored.
        resolve_type(&TypeExpr::selector("missing", "T"), &mut table).unwrap();
        assert!(!table.contains_key("missing"));
    }

    #[test]
    fn func_types_reduce_field_lists() {
        let mut table = imports();
        let expr = TypeExpr::Func(FuncSignature {
            params: vec![
                FieldDecl {
                    names: vec!["a".to_string(), "b".to_string()],
                    ty: TypeExpr::ident("int"),
                    tag: None,
                },
                FieldDecl::named("rest", TypeExpr::Ellipsis(Box::new(TypeExpr::ident("string")))),
            ],
            results: vec![FieldDecl::embedded(TypeExpr::selector("time", "Duration"))],
        });
        let ty = resolve_type(&expr, &mut table).unwrap();
        assert_eq!(
            ty,
            Type::Func {
                args: vec![Type::primitive("int"), Type::ellipsis(Type::primitive("string"))],
                results: vec![Type::selector("time", "Duration")],
            }
        );
        assert!(table["time"].need_parse);
    }

    #[test]
    fn nested_struct_interface_and_channel() {
        let mut table = imports();
        let expr = TypeExpr::Struct(StructBody {
            fields: vec![
                FieldDecl::named("C", TypeExpr::Chan {
                    dir: ChanDir::Recv,
                    value: Box::new(TypeExpr::ident("int")),
                }),
                FieldDecl::named("I", TypeExpr::Interface(vec![])),
            ],
            incomplete: false,
        });
        let ty = resolve_type(&expr, &mut table).unwrap();
        assert_eq!(
            ty,
            Type::Struct {
                fields: vec![
                    Type::channel(Type::primitive("int"), ChanDir::Recv),
                    Type::Interface { methods: vec![] },
                ]
            }
        );
    }

    #[test]
    fn unsupported_kind_is_fatal() {
        let mut table = imports();
        let err = resolve_type(
            &TypeExpr::array(TypeExpr::Unsupported("generic_type".to_string())),
            &mut table,
        )
        .unwrap_err();
        assert!(matches!(err, StructgraphError::UnsupportedTypeExpr(kind) if kind == "generic_type"));
    }

    #[test]
    fn incomplete_anonymous_struct_is_fatal() {
        let mut table = imports();
        let expr = TypeExpr::Struct(StructBody {
            fields: vec![],
            incomplete: true,
        });
        assert!(matches!(
            resolve_type(&expr, &mut table),
            Err(StructgraphError::IncompleteStruct(_))
        ));
    }
}
