//! Declaration Classifier.

use structgraph_core::decl::{Declaration, TypeExpr, TypeSpec};

/// Which builder a top-level declaration goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Struct,
    Interface,
    Alias,
    AliasValue,
}

/// Exported names start with an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn exported_type(decl: &Declaration) -> Option<&TypeSpec> {
    match decl {
        Declaration::Type(spec) if is_exported(&spec.name) => Some(spec),
        _ => None,
    }
}

pub fn is_struct(decl: &Declaration) -> bool {
    exported_type(decl).is_some_and(|spec| matches!(spec.expr, TypeExpr::Struct(_)))
}

pub fn is_interface(decl: &Declaration) -> bool {
    exported_type(decl).is_some_and(|spec| matches!(spec.expr, TypeExpr::Interface(_)))
}

pub fn is_alias(decl: &Declaration) -> bool {
    exported_type(decl).is_some_and(|spec| {
        matches!(
            spec.expr,
            TypeExpr::Ident(_)
                | TypeExpr::Selector { .. }
                | TypeExpr::Array(_)
                | TypeExpr::Map { .. }
                | TypeExpr::Pointer(_)
        )
    })
}

/// A constant binding with exactly one initializer. Exportedness is not
/// required: the value belongs to whatever alias it names.
pub fn is_alias_value(decl: &Declaration) -> bool {
    matches!(decl, Declaration::Const(spec) if spec.values.len() == 1)
}

/// Classify a declaration; `None` means it is out of scope for the model.
pub fn classify(decl: &Declaration) -> Option<DeclKind> {
    if is_struct(decl) {
        Some(DeclKind::Struct)
    } else if is_interface(decl) {
        Some(DeclKind::Interface)
    } else if is_alias(decl) {
        Some(DeclKind::Alias)
    } else if is_alias_value(decl) {
        Some(DeclKind::AliasValue)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use structgraph_core::decl::{ConstSpec, FuncDecl, FuncSignature, StructBody, ValueExpr};

    fn type_decl(name: &str, expr: TypeExpr) -> Declaration {
        Declaration::Type(TypeSpec {
            name: name.to_string(),
            expr,
        })
    }

    fn const_decl(name: &str, values: Vec<ValueExpr>) -> Declaration {
        Declaration::Const(ConstSpec {
            name: name.to_string(),
            ty: None,
            values,
        })
    }

    #[test]
    fn exported_names() {
        assert!(is_exported("Person"));
        assert!(is_exported("Élan"));
        assert!(!is_exported("person"));
        assert!(!is_exported("_Person"));
        assert!(!is_exported(""));
    }

    #[test]
    fn type_declarations() {
        let cases = [
            (TypeExpr::Struct(StructBody::default()), Some(DeclKind::Struct)),
            (TypeExpr::Interface(vec![]), Some(DeclKind::Interface)),
            (TypeExpr::ident("string"), Some(DeclKind::Alias)),
            (TypeExpr::selector("strfmt", "Email"), Some(DeclKind::Alias)),
            (TypeExpr::array(TypeExpr::ident("int")), Some(DeclKind::Alias)),
            (
                TypeExpr::map(TypeExpr::ident("string"), TypeExpr::ident("int")),
                Some(DeclKind::Alias),
            ),
            (TypeExpr::pointer(TypeExpr::ident("int")), Some(DeclKind::Alias)),
            (TypeExpr::Func(FuncSignature::default()), None),
            (TypeExpr::Unsupported("type_parameter_list".to_string()), None),
        ];
        for (expr, expected) in cases {
            let decl = type_decl("Exported", expr.clone());
            assert_eq!(classify(&decl), expected, "{expr:?}");
        }
    }

    #[test]
    fn unexported_types_are_invisible() {
        assert_eq!(
            classify(&type_decl("person", TypeExpr::Struct(StructBody::default()))),
            None
        );
        assert_eq!(classify(&type_decl("id", TypeExpr::ident("string"))), None);
    }

    #[test]
    fn constants_need_exactly_one_initializer() {
        assert_eq!(
            classify(&const_decl("red", vec![ValueExpr::literal("1")])),
            Some(DeclKind::AliasValue)
        );
        assert_eq!(classify(&const_decl("Second", vec![])), None);
        assert_eq!(
            classify(&const_decl(
                "A",
                vec![ValueExpr::literal("1"), ValueExpr::literal("2")]
            )),
            None
        );
    }

    #[test]
    fn functions_are_skipped() {
        let decl = Declaration::Func(FuncDecl {
            name: "Parse".to_string(),
            signature: FuncSignature::default(),
        });
        assert_eq!(classify(&decl), None);
    }
}
