//! File Result Aggregator and the struct/interface builders.
//!
//! A [`FileCollector`] owns the [`FileResult`] of one compilation unit while
//! its declarations are processed. Alias handling lives in `alias.rs`.

use crate::classify::{classify, DeclKind};
use crate::tags::parse_tags;
use crate::type_expr::resolve_type;
use crate::unquote::unquote;
use std::collections::BTreeMap;
use structgraph_core::decl::{
    CompilationUnit, ConstSpec, Declaration, FieldDecl, ImportSpec, StructBody, TypeExpr,
    TypeSpec,
};
use structgraph_core::{
    Diagnostic, DiagnosticKind, Field, FileResult, ImportDefinition, ImportTable,
    InterfaceDefinition, StructDefinition, StructgraphError,
};

/// Output of one file-processing pass.
#[derive(Debug, Clone)]
pub struct Collected {
    pub result: FileResult,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds the [`FileResult`] of one compilation unit.
#[derive(Debug)]
pub struct FileCollector {
    pub(crate) result: FileResult,
    pub(crate) diagnostics: Vec<Diagnostic>,
    /// Source specs of pending values, keyed by sequence number.
    pub(crate) pending_specs: BTreeMap<u32, ConstSpec>,
    last_seq: u32,
}

impl FileCollector {
    pub fn new(name: impl Into<String>, imports: &[ImportSpec]) -> Self {
        let mut result = FileResult::new(name);
        result.imports = collect_imports(imports);
        Self {
            result,
            diagnostics: Vec::new(),
            pending_specs: BTreeMap::new(),
            last_seq: 0,
        }
    }

    pub fn result(&self) -> &FileResult {
        &self.result
    }

    /// Classify a declaration and hand it to the matching builder.
    pub fn add_declaration(&mut self, decl: &Declaration) -> Result<(), StructgraphError> {
        match (classify(decl), decl) {
            (Some(DeclKind::Struct), Declaration::Type(spec)) => {
                self.add_struct(spec)?;
            }
            (Some(DeclKind::Interface), Declaration::Type(spec)) => {
                self.add_interface(spec);
            }
            (Some(DeclKind::Alias), Declaration::Type(spec)) => {
                self.add_alias(spec)?;
            }
            (Some(DeclKind::AliasValue), Declaration::Const(spec)) => {
                self.add_alias_value(spec);
            }
            _ => {}
        }
        Ok(())
    }

    /// Register a struct; a repeated name replaces the earlier fields.
    pub fn add_struct(&mut self, spec: &TypeSpec) -> Result<&StructDefinition, StructgraphError> {
        let TypeExpr::Struct(body) = &spec.expr else {
            return Err(StructgraphError::UnsupportedTypeExpr(format!(
                "{} is a {}, not a struct",
                spec.name,
                spec.expr.kind_name()
            )));
        };
        let fields = self.build_fields(&spec.name, body)?;

        let item = self.result.structs.entry(spec.name.clone()).or_default();
        item.name = spec.name.clone();
        item.fields = fields;
        Ok(item)
    }

    /// Register an interface placeholder.
    pub fn add_interface(&mut self, spec: &TypeSpec) -> &InterfaceDefinition {
        let item = self.result.interfaces.entry(spec.name.clone()).or_default();
        item.name = spec.name.clone();
        item
    }

    /// Close the pass: order every alias's candidates by declaration.
    pub fn finish(mut self) -> Collected {
        for alias in self.result.aliases.values_mut() {
            alias.candidates.sort_by_key(|value| value.seq);
        }
        for pending in &self.result.pending_alias_values {
            tracing::debug!(
                "{}: const {} never found alias {}",
                self.result.name,
                pending.name,
                pending.type_name
            );
        }
        Collected {
            result: self.result,
            diagnostics: self.diagnostics,
        }
    }

    pub(crate) fn next_seq(&mut self) -> u32 {
        self.last_seq += 1;
        self.last_seq
    }

    pub(crate) fn diagnose(
        &mut self,
        subject: impl Into<String>,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            file: self.result.name.clone(),
            subject: subject.into(),
            kind,
            message: message.into(),
        };
        tracing::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn build_fields(
        &mut self,
        struct_name: &str,
        body: &StructBody,
    ) -> Result<BTreeMap<String, Field>, StructgraphError> {
        if body.incomplete {
            return Err(StructgraphError::IncompleteStruct(struct_name.to_string()));
        }

        let mut fields = BTreeMap::new();
        for decl in &body.fields {
            let ty = resolve_type(&decl.ty, &mut self.result.imports)?;
            let tags = self.field_tags(struct_name, decl)?;

            if decl.names.is_empty() {
                let name = decl.ty.innermost_ident().ok_or_else(|| {
                    StructgraphError::MissingEmbeddedName(format!(
                        "{} in {struct_name}",
                        decl.ty.kind_name()
                    ))
                })?;
                fields.insert(
                    name.to_string(),
                    Field {
                        name: name.to_string(),
                        tags,
                        ty,
                        embed: true,
                    },
                );
                continue;
            }

            for name in &decl.names {
                fields.insert(
                    name.clone(),
                    Field {
                        name: name.clone(),
                        tags: tags.clone(),
                        ty: ty.clone(),
                        embed: false,
                    },
                );
            }
        }
        Ok(fields)
    }

    fn field_tags(
        &mut self,
        struct_name: &str,
        decl: &FieldDecl,
    ) -> Result<BTreeMap<String, Vec<String>>, StructgraphError> {
        let Some(raw) = &decl.tag else {
            return Ok(BTreeMap::new());
        };
        let parsed = parse_tags(raw)?;
        for bad in parsed.malformed {
            self.diagnose(
                format!("{struct_name}.{}", bad.key),
                DiagnosticKind::MalformedTag,
                format!("scan tags failure {}: {}", bad.raw, bad.reason),
            );
        }
        Ok(parsed.tags)
    }
}

/// Build the import table; the local name defaults to the last path segment.
pub fn collect_imports(imports: &[ImportSpec]) -> ImportTable {
    let mut table = ImportTable::new();
    for spec in imports {
        let full_name = match unquote(&spec.path) {
            Ok(path) => path,
            Err(err) => {
                tracing::debug!("skipping import {}: {}", spec.path, err);
                continue;
            }
        };
        let name = match &spec.alias {
            Some(alias) => alias.clone(),
            None => full_name
                .rsplit('/')
                .next()
                .unwrap_or(full_name.as_str())
                .to_string(),
        };
        table.insert(name.clone(), ImportDefinition::new(name, full_name));
    }
    table
}

/// Run the file-processing pass over one compilation unit.
pub fn collect_result(name: &str, unit: &CompilationUnit) -> Result<Collected, StructgraphError> {
    let mut collector = FileCollector::new(name, &unit.imports);
    for decl in &unit.declarations {
        collector.add_declaration(decl)?;
    }
    Ok(collector.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::GoSource;
    use structgraph_core::Type;

    fn collect(source: &str) -> Collected {
        let unit = GoSource::new()
            .parse_source("models/person.go", source.as_bytes())
            .expect("parse");
        collect_result("models/person.go", &unit).expect("collect")
    }

    #[test]
    fn import_names_default_to_last_segment() {
        let table = collect_imports(&[
            ImportSpec {
                path: "\"gopkg.in/mgo.v2/bson\"".to_string(),
                alias: None,
            },
            ImportSpec {
                path: "`net/http`".to_string(),
                alias: Some("h".to_string()),
            },
            ImportSpec {
                path: "\"broken".to_string(),
                alias: None,
            },
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table["bson"].full_name, "gopkg.in/mgo.v2/bson");
        assert_eq!(table["h"].full_name, "net/http");
        assert!(!table["h"].need_parse);
    }

    #[test]
    fn struct_fields_and_needparse() {
        let collected = collect(
            r#"package models

import (
	"fmt"
	"gopkg.in/mgo.v2/bson"
)

type Person struct {
	ID      bson.ObjectId  `json:"id" bson:"_id"`
	Name    string         `json:"name" bson:"name"`
	GroupID *bson.ObjectId `json:"groupId,omitempty" bson:"groupId"`
	Group   *Group         `json:"-"`
}

type hidden struct {
	X fmt.Stringer
}
"#,
        );
        let result = &collected.result;
        assert_eq!(result.structs.len(), 1);
        let person = &result.structs["Person"];
        assert_eq!(person.fields.len(), 4);

        let id = &person.fields["ID"];
        assert_eq!(id.ty, Type::selector("bson", "ObjectId"));
        assert_eq!(id.tags["bson"], vec!["_id".to_string()]);
        assert!(!id.embed);

        assert_eq!(
            person.fields["GroupID"].tags["json"],
            vec!["groupId".to_string(), "omitempty".to_string()]
        );
        assert_eq!(
            person.fields["Group"].ty,
            Type::pointer(Type::primitive("Group"))
        );

        assert!(result.imports["bson"].need_parse);
        // Only referenced by an unexported struct.
        assert!(!result.imports["fmt"].need_parse);
    }

    #[test]
    fn embedded_fields_take_innermost_name() {
        let collected = collect(
            r#"package models

type Derived struct {
	*Base
	pkg.Mixin
	Name string
}
"#,
        );
        let derived = &collected.result.structs["Derived"];
        let base = &derived.fields["Base"];
        assert!(base.embed);
        assert_eq!(base.name, "Base");
        assert_eq!(base.ty, Type::pointer(Type::primitive("Base")));

        let mixin = &derived.fields["Mixin"];
        assert!(mixin.embed);
        assert_eq!(mixin.ty, Type::selector("pkg", "Mixin"));
        assert!(!derived.fields["Name"].embed);
    }

    #[test]
    fn multi_name_fields_share_type_and_tags() {
        let collected = collect("package p\n\ntype Point struct {\n\tX, Y int `json:\"c\"`\n}\n");
        let point = &collected.result.structs["Point"];
        assert_eq!(point.fields["X"].ty, Type::primitive("int"));
        assert_eq!(point.fields["Y"].tags["json"], vec!["c".to_string()]);
    }

    #[test]
    fn interfaces_are_placeholders() {
        let collected = collect(
            "package p\n\ntype Reader interface {\n\tRead(p []byte) (int, error)\n}\n\ntype reader interface{}\n",
        );
        assert_eq!(collected.result.interfaces.len(), 1);
        assert_eq!(collected.result.interfaces["Reader"].name, "Reader");
    }

    #[test]
    fn repeated_struct_registration_replaces_fields() {
        let mut collector = FileCollector::new("a.go", &[]);
        let first = TypeSpec {
            name: "Config".to_string(),
            expr: TypeExpr::Struct(StructBody {
                fields: vec![FieldDecl::named("Old", TypeExpr::ident("int"))],
                incomplete: false,
            }),
        };
        let second = TypeSpec {
            name: "Config".to_string(),
            expr: TypeExpr::Struct(StructBody {
                fields: vec![FieldDecl::named("New", TypeExpr::ident("string"))],
                incomplete: false,
            }),
        };
        collector.add_struct(&first).unwrap();
        let latest = collector.add_struct(&second).unwrap();
        assert_eq!(latest.fields.len(), 1);
        assert!(latest.fields.contains_key("New"));
    }

    #[test]
    fn incomplete_struct_is_fatal() {
        let mut collector = FileCollector::new("a.go", &[]);
        let spec = TypeSpec {
            name: "Broken".to_string(),
            expr: TypeExpr::Struct(StructBody {
                fields: vec![],
                incomplete: true,
            }),
        };
        let err = collector.add_struct(&spec).unwrap_err();
        assert_eq!(err.to_string(), "Broken is incomplete struct definition");
    }

    #[test]
    fn malformed_tag_value_is_diagnosed_and_dropped() {
        let collected = collect(
            "package p\n\ntype T struct {\n\tA int `bad:\"\\q\" json:\"a\"`\n}\n",
        );
        let field = &collected.result.structs["T"].fields["A"];
        assert!(!field.tags.contains_key("bad"));
        assert_eq!(field.tags["json"], vec!["a".to_string()]);
        assert_eq!(collected.diagnostics.len(), 1);
        assert_eq!(collected.diagnostics[0].kind, DiagnosticKind::MalformedTag);
        assert_eq!(collected.diagnostics[0].subject, "T.bad");
    }

    #[test]
    fn generic_field_type_aborts() {
        let unit = GoSource::new()
            .parse_source(
                "a.go",
                b"package p\n\ntype T struct {\n\tItems List[int]\n}\n",
            )
            .unwrap();
        let err = collect_result("a.go", &unit).unwrap_err();
        assert!(matches!(err, StructgraphError::UnsupportedTypeExpr(_)));
    }
}
