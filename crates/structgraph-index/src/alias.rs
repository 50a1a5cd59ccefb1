//! Alias builder and Alias-Value Resolver.
//!
//! Constants may be declared before the alias they enumerate. Such values
//! wait on the file's pending list until the alias shows up in the same
//! pass; values whose alias never appears stay pending.

use crate::collect::FileCollector;
use crate::type_expr::resolve_type;
use std::collections::btree_map::Entry;
use structgraph_core::decl::{ConstSpec, TypeExpr, TypeSpec, ValueExpr};
use structgraph_core::{AliasDefinition, AliasValue, DiagnosticKind, StructgraphError};

/// Where a constant ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasValueOutcome {
    /// Appended to an alias already known in this file.
    Attached,
    /// Waiting for its alias declaration.
    Pending,
    /// Not an enumerable shape.
    Skipped,
}

impl FileCollector {
    /// Register an alias and pull in pending values that name it.
    pub fn add_alias(&mut self, spec: &TypeSpec) -> Result<&AliasDefinition, StructgraphError> {
        let original = resolve_type(&spec.expr, &mut self.result.imports)?;

        let slot = match self.result.aliases.entry(spec.name.clone()) {
            Entry::Occupied(entry) => {
                let alias = entry.into_mut();
                alias.original = original;
                return Ok(alias);
            }
            Entry::Vacant(slot) => slot,
        };

        let pending = std::mem::take(&mut self.result.pending_alias_values);
        let (matched, remaining): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|value| value.type_name == spec.name);
        self.result.pending_alias_values = remaining;

        if !matched.is_empty() {
            tracing::debug!(
                "{}: {} pending value(s) resolved to {}",
                self.result.name,
                matched.len(),
                spec.name
            );
        }

        let mut alias = AliasDefinition::new(spec.name.clone(), original);
        alias.raw_candidates = matched
            .iter()
            .filter_map(|value| self.pending_specs.remove(&value.seq))
            .collect();
        alias.candidates = matched;
        Ok(slot.insert(alias))
    }

    /// Resolve a single-initializer constant to the alias it enumerates.
    pub fn add_alias_value(&mut self, spec: &ConstSpec) -> AliasValueOutcome {
        let Some((type_name, literal)) = self.enumerable_value(spec) else {
            return AliasValueOutcome::Skipped;
        };

        let value = AliasValue {
            type_name,
            name: spec.name.clone(),
            value: literal,
            seq: self.next_seq(),
        };

        match self.result.aliases.get_mut(&value.type_name) {
            Some(alias) => {
                alias.candidates.push(value);
                alias.raw_candidates.push(spec.clone());
                AliasValueOutcome::Attached
            }
            None => {
                self.pending_specs.insert(value.seq, spec.clone());
                self.result.pending_alias_values.push(value);
                AliasValueOutcome::Pending
            }
        }
    }

    /// `(alias name, literal text)` for the two supported initializer shapes.
    fn enumerable_value(&mut self, spec: &ConstSpec) -> Option<(String, String)> {
        let [value] = spec.values.as_slice() else {
            tracing::debug!("const {} has {} initializers", spec.name, spec.values.len());
            return None;
        };

        match &spec.ty {
            // const Red Color = "red"
            Some(TypeExpr::Ident(type_name)) => {
                if *value == ValueExpr::Iota {
                    tracing::debug!("const {} is iota", spec.name);
                    return None;
                }
                match value.find_literal() {
                    Some(literal) => Some((type_name.clone(), literal.to_string())),
                    None => {
                        self.diagnose(
                            &spec.name,
                            DiagnosticKind::ComplexConstant,
                            format!("no literal found in value of {type_name} constant"),
                        );
                        None
                    }
                }
            }
            Some(other) => {
                self.diagnose(
                    &spec.name,
                    DiagnosticKind::ComplexConstant,
                    format!("constant typed by {} is not enumerable", other.kind_name()),
                );
                None
            }
            // const Red = Color("red")
            None => self.conversion_value(spec, value),
        }
    }

    fn conversion_value(&mut self, spec: &ConstSpec, value: &ValueExpr) -> Option<(String, String)> {
        let Some((callee, args)) = value.find_call() else {
            if !matches!(value, ValueExpr::Literal { .. } | ValueExpr::Iota) {
                self.diagnose(
                    &spec.name,
                    DiagnosticKind::ComplexConstant,
                    "untyped constant is neither a literal nor a conversion",
                );
            }
            return None;
        };

        let ValueExpr::Ident(type_name) = callee else {
            self.diagnose(
                &spec.name,
                DiagnosticKind::ComplexConstant,
                "conversion callee is not a simple identifier",
            );
            return None;
        };

        let [arg] = args else {
            self.diagnose(
                &spec.name,
                DiagnosticKind::ComplexConstant,
                format!("{type_name}(...) takes {} arguments", args.len()),
            );
            return None;
        };

        match arg.find_literal() {
            Some(literal) => Some((type_name.clone(), literal.to_string())),
            None => {
                self.diagnose(
                    &spec.name,
                    DiagnosticKind::ComplexConstant,
                    format!("no literal found in {type_name}(...)"),
                );
                None
            }
        }
    }
}
