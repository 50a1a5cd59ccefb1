//! Function-signature extraction.
//!
//! Lists the top-level functions of a target path. Imports are recorded but
//! never followed.

use crate::collect::collect_imports;
use crate::type_expr::resolve_type;
use crate::walker::normalize;
use std::path::Path;
use structgraph_core::decl::{CompilationUnit, Declaration, FieldDecl};
use structgraph_core::{
    FuncDefinition, FuncFile, FuncParam, FuncWorld, ImportTable, PackageSource, PathResolver,
    StructgraphError,
};

/// Collect every top-level function of one compilation unit.
pub fn collect_functions(name: &str, unit: &CompilationUnit) -> Result<FuncFile, StructgraphError> {
    let mut file = FuncFile {
        name: name.to_string(),
        imports: collect_imports(&unit.imports),
        ..FuncFile::default()
    };

    for decl in &unit.declarations {
        let Declaration::Func(func) = decl else {
            continue;
        };
        let definition = FuncDefinition {
            name: func.name.clone(),
            params: params(&func.signature.params, &mut file.imports)?,
            returns: params(&func.signature.results, &mut file.imports)?,
        };
        file.functions.insert(definition.name.clone(), definition);
    }
    Ok(file)
}

fn params(fields: &[FieldDecl], imports: &mut ImportTable) -> Result<Vec<FuncParam>, StructgraphError> {
    let mut out = Vec::new();
    for field in fields {
        let ty = resolve_type(&field.ty, imports)?;
        if field.names.is_empty() {
            out.push(FuncParam {
                name: String::new(),
                ty,
            });
            continue;
        }
        for name in &field.names {
            out.push(FuncParam {
                name: name.clone(),
                ty: ty.clone(),
            });
        }
    }
    Ok(out)
}

/// Build the function world of a single target path.
pub fn build_func_world(
    source: &dyn PackageSource,
    paths: &dyn PathResolver,
    target: &Path,
) -> Result<FuncWorld, StructgraphError> {
    let target = normalize(target)?;
    let mut world = FuncWorld::new();

    for (package_name, package) in source.parse_path(&target)? {
        for (file_name, unit) in &package.files {
            let file = collect_functions(file_name, unit)?;
            let full_name = paths.full_name(Path::new(file_name));
            let module = world.module_mut(&package_name);
            if module.full_name.is_empty() {
                if let Some(full_name) = full_name {
                    module.full_name = full_name;
                }
            }
            module.files.insert(file_name.clone(), file);
        }
    }

    tracing::info!(
        "Collected functions from {}: {} file(s)",
        target.display(),
        world.file_count()
    );
    Ok(world)
}
