use indexmap::IndexMap;
use log::debug;
use minijinja::{Environment, context};
use opgen_core::file::{Declaration, ImportSource, SynthesizedFile};
use serde::Serialize;
use thiserror::Error;

use crate::path::relative_import;

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("template error: {0}")]
    Render(#[from] minijinja::Error),
}

/// One `import` statement: all symbols of one source with the same
/// type-only flag.
#[derive(Debug, Default, Serialize)]
struct ImportLine {
    source: String,
    type_only: bool,
    default: Option<String>,
    named: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DeclarationView<'a> {
    kind: &'static str,
    name: &'a str,
    exported: bool,
    jsdoc: Vec<&'a str>,
    generics: Option<&'a str>,
    params: &'a str,
    return_type: Option<&'a str>,
    body: &'a str,
    value: &'a str,
}

/// Render a synthesized file. Imports of generated files are made relative
/// to the file itself and lose their extension.
pub fn print_file(file: &SynthesizedFile) -> Result<String, PrintError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.add_template("file.ts.j2", include_str!("../templates/file.ts.j2"))?;
    let tmpl = env.get_template("file.ts.j2")?;

    let imports = group_imports(file);
    debug!(
        "printing {} ({} import statements, {} declarations)",
        file.file.path,
        imports.len(),
        file.declarations.len()
    );
    let declarations: Vec<DeclarationView<'_>> =
        file.declarations.iter().map(declaration_view).collect();

    let rendered = tmpl.render(context! {
        imports => imports,
        declarations => declarations,
    })?;
    Ok(format!("{}\n", rendered.trim()))
}

fn group_imports(file: &SynthesizedFile) -> Vec<ImportLine> {
    let mut groups: IndexMap<(String, bool), ImportLine> = IndexMap::new();
    // `import type X, { Y }` is not valid TypeScript; type-only defaults get
    // their own statement.
    let mut type_defaults: Vec<ImportLine> = Vec::new();

    for entry in &file.imports {
        let source = match &entry.source {
            ImportSource::Module(module) => module.clone(),
            ImportSource::File(path) => relative_import(&file.file.path, path),
        };

        if entry.is_default && entry.type_only {
            type_defaults.push(ImportLine {
                source,
                type_only: true,
                default: Some(entry.symbol.clone()),
                named: Vec::new(),
            });
            continue;
        }

        let line = groups
            .entry((source.clone(), entry.type_only))
            .or_insert_with(|| ImportLine {
                source,
                type_only: entry.type_only,
                ..ImportLine::default()
            });
        let named = match &entry.alias {
            Some(alias) => format!("{} as {alias}", entry.symbol),
            None => entry.symbol.clone(),
        };
        if entry.is_default {
            line.default = Some(entry.local_name().to_string());
        } else if !line.named.contains(&named) {
            line.named.push(named);
        }
    }

    groups.into_values().chain(type_defaults).collect()
}

fn declaration_view(declaration: &Declaration) -> DeclarationView<'_> {
    match declaration {
        Declaration::Function(f) => DeclarationView {
            kind: "function",
            name: &f.name,
            exported: f.exported,
            jsdoc: f.jsdoc.iter().flat_map(|c| c.lines()).collect(),
            generics: f.generics.as_deref(),
            params: &f.params,
            return_type: f.return_type.as_deref(),
            body: f.body.trim_end(),
            value: "",
        },
        Declaration::Type(t) => DeclarationView {
            kind: "type",
            name: &t.name,
            exported: t.exported,
            jsdoc: t.jsdoc.iter().flat_map(|c| c.lines()).collect(),
            generics: None,
            params: "",
            return_type: None,
            body: "",
            value: &t.value,
        },
    }
}
