use indexmap::IndexMap;
use log::debug;
use opgen_core::file::{FileBuilder, ImportEntry, ImportSource, SynthesizedFile, TypeDecl};
use opgen_core::manager::{ResolvedFile, ResolvedNames};

use crate::mutation::{SWR_MUTATION_HOOK, SynthesizedFunctions};
use crate::options::DataReturnType;

const SWR_MUTATION_MODULE: &str = "swr/mutation";
const ZOD_RESOLVER_MODULE: &str = "@hookform/resolvers/zod";
const FORM_MODULE: &str = "react-hook-form";
const SHADOWED_SUFFIX: &str = "Schema";

/// Schema names as bound inside the hook file.
#[derive(Debug, Clone)]
pub struct LocalNames {
    pub names: ResolvedNames,
    /// Local binding to exported name, for schemas imported under an alias.
    pub aliases: IndexMap<String, String>,
}

impl LocalNames {
    fn import(&self, local: &str, source: &ImportSource) -> ImportEntry {
        match self.aliases.get(local) {
            Some(exported) => ImportEntry::type_only(exported.clone(), source.clone()).with_alias(local),
            None => ImportEntry::type_only(local, source.clone()),
        }
    }
}

/// Rebind schema names that collide with a name the hook file declares
/// itself. `Pet` becomes `PetSchema`, then `PetSchema2` and so on if that
/// is taken too.
pub fn localize(names: &ResolvedNames, declared: &[&str]) -> LocalNames {
    let imported = names.all();
    let mut aliases = IndexMap::new();
    let mut renamed: IndexMap<&str, String> = IndexMap::new();

    for name in imported.iter().copied().filter(|name| declared.contains(name)) {
        let taken = |candidate: &str| {
            declared.contains(&candidate)
                || imported.contains(&candidate)
                || aliases.contains_key(candidate)
        };
        let base = format!("{name}{SHADOWED_SUFFIX}");
        let mut local = base.clone();
        let mut counter = 2;
        while taken(&local) {
            local = format!("{base}{counter}");
            counter += 1;
        }
        debug!("schema {name} is shadowed by a declaration, imported as {local}");
        aliases.insert(local.clone(), name.to_string());
        renamed.insert(name, local);
    }

    let mut local = names.clone();
    if renamed.is_empty() {
        return LocalNames { names: local, aliases };
    }
    let rebind = |name: &mut String| {
        if let Some(alias) = renamed.get(name.as_str()) {
            *name = alias.clone();
        }
    };
    local
        .request
        .iter_mut()
        .chain(local.parameters.path.iter_mut())
        .chain(local.parameters.query.iter_mut())
        .chain(local.parameters.header.iter_mut())
        .chain(local.responses.values_mut())
        .for_each(rebind);

    LocalNames { names: local, aliases }
}

pub struct ComposeInput<'a> {
    /// The hook file being assembled.
    pub file: ResolvedFile,
    /// File of the types plugin the schema names are imported from.
    pub types_file: &'a ResolvedFile,
    /// Schema names as bound in the hook file.
    pub type_names: &'a LocalNames,
    pub client_import_path: &'a str,
    pub data_return_type: DataReturnType,
    /// Client alias and factory type.
    pub types: [TypeDecl; 2],
    pub functions: SynthesizedFunctions,
}

/// Build the hook file. Validation imports are added exactly when the form
/// wrapper was synthesized.
pub fn compose(input: ComposeInput<'_>) -> SynthesizedFile {
    let swr = ImportSource::Module(SWR_MUTATION_MODULE.to_string());
    let client = ImportSource::Module(input.client_import_path.to_string());
    let types = ImportSource::File(input.types_file.path.clone());

    let mut builder = FileBuilder::new(input.file);

    if let Some(form) = &input.functions.form {
        let form_module = ImportSource::Module(FORM_MODULE.to_string());
        builder.imports([
            ImportEntry::value(
                form.binding.validation_schema.clone(),
                ImportSource::File(form.binding.validator_file.path.clone()),
            ),
            ImportEntry::value("zodResolver", ImportSource::Module(ZOD_RESOLVER_MODULE.to_string())),
            ImportEntry::type_only("UseFormHandleSubmit", form_module.clone()),
            ImportEntry::type_only("UseFormReturn", form_module.clone()),
            ImportEntry::value("useForm", form_module),
        ]);
    }

    builder
        .import(ImportEntry::value(SWR_MUTATION_HOOK, swr.clone()).as_default())
        .import(ImportEntry::type_only("SWRMutationConfiguration", swr.clone()))
        .import(ImportEntry::type_only("SWRMutationResponse", swr))
        .import(ImportEntry::value("client", client.clone()).as_default());
    if input.data_return_type == DataReturnType::Full {
        builder.import(ImportEntry::type_only("ResponseConfig", client));
    }
    builder.imports(
        input
            .type_names
            .names
            .all()
            .into_iter()
            .map(|name| input.type_names.import(name, &types)),
    );

    let [alias, factory] = input.types;
    builder.declare(alias).declare(factory).declare(input.functions.primary);
    if let Some(form) = input.functions.form {
        builder.declare(form.decl);
    }

    builder.build()
}
