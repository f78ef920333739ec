use indexmap::IndexMap;
use opgen_core::context::PluginContext;
use opgen_core::ir::{self, HttpMethod, Operation, StatusKey};
use opgen_core::manager::{FeatureVector, NameOptions, OperationManager};
use opgen_core::registry::PluginRegistry;
use opgen_core::resolver::{ArtifactKind, PluginKey};
use opgen_core::schema::{ConventionalExtractor, SchemaBundle, SchemaExtractor, SchemaRef, SchemaRole};
use opgen_core::{CodeGenerator, Generation};
use opgen_swr::{DataReturnType, SwrGenerator, SwrOptions};

fn petstore() -> Vec<Operation> {
    ir::from_yaml(include_str!("fixtures/petstore.yaml"))
        .unwrap()
        .operations
}

fn generate_with(
    operations: &[Operation],
    extractor: &dyn SchemaExtractor,
    options: &SwrOptions,
) -> Generation {
    let registry = PluginRegistry::with_defaults();
    let swr = PluginKey::new("swr");
    let context = PluginContext::new(&swr, &registry, &registry).with_extractor(extractor);
    SwrGenerator::new()
        .generate(operations, context, options)
        .unwrap()
}

fn generate(operations: &[Operation], options: &SwrOptions) -> Generation {
    generate_with(operations, &ConventionalExtractor, options)
}

fn content<'a>(generation: &'a Generation, path: &str) -> &'a str {
    &generation
        .files
        .iter()
        .find(|f| f.path == path)
        .unwrap_or_else(|| panic!("{path} was not generated"))
        .content
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whether `symbol` occurs in `text` as a whole identifier.
fn mentions(text: &str, symbol: &str) -> bool {
    text.match_indices(symbol).any(|(i, _)| {
        let before = text[..i].chars().next_back();
        let after = text[i + symbol.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

fn import_lines(content: &str) -> Vec<&str> {
    content.lines().filter(|l| l.starts_with("import ")).collect()
}

fn imported_symbols(content: &str) -> Vec<String> {
    import_lines(content)
        .into_iter()
        .flat_map(|line| {
            let line = line.trim_start_matches("import ");
            let line = line.strip_prefix("type ").unwrap_or(line);
            let (names, _) = line.split_once(" from ").unwrap();
            names
                .replace(['{', '}'], "")
                .split(',')
                .map(|s| {
                    let s = s.trim();
                    s.split_once(" as ").map_or(s, |(_, alias)| alias).to_string()
                })
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn declarations(content: &str) -> String {
    content
        .lines()
        .filter(|l| !l.starts_with("import "))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_petstore_files_in_input_order() {
    let generation = generate(&petstore(), &SwrOptions::default());
    let paths: Vec<&str> = generation.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "hooks/useListPets.ts",
            "hooks/useCreatePet.ts",
            "hooks/useShowPetById.ts",
            "hooks/useDeletePet.ts",
        ]
    );
    assert!(generation.skipped.is_empty());
}

#[test]
fn test_list_pets_hook() {
    let generation = generate(&petstore(), &SwrOptions::default());
    insta::assert_snapshot!(content(&generation, "hooks/useListPets.ts"), @r#"
    import useSWRMutation from "swr/mutation";
    import type { SWRMutationConfiguration, SWRMutationResponse } from "swr/mutation";
    import client from "@opgen/client";
    import type { ListPetsQueryParams, Pet, Error } from "../types/listPets";

    type ListPetsClient = typeof client<ListPets["data"], ListPets["error"], ListPets["request"]>;

    type ListPets = {
      data: Pet;
      error: Error;
      request: never;
      pathParams: never;
      queryParams: ListPetsQueryParams;
      headerParams: never;
      response: Pet;
      client: {
        parameters: Partial<Parameters<ListPetsClient>[0]>;
        return: Awaited<ReturnType<ListPetsClient>>;
      };
    };

    /**
     * @summary List all pets
     * @link /pets
     */
    export function useListPets(params?: ListPets["queryParams"], options: {
      mutation?: SWRMutationConfiguration<ListPets["response"], ListPets["error"], [typeof url, typeof params] | null>;
      client?: ListPets["client"]["parameters"];
      shouldFetch?: boolean;
    } = {}): SWRMutationResponse<ListPets["response"], ListPets["error"], [typeof url, typeof params] | null> {
      const { mutation: mutationOptions, client: clientOptions = {}, shouldFetch = true } = options ?? {};
      const url = `/pets` as const;

      return useSWRMutation<ListPets["response"], ListPets["error"], [typeof url, typeof params] | null>(
        shouldFetch ? [url, params] : null,
        async (_url) => {
          const res = await client<ListPets["data"], ListPets["error"]>({
            method: "get",
            url,
            params,
            ...clientOptions,
          });

          return res.data;
        },
        mutationOptions,
      );
    }
    "#);
}

#[test]
fn test_create_pet_form_wrapper() {
    let generation = generate(&petstore(), &SwrOptions::default());
    let content = content(&generation, "hooks/useCreatePet.ts");

    assert_eq!(
        import_lines(content)[..4],
        [
            "import { createPetRequestSchema } from \"../zod/createPet\";",
            "import { zodResolver } from \"@hookform/resolvers/zod\";",
            "import type { UseFormHandleSubmit, UseFormReturn } from \"react-hook-form\";",
            "import { useForm } from \"react-hook-form\";",
        ]
    );
    // The default error has no status code and is left out
    assert!(content.contains(
        "import type { CreatePetRequest, Pet, ValidationError } from \"../types/createPet\";"
    ));
    assert!(content.contains("  error: ValidationError;\n"));

    assert!(content.contains("export function useCreatePet(options: {"));
    assert!(content.contains("shouldFetch ? url : null,"));
    assert!(content.contains("async (_url, { arg: data }) => {"));
    assert!(content.contains(
        "export function useFormCreatePet(...args: Parameters<typeof useCreatePet>): {\n  mutation: ReturnType<typeof useCreatePet>;\n  form: UseFormReturn<CreatePet[\"request\"]>;\n  submitToMutation: ReturnType<UseFormHandleSubmit<CreatePet[\"request\"]>>;\n} {"
    ));
    assert!(content.contains("resolver: zodResolver(createPetRequestSchema),"));
}

#[test]
fn test_path_params_and_headers() {
    let generation = generate(&petstore(), &SwrOptions::default());
    let content = content(&generation, "hooks/useShowPetById.ts");

    assert!(content.contains(
        "export function useShowPetById(petId: ShowPetByIdPathParams[\"petId\"], headers?: ShowPetById[\"headerParams\"], options: {"
    ));
    assert!(content.contains("const url = `/pets/${petId}` as const;"));
    assert!(content.contains("        headers: { ...headers, ...clientOptions.headers },\n"));
    assert!(content.contains(" * @description Info for a specific pet\n * @link /pets/:petId\n * @deprecated\n"));
    assert!(content.contains("  error: ShowPetById404;\n"));
    assert!(!content.contains("useForm"));
}

#[test]
fn test_derived_operation_name() {
    let generation = generate(&petstore(), &SwrOptions::default());
    let content = content(&generation, "hooks/useDeletePet.ts");
    assert!(content.contains("export function useDeletePet(petId: DeletePetPathParams[\"petId\"], options: {"));
    assert!(content.contains("  response: DeletePetMutationResponse;\n"));
    assert!(content.contains("method: \"delete\","));
}

#[test]
fn test_leading_digit_operation_names() {
    let operations =
        vec![Operation::new("2faVerify", HttpMethod::Post, "/2fa").with_response(StatusKey::Code(200), None)];
    let generation = generate(&operations, &SwrOptions::default());
    assert!(generation.skipped.is_empty());
    let content = content(&generation, "hooks/use2faVerify.ts");
    assert!(content.contains("export function use2faVerify("));
    assert!(content.contains("type _2faVerifyClient = typeof client<_2faVerify[\"data\"]"));
    assert!(content.contains("type _2faVerify = {\n"));
    assert!(content.contains("import type { _2faVerifyMutationResponse } from \"../types/_2faVerify\";"));
    for invalid in [" 2fa", "<2fa", "{ 2fa", "(2fa"] {
        assert!(!content.contains(invalid), "{invalid} starts an identifier with a digit");
    }
}

#[test]
fn test_factory_name_shadowing_a_schema_is_aliased() {
    let operations =
        vec![Operation::new("pet", HttpMethod::Get, "/pet").with_response(StatusKey::Code(200), Some("Pet"))];
    let generation = generate(&operations, &SwrOptions::default());
    let content = content(&generation, "hooks/usePet.ts");
    assert!(content.contains("import type { Pet as PetSchema } from \"../types/pet\";"));
    assert!(content.contains("type Pet = {\n"));
    assert!(content.contains("  data: PetSchema;\n"));
    assert!(content.contains("  response: PetSchema;\n"));
    assert!(!content.contains("data: Pet;"));
    assert_eq!(imported_symbols(content).iter().filter(|s| *s == "Pet").count(), 0);
}

#[test]
fn test_imports_match_usage() {
    let external = [
        "useSWRMutation",
        "SWRMutationConfiguration",
        "SWRMutationResponse",
        "ResponseConfig",
        "client",
        "zodResolver",
        "useForm",
        "UseFormReturn",
        "UseFormHandleSubmit",
        "createPetRequestSchema",
        "Pet",
        "Error",
        "ValidationError",
        "CreatePetRequest",
        "ListPetsQueryParams",
        "ShowPetByIdPathParams",
        "ShowPetByIdHeaderParams",
        "ShowPetById404",
        "DeletePetPathParams",
        "DeletePetMutationResponse",
    ];

    for options in [
        SwrOptions::default(),
        SwrOptions::default().without_validator(),
        SwrOptions {
            data_return_type: DataReturnType::Full,
            ..SwrOptions::default()
        },
    ] {
        let generation = generate(&petstore(), &options);
        for file in &generation.files {
            let imported = imported_symbols(&file.content);
            let body = declarations(&file.content);
            for symbol in &imported {
                assert!(
                    mentions(&body, symbol),
                    "{}: {symbol} is imported but never used",
                    file.path
                );
            }
            for symbol in external {
                if mentions(&body, symbol) {
                    assert!(
                        imported.iter().any(|s| s == symbol),
                        "{}: {symbol} is used but not imported",
                        file.path
                    );
                }
            }
            let mut unique = imported.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), imported.len(), "{}: duplicate import", file.path);
        }
    }
}

#[test]
fn test_full_data_return_type() {
    let options = SwrOptions {
        data_return_type: DataReturnType::Full,
        ..SwrOptions::default()
    };
    let generation = generate(&petstore(), &options);
    let content = content(&generation, "hooks/useListPets.ts");
    assert!(content.contains("import type { ResponseConfig } from \"@opgen/client\";"));
    assert!(content.contains("  response: ResponseConfig<Pet>;\n"));
    assert!(content.contains("      return res;\n"));
}

#[test]
fn test_without_validator_plugin() {
    let generation = generate(&petstore(), &SwrOptions::default().without_validator());
    let content = content(&generation, "hooks/useCreatePet.ts");
    assert!(!content.contains("useFormCreatePet"));
    assert!(!content.contains("zodResolver"));
    assert!(!content.contains("react-hook-form"));
}

#[test]
fn test_thread_count_does_not_change_output() {
    let mut operations = petstore();
    // Collides with `listPets` once cased
    operations.push(
        Operation::new("list-pets", HttpMethod::Get, "/v2/pets")
            .with_response(StatusKey::Code(200), Some("Pet")),
    );

    let single = generate(
        &operations,
        &SwrOptions {
            threads: Some(1),
            ..SwrOptions::default()
        },
    );
    let parallel = generate(
        &operations,
        &SwrOptions {
            threads: Some(4),
            ..SwrOptions::default()
        },
    );
    assert_eq!(single, parallel);
    assert_eq!(single.files[4].path, "hooks/useListPets2.ts");
    assert!(single.files[4].content.contains("export function useListPets2("));
}

#[test]
fn test_failing_operation_does_not_affect_siblings() {
    let mut operations = petstore();
    operations.insert(
        1,
        Operation::new("broken", HttpMethod::Get, "/broken").with_response(StatusKey::Code(200), Some("  ")),
    );

    let generation = generate(&operations, &SwrOptions::default());
    assert_eq!(generation.files.len(), 4);
    assert_eq!(generation.skipped.len(), 1);
    assert_eq!(generation.skipped[0].operation, "broken");
    assert!(generation.skipped[0].reason.contains("plugin ts"));
    assert_eq!(generation.files[1].path, "hooks/useCreatePet.ts");
}

#[test]
fn test_unknown_types_plugin_skips_every_operation() {
    let options = SwrOptions {
        types_plugin: PluginKey::new("typescript"),
        ..SwrOptions::default()
    };
    let generation = generate(&petstore(), &options);
    assert!(generation.files.is_empty());
    assert_eq!(generation.skipped.len(), 4);
}

#[test]
fn test_missing_extractor_aborts_the_run() {
    let registry = PluginRegistry::with_defaults();
    let swr = PluginKey::new("swr");
    let context = PluginContext::new(&swr, &registry, &registry);
    let err = SwrGenerator::new()
        .generate(&petstore(), context, &SwrOptions::default())
        .unwrap_err();
    assert!(err.is_fatal());
}

/// Schemas named the way a document parser might name them.
struct ListPetsSchemas {
    request: Option<&'static str>,
}

impl SchemaExtractor for ListPetsSchemas {
    fn extract(&self, _operation: &Operation, _status_code: Option<u16>) -> SchemaBundle {
        SchemaBundle {
            request: self.request.map(|name| SchemaRef::new(name, SchemaRole::Request)),
            path_params: None,
            query_params: Some(SchemaRef::new("ListPetsParams", SchemaRole::QueryParams)),
            header_params: None,
            response: SchemaRef::new("Pet", SchemaRole::Response).with_status(Some(200)),
            errors: vec![SchemaRef::new("Error", SchemaRole::Error).with_status(Some(404))],
        }
    }
}

fn list_pets() -> Operation {
    Operation::new("listPets", HttpMethod::Get, "/pets").with_tag("pets")
}

#[test]
fn test_list_pets_scenario() {
    let extractor = ListPetsSchemas { request: None };
    let registry = PluginRegistry::with_defaults();
    let swr = PluginKey::new("swr");
    let ts = PluginKey::new("ts");
    let context = PluginContext::new(&swr, &registry, &registry).with_extractor(&extractor);
    let manager = OperationManager::new(context).unwrap();

    let names = manager
        .group_schemas(&list_pets(), NameOptions::for_plugin(&ts, ArtifactKind::Type))
        .unwrap();
    assert_eq!(
        names.responses,
        IndexMap::from([
            (StatusKey::Code(200), "Pet".to_string()),
            (StatusKey::Code(404), "Error".to_string()),
        ])
    );
    assert_eq!(
        names.features(),
        FeatureVector {
            with_query_params: true,
            with_data: false,
            with_path_params: false,
            with_headers: false,
        }
    );

    let generation = generate_with(&[list_pets()], &extractor, &SwrOptions::default());
    let content = content(&generation, "hooks/useListPets.ts");
    assert!(content.contains("shouldFetch ? [url, params] : null,"));
    assert!(!content.contains("shouldFetch ? url : null,"));
    assert!(!content.contains("useForm"));
    assert!(content.contains("import type { ListPetsParams, Pet, Error } from \"../types/listPets\";"));
}

#[test]
fn test_list_pets_scenario_with_request() {
    let extractor = ListPetsSchemas {
        request: Some("CreatePetRequest"),
    };
    let generation = generate_with(&[list_pets()], &extractor, &SwrOptions::default());
    let content = content(&generation, "hooks/useListPets.ts");

    assert!(content.contains("export function useFormListPets(...args: Parameters<typeof useListPets>)"));
    assert!(content.contains("resolver: zodResolver(createPetRequestSchema),"));

    let imports = import_lines(content);
    for symbol in ["createPetRequestSchema", "zodResolver", "useForm", "UseFormReturn", "UseFormHandleSubmit"] {
        let count = imports.iter().filter(|line| mentions(line, symbol)).count();
        assert_eq!(count, 1, "{symbol} should be imported exactly once");
    }
    assert!(imports.contains(&"import { createPetRequestSchema } from \"../zod/listPets\";"));
}
