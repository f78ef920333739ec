use log::warn;
use minijinja::{Environment, context};
use opgen_core::file::FunctionDecl;
use opgen_core::ir::{HttpMethod, Operation};
use opgen_core::manager::{FeatureVector, ResolvedFile, ResolvedNames};
use opgen_typescript::{FunctionParam, FunctionParams, UrlPath, operation_comments};

use crate::error::SwrError;
use crate::options::DataReturnType;

/// Name of the SWR mutation hook the generated functions wrap.
pub const SWR_MUTATION_HOOK: &str = "useSWRMutation";

/// Prefix replaced in the primary function name to name the form wrapper.
const PRIMARY_PREFIX_LEN: usize = 3;
const FORM_PREFIX: &str = "useForm";

/// Cache key of the mutation: the URL alone, or the URL with the query
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey {
    Tuple,
    Url,
}

impl CacheKey {
    /// Chosen by the presence of query parameters only.
    pub fn select(features: &FeatureVector) -> Self {
        if features.with_query_params {
            CacheKey::Tuple
        } else {
            CacheKey::Url
        }
    }

    pub fn expression(&self) -> &'static str {
        match self {
            CacheKey::Tuple => "[url, params]",
            CacheKey::Url => "url",
        }
    }

    pub fn key_type(&self) -> &'static str {
        match self {
            CacheKey::Tuple => "[typeof url, typeof params] | null",
            CacheKey::Url => "typeof url | null",
        }
    }
}

/// The request validation schema the form wrapper binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormBinding {
    /// Resolved name of the validation schema of the request body.
    pub validation_schema: String,
    /// File the validation schema is declared in.
    pub validator_file: ResolvedFile,
}

/// The typed HTTP client call made by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCall {
    pub path: UrlPath,
    /// Type arguments of the client call.
    pub generics: String,
    pub features: FeatureVector,
    /// Client option entries, in emission order.
    pub options: Vec<String>,
}

/// The call of the SWR hook itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookCall {
    pub name: String,
    pub generics: String,
}

/// Everything a template needs to render the primary function.
#[derive(Debug, Clone)]
pub struct TemplateProps<'a> {
    pub name: &'a str,
    pub params: String,
    pub return_type: String,
    pub jsdoc: Vec<String>,
    pub hook: HookCall,
    pub client: ClientCall,
    pub cache_key: CacheKey,
    pub data_return_type: DataReturnType,
}

/// Everything a template needs to render the form wrapper.
#[derive(Debug, Clone)]
pub struct FormProps<'a> {
    pub name: String,
    pub params: String,
    pub return_type: String,
    pub request_model: &'a str,
    pub validation_schema: &'a str,
}

/// Renders one hook family. Implement it to emit a different function shape
/// from the same resolved data.
pub trait MutationTemplate: Send + Sync {
    fn primary(&self, props: &TemplateProps<'_>) -> Result<FunctionDecl, SwrError>;

    fn form(&self, props: &TemplateProps<'_>, form: &FormProps<'_>) -> Result<FunctionDecl, SwrError>;
}

/// The default template: an SWR `useSWRMutation` hook.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwrMutationTemplate;

fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.add_template("mutation.ts.j2", include_str!("../templates/mutation.ts.j2"))?;
    env.add_template("form.ts.j2", include_str!("../templates/form.ts.j2"))?;
    Ok(env)
}

impl MutationTemplate for SwrMutationTemplate {
    fn primary(&self, props: &TemplateProps<'_>) -> Result<FunctionDecl, SwrError> {
        let env = environment()?;
        let body = env.get_template("mutation.ts.j2")?.render(context! {
            url => props.client.path.template(),
            hook_name => &props.hook.name,
            hook_generics => &props.hook.generics,
            cache_key => props.cache_key.expression(),
            with_data => props.client.features.with_data,
            client_generics => &props.client.generics,
            client_options => &props.client.options,
            result => props.data_return_type.result_expression(),
        })?;

        Ok(FunctionDecl {
            name: props.name.to_string(),
            exported: true,
            generics: None,
            params: props.params.clone(),
            return_type: Some(props.return_type.clone()),
            jsdoc: props.jsdoc.clone(),
            body,
        })
    }

    fn form(&self, props: &TemplateProps<'_>, form: &FormProps<'_>) -> Result<FunctionDecl, SwrError> {
        let env = environment()?;
        let body = env.get_template("form.ts.j2")?.render(context! {
            name => props.name,
            request_model => form.request_model,
            validation_schema => form.validation_schema,
        })?;

        Ok(FunctionDecl {
            name: form.name.clone(),
            exported: true,
            generics: None,
            params: form.params.clone(),
            return_type: Some(form.return_type.clone()),
            jsdoc: props.jsdoc.clone(),
            body,
        })
    }
}

/// Inputs of the synthesizer for one operation.
#[derive(Debug, Clone)]
pub struct MutationInput<'a> {
    pub operation: &'a Operation,
    /// Resolved name of the primary function.
    pub name: &'a str,
    /// Resolved name of the factory type.
    pub factory: &'a str,
    /// Schema names as resolved by the types plugin.
    pub names: &'a ResolvedNames,
    /// Property keys of the path parameter schema.
    pub path_params: &'a [String],
    pub data_return_type: DataReturnType,
    pub form: Option<FormBinding>,
}

/// A synthesized form wrapper, with the validation schema it binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFunction {
    pub decl: FunctionDecl,
    pub binding: FormBinding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedFunctions {
    pub primary: FunctionDecl,
    pub form: Option<FormFunction>,
}

/// Client option entries: method, url, then params, data and the header
/// merge when present, then the caller's options.
pub fn client_options(method: HttpMethod, features: &FeatureVector) -> Vec<String> {
    let mut options = vec![format!("method: \"{}\"", method.as_lower()), "url".to_string()];
    if features.with_query_params {
        options.push("params".to_string());
    }
    if features.with_data {
        options.push("data".to_string());
    }
    if features.with_headers {
        options.push("headers: { ...headers, ...clientOptions.headers }".to_string());
    }
    options.push("...clientOptions".to_string());
    options
}

/// Name of the form wrapper of `primary`: `useCreatePet` → `useFormCreatePet`.
/// `None` when nothing follows the replaced prefix.
pub fn form_function_name(primary: &str) -> Option<String> {
    primary
        .get(PRIMARY_PREFIX_LEN..)
        .filter(|rest| !rest.is_empty())
        .map(|rest| format!("{FORM_PREFIX}{rest}"))
}

/// Build the primary hook and, when a form binding is given, its form
/// wrapper.
pub fn synthesize(
    input: MutationInput<'_>,
    template: &dyn MutationTemplate,
) -> Result<SynthesizedFunctions, SwrError> {
    let factory = input.factory;
    let features = input.names.features();
    let cache_key = CacheKey::select(&features);
    let request_model = features
        .with_data
        .then(|| format!("{factory}[\"request\"]"));

    let client_generics: Vec<String> = [
        Some(format!("{factory}[\"data\"]")),
        Some(format!("{factory}[\"error\"]")),
        request_model.clone(),
    ]
    .into_iter()
    .flatten()
    .collect();

    let result_generics: Vec<String> = [
        Some(format!("{factory}[\"response\"]")),
        Some(format!("{factory}[\"error\"]")),
        Some(cache_key.key_type().to_string()),
        request_model.clone(),
    ]
    .into_iter()
    .flatten()
    .collect();
    let result_generics = result_generics.join(", ");

    let mut params = FunctionParams::new();
    if let Some(path_type) = &input.names.parameters.path {
        params.extend(input.path_params.iter().map(|key| {
            FunctionParam::new(UrlPath::identifier(key)).typed(format!("{path_type}[\"{key}\"]"))
        }));
    }
    params
        .add(
            FunctionParam::new("params")
                .typed(format!("{factory}[\"queryParams\"]"))
                .optional()
                .enabled(features.with_query_params),
        )
        .add(
            FunctionParam::new("headers")
                .typed(format!("{factory}[\"headerParams\"]"))
                .optional()
                .enabled(features.with_headers),
        )
        .add(
            FunctionParam::new("options")
                .typed(format!(
                    "{{\n  mutation?: SWRMutationConfiguration<{result_generics}>;\n  client?: {factory}[\"client\"][\"parameters\"];\n  shouldFetch?: boolean;\n}}"
                ))
                .optional()
                .with_default("{}"),
        );

    let props = TemplateProps {
        name: input.name,
        params: params.render(),
        return_type: format!("SWRMutationResponse<{result_generics}>"),
        jsdoc: operation_comments(input.operation),
        hook: HookCall {
            name: SWR_MUTATION_HOOK.to_string(),
            generics: result_generics.clone(),
        },
        client: ClientCall {
            path: UrlPath::new(&input.operation.path),
            generics: client_generics.join(", "),
            features,
            options: client_options(input.operation.method, &features),
        },
        cache_key,
        data_return_type: input.data_return_type,
    };

    let primary = template.primary(&props)?;

    // The wrapper needs a request model to type the form with.
    let form = match (input.form, request_model.as_deref(), form_function_name(input.name)) {
        (Some(binding), Some(request_model), Some(name)) => {
            let form_props = FormProps {
                name,
                params: format!("...args: Parameters<typeof {}>", input.name),
                return_type: format!(
                    "{{\n  mutation: ReturnType<typeof {}>;\n  form: UseFormReturn<{request_model}>;\n  submitToMutation: ReturnType<UseFormHandleSubmit<{request_model}>>;\n}}",
                    input.name
                ),
                request_model,
                validation_schema: &binding.validation_schema,
            };
            let decl = template.form(&props, &form_props)?;
            Some(FormFunction { decl, binding })
        }
        (Some(_), Some(_), None) => {
            warn!(
                "{}: no form wrapper name can be derived from `{}`, skipping it",
                input.operation.id(),
                input.name
            );
            None
        }
        _ => None,
    };

    Ok(SynthesizedFunctions { primary, form })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use opgen_core::ir::{ParameterLocation, StatusKey};
    use opgen_core::manager::{FileMeta, ParameterNames};
    use opgen_core::resolver::PluginKey;

    fn names(query: bool, request: bool, path: bool, headers: bool) -> ResolvedNames {
        ResolvedNames {
            request: request.then(|| "CreatePetRequest".to_string()),
            parameters: ParameterNames {
                path: path.then(|| "PetPathParams".to_string()),
                query: query.then(|| "ListPetsParams".to_string()),
                header: headers.then(|| "PetHeaderParams".to_string()),
            },
            responses: IndexMap::from([(StatusKey::Code(200), "Pet".to_string())]),
            response_key: StatusKey::Code(200),
        }
    }

    fn binding() -> FormBinding {
        FormBinding {
            validation_schema: "createPetRequestSchema".to_string(),
            validator_file: ResolvedFile {
                base_name: "createPet.ts".to_string(),
                path: "zod/createPet.ts".to_string(),
                meta: FileMeta {
                    name: "createPet".to_string(),
                    plugin_key: PluginKey::new("zod"),
                    tag: None,
                },
            },
        }
    }

    fn run(
        operation: &Operation,
        names: &ResolvedNames,
        path_params: &[String],
        form: Option<FormBinding>,
    ) -> SynthesizedFunctions {
        synthesize(
            MutationInput {
                operation,
                name: "usePets",
                factory: "Pets",
                names,
                path_params,
                data_return_type: DataReturnType::Data,
                form,
            },
            &SwrMutationTemplate,
        )
        .unwrap()
    }

    #[test]
    fn test_client_options_order() {
        let all = FeatureVector {
            with_query_params: true,
            with_data: true,
            with_path_params: true,
            with_headers: true,
        };
        assert_eq!(
            client_options(HttpMethod::Post, &all),
            vec![
                "method: \"post\"",
                "url",
                "params",
                "data",
                "headers: { ...headers, ...clientOptions.headers }",
                "...clientOptions",
            ]
        );
        assert_eq!(
            client_options(HttpMethod::Get, &FeatureVector::default()),
            vec!["method: \"get\"", "url", "...clientOptions"]
        );
    }

    #[test]
    fn test_form_function_name() {
        assert_eq!(form_function_name("useCreatePet").as_deref(), Some("useFormCreatePet"));
        assert_eq!(form_function_name("use"), None);
        assert_eq!(form_function_name("ab"), None);
    }

    #[test]
    fn test_cache_key_follows_query_params_only() {
        let op = Operation::new("pets", HttpMethod::Post, "/pets");
        for mask in 0..16u8 {
            let names = names(mask & 1 != 0, mask & 2 != 0, mask & 4 != 0, mask & 8 != 0);
            let out = run(&op, &names, &["petId".to_string()], None);
            let tuple = out.primary.body.contains("shouldFetch ? [url, params] : null");
            let url = out.primary.body.contains("shouldFetch ? url : null");
            assert!(tuple ^ url, "exactly one cache key variant for mask {mask}");
            assert_eq!(tuple, mask & 1 != 0);
        }
    }

    #[test]
    fn test_parameters_keep_position() {
        let op = Operation::new("pets", HttpMethod::Put, "/pets/{petId}")
            .with_parameter("petId", ParameterLocation::Path, true);
        let out = run(&op, &names(false, true, true, true), &["petId".to_string()], None);
        let params = &out.primary.params;
        assert!(params.starts_with("petId: PetPathParams[\"petId\"], headers?: Pets[\"headerParams\"], options: {"));
        assert!(!params.contains("params?:"));
        assert!(params.ends_with("} = {}"));
        assert!(out.primary.body.contains("const url = `/pets/${petId}` as const;"));
    }

    #[test]
    fn test_generics_without_request() {
        let op = Operation::new("pets", HttpMethod::Get, "/pets");
        let out = run(&op, &names(false, false, false, false), &[], None);
        assert_eq!(
            out.primary.return_type.as_deref(),
            Some("SWRMutationResponse<Pets[\"response\"], Pets[\"error\"], typeof url | null>")
        );
        assert!(out.primary.body.contains("client<Pets[\"data\"], Pets[\"error\"]>({"));
        assert!(out.primary.body.contains("async (_url) => {"));
    }

    #[test]
    fn test_generics_with_request() {
        let op = Operation::new("pets", HttpMethod::Post, "/pets").with_request_body(None);
        let out = run(&op, &names(false, true, false, false), &[], None);
        assert_eq!(
            out.primary.return_type.as_deref(),
            Some(
                "SWRMutationResponse<Pets[\"response\"], Pets[\"error\"], typeof url | null, Pets[\"request\"]>"
            )
        );
        assert!(out.primary.body.contains("async (_url, { arg: data }) => {"));
        assert!(out.primary.body.contains("        data,\n"));
    }

    #[test]
    fn test_form_requires_binding_and_request() {
        let op = Operation::new("pets", HttpMethod::Post, "/pets").with_request_body(None);

        let without = run(&op, &names(false, true, false, false), &[], None);
        assert!(without.form.is_none());

        let no_request = run(&op, &names(false, false, false, false), &[], Some(binding()));
        assert!(no_request.form.is_none());

        let with = run(&op, &names(false, true, false, false), &[], Some(binding()));
        let form = with.form.unwrap();
        assert_eq!(form.decl.name, "useFormPets");
        assert_eq!(form.decl.params, "...args: Parameters<typeof usePets>");
        assert!(form.decl.body.contains("resolver: zodResolver(createPetRequestSchema),"));
        assert!(form.decl.body.contains("function onSubmit(formValue: Pets[\"request\"]) {"));
    }

    #[test]
    fn test_form_skipped_without_derivable_name() {
        let op = Operation::new("pets", HttpMethod::Post, "/pets").with_request_body(None);
        let out = synthesize(
            MutationInput {
                operation: &op,
                name: "use",
                factory: "Pets",
                names: &names(false, true, false, false),
                path_params: &[],
                data_return_type: DataReturnType::Data,
                form: Some(binding()),
            },
            &SwrMutationTemplate,
        )
        .unwrap();
        assert_eq!(out.primary.name, "use");
        assert!(out.form.is_none());
    }

    #[test]
    fn test_full_data_return_type() {
        let op = Operation::new("pets", HttpMethod::Get, "/pets");
        let out = synthesize(
            MutationInput {
                operation: &op,
                name: "usePets",
                factory: "Pets",
                names: &names(true, false, false, false),
                path_params: &[],
                data_return_type: DataReturnType::Full,
                form: None,
            },
            &SwrMutationTemplate,
        )
        .unwrap();
        assert!(out.primary.body.contains("return res;"));
    }
}
