use opgen_core::file::TypeDecl;
use opgen_core::manager::ResolvedNames;

use crate::options::DataReturnType;

const NEVER: &str = "never";

/// Name of the alias of the typed client call.
pub fn client_alias(factory: &str) -> String {
    format!("{factory}Client")
}

/// The client alias followed by the factory type, in declaration order.
pub fn factory_types(
    factory: &str,
    names: &ResolvedNames,
    data_return_type: DataReturnType,
) -> [TypeDecl; 2] {
    let client = client_alias(factory);

    let data = names.response().unwrap_or(NEVER);
    let errors: Vec<&str> = names.errors().collect();
    let error = if errors.is_empty() {
        NEVER.to_string()
    } else {
        let mut unique: Vec<&str> = Vec::new();
        for name in errors {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        unique.join(" | ")
    };
    let response = match data_return_type {
        DataReturnType::Data => data.to_string(),
        DataReturnType::Full => format!("ResponseConfig<{data}>"),
    };
    let or_never = |name: &Option<String>| name.clone().unwrap_or_else(|| NEVER.to_string());

    let alias = TypeDecl {
        name: client.clone(),
        exported: false,
        value: format!(
            "typeof client<{factory}[\"data\"], {factory}[\"error\"], {factory}[\"request\"]>"
        ),
        jsdoc: Vec::new(),
    };

    let members = [
        ("data", data.to_string()),
        ("error", error),
        ("request", or_never(&names.request)),
        ("pathParams", or_never(&names.parameters.path)),
        ("queryParams", or_never(&names.parameters.query)),
        ("headerParams", or_never(&names.parameters.header)),
        ("response", response),
        (
            "client",
            format!(
                "{{\n    parameters: Partial<Parameters<{client}>[0]>;\n    return: Awaited<ReturnType<{client}>>;\n  }}"
            ),
        ),
    ];
    let body: String = members
        .iter()
        .map(|(key, ty)| format!("  {key}: {ty};\n"))
        .collect();

    let factory_type = TypeDecl {
        name: factory.to_string(),
        exported: false,
        value: format!("{{\n{body}}}"),
        jsdoc: Vec::new(),
    };

    [alias, factory_type]
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use opgen_core::ir::StatusKey;
    use opgen_core::manager::ParameterNames;

    fn list_pets() -> ResolvedNames {
        ResolvedNames {
            request: None,
            parameters: ParameterNames {
                path: None,
                query: Some("ListPetsQueryParams".to_string()),
                header: None,
            },
            responses: IndexMap::from([
                (StatusKey::Code(200), "Pet".to_string()),
                (StatusKey::Code(404), "Error".to_string()),
            ]),
            response_key: StatusKey::Code(200),
        }
    }

    #[test]
    fn test_factory_type() {
        let [alias, factory] = factory_types("ListPets", &list_pets(), DataReturnType::Data);
        assert_eq!(alias.name, "ListPetsClient");
        assert_eq!(
            alias.value,
            "typeof client<ListPets[\"data\"], ListPets[\"error\"], ListPets[\"request\"]>"
        );
        insta::assert_snapshot!(factory.value, @r"
        {
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
        }
        ");
    }

    #[test]
    fn test_full_response_and_error_union() {
        let mut names = list_pets();
        names.responses.insert(StatusKey::Code(500), "ServerError".to_string());
        names.responses.insert(StatusKey::Code(503), "ServerError".to_string());
        let [_, factory] = factory_types("ListPets", &names, DataReturnType::Full);
        assert!(factory.value.contains("  error: Error | ServerError;\n"));
        assert!(factory.value.contains("  response: ResponseConfig<Pet>;\n"));
        assert!(factory.value.contains("  data: Pet;\n"));
    }
}
