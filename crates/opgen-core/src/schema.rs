use serde::Serialize;

use crate::ir::{HttpMethod, Operation, OperationResponse, ParameterLocation, StatusKey};
use crate::naming::{Casing, apply_case};

/// Semantic slot a schema occupies on an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaRole {
    Request,
    PathParams,
    QueryParams,
    HeaderParams,
    Response,
    Error,
}

/// A named schema attached to an operation, before name resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaRef {
    pub name: String,
    pub role: SchemaRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Property keys, in declaration order. Filled for parameter schemas.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<String>,
}

impl SchemaRef {
    pub fn new(name: impl Into<String>, role: SchemaRole) -> Self {
        Self {
            name: name.into(),
            role,
            status_code: None,
            properties: Vec::new(),
        }
    }

    pub fn with_status(mut self, status_code: Option<u16>) -> Self {
        self.status_code = status_code;
        self
    }
}

/// Every schema of one operation, grouped by role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaBundle {
    pub request: Option<SchemaRef>,
    pub path_params: Option<SchemaRef>,
    pub query_params: Option<SchemaRef>,
    pub header_params: Option<SchemaRef>,
    pub response: SchemaRef,
    pub errors: Vec<SchemaRef>,
}

/// Schema discovery for an operation.
pub trait SchemaExtractor: Send + Sync {
    /// Extract the schemas of `operation`. With `status_code`, `response` is
    /// narrowed to the response declared for that code.
    fn extract(&self, operation: &Operation, status_code: Option<u16>) -> SchemaBundle;
}

/// Extractor deriving schema names from the operation identifier:
/// `{Op}PathParams`, `{Op}QueryParams`, `{Op}HeaderParams`,
/// `{Op}MutationRequest`, `{Op}MutationResponse` (`Query*` for GET) and
/// `{Op}{status}` for other responses. Explicit schema names declared on
/// the operation take precedence.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionalExtractor;

impl ConventionalExtractor {
    fn parameters(
        operation: &Operation,
        base: &str,
        location: ParameterLocation,
        role: SchemaRole,
        suffix: &str,
    ) -> Option<SchemaRef> {
        let properties: Vec<String> = operation
            .parameters_in(location)
            .map(|p| p.name.clone())
            .collect();
        if properties.is_empty() {
            return None;
        }
        Some(SchemaRef {
            name: format!("{base}{suffix}"),
            role,
            status_code: None,
            properties,
        })
    }

    fn status_schema(base: &str, response: &OperationResponse, role: SchemaRole) -> SchemaRef {
        let name = response.schema.clone().unwrap_or_else(|| match response.status {
            StatusKey::Code(code) => format!("{base}{code}"),
            StatusKey::Default => format!("{base}Error"),
        });
        SchemaRef::new(name, role).with_status(response.status.code())
    }
}

impl SchemaExtractor for ConventionalExtractor {
    fn extract(&self, operation: &Operation, status_code: Option<u16>) -> SchemaBundle {
        let base = apply_case(&operation.id(), Casing::Pascal);
        let flavor = if operation.method == HttpMethod::Get {
            "Query"
        } else {
            "Mutation"
        };

        let request = operation.request_body.as_ref().map(|body| {
            let name = body
                .schema
                .clone()
                .unwrap_or_else(|| format!("{base}{flavor}Request"));
            SchemaRef::new(name, SchemaRole::Request)
        });

        let primary = operation
            .responses
            .iter()
            .position(|r| r.status.is_success())
            .or_else(|| {
                operation
                    .responses
                    .iter()
                    .position(|r| r.status == StatusKey::Default)
            });

        let mut response = match primary.map(|i| &operation.responses[i]) {
            Some(declared) => SchemaRef::new(
                declared
                    .schema
                    .clone()
                    .unwrap_or_else(|| format!("{base}{flavor}Response")),
                SchemaRole::Response,
            )
            .with_status(declared.status.code()),
            None => SchemaRef::new(format!("{base}{flavor}Response"), SchemaRole::Response),
        };

        let errors = operation
            .responses
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != primary)
            .map(|(_, r)| Self::status_schema(&base, r, SchemaRole::Error))
            .collect();

        if let Some(code) = status_code
            && response.status_code != Some(code)
            && let Some(declared) = operation
                .responses
                .iter()
                .find(|r| r.status == StatusKey::Code(code))
        {
            response = Self::status_schema(&base, declared, SchemaRole::Response);
        }

        SchemaBundle {
            request,
            path_params: Self::parameters(
                operation,
                &base,
                ParameterLocation::Path,
                SchemaRole::PathParams,
                "PathParams",
            ),
            query_params: Self::parameters(
                operation,
                &base,
                ParameterLocation::Query,
                SchemaRole::QueryParams,
                "QueryParams",
            ),
            header_params: Self::parameters(
                operation,
                &base,
                ParameterLocation::Header,
                SchemaRole::HeaderParams,
                "HeaderParams",
            ),
            response,
            errors,
        }
    }
}
