use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::naming::route_to_name;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    #[serde(alias = "GET")]
    Get,
    #[serde(alias = "POST")]
    Post,
    #[serde(alias = "PUT")]
    Put,
    #[serde(alias = "DELETE")]
    Delete,
    #[serde(alias = "PATCH")]
    Patch,
    #[serde(alias = "OPTIONS")]
    Options,
    #[serde(alias = "HEAD")]
    Head,
    #[serde(alias = "TRACE")]
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lowercase form, as written into generated client calls.
    pub fn as_lower(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a response or error schema: a numeric status code, or the
/// literal `default` fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "RawStatus")]
pub enum StatusKey {
    Code(u16),
    Default,
}

impl StatusKey {
    pub const DEFAULT_LABEL: &'static str = "default";

    pub fn code(&self) -> Option<u16> {
        match self {
            StatusKey::Code(code) => Some(*code),
            StatusKey::Default => None,
        }
    }

    /// Key for an optional status code, falling back to `default`.
    pub fn from_code(code: Option<u16>) -> Self {
        code.map_or(StatusKey::Default, StatusKey::Code)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StatusKey::Code(code) if (200..300).contains(code))
    }
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusKey::Code(code) => write!(f, "{code}"),
            StatusKey::Default => f.write_str(Self::DEFAULT_LABEL),
        }
    }
}

impl Serialize for StatusKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StatusKey::Code(code) => serializer.serialize_u16(*code),
            StatusKey::Default => serializer.serialize_str(Self::DEFAULT_LABEL),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStatus {
    Code(u16),
    Text(String),
}

impl TryFrom<RawStatus> for StatusKey {
    type Error = String;

    fn try_from(raw: RawStatus) -> Result<Self, Self::Error> {
        match raw {
            RawStatus::Code(code) => Ok(StatusKey::Code(code)),
            RawStatus::Text(text) if text.eq_ignore_ascii_case(StatusKey::DEFAULT_LABEL) => {
                Ok(StatusKey::Default)
            }
            RawStatus::Text(text) => text
                .parse::<u16>()
                .map(StatusKey::Code)
                .map_err(|_| format!("invalid status code: {text}")),
        }
    }
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// A declared path/query/header/cookie parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationParameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(default)]
    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A declared request body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OperationRequestBody {
    /// Explicit schema name; derived from the operation when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A declared response, keyed by status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResponse {
    pub status: StatusKey,

    /// Explicit schema name; derived from the operation when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One API endpoint, as handed over by the document parser.
///
/// Operations are never mutated by the pipeline; every component only
/// borrows them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId", alias = "id", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    pub method: HttpMethod,

    pub path: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub deprecated: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<OperationParameter>,

    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<OperationRequestBody>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<OperationResponse>,
}

impl Operation {
    pub fn new(operation_id: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            operation_id: Some(operation_id.into()),
            method,
            path: path.into(),
            tags: Vec::new(),
            summary: None,
            description: None,
            deprecated: false,
            parameters: Vec::new(),
            request_body: None,
            responses: Vec::new(),
        }
    }

    /// The stable identifier used as the resolution key. Falls back to a
    /// route-derived name (`GET /pets/{id}` → `getPet`) when the document
    /// carries no `operationId`.
    pub fn id(&self) -> String {
        match &self.operation_id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => route_to_name(self.method.as_str(), &self.path),
        }
    }

    /// First classification tag, used to group generated files.
    pub fn first_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    pub fn parameters_in(
        &self,
        location: ParameterLocation,
    ) -> impl Iterator<Item = &OperationParameter> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        location: ParameterLocation,
        required: bool,
    ) -> Self {
        self.parameters.push(OperationParameter {
            name: name.into(),
            location,
            required,
            description: None,
        });
        self
    }

    pub fn with_request_body(mut self, schema: Option<&str>) -> Self {
        self.request_body = Some(OperationRequestBody {
            schema: schema.map(String::from),
            required: true,
            description: None,
        });
        self
    }

    pub fn with_response(mut self, status: StatusKey, schema: Option<&str>) -> Self {
        self.responses.push(OperationResponse {
            status,
            schema: schema.map(String::from),
            description: None,
        });
        self
    }
}
