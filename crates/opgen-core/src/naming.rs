use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToSnakeCase};
use serde::{Deserialize, Serialize};

/// Identifier casing applied by a naming rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Casing {
    #[default]
    Camel,
    Pascal,
    Snake,
    Kebab,
}

/// Convert `name` to the given casing after sanitizing it to identifier
/// characters. The result never starts with a digit.
pub fn apply_case(name: &str, casing: Casing) -> String {
    let sanitized = sanitize_identifier(name);
    let cased = match casing {
        Casing::Camel => sanitized.to_lower_camel_case(),
        Casing::Pascal => sanitized.to_pascal_case(),
        Casing::Snake => sanitized.to_snake_case(),
        Casing::Kebab => sanitized.to_kebab_case(),
    };
    // heck drops the leading `_` added by `sanitize_identifier`
    if cased.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{cased}")
    } else {
        cased
    }
}

/// How one artifact kind of one plugin is named: `prefix`, the logical name
/// and `suffix` are joined as separate words and then cased, so
/// `use` + `listPets` in camel case gives `useListPets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingRule {
    pub case: Casing,
    pub prefix: String,
    pub suffix: String,
}

impl NamingRule {
    pub fn new(case: Casing) -> Self {
        Self {
            case,
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    pub fn apply(&self, name: &str) -> String {
        let words: Vec<String> = [self.prefix.as_str(), name, self.suffix.as_str()]
            .into_iter()
            .filter(|w| !w.is_empty())
            .map(sanitize_identifier)
            .collect();
        apply_case(&words.join("_"), self.case)
    }
}

/// Derive a camelCase operation name from HTTP method + path.
///
/// Examples:
/// - `GET /users` → `listUsers`
/// - `POST /users` → `createUsers`
/// - `GET /users/{userId}` → `getUser`
/// - `DELETE /users/{userId}` → `deleteUser`
/// - `GET /users/{userId}/messages` → `listUsersMessages`
pub fn route_to_name(method: &str, path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let mut resource_parts: Vec<&str> = Vec::new();
    let mut ends_with_param = false;

    for seg in &segments {
        if seg.starts_with('{') && seg.ends_with('}') {
            ends_with_param = true;
        } else {
            resource_parts.push(seg);
            ends_with_param = false;
        }
    }

    let method_lower = method.to_lowercase();
    let prefix = match method_lower.as_str() {
        "get" if ends_with_param => "get",
        "get" => "list",
        "post" => "create",
        "put" => "update",
        other => other,
    };

    if resource_parts.is_empty() {
        return prefix.to_string();
    }

    let mut pascal_parts = String::new();
    for (i, part) in resource_parts.iter().enumerate() {
        let is_last = i == resource_parts.len() - 1;
        let word = if is_last && ends_with_param {
            singularize(part)
        } else {
            part.to_string()
        };
        pascal_parts.push_str(&apply_case(&word, Casing::Pascal));
    }

    format!("{prefix}{pascal_parts}")
}

/// Naive singularization: strips trailing 's' if present.
fn singularize(word: &str) -> String {
    if word.ends_with("ies") && word.len() > 3 {
        format!("{}y", &word[..word.len() - 3])
    } else if word.ends_with("ses") || word.ends_with("xes") || word.ends_with("zes") {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Replace every run of non-alphanumeric characters with a single `_` and
/// prefix a leading digit with `_`.
pub fn sanitize_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_was_separator = false;

    for (i, ch) in name.chars().enumerate() {
        if ch.is_alphanumeric() {
            if i == 0 && ch.is_ascii_digit() {
                result.push('_');
            }
            if prev_was_separator && !result.is_empty() {
                result.push('_');
            }
            result.push(ch);
            prev_was_separator = false;
        } else {
            prev_was_separator = true;
        }
    }

    if result.is_empty() {
        return "unnamed".to_string();
    }

    result
}
