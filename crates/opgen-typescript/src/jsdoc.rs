use opgen_core::ir::Operation;

use crate::url_path::UrlPath;

/// Escape `*/` sequences that would prematurely close JSDoc comment blocks.
pub fn escape_jsdoc(value: &str) -> String {
    value.replace("*/", "*\\/")
}

/// JSDoc tag lines describing an operation: description, summary, a link
/// to the route and the deprecation marker.
pub fn operation_comments(operation: &Operation) -> Vec<String> {
    let mut comments = Vec::new();
    if let Some(description) = operation.description.as_deref().filter(|d| !d.trim().is_empty()) {
        comments.push(format!("@description {}", escape_jsdoc(description.trim())));
    }
    if let Some(summary) = operation.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        comments.push(format!("@summary {}", escape_jsdoc(summary.trim())));
    }
    comments.push(format!("@link {}", UrlPath::new(&operation.path).to_url()));
    if operation.deprecated {
        comments.push("@deprecated".to_string());
    }
    comments
}
