//! Validation utilities for configuration values

use miette::SourceSpan;

/// Words of the Strata language that cannot name a module.
pub(crate) const KEYWORDS: &[&str] = &["let", "fn", "if", "else", "true", "false"];

/// Validate a module name.
/// Returns None if valid, Some(reason) if invalid
pub fn validate_module_name(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();

    // First character must be a letter or underscore
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        Some(_) => return Some("name must start with a letter or underscore"),
        None => return Some("name cannot be empty"),
    }

    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Some("name must contain only letters, numbers, and underscores");
    }

    if KEYWORDS.contains(&name) {
        return Some("name is a reserved keyword");
    }

    None
}

/// Find the span of a quoted string value in the TOML source
pub(crate) fn find_value_span(src: &str, value: &str) -> Option<SourceSpan> {
    let quoted = [format!("\"{}\"", value), format!("'{}'", value)];

    for pattern in &quoted {
        if let Some(pos) = src.find(pattern) {
            // +1 to skip the opening quote
            return Some(SourceSpan::from((pos + 1, value.len())));
        }
    }

    None
}
