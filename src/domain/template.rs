//! Minimal placeholder substitution for bootstrap scripts.
//!
//! Scripts carry placeholders of exactly two shapes:
//!
//! - `{{ name }}` — required, resolved from the supplied variables;
//! - `{{ name | default('literal') }}` — optional, falling back to the
//!   quoted literal when the variable is absent.
//!
//! This is the whole templating contract. It is a deliberate key/default
//! substitution, not a general template engine: `default(...)` is the
//! only filter, and anything else inside the braces is an authoring
//! error surfaced as [`ProfileError::MalformedPlaceholder`].

use std::collections::HashMap;

use crate::domain::error::ProfileError;

/// Resolves every `{{ ... }}` placeholder in `template` from `variables`.
///
/// A supplied value always wins over a placeholder's default. Text
/// outside placeholders passes through verbatim, including the `%s`
/// instance-suffix site, which is not this layer's concern.
///
/// # Errors
///
/// `MissingVariable` when a placeholder has neither a value nor a
/// default; `MalformedPlaceholder` for unterminated braces or an unknown
/// filter.
pub fn render(template: &str, variables: &HashMap<String, String>) -> Result<String, ProfileError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return Err(ProfileError::MalformedPlaceholder(format!(
                "unterminated '{{{{' near: {}",
                snippet(&rest[start..])
            )));
        };
        out.push_str(&resolve(&after[..end], variables)?);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Resolves the text between one pair of braces.
fn resolve(inner: &str, variables: &HashMap<String, String>) -> Result<String, ProfileError> {
    let (name, default) = match inner.split_once('|') {
        Some((name, filter)) => {
            let default = parse_default(filter.trim()).ok_or_else(|| {
                ProfileError::MalformedPlaceholder(format!(
                    "unsupported filter '{}' (only default('...') is allowed)",
                    filter.trim()
                ))
            })?;
            (name.trim(), Some(default))
        }
        None => (inner.trim(), None),
    };
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ProfileError::MalformedPlaceholder(format!(
            "invalid variable name '{name}'"
        )));
    }
    if let Some(value) = variables.get(name) {
        return Ok(value.clone());
    }
    match default {
        Some(literal) => Ok(literal.to_string()),
        None => Err(ProfileError::MissingVariable(name.to_string())),
    }
}

/// Parses `default('literal')` or `default("literal")`, returning the
/// unquoted literal. Returns `None` when the filter is anything else.
fn parse_default(filter: &str) -> Option<&str> {
    let body = filter.strip_prefix("default(")?.strip_suffix(')')?.trim();
    body.strip_prefix('\'')
        .and_then(|b| b.strip_suffix('\''))
        .or_else(|| body.strip_prefix('"').and_then(|b| b.strip_suffix('"')))
}

/// Short excerpt of the offending text for error messages.
fn snippet(text: &str) -> &str {
    let end = text
        .char_indices()
        .take(40)
        .last()
        .map_or(0, |(i, c)| i + c.len_utf8());
    &text[..end]
}
