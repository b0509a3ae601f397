//! Query rewriting: substitution of caller-supplied values.
//!
//! Every required parameter must be supplied before any text changes; a
//! violation is a hard validation failure with no partial substitution.
//! Replacement is token-boundary safe: `?_x` never clobbers the front of
//! `?_x2`.

use std::collections::HashMap;

use crate::config::XSD_PREFIX;
use crate::error::{Error, Result};
use crate::templating::parameters::{ParamType, ParameterDescriptor};

/// Rewrites the query, replacing each descriptor's placeholder with the
/// formatted value supplied for it:
///
/// - `number` values go in verbatim
/// - `iri`-formatted values are wrapped as `<value>`
/// - language-tagged values become `"value"@lang`
/// - datatyped values become `"value"^^datatype`, pulling in the `xsd:`
///   prefix declaration when needed
/// - everything else becomes a plain `"value"` literal
pub fn rewrite_query(
    query: &str,
    parameters: &HashMap<String, ParameterDescriptor>,
    args: &HashMap<String, String>,
) -> Result<String> {
    let mut missing: Vec<&str> = parameters
        .values()
        .filter(|p| p.required && !args.contains_key(&p.name))
        .map(|p| p.name.as_str())
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(Error::Validation(format!(
            "provided parameters do not cover the required parameters: missing {}",
            missing.join(", ")
        )));
    }

    let mut rewritten = query.to_string();
    let mut require_xsd = false;

    for (name, value) in args {
        let Some(descriptor) = parameters.get(name) else { continue };
        if value.is_empty() {
            continue;
        }

        let formatted = if descriptor.param_type == ParamType::Number {
            value.clone()
        } else if descriptor.format.as_deref() == Some("iri") {
            format!("<{}>", value)
        } else if let Some(lang) = &descriptor.lang {
            format!("\"{}\"@{}", value, lang)
        } else if let Some(datatype) = &descriptor.datatype {
            if datatype.starts_with("xsd:") {
                require_xsd = true;
            }
            format!("\"{}\"^^{}", value, datatype)
        } else {
            format!("\"{}\"", value)
        };

        rewritten = replace_token(&rewritten, &descriptor.placeholder, &formatted);
    }

    if require_xsd && !rewritten.contains(XSD_PREFIX) {
        rewritten = rewritten.replacen("SELECT", &format!("{}\n\nSELECT", XSD_PREFIX), 1);
    }

    Ok(rewritten)
}

/// Replaces `token` wherever it occurs as a complete token, i.e. not
/// followed by an identifier character.
pub(crate) fn replace_token(text: &str, token: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (idx, _) in text.match_indices(token) {
        let end = idx + token.len();
        if is_token_boundary(text, end) {
            out.push_str(&text[last..idx]);
            out.push_str(replacement);
            last = end;
        }
    }
    out.push_str(&text[last..]);
    out
}

/// True when `token` occurs in `text` as a complete token.
pub(crate) fn contains_token(text: &str, token: &str) -> bool {
    text.match_indices(token).any(|(idx, _)| is_token_boundary(text, idx + token.len()))
}

fn is_token_boundary(text: &str, end: usize) -> bool {
    text.as_bytes()
        .get(end)
        .map_or(true, |b| !(b.is_ascii_alphanumeric() || *b == b'_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_token_respects_boundaries() {
        let text = "?_x ?_x2 (?_x)";
        assert_eq!(replace_token(text, "?_x", "\"a\""), "\"a\" ?_x2 (\"a\")");
    }

    #[test]
    fn test_contains_token() {
        assert!(contains_token("{ ?s a ?_kind . }", "?_kind"));
        assert!(!contains_token("{ ?s a ?_kind2 . }", "?_kind"));
    }
}
