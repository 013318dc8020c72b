//! Parse and validate the oracle's raw reply.
//!
//! The reply is untrusted free text. It must resolve to exactly one of the
//! candidate categories, and the value handed back is always the caller's own
//! `CategoryMeta`, never the strings the oracle echoed.

use serde_json::{Map, Value};
use tally_core::CategoryMeta;

use crate::error::SuggestError;
use crate::prompt::{ID_FIELD, NAME_FIELD};

/// Values the oracle sometimes emits instead of a real answer.
const PLACEHOLDERS: [&str; 6] = ["", "none", "null", "undefined", "n/a", "todo"];

/// Turn raw oracle text into one canonical candidate category.
///
/// Checks run in a fixed order and the first failure is returned:
/// JSON object present, both fields non-empty strings, no placeholders,
/// id is not a category name, id is known, name agrees with the id.
pub fn parse_suggest_response(
    text: &str,
    categories: &[CategoryMeta],
) -> Result<CategoryMeta, SuggestError> {
    let json = extract_json_object(text)?;

    let id = match json.get(ID_FIELD).and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id,
        _ => return Err(SuggestError::InvalidField(format!("missing or empty {ID_FIELD}"))),
    };
    let name = match json.get(NAME_FIELD).and_then(Value::as_str).map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => return Err(SuggestError::InvalidField(format!("missing or empty {NAME_FIELD}"))),
    };

    if is_placeholder(id) || is_placeholder(name) {
        return Err(SuggestError::InvalidField(format!(
            "placeholder value in response: id=\"{id}\", name=\"{name}\""
        )));
    }

    let id_lower = id.to_lowercase();
    if categories.iter().any(|c| c.name.to_lowercase() == id_lower) {
        return Err(SuggestError::FieldSwap { id: id.to_string() });
    }

    let Some(canonical) = categories.iter().find(|c| c.id.as_str() == id) else {
        return Err(SuggestError::UnknownCategory {
            id: id.to_string(),
            allowed: categories.iter().map(|c| c.id.to_string()).collect(),
        });
    };

    if canonical.name.to_lowercase() != name.to_lowercase() {
        return Err(SuggestError::NameMismatch {
            id: id.to_string(),
            name: name.to_string(),
            canonical: canonical.name.clone(),
        });
    }

    Ok(canonical.clone())
}

fn is_placeholder(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    PLACEHOLDERS.contains(&v.as_str())
}

/// The span from the first `{` to the last `}` in `text`, parsed as one
/// JSON object.
///
/// Stray braces in surrounding prose end up inside the span and make the
/// parse fail; the reply is rejected rather than guessed at.
fn extract_json_object(text: &str) -> Result<Map<String, Value>, SuggestError> {
    let span = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => {
            return Err(SuggestError::MalformedResponse(
                "no JSON object found in response".to_string(),
            ));
        }
    };

    serde_json::from_str(span)
        .map_err(|e| SuggestError::MalformedResponse(format!("JSON parse failure: {e}")))
}
